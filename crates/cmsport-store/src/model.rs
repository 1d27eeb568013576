//! Snapshot entities: items, templates and field values.

use chrono::{DateTime, Utc};
use cmsport_common::ContentId;
use serde::{Deserialize, Serialize};

/// A field definition on a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateField {
    pub id: ContentId,
    pub name: String,
    /// Declared type name, e.g. `Rich Text` or `Treelist`.
    #[serde(rename = "type")]
    pub field_type: String,
}

impl TemplateField {
    pub fn new(id: ContentId, name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            field_type: field_type.into(),
        }
    }
}

/// A schema definition shared by all items of one content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: ContentId,
    pub name: String,
    /// Item supplying default field values for items of this template.
    #[serde(default)]
    pub standard_values: Option<ContentId>,
    #[serde(default)]
    pub fields: Vec<TemplateField>,
}

impl Template {
    pub fn new(id: ContentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            standard_values: None,
            fields: Vec::new(),
        }
    }

    /// Add a field definition.
    pub fn with_field(mut self, field: TemplateField) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the standard values item.
    pub fn with_standard_values(mut self, id: ContentId) -> Self {
        self.standard_values = Some(id);
        self
    }

    /// Find a field by id (when `key` parses as one) or by case-insensitive name.
    pub fn find_field(&self, key: &str) -> Option<&TemplateField> {
        if let Ok(id) = key.parse::<ContentId>() {
            if let Some(field) = self.field(&id) {
                return Some(field);
            }
        }
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(key))
    }

    /// Get a field by id.
    pub fn field(&self, id: &ContentId) -> Option<&TemplateField> {
        self.fields.iter().find(|f| f.id == *id)
    }
}

/// The stored value of one field on one item, in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    pub field_id: ContentId,
    pub item_id: ContentId,
    /// Language tag; empty for shared values that answer every language.
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub updated: DateTime<Utc>,
}

impl FieldValue {
    pub fn new(
        item_id: ContentId,
        field_id: ContentId,
        language: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field_id,
            item_id,
            language: language.into(),
            value: value.into(),
            created: DateTime::<Utc>::default(),
            updated: DateTime::<Utc>::default(),
        }
    }

    /// Whether this value is shared across languages.
    #[inline]
    pub fn is_shared(&self) -> bool {
        self.language.is_empty()
    }

    /// Whether this value was created or updated after `since`.
    pub fn modified_since(&self, since: DateTime<Utc>) -> bool {
        self.created > since || self.updated > since
    }
}

/// A content node in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ContentId,
    pub name: String,
    pub path: String,
    pub template_id: ContentId,
    #[serde(default)]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub updated: DateTime<Utc>,
    /// Field values assigned by the loader.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<FieldValue>,
}

impl Item {
    pub fn new(
        id: ContentId,
        name: impl Into<String>,
        path: impl Into<String>,
        template_id: ContentId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            path: path.into(),
            template_id,
            created: DateTime::<Utc>::default(),
            updated: DateTime::<Utc>::default(),
            values: Vec::new(),
        }
    }

    /// Attach a value for `field_id` in `language`.
    pub fn with_value(
        mut self,
        field_id: ContentId,
        language: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let fv = FieldValue::new(self.id, field_id, language, value);
        self.values.push(fv);
        self
    }

    /// Get the value of a field for a language.
    ///
    /// A value stored for exactly `language` wins over a shared value.
    pub fn field_value(&self, field_id: &ContentId, language: &str) -> Option<&FieldValue> {
        let mut shared = None;
        for fv in self.values.iter().filter(|fv| fv.field_id == *field_id) {
            if fv.language.eq_ignore_ascii_case(language) {
                return Some(fv);
            }
            if fv.is_shared() {
                shared = Some(fv);
            }
        }
        shared
    }

    /// Whether the item or any of its field values changed after `since`.
    pub fn modified_since(&self, since: DateTime<Utc>) -> bool {
        self.created > since
            || self.updated > since
            || self.values.iter().any(|fv| fv.modified_since(since))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn id(n: u8) -> ContentId {
        ContentId::from_bytes([n; 16])
    }

    #[test]
    fn test_find_field_by_name_and_id() {
        let template = Template::new(id(1), "Page")
            .with_field(TemplateField::new(id(2), "Title", "Single-Line Text"))
            .with_field(TemplateField::new(id(3), "Body", "Rich Text"));

        assert_eq!(template.find_field("title").map(|f| f.id), Some(id(2)));
        assert_eq!(template.find_field(&id(3).to_string()).map(|f| f.name.as_str()), Some("Body"));
        assert_eq!(template.find_field(&id(3).to_braced()).map(|f| f.id), Some(id(3)));
        assert!(template.find_field("Missing").is_none());
    }

    #[test]
    fn test_field_value_prefers_language() {
        let item = Item::new(id(10), "home", "/content/home", id(1))
            .with_value(id(2), "", "shared")
            .with_value(id(2), "en", "english")
            .with_value(id(2), "de", "deutsch");

        assert_eq!(item.field_value(&id(2), "en").map(|v| v.value.as_str()), Some("english"));
        assert_eq!(item.field_value(&id(2), "DE").map(|v| v.value.as_str()), Some("deutsch"));
        assert_eq!(item.field_value(&id(2), "fr").map(|v| v.value.as_str()), Some("shared"));
        assert!(item.field_value(&id(3), "en").is_none());
    }

    #[test]
    fn test_modified_since_checks_values() {
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut item = Item::new(id(10), "home", "/content/home", id(1)).with_value(id(2), "en", "x");
        assert!(!item.modified_since(since));

        item.values[0].updated = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert!(item.modified_since(since));
    }
}
