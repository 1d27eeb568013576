//! Groups resolved items by template.

use std::collections::BTreeMap;

use cmsport_store::{Item, Snapshot};

use crate::error::FieldError;
use crate::model::{Group, Resolved, ResolvedField, ResolvedItem};
use crate::registry::HandlerRegistry;
use crate::resolver::{FieldInput, Resolver};
use crate::settings::Settings;

/// Result of assembling a snapshot.
#[derive(Debug, Default)]
pub struct Assembly {
    /// One group per exported template, ordered by group name.
    pub groups: Vec<Group>,
    /// Fields that failed to resolve and were left out.
    pub errors: Vec<FieldError>,
    /// Entries skipped inside otherwise resolved fields.
    pub warnings: Vec<FieldError>,
}

impl Assembly {
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name() == name)
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.items().len()).sum()
    }
}

/// Resolve every configured field of every report item and fold the results
/// into groups.
///
/// Field failures are logged, recorded in the [`Assembly`], and never abort
/// the item or the run.
pub fn assemble(snapshot: &Snapshot, settings: &Settings, registry: &HandlerRegistry) -> Assembly {
    let mut resolver = Resolver::new(registry, snapshot, settings.assets(), settings.language());
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for item in snapshot.report_items() {
        let Some(template_settings) = settings.template(&item.template_id) else {
            continue;
        };
        let Some(template) = snapshot.template_of(item) else {
            tracing::warn!(item = %item.id, template = %item.template_id, "template not found, skipping item");
            continue;
        };

        let mut resolved =
            ResolvedItem::describe(item).with_template(template_settings.name.clone());

        for field_settings in template_settings.fields() {
            if field_settings.is_pseudo() {
                match pseudo_value(&field_settings.name, item, &template.name) {
                    Some(value) => resolved.push_field(ResolvedField::new(
                        field_settings.output_name(),
                        Resolved::Scalar(value),
                    )),
                    None => {
                        tracing::debug!(item = %item.id, field = %field_settings.name, "unknown pseudo-field");
                    }
                }
                continue;
            }
            let Some(field) = template.find_field(&field_settings.name) else {
                tracing::debug!(item = %item.id, field = %field_settings.name, "field not on template");
                continue;
            };
            let Some(value) = snapshot.field_value_or_default(item, &field.id, settings.language())
            else {
                continue;
            };

            let input = FieldInput {
                value,
                field,
                item,
                settings: field_settings,
            };
            match resolver.resolve(&input) {
                Ok(value) => {
                    resolved.push_field(ResolvedField::new(field_settings.output_name(), value));
                }
                Err(err) => {
                    tracing::warn!(item = %item.id, field = %field.name, "{}", err);
                    errors.push(err);
                }
            }
            warnings.extend(resolver.take_diagnostics());
        }
        resolved.sort_fields();

        groups
            .entry(template_settings.name.clone())
            .or_insert_with(|| Group::new(template_settings.name.clone()))
            .push(resolved);
    }

    let assembly = Assembly {
        groups: groups.into_values().collect(),
        errors,
        warnings,
    };
    tracing::info!(
        groups = assembly.groups.len(),
        items = assembly.item_count(),
        errors = assembly.errors.len(),
        warnings = assembly.warnings.len(),
        "assembled content"
    );
    assembly
}

fn pseudo_value(name: &str, item: &Item, template: &str) -> Option<String> {
    match name {
        ":id" => Some(item.id.to_string()),
        ":name" => Some(item.name.clone()),
        ":path" => Some(item.path.clone()),
        ":template" => Some(template.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use cmsport_store::Item;

    use super::*;
    use crate::settings::{AssetSettings, FieldSettings, TemplateSettings};
    use crate::testutil::*;
    use crate::FieldErrorKind;

    #[test]
    fn test_field_failure_isolated() {
        let snapshot = site()
            .item(
                page(100, "home")
                    .with_value(id(TITLE), "en", "Home")
                    .with_value(id(CATEGORY), "en", format!("{}|{}", id(NEWS), id(SPORT)))
                    .with_value(id(HERO), "en", format!("<image mediaid=\"{}\" />", id(LOGO).to_braced())),
            )
            .item(
                page(101, "about")
                    .with_value(id(TITLE), "en", "About")
                    .with_value(id(BODY), "en", format!("<img src=\"-/media/{}.ashx\" />", id(BANNER).to_compact()))
                    .with_value(id(HERO), "en", format!("<image mediaid=\"{}\" />", id(LOGO).to_braced())),
            )
            .build();

        let assembly = assemble(&snapshot, &settings(), &HandlerRegistry::standard());

        assert_eq!(assembly.groups.len(), 1);
        let pages = assembly.group("Pages").unwrap();
        let names: Vec<_> = pages.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["about", "home"]);

        assert_eq!(assembly.errors.len(), 1);
        assert_eq!(assembly.errors[0].item_id, id(100));
        assert!(matches!(assembly.errors[0].kind, FieldErrorKind::MultipleReferences(2)));

        let home = &pages.items()[1];
        assert_eq!(home.template, "Pages");
        assert_eq!(home.field("Title").unwrap().value, "Home");
        assert!(home.field("Category").is_none());
        assert!(home.field("Hero").is_some());

        let files: Vec<_> = pages.assets().iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(files, ["banner.jpg", "logo.png"]);
    }

    #[test]
    fn test_standard_values_and_alias() {
        let template = page_template().with_standard_values(id(90));
        let defaults = Item::new(id(90), "__Standard Values", "/sitecore/templates/page/sv", id(PAGE))
            .with_value(id(TITLE), "", "Untitled");
        let snapshot = site()
            .template(template)
            .standard_values(defaults)
            .item(page(100, "home"))
            .build();

        let pages = TemplateSettings::new("Pages", id(PAGE))
            .with_field(FieldSettings::new("Title").with_alias("heading"))
            .with_field(FieldSettings::new(":path"));
        let settings = Settings::new("en", vec![pages], Vec::new(), AssetSettings::default());

        let assembly = assemble(&snapshot, &settings, &HandlerRegistry::standard());
        let home = &assembly.groups[0].items()[0];
        assert_eq!(home.fields.len(), 2);
        assert_eq!(home.field("heading").unwrap().value, "Untitled");
        assert_eq!(home.field(":path").unwrap().value, "/sitecore/content/home/home");
        assert!(assembly.errors.is_empty());
    }

    fn output_names(assembly: &Assembly) -> Vec<String> {
        assembly.groups[0].items()[0]
            .fields
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }

    #[test]
    fn test_fields_sorted_by_output_name() {
        let snapshot = site()
            .item(
                page(100, "home")
                    .with_value(id(TITLE), "en", "Home")
                    .with_value(id(BODY), "en", "<p>Hi</p>")
                    .with_value(id(LINK), "en", "plain"),
            )
            .build();

        // Reverse alphabetical settings order.
        let pages = TemplateSettings::new("Pages", id(PAGE))
            .with_field(FieldSettings::new("Title"))
            .with_field(FieldSettings::new("Link"))
            .with_field(FieldSettings::new("Body"));
        let settings = Settings::new("en", vec![pages], Vec::new(), AssetSettings::default());

        let assembly = assemble(&snapshot, &settings, &HandlerRegistry::standard());
        assert_eq!(output_names(&assembly), ["Body", "Link", "Title"]);

        let forward = TemplateSettings::new("Pages", id(PAGE))
            .with_field(FieldSettings::new("Body"))
            .with_field(FieldSettings::new("Link"))
            .with_field(FieldSettings::new("Title"));
        let settings = Settings::new("en", vec![forward], Vec::new(), AssetSettings::default());
        let again = assemble(&snapshot, &settings, &HandlerRegistry::standard());
        assert_eq!(again.groups[0].items(), assembly.groups[0].items());
    }

    #[test]
    fn test_fields_sorted_by_alias() {
        let snapshot = site()
            .item(
                page(100, "home")
                    .with_value(id(TITLE), "en", "Home")
                    .with_value(id(BODY), "en", "<p>Hi</p>"),
            )
            .build();

        let pages = TemplateSettings::new("Pages", id(PAGE))
            .with_field(FieldSettings::new("Body").with_alias("zcontent"))
            .with_field(FieldSettings::new("Title").with_alias("aheading"))
            .with_field(FieldSettings::new("Title"))
            .with_field(FieldSettings::new(":id").with_alias("key"));
        let settings = Settings::new("en", vec![pages], Vec::new(), AssetSettings::default());

        let assembly = assemble(&snapshot, &settings, &HandlerRegistry::standard());
        assert_eq!(output_names(&assembly), ["Title", "aheading", "key", "zcontent"]);
        let home = &assembly.groups[0].items()[0];
        assert_eq!(home.field("key").unwrap().value, id(100).to_string());
        assert_eq!(home.field("aheading").unwrap().value, "Home");
    }

    #[test]
    fn test_groups_ordered_and_repeatable() {
        let snapshot = site()
            .item(page(100, "home").with_value(id(TITLE), "en", "Home"))
            .item(tag_item(NEWS, "news", "News"))
            .item(Item::new(id(101), "orphan", "/sitecore/content/orphan", id(77)))
            .build();

        let tags = TemplateSettings::new("Alpha Tags", id(TAG)).with_field(FieldSettings::new("Title"));
        let settings = Settings::new("en", vec![page_settings(), tags], Vec::new(), AssetSettings::default());
        let registry = HandlerRegistry::standard();

        let first = assemble(&snapshot, &settings, &registry);
        let second = assemble(&snapshot, &settings, &registry);

        let names = |a: &Assembly| a.groups.iter().map(|g| g.name().to_string()).collect::<Vec<_>>();
        assert_eq!(names(&first), ["Alpha Tags", "Pages"]);
        assert_eq!(names(&first), names(&second));
        assert_eq!(first.item_count(), 2);
        assert_eq!(first.groups[1].items(), second.groups[1].items());
    }

    #[test]
    fn test_warnings_collected() {
        let snapshot = site()
            .item(page(100, "home").with_value(id(TAGS), "en", format!("{}|nope", id(NEWS))))
            .build();

        let assembly = assemble(&snapshot, &settings(), &HandlerRegistry::standard());
        assert!(assembly.errors.is_empty());
        assert_eq!(assembly.warnings.len(), 1);
        let tags = assembly.groups[0].items()[0].field("Tags").unwrap();
        assert_eq!(tags.references.len(), 1);
    }
}
