//! Export settings: which templates are exported, how, and where to.
//!
//! The settings file is JSON. The template/field part is validated into a
//! [`Settings`] value that the resolver and assembler read; the output and
//! pipeline sections are carried as plain data for the writer and pipeline.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use cmsport_common::ContentId;
use cmsport_store::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::ITEM_NAME_FIELD;

/// The settings file as written on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    /// Language whose values are exported. Shared values answer any language.
    #[serde(default)]
    pub filter_language: String,
    #[serde(default)]
    pub templates: Vec<TemplateConfig>,
    #[serde(default)]
    pub reference_templates: Vec<TemplateConfig>,
    #[serde(default)]
    pub blob_settings: BlobSettingsConfig,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

/// One template entry of the settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    /// Output group name.
    pub name: String,
    pub template_id: String,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// One field entry of a template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, rename = "reffield", skip_serializing_if = "Option::is_none")]
    pub ref_field: Option<String>,
    #[serde(default)]
    pub properties: FieldProperties,
}

/// Per-field flags. Unknown keys are rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldProperties {
    /// Treat the value as an attachment blob id whatever the declared type.
    #[serde(default)]
    pub blob: bool,
    /// Emit the resolved value as HTML content.
    #[serde(default)]
    pub html: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobSettingsConfig {
    /// Extra media item fields (names or ids) captured on every asset.
    #[serde(default)]
    pub custom_fields: Vec<String>,
}

/// Where the writer puts its output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSettings {
    #[serde(default = "default_content_format")]
    pub content_format: String,
    #[serde(default = "default_content_location")]
    pub content_location: PathBuf,
    #[serde(default = "default_blob_location")]
    pub blob_location: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            content_format: default_content_format(),
            content_location: default_content_location(),
            blob_location: default_blob_location(),
        }
    }
}

fn default_content_format() -> String {
    "xml".into()
}

fn default_content_location() -> PathBuf {
    PathBuf::from("output/content")
}

fn default_blob_location() -> PathBuf {
    PathBuf::from("output/blobs")
}

/// Concurrency knobs of the blob pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSettings {
    #[serde(default = "default_workers")]
    pub fetch_workers: usize,
    #[serde(default = "default_workers")]
    pub persist_workers: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            fetch_workers: default_workers(),
            persist_workers: default_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_workers() -> usize {
    8
}

fn default_queue_capacity() -> usize {
    1024
}

impl ExportSettings {
    /// Read a settings file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Parse settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the template and field mapping.
    pub fn build(&self) -> Result<Settings, SettingsError> {
        let templates = build_templates(&self.templates)?;
        let references = build_templates(&self.reference_templates)?;

        Ok(Settings {
            language: self.filter_language.clone(),
            index: index_templates(&templates),
            reference_index: index_templates(&references),
            templates,
            references,
            assets: AssetSettings {
                custom_fields: self.blob_settings.custom_fields.clone(),
            },
        })
    }
}

fn build_templates(configs: &[TemplateConfig]) -> Result<Vec<TemplateSettings>, SettingsError> {
    let mut out: Vec<TemplateSettings> = Vec::with_capacity(configs.len());
    for config in configs {
        let template = TemplateSettings::from_config(config)?;
        if out.iter().any(|t| t.template_id == template.template_id) {
            return Err(SettingsError::DuplicateTemplate(template.template_id));
        }
        out.push(template);
    }
    Ok(out)
}

fn index_templates(templates: &[TemplateSettings]) -> FxHashMap<ContentId, usize> {
    templates
        .iter()
        .enumerate()
        .map(|(i, t)| (t.template_id, i))
        .collect()
}

/// Validated template/field mapping for one run.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    language: String,
    templates: Vec<TemplateSettings>,
    references: Vec<TemplateSettings>,
    index: FxHashMap<ContentId, usize>,
    reference_index: FxHashMap<ContentId, usize>,
    assets: AssetSettings,
}

impl Settings {
    /// Assemble settings directly, mostly for tests and embedding.
    pub fn new(
        language: impl Into<String>,
        templates: Vec<TemplateSettings>,
        references: Vec<TemplateSettings>,
        assets: AssetSettings,
    ) -> Self {
        Self {
            language: language.into(),
            index: index_templates(&templates),
            reference_index: index_templates(&references),
            templates,
            references,
            assets,
        }
    }

    #[inline]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Exported templates, in settings order.
    #[inline]
    pub fn templates(&self) -> &[TemplateSettings] {
        &self.templates
    }

    /// Templates whose items may be referenced.
    #[inline]
    pub fn references(&self) -> &[TemplateSettings] {
        &self.references
    }

    #[inline]
    pub fn assets(&self) -> &AssetSettings {
        &self.assets
    }

    /// Settings for an exported template.
    pub fn template(&self, id: &ContentId) -> Option<&TemplateSettings> {
        self.index.get(id).map(|&i| &self.templates[i])
    }

    /// Settings for a reference template.
    pub fn reference_template(&self, id: &ContentId) -> Option<&TemplateSettings> {
        self.reference_index.get(id).map(|&i| &self.references[i])
    }

    /// Every configured template id, exported first, without duplicates.
    pub fn template_ids(&self) -> Vec<ContentId> {
        let mut ids: Vec<ContentId> = self.templates.iter().map(|t| t.template_id).collect();
        for t in &self.references {
            if !ids.contains(&t.template_id) {
                ids.push(t.template_id);
            }
        }
        ids
    }
}

/// How one template is exported.
#[derive(Debug, Clone)]
pub struct TemplateSettings {
    /// Output group name.
    pub name: String,
    pub template_id: ContentId,
    pub paths: Vec<PathFilter>,
    fields: Vec<FieldSettings>,
}

impl TemplateSettings {
    pub fn new(name: impl Into<String>, template_id: ContentId) -> Self {
        Self {
            name: name.into(),
            template_id,
            paths: Vec::new(),
            fields: Vec::new(),
        }
    }

    fn from_config(config: &TemplateConfig) -> Result<Self, SettingsError> {
        let template_id =
            config
                .template_id
                .parse()
                .map_err(|source| SettingsError::InvalidTemplateId {
                    name: config.name.clone(),
                    value: config.template_id.clone(),
                    source,
                })?;

        let mut template = Self::new(config.name.clone(), template_id);
        for pattern in &config.paths {
            template.paths.push(PathFilter::new(pattern)?);
        }
        for field in &config.fields {
            if field.name.trim().is_empty() {
                return Err(SettingsError::UnnamedField(config.name.clone()));
            }
            if field.name.starts_with(':') && !PSEUDO_FIELDS.contains(&field.name.as_str()) {
                return Err(SettingsError::UnknownPseudoField {
                    template: config.name.clone(),
                    field: field.name.clone(),
                });
            }
            let mut settings = FieldSettings::new(field.name.clone());
            settings.alias = field.alias.clone().filter(|a| !a.is_empty());
            settings.ref_field = field.ref_field.clone().filter(|r| !r.is_empty());
            settings.properties = field.properties;
            template.insert_field(settings);
        }
        Ok(template)
    }

    /// Add a path filter.
    pub fn with_path(mut self, filter: PathFilter) -> Self {
        self.paths.push(filter);
        self
    }

    /// Add a field, replacing any earlier field with the same key.
    pub fn with_field(mut self, field: FieldSettings) -> Self {
        self.insert_field(field);
        self
    }

    fn insert_field(&mut self, field: FieldSettings) {
        let key = field.key();
        match self.fields.iter().position(|f| f.key() == key) {
            Some(i) => self.fields[i] = field,
            None => self.fields.push(field),
        }
    }

    /// Configured fields, in settings order.
    #[inline]
    pub fn fields(&self) -> &[FieldSettings] {
        &self.fields
    }

    /// Look up a field by its `name` or `name:alias` key.
    pub fn field(&self, key: &str) -> Option<&FieldSettings> {
        self.fields.iter().find(|f| f.key() == key)
    }

    /// Whether an item at `path` passes this template's path filters.
    pub fn accepts_path(&self, path: &str) -> bool {
        self.paths.is_empty() || self.paths.iter().any(|p| p.matches(path))
    }
}

/// Pseudo-fields: item properties exported as fields.
pub const PSEUDO_FIELDS: [&str; 4] = [":id", ":name", ":path", ":template"];

/// How one field is exported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSettings {
    /// Field name (or id) on the template.
    pub name: String,
    pub alias: Option<String>,
    /// Field to resolve on referenced items; [`ITEM_NAME_FIELD`] emits the item name.
    pub ref_field: Option<String>,
    pub properties: FieldProperties,
}

impl FieldSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_ref_field(mut self, ref_field: impl Into<String>) -> Self {
        self.ref_field = Some(ref_field.into());
        self
    }

    pub fn with_properties(mut self, properties: FieldProperties) -> Self {
        self.properties = properties;
        self
    }

    /// `name` or `name:alias`.
    pub fn key(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{}:{}", self.name, alias),
            None => self.name.clone(),
        }
    }

    /// Name used in the output: the alias when set.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Pseudo-fields start with `:` and never exist in the store schema.
    /// See [`PSEUDO_FIELDS`].
    #[inline]
    pub fn is_pseudo(&self) -> bool {
        self.name.starts_with(':')
    }

    /// Whether references should be emitted as bare item descriptors.
    pub fn uses_item_name(&self) -> bool {
        match self.ref_field.as_deref() {
            None => true,
            Some(r) => r == ITEM_NAME_FIELD,
        }
    }
}

/// Media item fields captured on every extracted asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSettings {
    pub custom_fields: Vec<String>,
}

impl AssetSettings {
    pub fn new<I, S>(custom_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            custom_fields: custom_fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Item path filter: a case-insensitive prefix or a glob pattern.
#[derive(Debug, Clone)]
pub enum PathFilter {
    Prefix(String),
    Glob(glob::Pattern),
}

impl PathFilter {
    /// Filters containing `*`, `?` or `[` are globs, anything else a prefix.
    pub fn new(pattern: &str) -> Result<Self, SettingsError> {
        if pattern.contains(['*', '?', '[']) {
            glob::Pattern::new(pattern)
                .map(PathFilter::Glob)
                .map_err(|source| SettingsError::InvalidPathFilter {
                    pattern: pattern.to_string(),
                    source,
                })
        } else {
            Ok(PathFilter::Prefix(pattern.to_lowercase()))
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathFilter::Prefix(prefix) => path.to_lowercase().starts_with(prefix.as_str()),
            PathFilter::Glob(pattern) => pattern.matches_with(
                path,
                glob::MatchOptions {
                    case_sensitive: false,
                    require_literal_separator: false,
                    require_literal_leading_dot: false,
                },
            ),
        }
    }
}
