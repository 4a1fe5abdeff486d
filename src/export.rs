//! Query/export facade over the field registry.
//!
//! Produces the fully localized "all fields attributes" listing consumed by
//! reporting and API clients. Rows are sorted by English label; choices keep
//! their configured order. Every row carries one label slot per active
//! language, empty when no translation exists.
//!
//! # Examples
//!
//! ```rust
//! use registration_fields::config::EngineConfig;
//! use registration_fields::export::{ExportFilter, FieldExporter};
//! use registration_fields::language::StaticLanguageCatalog;
//! use registration_fields::schema::{Association, FieldRegistry};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Arc::new(StaticLanguageCatalog::english_only().with_language("French(FR)", "French"));
//! let registry = FieldRegistry::with_core_fields(catalog)?;
//! let config = EngineConfig::default();
//!
//! let exporter = FieldExporter::new(&registry, &config);
//! let rows = exporter.all_fields_attributes(&ExportFilter::new().association(Association::Individual));
//! assert!(rows.iter().all(|row| row.labels.len() == 2));
//! # Ok(())
//! # }
//! ```

use crate::config::EngineConfig;
use crate::error::{FieldResult, RegistryError};
use crate::field_type::FieldType;
use crate::language::Labels;
use crate::schema::{
    Association, Choice, FieldDefinition, FieldKind, FieldRegistry, RegisterOutcome,
    ResolvedChoice,
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// One exported field row.
///
/// Key order matches the export contract:
/// `name, type, associatedWith, required, isFlexField, hint, labelEn, labels, choices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub associated_with: Association,
    pub required: bool,
    pub is_flex_field: bool,
    #[serde(default)]
    pub hint: String,
    pub label_en: String,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl From<FieldDefinition> for FieldAttribute {
    fn from(definition: FieldDefinition) -> Self {
        let field_type = definition.field_type();
        let choices = match definition.kind {
            FieldKind::SelectOne(choices) | FieldKind::SelectMany(choices) => choices,
            _ => Vec::new(),
        };
        Self {
            name: definition.name,
            field_type,
            associated_with: definition.associated_with,
            required: definition.required,
            is_flex_field: definition.is_flex_field,
            hint: definition.hint,
            label_en: definition.label_en,
            labels: definition.labels,
            choices,
        }
    }
}

impl TryFrom<FieldAttribute> for FieldDefinition {
    type Error = RegistryError;

    fn try_from(attribute: FieldAttribute) -> Result<Self, Self::Error> {
        let kind = FieldKind::from_parts(&attribute.name, attribute.field_type, attribute.choices)?;
        let definition = FieldDefinition {
            name: attribute.name,
            kind,
            associated_with: attribute.associated_with,
            is_flex_field: attribute.is_flex_field,
            required: attribute.required,
            hint: attribute.hint,
            label_en: attribute.label_en,
            labels: attribute.labels,
        };
        definition.validate_structure()?;
        Ok(definition)
    }
}

impl FieldAttribute {
    /// Turn an exported row back into a definition for re-registration.
    pub fn into_definition(self) -> Result<FieldDefinition, RegistryError> {
        FieldDefinition::try_from(self)
    }
}

/// Which rows an export includes. All criteria default to "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportFilter {
    pub association: Option<Association>,
    pub flex: Option<bool>,
    pub name_contains: Option<String>,
    pub include_hidden: Option<bool>,
}

impl ExportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn association(mut self, association: Association) -> Self {
        self.association = Some(association);
        self
    }

    pub fn flex_only(mut self) -> Self {
        self.flex = Some(true);
        self
    }

    pub fn core_only(mut self) -> Self {
        self.flex = Some(false);
        self
    }

    pub fn name_contains(mut self, fragment: impl Into<String>) -> Self {
        self.name_contains = Some(fragment.into());
        self
    }

    /// Override the configured hidden-field policy for this export.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = Some(include);
        self
    }
}

/// Content fingerprint of an export, usable as a cache validator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportVersion(String);

impl ExportVersion {
    /// Hash the serialized rows (SHA-256, first 8 bytes, base64).
    pub fn from_attributes(rows: &[FieldAttribute]) -> FieldResult<Self> {
        let content = serde_json::to_vec(rows)?;
        let hash = Sha256::digest(&content);
        Ok(Self(BASE64.encode(&hash[..8])))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExportVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rows plus their fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSnapshot {
    pub version: ExportVersion,
    pub fields: Vec<FieldAttribute>,
}

/// Read-only projection of a registry.
#[derive(Debug, Clone, Copy)]
pub struct FieldExporter<'a> {
    registry: &'a FieldRegistry,
    config: &'a EngineConfig,
}

impl<'a> FieldExporter<'a> {
    pub fn new(registry: &'a FieldRegistry, config: &'a EngineConfig) -> Self {
        Self { registry, config }
    }

    /// All rows matching `filter`, sorted by English label.
    pub fn all_fields_attributes(&self, filter: &ExportFilter) -> Vec<FieldAttribute> {
        let include_hidden = filter
            .include_hidden
            .unwrap_or(self.config.include_hidden_in_export);
        let rows: Vec<FieldAttribute> = self
            .registry
            .list_where(|record| {
                (include_hidden || record.visible)
                    && filter.association.is_none_or(|a| a == record.association)
                    && filter.flex.is_none_or(|flex| flex == record.is_flex_field)
                    && filter
                        .name_contains
                        .as_deref()
                        .is_none_or(|fragment| record.name.contains(fragment))
            })
            .into_iter()
            .map(FieldAttribute::from)
            .collect();
        debug!("Exported {} field attributes", rows.len());
        rows
    }

    /// Rows matching `filter` together with their content fingerprint.
    pub fn snapshot(&self, filter: &ExportFilter) -> FieldResult<ExportSnapshot> {
        let fields = self.all_fields_attributes(filter);
        let version = ExportVersion::from_attributes(&fields)?;
        debug!("Export snapshot version {}", version);
        Ok(ExportSnapshot { version, fields })
    }

    /// Serialize the matching rows as a JSON array.
    pub fn to_json(&self, filter: &ExportFilter) -> FieldResult<String> {
        Ok(serde_json::to_string_pretty(
            &self.all_fields_attributes(filter),
        )?)
    }

    /// `(value, label)` pairs of one field for one language.
    pub fn resolve_choices(
        &self,
        name: &str,
        association: Association,
        language: &str,
    ) -> FieldResult<Vec<ResolvedChoice>> {
        Ok(self.registry.resolve_choices(name, association, language)?)
    }
}

/// Register every exported row into `registry`, in order.
pub fn import_attributes(
    registry: &mut FieldRegistry,
    rows: Vec<FieldAttribute>,
) -> Result<Vec<RegisterOutcome>, RegistryError> {
    rows.into_iter()
        .map(|row| registry.register(row.into_definition()?))
        .collect()
}
