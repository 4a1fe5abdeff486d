//! Core data model for field definitions.
//!
//! A [`FieldDefinition`] describes one household or individual attribute.
//! Its value type is a closed [`FieldKind`] union, so only choice types can
//! carry a choice list and the "choices iff select" rule holds by construction.

use crate::error::{RegistryError, RegistryResult};
use crate::export::FieldAttribute;
use crate::field_type::FieldType;
use crate::language::Labels;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Entity kind a field applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Association {
    Household,
    Individual,
}

impl Association {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Household => "Household",
            Self::Individual => "Individual",
        }
    }
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Association {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Household" | "household" => Ok(Self::Household),
            "Individual" | "individual" => Ok(Self::Individual),
            other => Err(format!("unknown association '{}'", other)),
        }
    }
}

/// Registry key: a name is only unique together with its association.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    pub name: String,
    pub association: Association,
}

impl FieldKey {
    pub fn new(name: impl Into<String>, association: Association) -> Self {
        Self {
            name: name.into(),
            association,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.association)
    }
}

/// One selectable option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Canonical machine value used for persistence and equality
    pub value: String,
    pub label_en: String,
    #[serde(default)]
    pub labels: Labels,
}

impl Choice {
    pub fn new(value: impl Into<String>, label_en: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label_en: label_en.into(),
            labels: Labels::new(),
        }
    }

    pub fn with_label(mut self, language: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels = self.labels.with(language, label);
        self
    }
}

/// Value type of a field. Only the select variants carry choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Decimal,
    Bool,
    Date,
    Image,
    SelectOne(Vec<Choice>),
    SelectMany(Vec<Choice>),
}

impl FieldKind {
    /// Build a kind from a type tag and a choice list, enforcing that
    /// choices are present exactly for select types.
    pub fn from_parts(
        name: &str,
        field_type: FieldType,
        choices: Vec<Choice>,
    ) -> RegistryResult<Self> {
        if !field_type.is_choice() && !choices.is_empty() {
            return Err(RegistryError::invalid(
                name,
                format!("{} fields cannot have choices", field_type),
            ));
        }
        let kind = match field_type {
            FieldType::String => Self::String,
            FieldType::Integer => Self::Integer,
            FieldType::Decimal => Self::Decimal,
            FieldType::Bool => Self::Bool,
            FieldType::Date => Self::Date,
            FieldType::Image => Self::Image,
            FieldType::SelectOne => Self::SelectOne(choices),
            FieldType::SelectMany => Self::SelectMany(choices),
        };
        Ok(kind)
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Self::String => FieldType::String,
            Self::Integer => FieldType::Integer,
            Self::Decimal => FieldType::Decimal,
            Self::Bool => FieldType::Bool,
            Self::Date => FieldType::Date,
            Self::Image => FieldType::Image,
            Self::SelectOne(_) => FieldType::SelectOne,
            Self::SelectMany(_) => FieldType::SelectMany,
        }
    }

    /// Choice list; empty for non-choice kinds.
    pub fn choices(&self) -> &[Choice] {
        match self {
            Self::SelectOne(choices) | Self::SelectMany(choices) => choices,
            _ => &[],
        }
    }

    pub(crate) fn choices_mut(&mut self) -> Option<&mut Vec<Choice>> {
        match self {
            Self::SelectOne(choices) | Self::SelectMany(choices) => Some(choices),
            _ => None,
        }
    }
}

/// Definition of a household or individual attribute.
///
/// Serializes in the export shape:
/// `{ name, type, associatedWith, required, isFlexField, hint, labelEn, labels, choices }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "FieldAttribute", try_from = "FieldAttribute")]
pub struct FieldDefinition {
    /// Stable snake_case identifier
    pub name: String,
    pub kind: FieldKind,
    pub associated_with: Association,
    pub is_flex_field: bool,
    pub required: bool,
    pub hint: String,
    /// Canonical English label; fallback text and default sort key
    pub label_en: String,
    pub labels: Labels,
}

impl FieldDefinition {
    /// Start a definition for a non-choice type, or a choice type whose
    /// choices are added through the builder.
    pub fn builder(
        name: impl Into<String>,
        associated_with: Association,
        field_type: FieldType,
    ) -> FieldDefinitionBuilder {
        FieldDefinitionBuilder {
            name: name.into(),
            field_type,
            associated_with,
            is_flex_field: false,
            required: false,
            hint: String::new(),
            label_en: String::new(),
            labels: Labels::new(),
            choices: Vec::new(),
        }
    }

    pub fn key(&self) -> FieldKey {
        FieldKey::new(self.name.clone(), self.associated_with)
    }

    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    pub fn choices(&self) -> &[Choice] {
        self.kind.choices()
    }

    pub fn choice(&self, value: &str) -> Option<&Choice> {
        self.choices().iter().find(|choice| choice.value == value)
    }

    /// Check the structural invariants a definition must satisfy on its own.
    pub fn validate_structure(&self) -> RegistryResult<()> {
        let name = self.name.as_str();
        if name.is_empty() {
            return Err(RegistryError::invalid(name, "name cannot be empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(RegistryError::invalid(name, "name cannot contain whitespace"));
        }

        if self.field_type().is_choice() && self.choices().is_empty() {
            return Err(RegistryError::invalid(
                name,
                format!("{} fields need at least one choice", self.field_type()),
            ));
        }

        let mut seen = HashSet::new();
        for choice in self.choices() {
            check_choice_value(name, &choice.value)?;
            if !seen.insert(choice.value.as_str()) {
                return Err(RegistryError::invalid(
                    name,
                    format!("duplicate choice value '{}'", choice.value),
                ));
            }
        }
        Ok(())
    }
}

/// A choice value must survive SELECT_MANY text splitting intact.
pub(crate) fn check_choice_value(owner: &str, value: &str) -> RegistryResult<()> {
    if value.is_empty() {
        return Err(RegistryError::invalid(owner, "choice value cannot be empty"));
    }
    if value.chars().any(|c| c == ',' || c.is_whitespace()) {
        return Err(RegistryError::invalid(
            owner,
            format!("choice value '{}' cannot contain commas or whitespace", value),
        ));
    }
    Ok(())
}

/// Fluent builder for [`FieldDefinition`].
#[derive(Debug, Clone)]
pub struct FieldDefinitionBuilder {
    name: String,
    field_type: FieldType,
    associated_with: Association,
    is_flex_field: bool,
    required: bool,
    hint: String,
    label_en: String,
    labels: Labels,
    choices: Vec<Choice>,
}

impl FieldDefinitionBuilder {
    pub fn flex(mut self) -> Self {
        self.is_flex_field = true;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    pub fn label_en(mut self, label: impl Into<String>) -> Self {
        self.label_en = label.into();
        self
    }

    pub fn label(mut self, language: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels = self.labels.with(language, label);
        self
    }

    pub fn choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn choices(mut self, choices: impl IntoIterator<Item = Choice>) -> Self {
        self.choices.extend(choices);
        self
    }

    pub fn build(self) -> RegistryResult<FieldDefinition> {
        let kind = FieldKind::from_parts(&self.name, self.field_type, self.choices)?;
        let definition = FieldDefinition {
            name: self.name,
            kind,
            associated_with: self.associated_with,
            is_flex_field: self.is_flex_field,
            required: self.required,
            hint: self.hint,
            label_en: self.label_en,
            labels: self.labels,
        };
        definition.validate_structure()?;
        Ok(definition)
    }
}
