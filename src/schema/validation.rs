//! Value validation against field definitions.
//!
//! A validation call is a pure pipeline over one definition and one raw
//! value: type check, then choice check for select types, then the required
//! check. The first failing stage decides the error. Nothing is written and
//! the registry is only read.

use super::choices::ChoiceSet;
use super::registry::{FieldRegistry, StoredKind};
use super::types::{Association, Choice, FieldDefinition};
use crate::config::EngineConfig;
use crate::error::{FieldError, ValidationError, ValidationResult};
use crate::field_type::{FieldType, FieldValue, RawValue};
use log::debug;
use std::collections::BTreeMap;

/// Where the allowed choice values of a field come from.
enum ChoiceLookup<'a> {
    None,
    Definition(&'a [Choice]),
    Set(&'a ChoiceSet),
}

impl ChoiceLookup<'_> {
    fn contains(&self, value: &str) -> bool {
        match self {
            Self::None => false,
            Self::Definition(choices) => choices.iter().any(|c| c.value == value),
            Self::Set(set) => set.contains(value),
        }
    }

    fn values(&self) -> Vec<String> {
        match self {
            Self::None => Vec::new(),
            Self::Definition(choices) => choices.iter().map(|c| c.value.clone()).collect(),
            Self::Set(set) => set.values().into_iter().map(str::to_string).collect(),
        }
    }
}

/// Everything the pipeline needs to know about the target field.
struct Target<'a> {
    name: &'a str,
    association: Association,
    field_type: FieldType,
    required: bool,
    choices: ChoiceLookup<'a>,
}

/// Stateless validator bound to an engine configuration.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    config: &'a EngineConfig,
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Validate a raw value against a standalone definition.
    pub fn validate(
        &self,
        definition: &FieldDefinition,
        raw: &RawValue,
    ) -> ValidationResult<FieldValue> {
        let target = Target {
            name: &definition.name,
            association: definition.associated_with,
            field_type: definition.field_type(),
            required: definition.required,
            choices: ChoiceLookup::Definition(definition.choices()),
        };
        self.run(&target, raw)
    }

    fn run(&self, target: &Target<'_>, raw: &RawValue) -> ValidationResult<FieldValue> {
        let result = self
            .type_check(target, raw)
            .and_then(|value| self.choice_check(target, value))
            .and_then(|value| self.required_check(target, value));
        if let Err(err) = &result {
            debug!("Rejected value for {} ({}): {}", target.name, target.association, err);
        }
        result
    }

    fn type_check(&self, target: &Target<'_>, raw: &RawValue) -> ValidationResult<FieldValue> {
        if raw.is_empty() {
            return Ok(FieldValue::Empty);
        }
        let parsed = match raw {
            RawValue::Absent => return Ok(FieldValue::Empty),
            RawValue::Text(text) => target
                .field_type
                .parse(self.config.normalize(text), self.config),
            RawValue::List(items) => target.field_type.parse_list(items, self.config),
        };
        parsed.map_err(|failure| {
            ValidationError::type_mismatch(
                target.name,
                target.association,
                format!("{} ({})", target.field_type, failure.expected),
                raw.display(),
            )
        })
    }

    fn choice_check(&self, target: &Target<'_>, value: FieldValue) -> ValidationResult<FieldValue> {
        if let Some(unknown) = value
            .choice_values()
            .into_iter()
            .find(|candidate| !target.choices.contains(candidate))
        {
            return Err(ValidationError::unknown_choice(
                target.name,
                target.association,
                unknown,
                target.choices.values(),
            ));
        }
        Ok(value)
    }

    fn required_check(
        &self,
        target: &Target<'_>,
        value: FieldValue,
    ) -> ValidationResult<FieldValue> {
        if target.required && value.is_empty() {
            return Err(ValidationError::missing_required(
                target.name,
                target.association,
            ));
        }
        if value.is_empty() {
            return Ok(FieldValue::Empty);
        }
        Ok(value)
    }
}

/// Outcome of validating a whole entity record.
#[derive(Debug, Default)]
pub struct RecordValidationReport {
    /// Accepted values keyed by field name
    pub accepted: BTreeMap<String, FieldValue>,
    /// Every rejection, in field-name order
    pub errors: Vec<FieldError>,
}

impl RecordValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Accepted values, or all collected errors.
    pub fn into_result(self) -> Result<BTreeMap<String, FieldValue>, Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(self.accepted)
        } else {
            Err(self.errors)
        }
    }
}

impl FieldRegistry {
    /// Validate a raw value for the field identified by name and association.
    pub fn validate(
        &self,
        name: &str,
        association: Association,
        raw: &RawValue,
        config: &EngineConfig,
    ) -> Result<FieldValue, FieldError> {
        let record = self.record(name, association)?;
        let choices = match &record.kind {
            StoredKind::Scalar(_) => ChoiceLookup::None,
            StoredKind::SelectOne(id) | StoredKind::SelectMany(id) => self
                .choice_registry()
                .get(*id)
                .map(ChoiceLookup::Set)
                .unwrap_or(ChoiceLookup::None),
        };
        let target = Target {
            name: &record.name,
            association,
            field_type: record.kind.field_type(),
            required: record.required,
            choices,
        };
        Ok(Validator::new(config).run(&target, raw)?)
    }

    /// Validate every submitted value of one entity record.
    ///
    /// Unknown field names are reported as not found. Required visible
    /// fields of the association that were not submitted at all are
    /// reported as missing. All problems are collected; nothing
    /// short-circuits across fields.
    pub fn validate_record(
        &self,
        association: Association,
        values: &BTreeMap<String, RawValue>,
        config: &EngineConfig,
    ) -> RecordValidationReport {
        let mut report = RecordValidationReport::default();

        for (name, raw) in values {
            match self.validate(name, association, raw, config) {
                Ok(value) => {
                    report.accepted.insert(name.clone(), value);
                }
                Err(err) => report.errors.push(err),
            }
        }

        let mut missing: Vec<&str> = self
            .records()
            .filter(|r| r.association == association && r.visible && r.required)
            .filter(|r| !values.contains_key(&r.name))
            .map(|r| r.name.as_str())
            .collect();
        missing.sort_unstable();
        for name in missing {
            report
                .errors
                .push(ValidationError::missing_required(name, association).into());
        }

        debug!(
            "Validated {} record: {} accepted, {} errors",
            association,
            report.accepted.len(),
            report.errors.len()
        );
        report
    }
}
