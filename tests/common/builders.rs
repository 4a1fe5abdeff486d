//! Test data builders for flex fields and submitted records.

use registration_fields::field_type::{FieldType, RawValue};
use registration_fields::schema::{Association, Choice, FieldDefinition};
use std::collections::BTreeMap;

/// Builder for flex field definitions with test-friendly defaults
#[derive(Debug, Clone)]
pub struct FlexFieldBuilder {
    name: String,
    association: Association,
    field_type: FieldType,
    required: bool,
    hint: String,
    label_en: Option<String>,
    labels: Vec<(String, String)>,
    choices: Vec<Choice>,
}

impl FlexFieldBuilder {
    pub fn new(name: &str, association: Association, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            association,
            field_type,
            required: false,
            hint: String::new(),
            label_en: None,
            labels: Vec::new(),
            choices: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn hint(mut self, hint: &str) -> Self {
        self.hint = hint.to_string();
        self
    }

    pub fn label_en(mut self, label: &str) -> Self {
        self.label_en = Some(label.to_string());
        self
    }

    pub fn label(mut self, language: &str, label: &str) -> Self {
        self.labels.push((language.to_string(), label.to_string()));
        self
    }

    /// Add choices whose English label equals the value
    pub fn choices<'a>(mut self, values: impl IntoIterator<Item = &'a str>) -> Self {
        self.choices
            .extend(values.into_iter().map(|value| Choice::new(value, value)));
        self
    }

    pub fn choice_list(mut self, choices: Vec<Choice>) -> Self {
        self.choices.extend(choices);
        self
    }

    pub fn build(self) -> FieldDefinition {
        self.try_build().expect("Invalid test field definition")
    }

    pub fn try_build(self) -> Result<FieldDefinition, registration_fields::error::RegistryError> {
        let label_en = self.label_en.unwrap_or_else(|| self.name.clone());
        let mut builder = FieldDefinition::builder(self.name, self.association, self.field_type)
            .flex()
            .required(self.required)
            .hint(self.hint)
            .label_en(label_en.clone())
            .label("English(EN)", label_en)
            .choices(self.choices);
        for (language, label) in self.labels {
            builder = builder.label(language, label);
        }
        builder.build()
    }
}

/// Builder for a submitted entity record
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    values: BTreeMap<String, RawValue>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A household record with every required core field filled in
    pub fn valid_household() -> Self {
        Self::new()
            .with("size", "4")
            .with("first_registration_date", "2021-03-14")
            .with("consent", "yes")
            .with("residence_status", "IDP")
    }

    /// An individual record with every required core field filled in
    pub fn valid_individual() -> Self {
        Self::new()
            .with("full_name", "Amina Yusuf")
            .with("sex", "FEMALE")
            .with("birth_date", "1990-05-17")
            .with("relationship", "HEAD")
            .with("first_registration_date", "2021-03-14")
    }

    pub fn with(mut self, name: &str, value: impl Into<RawValue>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn with_list(mut self, name: &str, values: &[&str]) -> Self {
        self.values
            .insert(name.to_string(), RawValue::list(values.iter().copied()));
        self
    }

    pub fn without(mut self, name: &str) -> Self {
        self.values.remove(name);
        self
    }

    pub fn build(self) -> BTreeMap<String, RawValue> {
        self.values
    }
}
