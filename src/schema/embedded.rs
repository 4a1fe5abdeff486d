//! Embedded core field definitions.
//!
//! The core household and individual schema ships with the library as a JSON
//! document so a deployment can be bootstrapped without external files.
//! Choice lists shared by several fields are declared once under
//! `choiceSets` and referenced by name.

use super::types::{Choice, FieldDefinition, FieldKind};
use crate::error::{RegistryError, RegistryResult};
use crate::field_type::FieldType;
use crate::language::Labels;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoreDocument {
    choice_sets: Vec<NamedChoiceSet>,
    fields: Vec<CoreField>,
}

#[derive(Debug, Deserialize)]
struct NamedChoiceSet {
    name: String,
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoreField {
    name: String,
    #[serde(rename = "type")]
    field_type: FieldType,
    associated_with: super::types::Association,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    hint: String,
    label_en: String,
    #[serde(default)]
    labels: Labels,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    choice_set: Option<String>,
}

fn parse_document() -> RegistryResult<CoreDocument> {
    serde_json::from_str(core_fields_document())
        .map_err(|e| RegistryError::invalid("core_fields", e.to_string()))
}

/// Named choice sets referenced by the core fields.
pub fn core_choice_sets() -> RegistryResult<Vec<(String, Vec<Choice>)>> {
    Ok(parse_document()?
        .choice_sets
        .into_iter()
        .map(|set| (set.name, set.choices))
        .collect())
}

/// Core definitions, each paired with the name of the shared choice set it
/// uses, if any. Definitions that use a shared set carry no inline choices.
pub fn core_fields() -> RegistryResult<Vec<(FieldDefinition, Option<String>)>> {
    parse_document()?
        .fields
        .into_iter()
        .map(|field| {
            let kind = FieldKind::from_parts(&field.name, field.field_type, field.choices)?;
            let definition = FieldDefinition {
                name: field.name,
                kind,
                associated_with: field.associated_with,
                is_flex_field: false,
                required: field.required,
                hint: field.hint,
                label_en: field.label_en,
                labels: field.labels,
            };
            if field.choice_set.is_none() {
                definition.validate_structure()?;
            }
            Ok((definition, field.choice_set))
        })
        .collect()
}

/// Returns the core field document as a JSON string.
pub fn core_fields_document() -> &'static str {
    r#"{
  "choiceSets": [
    {
      "name": "yes_no_not_answered",
      "choices": [
        { "value": "1", "labelEn": "Yes", "labels": [
          { "language": "English(EN)", "label": "Yes" },
          { "language": "French(FR)", "label": "Oui" },
          { "language": "Arabic(AR)", "label": "نعم" } ] },
        { "value": "0", "labelEn": "No", "labels": [
          { "language": "English(EN)", "label": "No" },
          { "language": "French(FR)", "label": "Non" },
          { "language": "Arabic(AR)", "label": "لا" } ] },
        { "value": "NOT_ANSWERED", "labelEn": "Not answered", "labels": [
          { "language": "English(EN)", "label": "Not answered" } ] }
      ]
    }
  ],
  "fields": [
    {
      "name": "size",
      "type": "INTEGER",
      "associatedWith": "Household",
      "required": true,
      "labelEn": "Household size",
      "labels": [
        { "language": "English(EN)", "label": "Household size" },
        { "language": "French(FR)", "label": "Taille du ménage" }
      ]
    },
    {
      "name": "child_hoh",
      "type": "BOOL",
      "associatedWith": "Household",
      "labelEn": "Child is head of household",
      "labels": [{ "language": "English(EN)", "label": "Child is head of household" }]
    },
    {
      "name": "first_registration_date",
      "type": "DATE",
      "associatedWith": "Household",
      "required": true,
      "labelEn": "Household first registered at",
      "labels": [{ "language": "English(EN)", "label": "Household first registered at" }]
    },
    {
      "name": "registration_data_import",
      "type": "STRING",
      "associatedWith": "Household",
      "labelEn": "Household registration data import",
      "labels": [{ "language": "English(EN)", "label": "Household registration data import" }]
    },
    {
      "name": "address",
      "type": "STRING",
      "associatedWith": "Household",
      "labelEn": "Address",
      "hint": "Street, building and apartment",
      "labels": [
        { "language": "English(EN)", "label": "Address" },
        { "language": "French(FR)", "label": "Adresse" }
      ]
    },
    {
      "name": "village",
      "type": "STRING",
      "associatedWith": "Household",
      "labelEn": "Village",
      "labels": [{ "language": "English(EN)", "label": "Village" }]
    },
    {
      "name": "consent",
      "type": "BOOL",
      "associatedWith": "Household",
      "required": true,
      "labelEn": "Do you consent to share this information?",
      "labels": [{ "language": "English(EN)", "label": "Do you consent to share this information?" }]
    },
    {
      "name": "residence_status",
      "type": "SELECT_ONE",
      "associatedWith": "Household",
      "required": true,
      "labelEn": "Residence status",
      "labels": [{ "language": "English(EN)", "label": "Residence status" }],
      "choices": [
        { "value": "IDP", "labelEn": "Displaced | Internally Displaced People",
          "labels": [{ "language": "English(EN)", "label": "Displaced | Internally Displaced People" }] },
        { "value": "REFUGEE", "labelEn": "Displaced | Refugee / Asylum Seeker",
          "labels": [{ "language": "English(EN)", "label": "Displaced | Refugee / Asylum Seeker" }] },
        { "value": "OTHERS_OF_CONCERN", "labelEn": "Displaced | Others of Concern",
          "labels": [{ "language": "English(EN)", "label": "Displaced | Others of Concern" }] },
        { "value": "HOST", "labelEn": "Non-displaced | Host",
          "labels": [{ "language": "English(EN)", "label": "Non-displaced | Host" }] },
        { "value": "NON_HOST", "labelEn": "Non-displaced | Non-host",
          "labels": [{ "language": "English(EN)", "label": "Non-displaced | Non-host" }] },
        { "value": "RETURNEE", "labelEn": "Displaced | Returnee",
          "labels": [{ "language": "English(EN)", "label": "Displaced | Returnee" }] }
      ]
    },
    {
      "name": "female_age_group_0_5_count",
      "type": "INTEGER",
      "associatedWith": "Household",
      "labelEn": "Females Age 0 - 5",
      "labels": [{ "language": "English(EN)", "label": "Females Age 0 - 5" }]
    },
    {
      "name": "full_name",
      "type": "STRING",
      "associatedWith": "Individual",
      "required": true,
      "labelEn": "Full name",
      "labels": [
        { "language": "English(EN)", "label": "Full name" },
        { "language": "French(FR)", "label": "Nom complet" }
      ]
    },
    {
      "name": "given_name",
      "type": "STRING",
      "associatedWith": "Individual",
      "labelEn": "Given name",
      "labels": [{ "language": "English(EN)", "label": "Given name" }]
    },
    {
      "name": "family_name",
      "type": "STRING",
      "associatedWith": "Individual",
      "labelEn": "Family name",
      "labels": [{ "language": "English(EN)", "label": "Family name" }]
    },
    {
      "name": "sex",
      "type": "SELECT_ONE",
      "associatedWith": "Individual",
      "required": true,
      "labelEn": "Gender",
      "labels": [
        { "language": "English(EN)", "label": "Gender" },
        { "language": "French(FR)", "label": "Sexe" }
      ],
      "choices": [
        { "value": "FEMALE", "labelEn": "Female", "labels": [
          { "language": "English(EN)", "label": "Female" },
          { "language": "French(FR)", "label": "Femme" } ] },
        { "value": "MALE", "labelEn": "Male", "labels": [
          { "language": "English(EN)", "label": "Male" },
          { "language": "French(FR)", "label": "Homme" } ] },
        { "value": "OTHER", "labelEn": "Other", "labels": [
          { "language": "English(EN)", "label": "Other" } ] },
        { "value": "NOT_ANSWERED", "labelEn": "Not Answered", "labels": [
          { "language": "English(EN)", "label": "Not Answered" } ] },
        { "value": "NOT_COLLECTED", "labelEn": "Not Collected", "labels": [
          { "language": "English(EN)", "label": "Not Collected" } ] }
      ]
    },
    {
      "name": "age",
      "type": "INTEGER",
      "associatedWith": "Individual",
      "labelEn": "Age (calculated)",
      "labels": [{ "language": "English(EN)", "label": "Age (calculated)" }]
    },
    {
      "name": "birth_date",
      "type": "DATE",
      "associatedWith": "Individual",
      "required": true,
      "labelEn": "Birth date",
      "hint": "YYYY-MM-DD",
      "labels": [
        { "language": "English(EN)", "label": "Birth date" },
        { "language": "French(FR)", "label": "Date de naissance" }
      ]
    },
    {
      "name": "estimated_birth_date",
      "type": "BOOL",
      "associatedWith": "Individual",
      "labelEn": "Estimated birth date?",
      "labels": [{ "language": "English(EN)", "label": "Estimated birth date?" }]
    },
    {
      "name": "marital_status",
      "type": "SELECT_ONE",
      "associatedWith": "Individual",
      "labelEn": "Marital status",
      "labels": [{ "language": "English(EN)", "label": "Marital status" }],
      "choices": [
        { "value": "SINGLE", "labelEn": "Single" },
        { "value": "MARRIED", "labelEn": "Married" },
        { "value": "WIDOWED", "labelEn": "Widowed" },
        { "value": "DIVORCED", "labelEn": "Divorced" },
        { "value": "SEPARATED", "labelEn": "Separated" }
      ]
    },
    {
      "name": "relationship",
      "type": "SELECT_ONE",
      "associatedWith": "Individual",
      "required": true,
      "labelEn": "Relationship to Head of Household",
      "labels": [{ "language": "English(EN)", "label": "Relationship to Head of Household" }],
      "choices": [
        { "value": "HEAD", "labelEn": "Head of household (self)" },
        { "value": "SON_DAUGHTER", "labelEn": "Son / Daughter" },
        { "value": "WIFE_HUSBAND", "labelEn": "Wife / Husband" },
        { "value": "BROTHER_SISTER", "labelEn": "Brother / Sister" },
        { "value": "MOTHER_FATHER", "labelEn": "Mother / Father" },
        { "value": "GRANDDAUGHER_GRANDSON", "labelEn": "Granddaughter / Grandson" },
        { "value": "NON_BENEFICIARY", "labelEn": "Not a Family Member. Can only act as a recipient." },
        { "value": "UNKNOWN", "labelEn": "Unknown" }
      ]
    },
    {
      "name": "phone_no",
      "type": "STRING",
      "associatedWith": "Individual",
      "labelEn": "Phone number",
      "labels": [{ "language": "English(EN)", "label": "Phone number" }]
    },
    {
      "name": "photo",
      "type": "IMAGE",
      "associatedWith": "Individual",
      "labelEn": "Photo",
      "labels": [{ "language": "English(EN)", "label": "Photo" }]
    },
    {
      "name": "child_hoh",
      "type": "BOOL",
      "associatedWith": "Individual",
      "labelEn": "Child is head of household (individual)",
      "labels": [{ "language": "English(EN)", "label": "Child is head of household (individual)" }]
    },
    {
      "name": "first_registration_date",
      "type": "DATE",
      "associatedWith": "Individual",
      "required": true,
      "labelEn": "First registration date",
      "labels": [{ "language": "English(EN)", "label": "First registration date" }]
    },
    {
      "name": "registration_data_import",
      "type": "STRING",
      "associatedWith": "Individual",
      "labelEn": "Registration data import",
      "labels": [{ "language": "English(EN)", "label": "Registration data import" }]
    },
    {
      "name": "pregnant",
      "type": "BOOL",
      "associatedWith": "Individual",
      "labelEn": "Is pregnant?",
      "labels": [{ "language": "English(EN)", "label": "Is pregnant?" }]
    },
    {
      "name": "work_status",
      "type": "SELECT_ONE",
      "associatedWith": "Individual",
      "labelEn": "Does the individual work?",
      "labels": [{ "language": "English(EN)", "label": "Does the individual work?" }],
      "choiceSet": "yes_no_not_answered"
    },
    {
      "name": "disability",
      "type": "SELECT_ONE",
      "associatedWith": "Individual",
      "labelEn": "Does the individual have a disability?",
      "labels": [{ "language": "English(EN)", "label": "Does the individual have a disability?" }],
      "choiceSet": "yes_no_not_answered"
    },
    {
      "name": "observed_disability",
      "type": "SELECT_MANY",
      "associatedWith": "Individual",
      "labelEn": "Does the individual have difficulty...",
      "labels": [{ "language": "English(EN)", "label": "Does the individual have difficulty..." }],
      "choices": [
        { "value": "NONE", "labelEn": "None" },
        { "value": "SEEING", "labelEn": "Difficulty seeing (even if wearing glasses)" },
        { "value": "HEARING", "labelEn": "Difficulty hearing (even if using a hearing aid)" },
        { "value": "WALKING", "labelEn": "Difficulty walking or climbing steps" },
        { "value": "MEMORY", "labelEn": "Difficulty remembering or concentrating" },
        { "value": "SELF_CARE", "labelEn": "Difficulty with self care (washing, dressing)" },
        { "value": "COMMUNICATING", "labelEn": "Difficulty communicating" }
      ]
    }
  ]
}"#
}
