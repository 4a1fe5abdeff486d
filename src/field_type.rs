//! Field type system: type tags, raw input and parsed values.
//!
//! Each [`FieldType`] owns the parse contract for its kind of value. Parsing
//! is strict: anything outside the contract is a failure, never a coerced
//! default. Choice membership is not checked here; that needs the field's
//! choice list and lives in the validator.

use crate::config::EngineConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO-8601 calendar date format accepted for DATE fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Primitive value kinds a field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    String,
    Integer,
    Decimal,
    Bool,
    Date,
    Image,
    SelectOne,
    SelectMany,
}

impl FieldType {
    pub const ALL: [FieldType; 8] = [
        FieldType::String,
        FieldType::Integer,
        FieldType::Decimal,
        FieldType::Bool,
        FieldType::Date,
        FieldType::Image,
        FieldType::SelectOne,
        FieldType::SelectMany,
    ];

    /// Canonical tag, e.g. `SELECT_ONE`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Integer => "INTEGER",
            Self::Decimal => "DECIMAL",
            Self::Bool => "BOOL",
            Self::Date => "DATE",
            Self::Image => "IMAGE",
            Self::SelectOne => "SELECT_ONE",
            Self::SelectMany => "SELECT_MANY",
        }
    }

    /// Whether the type draws its values from a choice list.
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::SelectOne | Self::SelectMany)
    }

    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Self::SelectMany)
    }

    /// Parse one textual value under this type's contract.
    ///
    /// `text` must already be trimmed and non-empty; emptiness is the
    /// validator's concern. SELECT_MANY input is split on commas and
    /// whitespace.
    pub fn parse(&self, text: &str, config: &EngineConfig) -> Result<FieldValue, ParseFailure> {
        match self {
            Self::String => parse_string(text, config),
            Self::Integer => text
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| ParseFailure::expected("a base-10 whole number")),
            Self::Decimal => parse_decimal(text),
            Self::Bool => parse_bool(text, config),
            Self::Date => parse_date(text),
            Self::Image => Ok(FieldValue::Image(ImageRef::new(text))),
            Self::SelectOne => Ok(FieldValue::SelectOne(text.to_string())),
            Self::SelectMany => Ok(FieldValue::SelectMany(collapse_duplicates(
                text.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|token| !token.is_empty())
                    .map(str::to_string),
            ))),
        }
    }

    /// Parse a list of values. Only SELECT_MANY accepts lists.
    pub fn parse_list(
        &self,
        items: &[String],
        config: &EngineConfig,
    ) -> Result<FieldValue, ParseFailure> {
        if !self.is_multi_valued() {
            return Err(ParseFailure::expected(format!(
                "a single {} value, not a list",
                self
            )));
        }
        let tokens = items.iter().map(|item| {
            if config.trim_input {
                item.trim().to_string()
            } else {
                item.clone()
            }
        });
        Ok(FieldValue::SelectMany(collapse_duplicates(
            tokens.filter(|token| !token.is_empty()),
        )))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ParseFailure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseFailure::expected("a known field type tag"))
    }
}

/// Why a textual value did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub expected: String,
}

impl ParseFailure {
    fn expected(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}", self.expected)
    }
}

/// Raw submitted value, before typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    List(Vec<String>),
    Text(String),
    Absent,
}

impl RawValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Whether the value carries nothing to parse.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::List(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }

    /// Rendering used in error messages.
    pub fn display(&self) -> String {
        match self {
            Self::Absent => String::new(),
            Self::Text(text) => text.clone(),
            Self::List(items) => items.join(","),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Absent)
    }
}

/// Opaque handle into an external image store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value accepted by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldValue {
    /// No value submitted for an optional field
    Empty,
    String(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    Date(NaiveDate),
    Image(ImageRef),
    SelectOne(String),
    /// Distinct values in first-seen order
    SelectMany(Vec<String>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::SelectMany(values) => values.is_empty(),
            _ => false,
        }
    }

    /// Choice values carried by this value; empty for non-choice values.
    pub fn choice_values(&self) -> Vec<&str> {
        match self {
            Self::SelectOne(value) => vec![value.as_str()],
            Self::SelectMany(values) => values.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

fn parse_string(text: &str, config: &EngineConfig) -> Result<FieldValue, ParseFailure> {
    if let Some(max) = config.max_string_length {
        if text.chars().count() > max {
            return Err(ParseFailure::expected(format!(
                "text of at most {} characters",
                max
            )));
        }
    }
    Ok(FieldValue::String(text.to_string()))
}

fn parse_decimal(text: &str) -> Result<FieldValue, ParseFailure> {
    let failure = || ParseFailure::expected("a decimal number");
    // f64 parsing also accepts "inf" and "NaN" spellings; those are not numbers here
    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return Err(failure());
    }
    match text.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(FieldValue::Decimal(number)),
        _ => Err(failure()),
    }
}

fn parse_bool(text: &str, config: &EngineConfig) -> Result<FieldValue, ParseFailure> {
    let matches = |tokens: &[String]| tokens.iter().any(|token| token.eq_ignore_ascii_case(text));
    if matches(&config.truthy_tokens) {
        Ok(FieldValue::Bool(true))
    } else if matches(&config.falsy_tokens) {
        Ok(FieldValue::Bool(false))
    } else {
        Err(ParseFailure::expected(format!(
            "one of {:?} or {:?}",
            config.truthy_tokens, config.falsy_tokens
        )))
    }
}

fn parse_date(text: &str) -> Result<FieldValue, ParseFailure> {
    let failure = || ParseFailure::expected("a calendar date in YYYY-MM-DD form");
    let bytes = text.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !well_formed {
        return Err(failure());
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map(FieldValue::Date)
        .map_err(|_| failure())
}

fn collapse_duplicates(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}
