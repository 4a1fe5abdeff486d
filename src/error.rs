//! Error types for field registration and validation.
//!
//! Value-level rejections ([`ValidationError`]) and registry-level failures
//! ([`RegistryError`]) are kept apart so callers can tell "the submitted value
//! is wrong" from "the schema operation is wrong". [`FieldError`] wraps both
//! for operations that can hit either.

use crate::schema::types::Association;
use std::fmt;

/// Main error type for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// A submitted value was rejected by the validator
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A registry lookup or schema change failed
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Engine configuration is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An IMAGE value references content the image store does not hold
    #[error("Field '{field}' ({association}) references missing image '{handle}'")]
    ImageNotFound {
        field: String,
        association: Association,
        handle: String,
    },

    /// Errors surfaced by an external record store
    #[error("Record store error: {message}")]
    Store { message: String },
}

/// Value-level validation failures.
///
/// Every variant names the field and association so the caller can render
/// an actionable message without a second lookup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Value cannot be parsed as the declared type
    #[error("Field '{field}' ({association}) expects {expected}, got '{value}'")]
    TypeMismatch {
        field: String,
        association: Association,
        expected: String,
        value: String,
    },

    /// Value is not one of the field's choices
    #[error("Field '{field}' ({association}) has no choice '{value}', allowed values: {allowed:?}")]
    UnknownChoice {
        field: String,
        association: Association,
        value: String,
        allowed: Vec<String>,
    },

    /// Required field has no value
    #[error("Required field '{field}' ({association}) is missing")]
    MissingRequiredField {
        field: String,
        association: Association,
    },
}

/// Fieldless discriminant of [`ValidationError`] for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    TypeMismatch,
    UnknownChoice,
    MissingRequiredField,
}

/// Registry lookup and schema change failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No definition for the name/association pair
    #[error("Field '{name}' ({association}) not found")]
    NotFound {
        name: String,
        association: Association,
    },

    /// Attempted incompatible redefinition of an existing field
    #[error("Schema conflict on field '{name}' ({association}): {reason}")]
    SchemaConflict {
        name: String,
        association: Association,
        reason: String,
    },

    /// Definition violates a structural invariant on its own
    #[error("Invalid definition for field '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    /// Shared choice set name is not registered
    #[error("Choice set '{0}' not found")]
    ChoiceSetNotFound(String),
}

/// Errors raised while building or loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Failed to parse configuration: {message}")]
    Parse { message: String },
}

impl FieldError {
    /// Create a record store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Validation error kind, if this is a value rejection.
    pub fn validation_kind(&self) -> Option<ValidationErrorKind> {
        match self {
            Self::Validation(err) => Some(err.kind()),
            _ => None,
        }
    }
}

impl ValidationError {
    /// Create a type mismatch error
    pub fn type_mismatch(
        field: impl Into<String>,
        association: Association,
        expected: impl fmt::Display,
        value: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            association,
            expected: expected.to_string(),
            value: value.into(),
        }
    }

    /// Create an unknown choice error
    pub fn unknown_choice(
        field: impl Into<String>,
        association: Association,
        value: impl Into<String>,
        allowed: Vec<String>,
    ) -> Self {
        Self::UnknownChoice {
            field: field.into(),
            association,
            value: value.into(),
            allowed,
        }
    }

    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>, association: Association) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            association,
        }
    }

    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::TypeMismatch { .. } => ValidationErrorKind::TypeMismatch,
            Self::UnknownChoice { .. } => ValidationErrorKind::UnknownChoice,
            Self::MissingRequiredField { .. } => ValidationErrorKind::MissingRequiredField,
        }
    }

    /// Name of the field the error refers to.
    pub fn field(&self) -> &str {
        match self {
            Self::TypeMismatch { field, .. }
            | Self::UnknownChoice { field, .. }
            | Self::MissingRequiredField { field, .. } => field,
        }
    }

    pub fn association(&self) -> Association {
        match self {
            Self::TypeMismatch { association, .. }
            | Self::UnknownChoice { association, .. }
            | Self::MissingRequiredField { association, .. } => *association,
        }
    }
}

impl RegistryError {
    /// Create a not found error
    pub fn not_found(name: impl Into<String>, association: Association) -> Self {
        Self::NotFound {
            name: name.into(),
            association,
        }
    }

    /// Create a schema conflict error
    pub fn conflict(
        name: impl Into<String>,
        association: Association,
        reason: impl Into<String>,
    ) -> Self {
        Self::SchemaConflict {
            name: name.into(),
            association,
            reason: reason.into(),
        }
    }

    /// Create an invalid definition error
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Result type alias for engine operations
pub type FieldResult<T> = Result<T, FieldError>;

/// Result type alias for value validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
