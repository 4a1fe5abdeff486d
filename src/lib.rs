//! Field definition and validation engine for registration data.
//!
//! Maintains the per-deployment catalog of household and individual fields
//! (built-in core fields plus deployment-defined flex fields), validates
//! submitted values against them, and exports the fully localized field
//! listing consumed by reporting and API clients.
//!
//! # Core Components
//!
//! - [`FieldRegistry`] - Definitions keyed by name and association
//! - [`Validator`] - Type, choice and required checks for raw values
//! - [`FieldExporter`] - Localized "all fields attributes" listing
//! - [`Deployment`] - Async handle serializing schema writes
//! - [`RegistrationGate`] - Validates before anything reaches a record store
//!
//! # Quick Start
//!
//! ```rust
//! use registration_fields::{Association, Choice, EngineConfig, FieldDefinition, FieldRegistry};
//! use registration_fields::field_type::{FieldType, FieldValue, RawValue};
//! use registration_fields::language::StaticLanguageCatalog;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Arc::new(StaticLanguageCatalog::english_only());
//! let mut registry = FieldRegistry::with_core_fields(catalog)?;
//!
//! let relatives = FieldDefinition::builder("drug_addict_h_f", Association::Household, FieldType::SelectMany)
//!     .flex()
//!     .label_en("Relatives with addiction")
//!     .choice(Choice::new("mother", "Mother"))
//!     .choice(Choice::new("father", "Father"))
//!     .build()?;
//! registry.register(relatives)?;
//!
//! let config = EngineConfig::default();
//! let value = registry.validate(
//!     "drug_addict_h_f",
//!     Association::Household,
//!     &RawValue::list(["mother", "mother", "father"]),
//!     &config,
//! )?;
//! assert_eq!(value, FieldValue::SelectMany(vec!["mother".into(), "father".into()]));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod deployment;
pub mod error;
pub mod export;
pub mod field_type;
pub mod language;
pub mod schema;
pub mod store;

// Re-export commonly used types for convenience
pub use config::{EngineConfig, EngineConfigBuilder};
pub use deployment::Deployment;
pub use error::{
    ConfigError, FieldError, FieldResult, RegistryError, ValidationError, ValidationErrorKind,
};
pub use export::{ExportFilter, ExportSnapshot, ExportVersion, FieldAttribute, FieldExporter};
pub use field_type::{FieldType, FieldValue, RawValue};
pub use language::{LanguageCatalog, StaticLanguageCatalog};
pub use schema::{
    Association, Choice, FieldDefinition, FieldRegistry, RegisterOutcome, Validator,
};
pub use store::{ImageStore, RecordStore, RegistrationGate};
