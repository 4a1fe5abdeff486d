//! Field definitions, the registries that hold them, and value validation.
//!
//! # Key Types
//!
//! - [`FieldDefinition`] - One household or individual attribute
//! - [`FieldRegistry`] - Registry of definitions for a deployment
//! - [`ChoiceRegistry`] - Shared, append-only choice lists
//! - [`Validator`] - Checks raw values against a definition
//!
//! # Examples
//!
//! ```rust
//! use registration_fields::config::EngineConfig;
//! use registration_fields::field_type::{FieldValue, RawValue};
//! use registration_fields::language::StaticLanguageCatalog;
//! use registration_fields::schema::{Association, FieldRegistry};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Arc::new(StaticLanguageCatalog::english_only());
//! let registry = FieldRegistry::with_core_fields(catalog)?;
//! let config = EngineConfig::default();
//!
//! let age = registry.validate("age", Association::Individual, &RawValue::text("34"), &config)?;
//! assert_eq!(age, FieldValue::Integer(34));
//! # Ok(())
//! # }
//! ```

pub mod choices;
pub mod embedded;
pub mod registry;
pub mod types;
pub mod validation;


pub use choices::{ChoiceRegistry, ChoiceSet, ChoiceSetId, ResolvedChoice};
pub use registry::{FieldRegistry, RegisterOutcome};
pub use types::{Association, Choice, FieldDefinition, FieldDefinitionBuilder, FieldKey, FieldKind};
pub use validation::{RecordValidationReport, Validator};
