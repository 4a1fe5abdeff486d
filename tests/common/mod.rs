//! Common test utilities for registration field testing.
//!
//! This module provides macros, builders, and fixtures shared by the
//! validation and integration tests.

pub mod builders;

use registration_fields::config::EngineConfig;
use registration_fields::error::FieldError;
use registration_fields::field_type::{FieldValue, RawValue};
use registration_fields::schema::{Association, FieldRegistry};

/// Route engine logs through the test harness; set `RUST_LOG` to see them.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Validate one raw value with the default engine configuration.
pub fn validate(
    registry: &FieldRegistry,
    name: &str,
    association: Association,
    raw: impl Into<RawValue>,
) -> Result<FieldValue, FieldError> {
    registry.validate(name, association, &raw.into(), &EngineConfig::default())
}

/// Custom assertion macro for a validation error of a given kind
#[macro_export]
macro_rules! assert_validation_error {
    ($result:expr, $expected_kind:expr) => {
        match $result {
            Err(err) => assert_eq!(
                err.validation_kind(),
                Some($expected_kind),
                "Expected validation error {:?}, got {:?}",
                $expected_kind,
                err
            ),
            Ok(value) => panic!(
                "Expected validation error {:?}, but validation passed with {:?}",
                $expected_kind, value
            ),
        }
    };
}

/// Custom assertion macro for specific error messages
#[macro_export]
macro_rules! assert_error_message_contains {
    ($result:expr, $substring:expr) => {
        match $result {
            Err(err) => assert!(
                err.to_string().contains($substring),
                "Error message '{}' does not contain '{}'",
                err,
                $substring
            ),
            Ok(_) => panic!(
                "Expected error containing '{}', but the call succeeded",
                $substring
            ),
        }
    };
}

/// Custom assertion macro for successful validation with an expected value
#[macro_export]
macro_rules! assert_accepts {
    ($result:expr, $expected:expr) => {
        match $result {
            Ok(value) => assert_eq!(value, $expected),
            Err(err) => panic!("Expected validation to succeed, but got error: {}", err),
        }
    };
}
