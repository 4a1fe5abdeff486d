//! Data type validation tests.
//!
//! One group per field type: what each parse contract accepts, what it
//! rejects, and that rejected input is never coerced into a value.

use chrono::NaiveDate;

use crate::common::{fixtures, validate};
use crate::{assert_accepts, assert_error_message_contains, assert_validation_error};

use registration_fields::config::EngineConfig;
use registration_fields::error::ValidationErrorKind;
use registration_fields::field_type::{FieldValue, ImageRef, RawValue};
use registration_fields::schema::Association;

#[test]
fn test_integer_accepts_whole_numbers() {
    let registry = fixtures::core_registry();
    assert_accepts!(
        validate(&registry, "age", Association::Individual, "34"),
        FieldValue::Integer(34)
    );
    assert_accepts!(
        validate(&registry, "age", Association::Individual, "  7 "),
        FieldValue::Integer(7)
    );
    assert_accepts!(
        validate(&registry, "size", Association::Household, "-1"),
        FieldValue::Integer(-1)
    );
}

#[test]
fn test_integer_rejects_words_and_fractions() {
    let registry = fixtures::core_registry();
    for input in ["thirty", "3.5", "1e2", "0x10", "34 years"] {
        assert_validation_error!(
            validate(&registry, "age", Association::Individual, input),
            ValidationErrorKind::TypeMismatch
        );
    }
}

#[test]
fn test_type_mismatch_message_names_field_and_association() {
    let registry = fixtures::core_registry();
    assert_error_message_contains!(
        validate(&registry, "age", Association::Individual, "thirty"),
        "'age' (Individual)"
    );
    assert_error_message_contains!(
        validate(&registry, "age", Association::Individual, "thirty"),
        "INTEGER"
    );
}

#[test]
fn test_decimal_accepts_signed_fixed_and_floating() {
    let registry = fixtures::flex_registry();
    let cases = [("12", 12.0), ("-0.5", -0.5), ("+3.25", 3.25), ("2.5e2", 250.0)];
    for (input, expected) in cases {
        assert_accepts!(
            validate(&registry, "monthly_income_i_f", Association::Individual, input),
            FieldValue::Decimal(expected)
        );
    }
}

#[test]
fn test_decimal_rejects_non_numbers() {
    let registry = fixtures::flex_registry();
    for input in ["abc", "NaN", "infinity", "1,5", "--1"] {
        assert_validation_error!(
            validate(&registry, "monthly_income_i_f", Association::Individual, input),
            ValidationErrorKind::TypeMismatch
        );
    }
}

#[test]
fn test_bool_token_sets() {
    let registry = fixtures::core_registry();
    for input in ["true", "TRUE", "1", "yes"] {
        assert_accepts!(
            validate(&registry, "pregnant", Association::Individual, input),
            FieldValue::Bool(true)
        );
    }
    for input in ["false", "0", "No"] {
        assert_accepts!(
            validate(&registry, "pregnant", Association::Individual, input),
            FieldValue::Bool(false)
        );
    }
    assert_validation_error!(
        validate(&registry, "pregnant", Association::Individual, "maybe"),
        ValidationErrorKind::TypeMismatch
    );
}

#[test]
fn test_bool_tokens_follow_configuration() {
    let registry = fixtures::core_registry();
    let config = EngineConfig::builder()
        .with_bool_tokens(["oui"], ["non"])
        .build()
        .unwrap();
    let validate_with = |raw: &str| {
        registry.validate("pregnant", Association::Individual, &RawValue::text(raw), &config)
    };
    assert_eq!(validate_with("OUI").unwrap(), FieldValue::Bool(true));
    assert_eq!(validate_with("non").unwrap(), FieldValue::Bool(false));
    assert!(validate_with("true").is_err());
}

#[test]
fn test_date_accepts_iso_calendar_dates() {
    let registry = fixtures::core_registry();
    assert_accepts!(
        validate(&registry, "birth_date", Association::Individual, "2000-02-29"),
        FieldValue::Date(NaiveDate::from_ymd_opt(2000, 2, 29).unwrap())
    );
}

#[test]
fn test_date_rejects_malformed_and_out_of_range() {
    let registry = fixtures::core_registry();
    for input in ["2020-02-30", "2019-02-29", "2020-13-01", "17/05/1990", "1990-5-17", "1990-05-17T00:00:00"] {
        assert_validation_error!(
            validate(&registry, "birth_date", Association::Individual, input),
            ValidationErrorKind::TypeMismatch
        );
    }
}

#[test]
fn test_string_respects_configured_max_length() {
    let registry = fixtures::core_registry();
    let config = EngineConfig::builder().with_max_string_length(5).build().unwrap();
    let short = registry.validate("village", Association::Household, &RawValue::text("Herat"), &config);
    let long = registry.validate("village", Association::Household, &RawValue::text("Mazar-i-Sharif"), &config);
    assert_eq!(short.unwrap(), FieldValue::String("Herat".into()));
    assert_validation_error!(long, ValidationErrorKind::TypeMismatch);

    // unbounded by default
    assert!(validate(&registry, "village", Association::Household, "Mazar-i-Sharif").is_ok());
}

#[test]
fn test_trim_can_be_disabled() {
    let registry = fixtures::core_registry();
    let config = EngineConfig::builder().with_trim_input(false).build().unwrap();
    let result = registry.validate("age", Association::Individual, &RawValue::text(" 34"), &config);
    assert_validation_error!(result, ValidationErrorKind::TypeMismatch);
}

#[test]
fn test_image_is_an_opaque_handle() {
    let registry = fixtures::core_registry();
    assert_accepts!(
        validate(&registry, "photo", Association::Individual, "s3://bucket/ind-1.jpg"),
        FieldValue::Image(ImageRef::new("s3://bucket/ind-1.jpg"))
    );
}
