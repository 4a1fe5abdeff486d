//! Choice validation tests.
//!
//! SELECT_ONE and SELECT_MANY membership, duplicate collapsing, and the
//! separation of look-alike choice scales.

use crate::common::{fixtures, validate};
use crate::{assert_accepts, assert_error_message_contains, assert_validation_error};

use registration_fields::error::{FieldError, ValidationError, ValidationErrorKind};
use registration_fields::field_type::{FieldValue, RawValue};
use registration_fields::schema::Association;

#[test]
fn test_select_one_accepts_known_value() {
    let registry = fixtures::core_registry();
    assert_accepts!(
        validate(&registry, "sex", Association::Individual, "MALE"),
        FieldValue::SelectOne("MALE".into())
    );
}

#[test]
fn test_select_one_rejects_unknown_value() {
    let registry = fixtures::core_registry();
    assert_validation_error!(
        validate(&registry, "sex", Association::Individual, "UNKNOWN"),
        ValidationErrorKind::UnknownChoice
    );
    assert_error_message_contains!(
        validate(&registry, "sex", Association::Individual, "UNKNOWN"),
        "'UNKNOWN'"
    );
}

#[test]
fn test_choice_match_is_on_value_not_label() {
    let registry = fixtures::core_registry();
    assert_validation_error!(
        validate(&registry, "sex", Association::Individual, "Female"),
        ValidationErrorKind::UnknownChoice
    );
    assert_validation_error!(
        validate(&registry, "sex", Association::Individual, "female"),
        ValidationErrorKind::UnknownChoice
    );
}

#[test]
fn test_select_many_collapses_duplicates() {
    let registry = fixtures::flex_registry();
    assert_accepts!(
        validate(
            &registry,
            "drug_addict_h_f",
            Association::Household,
            RawValue::list(["mother", "mother", "father"])
        ),
        FieldValue::SelectMany(vec!["mother".into(), "father".into()])
    );
}

#[test]
fn test_select_many_accepts_delimited_text() {
    let registry = fixtures::flex_registry();
    assert_accepts!(
        validate(&registry, "drug_addict_h_f", Association::Household, "sister, brother sister"),
        FieldValue::SelectMany(vec!["sister".into(), "brother".into()])
    );
}

#[test]
fn test_select_many_rejects_any_unknown_member() {
    let registry = fixtures::flex_registry();
    let result = validate(
        &registry,
        "drug_addict_h_f",
        Association::Household,
        RawValue::list(["mother", "uncle", "father"]),
    );
    match result {
        Err(FieldError::Validation(ValidationError::UnknownChoice { value, allowed, .. })) => {
            assert_eq!(value, "uncle");
            assert_eq!(allowed, vec!["brother", "father", "mother", "no", "other", "sister"]);
        }
        other => panic!("Expected UnknownChoice, got {:?}", other),
    }
}

#[test]
fn test_look_alike_scales_stay_separate() {
    let registry = fixtures::flex_registry();
    // "0" means "No" on the binary scale and does not exist on the frequency scale
    assert_accepts!(
        validate(&registry, "sold_assets_h_f", Association::Household, "0"),
        FieldValue::SelectOne("0".into())
    );
    assert_validation_error!(
        validate(&registry, "reduced_meals_h_f", Association::Household, "0"),
        ValidationErrorKind::UnknownChoice
    );
    assert_accepts!(
        validate(&registry, "reduced_meals_h_f", Association::Household, "4"),
        FieldValue::SelectOne("4".into())
    );

    let binary = registry.get("sold_assets_h_f", Association::Household).unwrap();
    let frequency = registry.get("reduced_meals_h_f", Association::Household).unwrap();
    assert_ne!(binary.choices(), frequency.choices());
}

#[test]
fn test_shared_set_fields_validate_identically() {
    let registry = fixtures::core_registry();
    for field in ["work_status", "disability"] {
        assert_accepts!(
            validate(&registry, field, Association::Individual, "NOT_ANSWERED"),
            FieldValue::SelectOne("NOT_ANSWERED".into())
        );
        assert_validation_error!(
            validate(&registry, field, Association::Individual, "2"),
            ValidationErrorKind::UnknownChoice
        );
    }
}

#[test]
fn test_extended_choice_becomes_valid() {
    let mut registry = fixtures::flex_registry();
    assert!(validate(&registry, "drug_addict_h_f", Association::Household, "cousin").is_err());
    registry
        .extend_choices(
            "drug_addict_h_f",
            Association::Household,
            &[registration_fields::schema::Choice::new("cousin", "Cousin")],
        )
        .unwrap();
    assert_accepts!(
        validate(&registry, "drug_addict_h_f", Association::Household, "cousin"),
        FieldValue::SelectMany(vec!["cousin".into()])
    );
}
