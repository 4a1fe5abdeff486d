//! Concurrent access through the async deployment handle.
//!
//! Reads and validation run in parallel; schema writes are serialized so
//! concurrent flex-field additions never leave duplicate or partial state.

use futures::future::join_all;

use crate::common::builders::{FlexFieldBuilder, RecordBuilder};
use crate::common::fixtures;

use registration_fields::error::FieldError;
use registration_fields::export::ExportFilter;
use registration_fields::field_type::{FieldType, FieldValue, RawValue};
use registration_fields::schema::{Association, RegisterOutcome};

#[tokio::test]
async fn test_concurrent_identical_registrations_create_once() {
    let deployment = fixtures::deployment();
    let definition = FlexFieldBuilder::new("water_source_h_f", Association::Household, FieldType::SelectOne)
        .label_en("Main source of drinking water")
        .choices(["piped", "well", "river", "truck"])
        .build();

    let tasks = (0..16).map(|_| {
        let deployment = deployment.clone();
        let definition = definition.clone();
        tokio::spawn(async move { deployment.register(definition).await })
    });
    let outcomes: Vec<RegisterOutcome> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked").expect("registration failed"))
        .collect();

    assert_eq!(
        outcomes.iter().filter(|o| **o == RegisterOutcome::Created).count(),
        1
    );
    assert_eq!(
        outcomes.iter().filter(|o| **o == RegisterOutcome::Unchanged).count(),
        15
    );
    let matching = deployment
        .export(&ExportFilter::new().name_contains("water_source_h_f"))
        .await;
    assert_eq!(matching.len(), 1);
}

#[tokio::test]
async fn test_concurrent_conflicting_registrations_keep_one_type() {
    let deployment = fixtures::deployment();
    let types = [FieldType::Integer, FieldType::Decimal, FieldType::String, FieldType::Bool];

    let tasks = types.into_iter().map(|field_type| {
        let deployment = deployment.clone();
        async move {
            let definition = FlexFieldBuilder::new("livestock_h_f", Association::Household, field_type)
                .label_en("Livestock owned")
                .build();
            deployment.register(definition).await
        }
    });
    let results = join_all(tasks).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, FieldError::Registry(_))));
    assert!(deployment.get("livestock_h_f", Association::Household).await.is_ok());
}

#[tokio::test]
async fn test_validation_runs_alongside_writes() {
    let deployment = fixtures::deployment();

    let readers = (0..32).map(|i| {
        let deployment = deployment.clone();
        async move {
            deployment
                .validate("age", Association::Individual, &RawValue::text(i.to_string()))
                .await
        }
    });
    let writer = {
        let deployment = deployment.clone();
        async move { deployment.register_all(fixtures::sample_flex_fields()).await }
    };

    let (reads, written) = tokio::join!(join_all(readers), writer);
    for (i, read) in reads.into_iter().enumerate() {
        assert_eq!(read.unwrap(), FieldValue::Integer(i as i64));
    }
    assert_eq!(written.unwrap().len(), fixtures::sample_flex_fields().len());
}

#[tokio::test]
async fn test_record_validation_through_handle() {
    let deployment = fixtures::deployment();
    let report = deployment
        .validate_record(Association::Household, &RecordBuilder::valid_household().build())
        .await;
    assert!(report.is_valid(), "{:?}", report.errors);
}

#[tokio::test]
async fn test_import_is_atomic() {
    let source = fixtures::deployment();
    source.register_all(fixtures::sample_flex_fields()).await.unwrap();
    let mut rows = source.export(&ExportFilter::new().flex_only()).await;

    let target = fixtures::deployment();
    let mut bad = rows[0].clone();
    bad.name = "age".to_string();
    bad.associated_with = Association::Individual;
    bad.is_flex_field = true;
    rows.push(bad);

    let before = target.list_all().await;
    assert!(target.import(rows).await.is_err());
    assert_eq!(target.list_all().await, before);
}

#[tokio::test]
async fn test_snapshot_detaches_from_live_registry() {
    let deployment = fixtures::deployment();
    let snapshot = deployment.registry_snapshot().await;
    deployment
        .deprecate("village", Association::Household)
        .await
        .unwrap();
    assert!(snapshot.is_visible("village", Association::Household).unwrap());
    assert!(!deployment
        .registry_snapshot()
        .await
        .is_visible("village", Association::Household)
        .unwrap());
}

#[test]
fn test_blocking_callers_can_drive_the_handle() {
    let deployment = fixtures::deployment();
    let value = tokio_test::block_on(deployment.validate(
        "sex",
        Association::Individual,
        &RawValue::text("FEMALE"),
    ))
    .unwrap();
    assert_eq!(value, FieldValue::SelectOne("FEMALE".into()));
}
