//! Pre-write validation gate tests.
//!
//! Nothing reaches the record store unless it validates, and IMAGE values
//! must resolve in the image store.

use std::collections::BTreeMap;
use std::io;

use crate::common::builders::RecordBuilder;
use crate::common::fixtures;

use registration_fields::error::{FieldError, ValidationErrorKind};
use registration_fields::field_type::{FieldValue, ImageRef, RawValue};
use registration_fields::schema::Association;
use registration_fields::store::{
    InMemoryImageStore, InMemoryRecordStore, RecordKey, RecordStore, RegistrationGate,
};

/// Record store whose batch writes always fail.
#[derive(Debug, Default)]
struct RejectingBatchStore {
    inner: InMemoryRecordStore,
}

impl RecordStore for RejectingBatchStore {
    type Error = io::Error;

    async fn put(&self, key: RecordKey, value: FieldValue) -> Result<(), Self::Error> {
        self.inner.put(key, value).await.map_err(|never| match never {})
    }

    async fn put_all(&self, _entries: Vec<(RecordKey, FieldValue)>) -> Result<(), Self::Error> {
        Err(io::Error::other("disk full"))
    }

    async fn get(&self, key: &RecordKey) -> Result<Option<FieldValue>, Self::Error> {
        self.inner.get(key).await.map_err(|never| match never {})
    }

    async fn references_choice(
        &self,
        field_name: &str,
        association: Association,
        value: &str,
    ) -> Result<bool, Self::Error> {
        self.inner
            .references_choice(field_name, association, value)
            .await
            .map_err(|never| match never {})
    }
}

async fn gate() -> RegistrationGate<InMemoryRecordStore, InMemoryImageStore> {
    let deployment = fixtures::deployment();
    deployment
        .register_all(fixtures::sample_flex_fields())
        .await
        .unwrap();
    let images = InMemoryImageStore::new();
    images.insert(ImageRef::new("img/card-1.png")).await;
    RegistrationGate::new(deployment, InMemoryRecordStore::new(), images)
}

#[tokio::test]
async fn test_accepted_value_is_stored_typed() {
    let gate = gate().await;
    let value = gate
        .submit("hh-1", "size", Association::Household, RawValue::text("5"))
        .await
        .unwrap();
    assert_eq!(value, FieldValue::Integer(5));

    let stored = gate
        .records()
        .get(&RecordKey::new("hh-1", "size", Association::Household))
        .await
        .unwrap();
    assert_eq!(stored, Some(FieldValue::Integer(5)));
}

#[tokio::test]
async fn test_rejected_value_leaves_previous_value() {
    let gate = gate().await;
    gate.submit("hh-1", "size", Association::Household, RawValue::text("5"))
        .await
        .unwrap();
    let result = gate
        .submit("hh-1", "size", Association::Household, RawValue::text("five"))
        .await;
    assert_eq!(
        result.unwrap_err().validation_kind(),
        Some(ValidationErrorKind::TypeMismatch)
    );

    let stored = gate
        .records()
        .get(&RecordKey::new("hh-1", "size", Association::Household))
        .await
        .unwrap();
    assert_eq!(stored, Some(FieldValue::Integer(5)));
}

#[tokio::test]
async fn test_flex_image_must_resolve() {
    let gate = gate().await;
    let present = gate
        .submit("ind-1", "id_card_photo_i_f", Association::Individual, RawValue::text("img/card-1.png"))
        .await;
    assert!(present.is_ok());

    let missing = gate
        .submit("ind-2", "id_card_photo_i_f", Association::Individual, RawValue::text("img/card-2.png"))
        .await;
    match missing {
        Err(FieldError::ImageNotFound { field, handle, .. }) => {
            assert_eq!(field, "id_card_photo_i_f");
            assert_eq!(handle, "img/card-2.png");
        }
        other => panic!("Expected ImageNotFound, got {:?}", other),
    }
    assert!(gate
        .records()
        .entity("ind-2", Association::Individual)
        .await
        .is_empty());
}

#[tokio::test]
async fn test_record_written_only_when_fully_valid() {
    let gate = gate().await;

    let invalid = RecordBuilder::valid_individual()
        .with("age", "thirty")
        .with("id_card_photo_i_f", "img/card-1.png")
        .build();
    let errors = gate
        .submit_record("ind-1", Association::Individual, &invalid)
        .await
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(gate.records().is_empty().await);

    let valid = RecordBuilder::valid_individual()
        .with("age", "34")
        .with_list("observed_disability", &["SEEING", "SEEING", "HEARING"])
        .build();
    let accepted = gate
        .submit_record("ind-1", Association::Individual, &valid)
        .await
        .unwrap();
    assert_eq!(
        accepted.get("observed_disability"),
        Some(&FieldValue::SelectMany(vec!["SEEING".into(), "HEARING".into()]))
    );

    let stored: BTreeMap<String, FieldValue> =
        gate.records().entity("ind-1", Association::Individual).await;
    assert_eq!(stored, accepted);
}

#[tokio::test]
async fn test_missing_image_blocks_whole_record() {
    let gate = gate().await;
    let record = RecordBuilder::valid_individual()
        .with("id_card_photo_i_f", "img/unknown.png")
        .build();
    let errors = gate
        .submit_record("ind-9", Association::Individual, &record)
        .await
        .unwrap_err();
    assert!(matches!(errors[0], FieldError::ImageNotFound { .. }));
    assert!(gate.records().is_empty().await);
}

#[tokio::test]
async fn test_choice_references_are_discoverable() {
    let gate = gate().await;
    gate.submit(
        "hh-1",
        "drug_addict_h_f",
        Association::Household,
        RawValue::list(["mother", "father"]),
    )
    .await
    .unwrap();

    let store = gate.records();
    assert!(store
        .references_choice("drug_addict_h_f", Association::Household, "father")
        .await
        .unwrap());
    assert!(!store
        .references_choice("drug_addict_h_f", Association::Household, "sister")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_failed_batch_write_stores_nothing() {
    let deployment = fixtures::deployment();
    let gate = RegistrationGate::new(
        deployment,
        RejectingBatchStore::default(),
        InMemoryImageStore::new(),
    );
    let record = RecordBuilder::valid_individual().with("age", "34").build();

    let errors = gate
        .submit_record("ind-1", Association::Individual, &record)
        .await
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        FieldError::Store { message } => assert!(message.contains("disk full")),
        other => panic!("Expected Store error, got {:?}", other),
    }
    assert!(gate.records().inner.is_empty().await);
}
