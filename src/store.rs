//! Record store contract and the pre-write validation gate.
//!
//! The engine does not define how records persist. It only guarantees that
//! nothing reaches a [`RecordStore`] without passing validation against the
//! deployment's registry. IMAGE values are additionally checked against an
//! [`ImageStore`], since the engine never looks at image bytes itself.
//!
//! # Example Usage
//!
//! ```rust
//! use registration_fields::config::EngineConfig;
//! use registration_fields::deployment::Deployment;
//! use registration_fields::field_type::RawValue;
//! use registration_fields::language::StaticLanguageCatalog;
//! use registration_fields::schema::Association;
//! use registration_fields::store::{InMemoryImageStore, InMemoryRecordStore, RegistrationGate};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let deployment = Deployment::with_core_fields(
//!     "afg",
//!     EngineConfig::default(),
//!     Arc::new(StaticLanguageCatalog::english_only()),
//! )?;
//! let gate = RegistrationGate::new(deployment, InMemoryRecordStore::new(), InMemoryImageStore::new());
//!
//! gate.submit("ind-1", "age", Association::Individual, RawValue::text("34")).await?;
//! assert!(gate.submit("ind-1", "age", Association::Individual, RawValue::text("thirty")).await.is_err());
//! # Ok(())
//! # }
//! ```

use crate::deployment::Deployment;
use crate::error::{FieldError, FieldResult};
use crate::field_type::{FieldValue, ImageRef, RawValue};
use crate::schema::Association;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Location of one field value of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordKey {
    pub entity_id: String,
    pub field_name: String,
    pub associated_with: Association,
}

impl RecordKey {
    pub fn new(
        entity_id: impl Into<String>,
        field_name: impl Into<String>,
        associated_with: Association,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            field_name: field_name.into(),
            associated_with,
        }
    }
}

/// Persistence backend for validated values.
pub trait RecordStore: Send + Sync {
    /// The error type returned by store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store a validated value, replacing any previous value at `key`.
    fn put(
        &self,
        key: RecordKey,
        value: FieldValue,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Store a batch of values. Either every entry is written or none is.
    fn put_all(
        &self,
        entries: Vec<(RecordKey, FieldValue)>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn get(
        &self,
        key: &RecordKey,
    ) -> impl Future<Output = Result<Option<FieldValue>, Self::Error>> + Send;

    /// Whether any stored value of the field uses choice `value`.
    fn references_choice(
        &self,
        field_name: &str,
        association: Association,
        value: &str,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}

/// Resolves IMAGE handles to stored content.
pub trait ImageStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn exists(&self, handle: &ImageRef) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}

/// Thread-safe in-memory record store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    data: Arc<RwLock<HashMap<RecordKey, FieldValue>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    /// All stored values of one entity, keyed by field name.
    pub async fn entity(
        &self,
        entity_id: &str,
        association: Association,
    ) -> BTreeMap<String, FieldValue> {
        self.data
            .read()
            .await
            .iter()
            .filter(|(key, _)| key.entity_id == entity_id && key.associated_with == association)
            .map(|(key, value)| (key.field_name.clone(), value.clone()))
            .collect()
    }
}

impl RecordStore for InMemoryRecordStore {
    type Error = Infallible;

    async fn put(&self, key: RecordKey, value: FieldValue) -> Result<(), Self::Error> {
        trace!("Storing {:?}", key);
        self.data.write().await.insert(key, value);
        Ok(())
    }

    async fn put_all(&self, entries: Vec<(RecordKey, FieldValue)>) -> Result<(), Self::Error> {
        let mut data = self.data.write().await;
        trace!("Storing batch of {} values", entries.len());
        data.extend(entries);
        Ok(())
    }

    async fn get(&self, key: &RecordKey) -> Result<Option<FieldValue>, Self::Error> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn references_choice(
        &self,
        field_name: &str,
        association: Association,
        value: &str,
    ) -> Result<bool, Self::Error> {
        Ok(self.data.read().await.iter().any(|(key, stored)| {
            key.field_name == field_name
                && key.associated_with == association
                && stored.choice_values().contains(&value)
        }))
    }
}

/// Thread-safe in-memory image handle registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryImageStore {
    handles: Arc<RwLock<HashSet<ImageRef>>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, handle: ImageRef) {
        self.handles.write().await.insert(handle);
    }
}

impl ImageStore for InMemoryImageStore {
    type Error = Infallible;

    async fn exists(&self, handle: &ImageRef) -> Result<bool, Self::Error> {
        Ok(self.handles.read().await.contains(handle))
    }
}

/// Validates values against a deployment before writing them to a store.
#[derive(Debug, Clone)]
pub struct RegistrationGate<S, I> {
    deployment: Deployment,
    records: S,
    images: I,
}

impl<S: RecordStore, I: ImageStore> RegistrationGate<S, I> {
    pub fn new(deployment: Deployment, records: S, images: I) -> Self {
        Self {
            deployment,
            records,
            images,
        }
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn records(&self) -> &S {
        &self.records
    }

    /// Validate and store one value. Rejected values never reach the store.
    pub async fn submit(
        &self,
        entity_id: &str,
        field_name: &str,
        association: Association,
        raw: RawValue,
    ) -> FieldResult<FieldValue> {
        let value = self
            .deployment
            .validate(field_name, association, &raw)
            .await?;
        self.check_image(field_name, association, &value).await?;

        let key = RecordKey::new(entity_id, field_name, association);
        self.records
            .put(key, value.clone())
            .await
            .map_err(|e| FieldError::store(e.to_string()))?;
        debug!("Stored {} ({}) for entity {}", field_name, association, entity_id);
        Ok(value)
    }

    /// Validate a whole record and store it only if every value passes.
    ///
    /// Accepted values go to the store as one [`RecordStore::put_all`] batch.
    pub async fn submit_record(
        &self,
        entity_id: &str,
        association: Association,
        values: &BTreeMap<String, RawValue>,
    ) -> Result<BTreeMap<String, FieldValue>, Vec<FieldError>> {
        let accepted = self
            .deployment
            .validate_record(association, values)
            .await
            .into_result()?;

        let mut errors = Vec::new();
        for (name, value) in &accepted {
            if let Err(err) = self.check_image(name, association, value).await {
                errors.push(err);
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let entries = accepted
            .iter()
            .map(|(name, value)| {
                (
                    RecordKey::new(entity_id, name.clone(), association),
                    value.clone(),
                )
            })
            .collect();
        self.records
            .put_all(entries)
            .await
            .map_err(|e| vec![FieldError::store(e.to_string())])?;
        debug!(
            "Stored {} values for {} entity {}",
            accepted.len(),
            association,
            entity_id
        );
        Ok(accepted)
    }

    async fn check_image(
        &self,
        field_name: &str,
        association: Association,
        value: &FieldValue,
    ) -> FieldResult<()> {
        let FieldValue::Image(handle) = value else {
            return Ok(());
        };
        let exists = self
            .images
            .exists(handle)
            .await
            .map_err(|e| FieldError::store(e.to_string()))?;
        if !exists {
            return Err(FieldError::ImageNotFound {
                field: field_name.to_string(),
                association,
                handle: handle.to_string(),
            });
        }
        Ok(())
    }
}
