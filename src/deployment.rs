//! Deployment-scoped registry handle.
//!
//! A [`Deployment`] wraps one [`FieldRegistry`] behind an async `RwLock`.
//! Reads (lookups, validation, exports) share the lock; schema writes take
//! it exclusively, so concurrent flex-field additions for the same
//! deployment are serialized and cannot produce duplicate or half-applied
//! definitions. Cloning a `Deployment` clones the handle, not the registry.

use crate::config::EngineConfig;
use crate::error::{FieldError, FieldResult};
use crate::export::{ExportFilter, ExportSnapshot, FieldAttribute, FieldExporter};
use crate::field_type::{FieldValue, RawValue};
use crate::language::LanguageCatalog;
use crate::schema::{
    Association, Choice, ChoiceSetId, FieldDefinition, FieldRegistry, RecordValidationReport,
    RegisterOutcome,
};
use log::{debug, info};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to one deployment's field registry.
#[derive(Debug, Clone)]
pub struct Deployment {
    id: String,
    config: Arc<EngineConfig>,
    registry: Arc<RwLock<FieldRegistry>>,
}

impl Deployment {
    /// Create a deployment with an empty registry.
    pub fn new(
        id: impl Into<String>,
        config: EngineConfig,
        catalog: Arc<dyn LanguageCatalog>,
    ) -> Self {
        Self::from_registry(id, config, FieldRegistry::new(catalog))
    }

    /// Create a deployment pre-loaded with the embedded core fields.
    pub fn with_core_fields(
        id: impl Into<String>,
        config: EngineConfig,
        catalog: Arc<dyn LanguageCatalog>,
    ) -> FieldResult<Self> {
        let registry = FieldRegistry::with_core_fields(catalog)?;
        Ok(Self::from_registry(id, config, registry))
    }

    pub fn from_registry(
        id: impl Into<String>,
        config: EngineConfig,
        registry: FieldRegistry,
    ) -> Self {
        let id = id.into();
        info!("Opened deployment '{}' with {} fields", id, registry.len());
        Self {
            id,
            config: Arc::new(config),
            registry: Arc::new(RwLock::new(registry)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Insert or update one definition.
    pub async fn register(&self, definition: FieldDefinition) -> FieldResult<RegisterOutcome> {
        let mut registry = self.registry.write().await;
        Ok(registry.register(definition)?)
    }

    /// Apply a batch of definitions atomically: either every definition is
    /// registered or, on the first failure, none is.
    pub async fn register_all(
        &self,
        definitions: Vec<FieldDefinition>,
    ) -> FieldResult<Vec<RegisterOutcome>> {
        let mut registry = self.registry.write().await;
        let mut staged = registry.clone();
        let outcomes = definitions
            .into_iter()
            .map(|definition| staged.register(definition))
            .collect::<Result<Vec<_>, _>>()?;
        *registry = staged;
        debug!(
            "Deployment '{}' applied {} definitions",
            self.id,
            outcomes.len()
        );
        Ok(outcomes)
    }

    pub async fn register_shared_choices(
        &self,
        name: &str,
        choices: &[Choice],
    ) -> FieldResult<ChoiceSetId> {
        let mut registry = self.registry.write().await;
        Ok(registry.register_shared_choices(name, choices)?)
    }

    pub async fn register_with_shared_choices(
        &self,
        definition: FieldDefinition,
        set_name: &str,
    ) -> FieldResult<RegisterOutcome> {
        let mut registry = self.registry.write().await;
        Ok(registry.register_with_shared_choices(definition, set_name)?)
    }

    pub async fn extend_choices(
        &self,
        name: &str,
        association: Association,
        choices: &[Choice],
    ) -> FieldResult<()> {
        let mut registry = self.registry.write().await;
        Ok(registry.extend_choices(name, association, choices)?)
    }

    pub async fn deprecate(&self, name: &str, association: Association) -> FieldResult<()> {
        let mut registry = self.registry.write().await;
        Ok(registry.deprecate(name, association)?)
    }

    pub async fn restore(&self, name: &str, association: Association) -> FieldResult<()> {
        let mut registry = self.registry.write().await;
        Ok(registry.restore(name, association)?)
    }

    pub async fn get(&self, name: &str, association: Association) -> FieldResult<FieldDefinition> {
        let registry = self.registry.read().await;
        Ok(registry.get(name, association)?)
    }

    pub async fn list_all(&self) -> Vec<FieldDefinition> {
        self.registry.read().await.list_all()
    }

    pub async fn validate(
        &self,
        name: &str,
        association: Association,
        raw: &RawValue,
    ) -> FieldResult<FieldValue> {
        let registry = self.registry.read().await;
        registry.validate(name, association, raw, &self.config)
    }

    pub async fn validate_record(
        &self,
        association: Association,
        values: &BTreeMap<String, RawValue>,
    ) -> RecordValidationReport {
        let registry = self.registry.read().await;
        registry.validate_record(association, values, &self.config)
    }

    pub async fn export(&self, filter: &ExportFilter) -> Vec<FieldAttribute> {
        let registry = self.registry.read().await;
        FieldExporter::new(&registry, &self.config).all_fields_attributes(filter)
    }

    pub async fn snapshot(&self, filter: &ExportFilter) -> FieldResult<ExportSnapshot> {
        let registry = self.registry.read().await;
        FieldExporter::new(&registry, &self.config).snapshot(filter)
    }

    /// Detached copy of the registry for read-heavy callers.
    pub async fn registry_snapshot(&self) -> FieldRegistry {
        self.registry.read().await.clone()
    }

    /// Re-register exported rows, atomically.
    pub async fn import(&self, rows: Vec<FieldAttribute>) -> FieldResult<Vec<RegisterOutcome>> {
        let definitions = rows
            .into_iter()
            .map(FieldAttribute::into_definition)
            .collect::<Result<Vec<_>, _>>()
            .map_err(FieldError::from)?;
        self.register_all(definitions).await
    }
}
