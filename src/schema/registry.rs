//! Field definition registry.
//!
//! Holds every [`FieldDefinition`] of a deployment keyed by name and
//! association. Labels are stored sparsely and choice lists live in the
//! [`ChoiceRegistry`] arena; both are expanded against the language catalog
//! whenever a definition is read, so every read reflects the catalog's
//! current active languages.

use super::choices::{ChoiceRegistry, ChoiceSetId, ResolvedChoice};
use super::embedded;
use super::types::{Association, Choice, FieldDefinition, FieldKey, FieldKind, check_choice_value};
use crate::error::{RegistryError, RegistryResult};
use crate::field_type::FieldType;
use crate::language::{Labels, LanguageCatalog, Translations};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Stored value type. Choice kinds point into the choice arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoredKind {
    /// Never a select kind
    Scalar(FieldKind),
    SelectOne(ChoiceSetId),
    SelectMany(ChoiceSetId),
}

impl StoredKind {
    pub(crate) fn field_type(&self) -> FieldType {
        match self {
            Self::Scalar(kind) => kind.field_type(),
            Self::SelectOne(_) => FieldType::SelectOne,
            Self::SelectMany(_) => FieldType::SelectMany,
        }
    }

    pub(crate) fn choice_set(&self) -> Option<ChoiceSetId> {
        match self {
            Self::Scalar(_) => None,
            Self::SelectOne(id) | Self::SelectMany(id) => Some(*id),
        }
    }

    fn with_choice_set(self, id: ChoiceSetId) -> Self {
        match self {
            Self::Scalar(kind) => Self::Scalar(kind),
            Self::SelectOne(_) => Self::SelectOne(id),
            Self::SelectMany(_) => Self::SelectMany(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldRecord {
    pub(crate) name: String,
    pub(crate) association: Association,
    pub(crate) kind: StoredKind,
    pub(crate) is_flex_field: bool,
    pub(crate) required: bool,
    pub(crate) hint: String,
    pub(crate) label_en: String,
    pub(crate) translations: Translations,
    pub(crate) visible: bool,
}

/// What a call to [`FieldRegistry::register`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Registry of field definitions for one deployment.
#[derive(Clone)]
pub struct FieldRegistry {
    fields: HashMap<FieldKey, FieldRecord>,
    choices: ChoiceRegistry,
    catalog: Arc<dyn LanguageCatalog>,
}

impl fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("fields", &self.fields.len())
            .field("choice_sets", &self.choices.len())
            .field("languages", &self.catalog.active_languages())
            .finish()
    }
}

impl FieldRegistry {
    /// Create an empty registry bound to a language catalog.
    pub fn new(catalog: Arc<dyn LanguageCatalog>) -> Self {
        Self {
            fields: HashMap::new(),
            choices: ChoiceRegistry::new(),
            catalog,
        }
    }

    /// Create a registry pre-loaded with the embedded core household and
    /// individual fields.
    pub fn with_core_fields(catalog: Arc<dyn LanguageCatalog>) -> RegistryResult<Self> {
        let mut registry = Self::new(catalog);
        for (name, choices) in embedded::core_choice_sets()? {
            registry.register_shared_choices(&name, &choices)?;
        }
        for (definition, shared_set) in embedded::core_fields()? {
            match shared_set {
                Some(set) => registry.register_with_shared_choices(definition, &set)?,
                None => registry.register(definition)?,
            };
        }
        info!("Loaded {} core field definitions", registry.len());
        Ok(registry)
    }

    pub fn catalog(&self) -> &dyn LanguageCatalog {
        self.catalog.as_ref()
    }

    pub fn choice_registry(&self) -> &ChoiceRegistry {
        &self.choices
    }

    /// Number of definitions, hidden ones included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str, association: Association) -> bool {
        self.fields.contains_key(&FieldKey::new(name, association))
    }

    /// Fetch one definition with labels and choices localized for the
    /// catalog's active languages.
    pub fn get(&self, name: &str, association: Association) -> RegistryResult<FieldDefinition> {
        self.record(name, association)
            .map(|record| self.materialize(record))
    }

    /// Whether a definition is visible (not deprecated).
    pub fn is_visible(&self, name: &str, association: Association) -> RegistryResult<bool> {
        self.record(name, association).map(|record| record.visible)
    }

    /// All visible definitions sorted by English label.
    pub fn list_all(&self) -> Vec<FieldDefinition> {
        self.list_where(|record| record.visible)
    }

    /// All definitions, deprecated ones included, sorted by English label.
    pub fn list_including_hidden(&self) -> Vec<FieldDefinition> {
        self.list_where(|_| true)
    }

    /// Visible definitions for one entity kind.
    pub fn fields_for(&self, association: Association) -> Vec<FieldDefinition> {
        self.list_where(|record| record.visible && record.association == association)
    }

    pub fn core_fields(&self) -> Vec<FieldDefinition> {
        self.list_where(|record| record.visible && !record.is_flex_field)
    }

    pub fn flex_fields(&self) -> Vec<FieldDefinition> {
        self.list_where(|record| record.visible && record.is_flex_field)
    }

    /// Insert or update a definition keyed by name and association.
    ///
    /// Registering an identical definition again changes nothing. Updates
    /// may change labels, hint and (for flex fields) the required flag, and
    /// may append choices. They may not change the type, move a field
    /// between core and flex, change a core field's required flag, or drop
    /// or reorder existing choice values.
    pub fn register(&mut self, definition: FieldDefinition) -> RegistryResult<RegisterOutcome> {
        self.register_inner(definition, None)
    }

    /// Register a choice field whose choice list is the named shared set.
    ///
    /// Any choices already on `definition` are ignored.
    pub fn register_with_shared_choices(
        &mut self,
        mut definition: FieldDefinition,
        set_name: &str,
    ) -> RegistryResult<RegisterOutcome> {
        let id = self
            .choices
            .shared(set_name)
            .ok_or_else(|| RegistryError::ChoiceSetNotFound(set_name.to_string()))?;
        if !definition.field_type().is_choice() {
            return Err(RegistryError::invalid(
                &definition.name,
                format!(
                    "{} fields cannot use choice set '{}'",
                    definition.field_type(),
                    set_name
                ),
            ));
        }
        let choices = self.choices.materialize(id, self.catalog.as_ref());
        if let Some(slot) = definition.kind.choices_mut() {
            *slot = choices;
        }
        self.register_inner(definition, Some(id))
    }

    /// Register or extend a named choice set other fields can reference.
    pub fn register_shared_choices(
        &mut self,
        name: &str,
        choices: &[Choice],
    ) -> RegistryResult<ChoiceSetId> {
        self.choices.register_shared(name, choices)
    }

    /// Append choices to an existing choice field. Values already present
    /// keep their position and labels.
    pub fn extend_choices(
        &mut self,
        name: &str,
        association: Association,
        choices: &[Choice],
    ) -> RegistryResult<()> {
        let key = FieldKey::new(name, association);
        let record = self
            .fields
            .get(&key)
            .ok_or_else(|| RegistryError::not_found(name, association))?;
        let Some(current) = record.kind.choice_set() else {
            return Err(RegistryError::conflict(
                name,
                association,
                format!("{} fields have no choices to extend", record.kind.field_type()),
            ));
        };
        for choice in choices {
            check_choice_value(name, &choice.value)?;
        }

        let updated = self.choices.append_for_field(current, choices)?;
        if let Some(record) = self.fields.get_mut(&key) {
            record.kind = record.kind.clone().with_choice_set(updated);
        }
        debug!("Extended choices of {}", key);
        Ok(())
    }

    /// Hide a definition from listings. It stays retrievable and valid as a
    /// validation target because persisted records may reference it.
    pub fn deprecate(&mut self, name: &str, association: Association) -> RegistryResult<()> {
        self.set_visible(name, association, false)
    }

    /// Undo [`deprecate`](Self::deprecate).
    pub fn restore(&mut self, name: &str, association: Association) -> RegistryResult<()> {
        self.set_visible(name, association, true)
    }

    /// Choices of a field as `(value, label)` pairs for one language.
    pub fn resolve_choices(
        &self,
        name: &str,
        association: Association,
        language: &str,
    ) -> RegistryResult<Vec<ResolvedChoice>> {
        let record = self.record(name, association)?;
        Ok(record
            .kind
            .choice_set()
            .map(|id| self.choices.resolve(id, language))
            .unwrap_or_default())
    }

    pub(crate) fn record(&self, name: &str, association: Association) -> RegistryResult<&FieldRecord> {
        self.fields
            .get(&FieldKey::new(name, association))
            .ok_or_else(|| RegistryError::not_found(name, association))
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &FieldRecord> {
        self.fields.values()
    }

    fn set_visible(
        &mut self,
        name: &str,
        association: Association,
        visible: bool,
    ) -> RegistryResult<()> {
        let record = self
            .fields
            .get_mut(&FieldKey::new(name, association))
            .ok_or_else(|| RegistryError::not_found(name, association))?;
        if record.visible != visible {
            record.visible = visible;
            info!(
                "Field {} ({}) is now {}",
                name,
                association,
                if visible { "visible" } else { "hidden" }
            );
        }
        Ok(())
    }

    pub(crate) fn list_where(&self, keep: impl Fn(&FieldRecord) -> bool) -> Vec<FieldDefinition> {
        let mut records: Vec<&FieldRecord> = self.fields.values().filter(|r| keep(r)).collect();
        sort_for_listing(&mut records);
        records
            .into_iter()
            .map(|record| self.materialize(record))
            .collect()
    }

    fn register_inner(
        &mut self,
        mut definition: FieldDefinition,
        shared_set: Option<ChoiceSetId>,
    ) -> RegistryResult<RegisterOutcome> {
        definition.validate_structure()?;
        let key = definition.key();

        let existing = self.fields.get(&key).cloned();
        if let Some(existing) = &existing {
            if let Err(err) = self.check_compatible(existing, &definition) {
                warn!("Rejected redefinition of {}: {}", key, err);
                return Err(err);
            }
            self.carry_inactive_labels(existing, &mut definition);
        }

        let kind = match &definition.kind {
            FieldKind::SelectOne(choices) | FieldKind::SelectMany(choices) => {
                let current = existing.as_ref().and_then(|r| r.kind.choice_set());
                let id = match (shared_set, current) {
                    (Some(id), _) => id,
                    (None, Some(current)) if self.choices.matches(current, choices) => current,
                    (None, _) => self.choices.intern(choices),
                };
                if definition.field_type() == FieldType::SelectOne {
                    StoredKind::SelectOne(id)
                } else {
                    StoredKind::SelectMany(id)
                }
            }
            scalar => StoredKind::Scalar(scalar.clone()),
        };

        let record = FieldRecord {
            name: definition.name,
            association: definition.associated_with,
            kind,
            is_flex_field: definition.is_flex_field,
            required: definition.required,
            hint: definition.hint,
            label_en: definition.label_en,
            translations: Translations::from(&definition.labels),
            visible: existing.as_ref().map(|r| r.visible).unwrap_or(true),
        };

        let outcome = match existing {
            Some(existing) if existing == record => return Ok(RegisterOutcome::Unchanged),
            Some(existing) => {
                self.swap_choice_users(existing.kind.choice_set(), record.kind.choice_set());
                info!("Updated field definition {}", key);
                RegisterOutcome::Updated
            }
            None => {
                self.swap_choice_users(None, record.kind.choice_set());
                info!(
                    "Registered {} field definition {}",
                    if record.is_flex_field { "flex" } else { "core" },
                    key
                );
                RegisterOutcome::Created
            }
        };
        self.fields.insert(key, record);
        Ok(outcome)
    }

    fn check_compatible(
        &self,
        existing: &FieldRecord,
        definition: &FieldDefinition,
    ) -> RegistryResult<()> {
        let conflict = |reason: String| {
            Err(RegistryError::conflict(
                &existing.name,
                existing.association,
                reason,
            ))
        };

        if existing.kind.field_type() != definition.field_type() {
            return conflict(format!(
                "type cannot change from {} to {}",
                existing.kind.field_type(),
                definition.field_type()
            ));
        }
        if existing.is_flex_field != definition.is_flex_field {
            return conflict("a field cannot move between core and flex".to_string());
        }
        if !existing.is_flex_field && existing.required != definition.required {
            return conflict("required flag of a core field cannot change".to_string());
        }
        if let Some(current) = existing.kind.choice_set() {
            if !self.choices.is_extended_by(current, definition.choices()) {
                return conflict("choice values cannot be removed or reordered".to_string());
            }
        }
        Ok(())
    }

    /// Keep stored translations for languages the catalog does not currently
    /// expose; an update built from a localized read cannot mention them.
    fn carry_inactive_labels(&self, existing: &FieldRecord, definition: &mut FieldDefinition) {
        let active = self.catalog.active_languages();
        let hidden = |language: &str| !active.iter().any(|code| code == language);

        definition.labels = carry_over(&definition.labels, &existing.translations, &hidden);
        if let (Some(id), Some(choices)) = (existing.kind.choice_set(), definition.kind.choices_mut())
        {
            for choice in choices.iter_mut() {
                if let Some(stored) = self.choices.translations(id, &choice.value) {
                    choice.labels = carry_over(&choice.labels, stored, &hidden);
                }
            }
        }
    }

    fn swap_choice_users(&mut self, old: Option<ChoiceSetId>, new: Option<ChoiceSetId>) {
        if old == new {
            return;
        }
        if let Some(old) = old {
            self.choices.release(old);
        }
        if let Some(new) = new {
            self.choices.retain(new);
        }
    }

    fn materialize(&self, record: &FieldRecord) -> FieldDefinition {
        let catalog = self.catalog.as_ref();
        let kind = match &record.kind {
            StoredKind::Scalar(kind) => kind.clone(),
            StoredKind::SelectOne(id) => FieldKind::SelectOne(self.choices.materialize(*id, catalog)),
            StoredKind::SelectMany(id) => {
                FieldKind::SelectMany(self.choices.materialize(*id, catalog))
            }
        };
        FieldDefinition {
            name: record.name.clone(),
            kind,
            associated_with: record.association,
            is_flex_field: record.is_flex_field,
            required: record.required,
            hint: record.hint.clone(),
            label_en: record.label_en.clone(),
            labels: record.translations.localize(catalog),
        }
    }
}

fn carry_over(labels: &Labels, stored: &Translations, hidden: &impl Fn(&str) -> bool) -> Labels {
    let mut merged = labels.clone();
    for (language, label) in stored.iter() {
        if hidden(language) && labels.get(language).is_none() {
            merged = merged.with(language, label);
        }
    }
    merged
}

/// Presentation order: English label (ordinal), then name, then association.
pub(crate) fn sort_for_listing(records: &mut [&FieldRecord]) {
    records.sort_by(|a, b| {
        a.label_en
            .cmp(&b.label_en)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.association.cmp(&b.association))
    });
}
