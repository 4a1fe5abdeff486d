//! Choice registry: shared, append-only option lists.
//!
//! Choice lists live in an arena and fields hold a [`ChoiceSetId`] into it.
//! Identical lists (same values, English labels and translations, same order)
//! are stored once, so the many fields sharing e.g. a Yes/No/Not-applicable
//! scale cannot drift apart. Sets may also be registered under a name and
//! referenced explicitly.
//!
//! Extending a set only ever appends. A set with more than one user is forked
//! before a per-field extension so sibling fields keep their list.

use super::types::{Choice, check_choice_value};
use crate::error::{RegistryError, RegistryResult};
use crate::language::{LanguageCatalog, Translations};
use log::{debug, trace};
use std::collections::HashMap;

/// Index of a choice set in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChoiceSetId(usize);

impl ChoiceSetId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StoredChoice {
    value: String,
    label_en: String,
    translations: Translations,
}

impl From<&Choice> for StoredChoice {
    fn from(choice: &Choice) -> Self {
        Self {
            value: choice.value.clone(),
            label_en: choice.label_en.clone(),
            translations: Translations::from(&choice.labels),
        }
    }
}

/// An ordered list of choices stored in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSet {
    name: Option<String>,
    choices: Vec<StoredChoice>,
    users: usize,
}

impl ChoiceSet {
    /// Shared set name, if registered explicitly.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Choice values in configured order.
    pub fn values(&self) -> Vec<&str> {
        self.choices.iter().map(|c| c.value.as_str()).collect()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.choices.iter().any(|c| c.value == value)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Number of field definitions referencing this set.
    pub fn users(&self) -> usize {
        self.users
    }

    fn same_content(&self, choices: &[StoredChoice]) -> bool {
        self.choices == choices
    }
}

/// A choice resolved for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChoice {
    pub value: String,
    pub label: String,
}

/// Arena of choice sets.
#[derive(Debug, Clone, Default)]
pub struct ChoiceRegistry {
    sets: Vec<ChoiceSet>,
    by_name: HashMap<String, ChoiceSetId>,
}

impl ChoiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ChoiceSetId) -> Option<&ChoiceSet> {
        self.sets.get(id.0)
    }

    /// Look up a named shared set.
    pub fn shared(&self, name: &str) -> Option<ChoiceSetId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Register or extend a named shared set.
    ///
    /// Re-registering with the same list is a no-op. A longer list whose
    /// prefix is the existing list appends the new values; anything that would
    /// drop or reorder existing values is rejected.
    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        choices: &[Choice],
    ) -> RegistryResult<ChoiceSetId> {
        let name = name.into();
        for choice in choices {
            check_choice_value(&name, &choice.value)?;
        }
        let stored: Vec<StoredChoice> = choices.iter().map(StoredChoice::from).collect();

        if let Some(id) = self.shared(&name) {
            let set = &mut self.sets[id.0];
            if !values_extend(&set.choices, &stored) {
                return Err(RegistryError::invalid(
                    name,
                    "shared choice set update would drop or reorder existing values",
                ));
            }
            let added = append_new(&mut set.choices, stored);
            debug!("Extended shared choice set '{}' with {} values", name, added);
            return Ok(id);
        }

        let id = ChoiceSetId(self.sets.len());
        self.sets.push(ChoiceSet {
            name: Some(name.clone()),
            choices: stored,
            users: 0,
        });
        self.by_name.insert(name.clone(), id);
        debug!("Registered shared choice set '{}' as {:?}", name, id);
        Ok(id)
    }

    /// Store a choice list, reusing an unnamed set with identical content.
    ///
    /// Named sets are only ever bound explicitly, so a field with its own list
    /// never follows later extensions of a shared set. When nothing matches,
    /// the slot of an unnamed set no field references any more is recycled.
    pub(crate) fn intern(&mut self, choices: &[Choice]) -> ChoiceSetId {
        let stored: Vec<StoredChoice> = choices.iter().map(StoredChoice::from).collect();
        if let Some(index) = self
            .sets
            .iter()
            .position(|set| set.name.is_none() && set.same_content(&stored))
        {
            trace!("Reusing choice set {} for {} values", index, stored.len());
            return ChoiceSetId(index);
        }
        if let Some(index) = self
            .sets
            .iter()
            .position(|set| set.name.is_none() && set.users == 0)
        {
            trace!("Recycling orphaned choice set {}", index);
            self.sets[index].choices = stored;
            return ChoiceSetId(index);
        }
        let id = ChoiceSetId(self.sets.len());
        self.sets.push(ChoiceSet {
            name: None,
            choices: stored,
            users: 0,
        });
        id
    }

    pub(crate) fn retain(&mut self, id: ChoiceSetId) {
        if let Some(set) = self.sets.get_mut(id.0) {
            set.users += 1;
        }
    }

    pub(crate) fn release(&mut self, id: ChoiceSetId) {
        if let Some(set) = self.sets.get_mut(id.0) {
            set.users = set.users.saturating_sub(1);
        }
    }

    /// Whether set `id` holds exactly `choices`, labels included.
    pub(crate) fn matches(&self, id: ChoiceSetId, choices: &[Choice]) -> bool {
        let stored: Vec<StoredChoice> = choices.iter().map(StoredChoice::from).collect();
        self.get(id).is_some_and(|set| set.same_content(&stored))
    }

    /// Stored translations of one choice.
    pub(crate) fn translations(&self, id: ChoiceSetId, value: &str) -> Option<&Translations> {
        self.get(id)?
            .choices
            .iter()
            .find(|c| c.value == value)
            .map(|c| &c.translations)
    }

    /// Whether `new` keeps every value of set `id` in place.
    pub(crate) fn is_extended_by(&self, id: ChoiceSetId, new: &[Choice]) -> bool {
        let stored: Vec<StoredChoice> = new.iter().map(StoredChoice::from).collect();
        self.get(id)
            .map(|set| values_extend(&set.choices, &stored))
            .unwrap_or(false)
    }

    /// Append choices to the set used by one field, forking it first if
    /// other users or a shared name depend on it. Values already present are
    /// left untouched. Returns the id the field should reference afterwards.
    pub(crate) fn append_for_field(
        &mut self,
        id: ChoiceSetId,
        choices: &[Choice],
    ) -> RegistryResult<ChoiceSetId> {
        let set = self
            .sets
            .get(id.0)
            .ok_or_else(|| RegistryError::ChoiceSetNotFound(format!("{:?}", id)))?;

        let stored: Vec<StoredChoice> = choices
            .iter()
            .map(StoredChoice::from)
            .filter(|c| !set.contains(&c.value))
            .collect();
        if stored.is_empty() {
            return Ok(id);
        }

        let target = if set.users > 1 || set.name.is_some() {
            let forked = ChoiceSet {
                name: None,
                choices: set.choices.clone(),
                users: 1,
            };
            self.release(id);
            self.sets.push(forked);
            let forked_id = ChoiceSetId(self.sets.len() - 1);
            debug!("Forked choice set {:?} into {:?} before extension", id, forked_id);
            forked_id
        } else {
            id
        };

        let added = append_new(&mut self.sets[target.0].choices, stored);
        trace!("Appended {} choices to {:?}", added, target);
        Ok(target)
    }

    /// Choices of a set with labels expanded for every active language.
    pub fn materialize(&self, id: ChoiceSetId, catalog: &dyn LanguageCatalog) -> Vec<Choice> {
        self.get(id)
            .map(|set| {
                set.choices
                    .iter()
                    .map(|c| Choice {
                        value: c.value.clone(),
                        label_en: c.label_en.clone(),
                        labels: c.translations.localize(catalog),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `(value, label)` pairs in configured order, falling back to the
    /// English label when no translation exists for `language`.
    pub fn resolve(&self, id: ChoiceSetId, language: &str) -> Vec<ResolvedChoice> {
        self.get(id)
            .map(|set| {
                set.choices
                    .iter()
                    .map(|c| ResolvedChoice {
                        value: c.value.clone(),
                        label: c.translations.resolve(language, &c.label_en).to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// True when `new` starts with exactly the values of `existing`, in order.
fn values_extend(existing: &[StoredChoice], new: &[StoredChoice]) -> bool {
    existing.len() <= new.len()
        && existing
            .iter()
            .zip(new.iter())
            .all(|(old, new)| old.value == new.value)
}

fn append_new(target: &mut Vec<StoredChoice>, new: Vec<StoredChoice>) -> usize {
    let mut added = 0;
    for choice in new {
        if !target.iter().any(|c| c.value == choice.value) {
            target.push(choice);
            added += 1;
        }
    }
    added
}
