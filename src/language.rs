//! Language catalog contract and localized label containers.
//!
//! The catalog is the source of truth for which label slots a field or choice
//! must expose. Translations are stored sparsely as [`Translations`] and
//! expanded into complete, catalog-ordered [`Labels`] at read time, so a
//! language without a translation yields an empty string instead of a missing
//! entry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only view of the deployment's display languages.
pub trait LanguageCatalog: Send + Sync {
    /// Ordered list of active language codes.
    fn active_languages(&self) -> Vec<String>;

    /// Display name for a language code. Unknown codes render as the code itself.
    fn display_name(&self, code: &str) -> String;
}

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Catalog backed by a fixed, ordered list of languages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticLanguageCatalog {
    languages: Vec<Language>,
}

impl StaticLanguageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with English as the only active language.
    pub fn english_only() -> Self {
        Self::new().with_language("English(EN)", "English")
    }

    /// Append an active language. Re-adding an existing code updates its name in place.
    pub fn with_language(self, code: impl Into<String>, name: impl Into<String>) -> Self {
        self.upsert(code.into(), name.into(), true)
    }

    /// Append a language that is known but not active. Re-adding an existing
    /// code updates its name and deactivates it.
    pub fn with_inactive_language(
        self,
        code: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.upsert(code.into(), name.into(), false)
    }

    fn upsert(mut self, code: String, name: String, active: bool) -> Self {
        match self.languages.iter_mut().find(|lang| lang.code == code) {
            Some(existing) => {
                existing.name = name;
                existing.active = active;
            }
            None => self.languages.push(Language { code, name, active }),
        }
        self
    }

    /// Toggle a language's active flag. Returns false if the code is unknown.
    pub fn set_active(&mut self, code: &str, active: bool) -> bool {
        match self.languages.iter_mut().find(|lang| lang.code == code) {
            Some(lang) => {
                lang.active = active;
                true
            }
            None => false,
        }
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }
}

impl LanguageCatalog for StaticLanguageCatalog {
    fn active_languages(&self) -> Vec<String> {
        self.languages
            .iter()
            .filter(|lang| lang.active)
            .map(|lang| lang.code.clone())
            .collect()
    }

    fn display_name(&self, code: &str) -> String {
        self.languages
            .iter()
            .find(|lang| lang.code == code)
            .map(|lang| lang.name.clone())
            .unwrap_or_else(|| code.to_string())
    }
}

/// One `{language, label}` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub language: String,
    pub label: String,
}

impl LabelEntry {
    pub fn new(language: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            label: label.into(),
        }
    }
}

/// Ordered `{language, label}` list.
///
/// When produced by [`Translations::localize`] it holds exactly one entry per
/// active language, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(Vec<LabelEntry>);

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, language: impl Into<String>, label: impl Into<String>) -> Self {
        self.0.push(LabelEntry::new(language, label));
        self
    }

    /// Label for a language; `None` when the list has no slot for it.
    pub fn get(&self, language: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|entry| entry.language == language)
            .map(|entry| entry.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Language codes in slot order.
    pub fn languages(&self) -> Vec<&str> {
        self.0.iter().map(|entry| entry.language.as_str()).collect()
    }

    /// Whether the slots match the catalog's active languages exactly, order included.
    pub fn is_complete_for(&self, catalog: &dyn LanguageCatalog) -> bool {
        let active = catalog.active_languages();
        self.0.len() == active.len()
            && self
                .0
                .iter()
                .zip(active.iter())
                .all(|(entry, code)| &entry.language == code)
    }
}

impl From<Vec<LabelEntry>> for Labels {
    fn from(entries: Vec<LabelEntry>) -> Self {
        Self(entries)
    }
}

impl<'a> IntoIterator for &'a Labels {
    type Item = &'a LabelEntry;
    type IntoIter = std::slice::Iter<'a, LabelEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Sparse language -> label storage. Empty labels are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translations(BTreeMap<String, String>);

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, language: impl Into<String>, label: impl Into<String>) -> Self {
        self.insert(language, label);
        self
    }

    /// Insert or replace a translation. An empty label removes the entry.
    pub fn insert(&mut self, language: impl Into<String>, label: impl Into<String>) {
        let language = language.into();
        let label = label.into();
        if label.is_empty() {
            self.0.remove(&language);
        } else {
            self.0.insert(language, label);
        }
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    /// `(language, label)` pairs ordered by language code.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Expand into one slot per active language, in catalog order.
    pub fn localize(&self, catalog: &dyn LanguageCatalog) -> Labels {
        catalog
            .active_languages()
            .into_iter()
            .map(|language| {
                let label = self.0.get(&language).cloned().unwrap_or_default();
                LabelEntry { language, label }
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// Label for `language`, or `fallback` when no translation exists.
    pub fn resolve<'a>(&'a self, language: &str, fallback: &'a str) -> &'a str {
        self.get(language).unwrap_or(fallback)
    }
}

impl From<&Labels> for Translations {
    fn from(labels: &Labels) -> Self {
        let mut translations = Translations::new();
        for entry in labels {
            translations.insert(entry.language.clone(), entry.label.clone());
        }
        translations
    }
}
