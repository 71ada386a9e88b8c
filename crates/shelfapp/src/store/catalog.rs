use super::backend::StorageBackend;
use super::keys;
use crate::error::{Result, ShelfError};
use crate::model::{normalize_product_name, Category, CategoryRule, ShoppingHistoryItem};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

/// In-memory catalog of categories, rules and the purchase ledger.
///
/// The maps are authoritative; every mutating command finishes by writing the
/// affected document back through the backend as one value, so a reader
/// never observes a half-updated tree.
pub struct Catalog<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    pub(crate) categories: BTreeMap<String, Category>,
    /// Kept in insertion order; rule evaluation relies on it for tie-breaking.
    pub(crate) rules: Vec<CategoryRule>,
    pub(crate) history: BTreeMap<String, ShoppingHistoryItem>,
}

impl<B: StorageBackend> Catalog<B> {
    /// An empty catalog. Nothing is read from the backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            categories: BTreeMap::new(),
            rules: Vec::new(),
            history: BTreeMap::new(),
        }
    }

    /// Load every document from the backend.
    pub fn open(backend: B) -> Result<Self> {
        let mut catalog = Self::with_backend(backend);
        catalog.reload()?;
        Ok(catalog)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Discard in-memory categories and re-read them from storage.
    pub fn reload_categories(&mut self) -> Result<()> {
        self.categories = self.load(keys::CATEGORIES)?.unwrap_or_default();
        tracing::debug!(count = self.categories.len(), "reloaded categories");
        Ok(())
    }

    /// Re-read categories, rules and the ledger.
    pub fn reload(&mut self) -> Result<()> {
        self.reload_categories()?;
        self.rules = self.load(keys::RULES)?.unwrap_or_default();
        self.history = self.load(keys::HISTORY)?.unwrap_or_default();
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get_item(key)? {
            Some(raw) if !raw.trim().is_empty() => {
                let value = serde_json::from_str(&raw).map_err(ShelfError::Serialization)?;
                Ok(Some(value))
            }
            _ => Ok(None),
        }
    }

    // --- Categories ---

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    pub fn require(&self, id: &str) -> Result<&Category> {
        self.categories
            .get(id)
            .ok_or_else(|| ShelfError::CategoryNotFound(id.to_string()))
    }

    pub(crate) fn require_mut(&mut self, id: &str) -> Result<&mut Category> {
        self.categories
            .get_mut(id)
            .ok_or_else(|| ShelfError::CategoryNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.categories.contains_key(id)
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn active_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values().filter(|c| c.is_active())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    // --- Rules ---

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn rule(&self, id: &str) -> Option<&CategoryRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub(crate) fn rule_mut(&mut self, id: &str) -> Result<&mut CategoryRule> {
        self.rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ShelfError::RuleNotFound(id.to_string()))
    }

    // --- Ledger ---

    pub fn history(&self) -> impl Iterator<Item = &ShoppingHistoryItem> {
        self.history.values()
    }

    /// Ledger entry for a product name (normalized before lookup).
    pub fn history_entry(&self, product_name: &str) -> Option<&ShoppingHistoryItem> {
        self.history.get(&normalize_product_name(product_name))
    }

    // --- Persistence ---

    /// Serialized form of the category document, as written to storage.
    pub fn categories_snapshot(&self) -> Result<String> {
        serde_json::to_string(&self.categories).map_err(ShelfError::Serialization)
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(ShelfError::Serialization)?;
        self.backend.set_item(key, &raw)
    }

    /// Persist after a mutation. Failures are logged, the in-memory state stays.
    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.write(key, value) {
            tracing::error!(key, error = %e, "failed to persist; in-memory state kept");
        }
    }

    pub(crate) fn persist_categories(&self) {
        self.persist(keys::CATEGORIES, &self.categories);
    }

    pub(crate) fn persist_rules(&self) {
        self.persist(keys::RULES, &self.rules);
    }

    pub(crate) fn persist_history(&self) {
        self.persist(keys::HISTORY, &self.history);
    }

    /// Write every document, returning the first failure.
    ///
    /// Mutating commands swallow persistence errors; callers that need to know
    /// the data reached storage call this afterwards.
    pub fn save_all(&self) -> Result<()> {
        self.write(keys::CATEGORIES, &self.categories)?;
        self.write(keys::RULES, &self.rules)?;
        self.write(keys::HISTORY, &self.history)?;
        Ok(())
    }
}
