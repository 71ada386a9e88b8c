//! # API Facade
//!
//! [`ShelfApi`] is the single entry point for clients. Each method forwards to a
//! command in [`crate::commands`]; the facade adds no logic of its own beyond
//! filling defaults from [`ShelfConfig`].
//!
//! ## Generic Over the Backend
//!
//! - Production: `ShelfApi<FsBackend>`
//! - Testing: `ShelfApi<MemBackend>`
//!
//! The facade owns the catalog. There is exactly one per process, created at
//! start-up and passed to whoever needs it.

use crate::commands::{
    self,
    export::ExportOptions,
    import::{ImportOptions, ImportReport},
    rules::RuleDraft,
    suggest::CategorySuggestion,
    template::{CategoryTemplate, TemplateImportOptions, TemplateOptions},
};
use crate::config::ShelfConfig;
use crate::error::{Result, ShelfError};
use crate::model::{
    Category, CategoryDraft, CategoryRule, CategoryUpdate, Permissions, Seasonality,
    ShoppingHistoryItem,
};
use crate::store::{Catalog, StorageBackend};

pub struct ShelfApi<B: StorageBackend> {
    catalog: Catalog<B>,
    config: ShelfConfig,
}

impl<B: StorageBackend> ShelfApi<B> {
    pub fn new(catalog: Catalog<B>, config: ShelfConfig) -> Self {
        Self { catalog, config }
    }

    /// Load the catalog from `backend`.
    pub fn open(backend: B, config: ShelfConfig) -> Result<Self> {
        Ok(Self::new(Catalog::open(backend)?, config))
    }

    pub fn catalog(&self) -> &Catalog<B> {
        &self.catalog
    }

    pub fn config(&self) -> &ShelfConfig {
        &self.config
    }

    /// Re-attempt persisting every document.
    pub fn save(&self) -> Result<()> {
        self.catalog.save_all()
    }

    // --- Taxonomy ---

    pub fn create_category(&mut self, draft: CategoryDraft) -> Result<Category> {
        commands::create::run(&mut self.catalog, draft)
    }

    pub fn get_category(&self, id: &str) -> Result<&Category> {
        self.catalog.require(id)
    }

    pub fn list_categories(&self, include_archived: bool) -> Vec<&Category> {
        self.catalog
            .categories()
            .filter(|c| include_archived || c.is_active())
            .collect()
    }

    pub fn update_category(&mut self, id: &str, update: CategoryUpdate) -> Result<Category> {
        commands::update::run(&mut self.catalog, id, update)
    }

    pub fn set_permissions(&mut self, id: &str, permissions: Permissions) -> Result<Category> {
        commands::update::permissions(&mut self.catalog, id, permissions)
    }

    pub fn move_category(&mut self, id: &str, new_parent: Option<&str>) -> Result<Category> {
        commands::move_category::run(&mut self.catalog, id, new_parent)
    }

    /// Archive `id` and its subtree. Returns the ids that changed status.
    pub fn archive_category(&mut self, id: &str) -> Result<Vec<String>> {
        commands::archive::run(&mut self.catalog, id)
    }

    pub fn unarchive_category(&mut self, id: &str) -> Result<bool> {
        commands::archive::unarchive(&mut self.catalog, id)
    }

    pub fn children(&self, id: &str) -> Result<Vec<&Category>> {
        let cat = self.catalog.require(id)?;
        Ok(cat
            .sub_categories
            .iter()
            .filter_map(|child| self.catalog.category(child))
            .collect())
    }

    pub fn descendants(&self, id: &str) -> Result<Vec<&Category>> {
        self.catalog.require(id)?;
        Ok(
            commands::helpers::descendant_ids(&self.catalog.categories, id)
                .iter()
                .filter_map(|d| self.catalog.category(d))
                .collect(),
        )
    }

    /// Ancestors, root first.
    pub fn ancestors(&self, id: &str) -> Result<Vec<&Category>> {
        self.catalog.require(id)?;
        Ok(
            commands::helpers::ancestor_ids(&self.catalog.categories, id)
                .iter()
                .filter_map(|a| self.catalog.category(a))
                .collect(),
        )
    }

    pub fn reload_categories(&mut self) -> Result<()> {
        self.catalog.reload_categories()
    }

    // --- Rules ---

    pub fn add_rule(&mut self, draft: RuleDraft) -> Result<CategoryRule> {
        commands::rules::add(&mut self.catalog, draft)
    }

    pub fn list_rules(&self) -> &[CategoryRule] {
        self.catalog.rules()
    }

    pub fn test_rule(&self, text: &str, rule_id: &str) -> Result<bool> {
        let rule = self
            .catalog
            .rule(rule_id)
            .ok_or_else(|| ShelfError::RuleNotFound(rule_id.to_string()))?;
        Ok(commands::rules::test_rule(text, rule))
    }

    pub fn find_matching_category(&self, text: &str) -> Option<&Category> {
        commands::rules::find_matching_category(&self.catalog, text)
    }

    pub fn assign_rule(&mut self, category_id: &str, rule_id: &str) -> Result<Category> {
        commands::rules::assign(&mut self.catalog, category_id, rule_id)
    }

    pub fn unassign_rule(&mut self, category_id: &str, rule_id: &str) -> Result<Category> {
        commands::rules::unassign(&mut self.catalog, category_id, rule_id)
    }

    pub fn set_rule_active(&mut self, rule_id: &str, active: bool) -> Result<CategoryRule> {
        commands::rules::set_active(&mut self.catalog, rule_id, active)
    }

    // --- Ledger & suggestions ---

    pub fn add_purchase(
        &mut self,
        product_name: &str,
        category_id: Option<&str>,
    ) -> Result<ShoppingHistoryItem> {
        commands::purchases::add(&mut self.catalog, product_name, category_id)
    }

    pub fn set_seasonality(
        &mut self,
        product_name: &str,
        weights: Seasonality,
    ) -> Result<ShoppingHistoryItem> {
        commands::purchases::set_seasonality(&mut self.catalog, product_name, weights)
    }

    pub fn history(&self) -> Vec<&ShoppingHistoryItem> {
        self.catalog.history().collect()
    }

    pub fn suggest_category(&self, product_name: &str) -> Option<CategorySuggestion> {
        commands::suggest::run(&self.catalog, product_name)
    }

    // --- Transport ---

    pub fn export_categories(&self, options: &ExportOptions) -> Result<String> {
        commands::export::run(&self.catalog, options)
    }

    pub fn import_categories(
        &mut self,
        data: &str,
        options: &ImportOptions,
    ) -> Result<ImportReport> {
        commands::import::run(&mut self.catalog, data, options)
    }

    pub fn export_template(
        &self,
        category_ids: &[String],
        options: &TemplateOptions,
    ) -> Result<CategoryTemplate> {
        commands::template::export(&self.catalog, category_ids, options)
    }

    /// Import a template document. `None` takes languages from the config.
    pub fn import_template(
        &mut self,
        data: &str,
        options: Option<TemplateImportOptions>,
    ) -> Result<ImportReport> {
        let template = commands::template::parse(data)?;
        let options = options.unwrap_or_else(|| self.config.template_import_options());
        commands::template::import(&mut self.catalog, &template, &options)
    }
}
