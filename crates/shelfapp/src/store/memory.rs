use super::catalog::Catalog;
use super::mem_backend::MemBackend;

pub type InMemoryCatalog = Catalog<MemBackend>;

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Catalog::with_backend(MemBackend::new())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::commands::{create, purchases};
    use crate::model::CategoryDraft;

    /// Builder for a populated in-memory catalog.
    ///
    /// Ids of created categories are recorded by name for easy lookup.
    pub struct CatalogFixture {
        pub catalog: InMemoryCatalog,
        pub ids: std::collections::HashMap<String, String>,
    }

    impl Default for CatalogFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl CatalogFixture {
        pub fn new() -> Self {
            Self {
                catalog: InMemoryCatalog::new(),
                ids: std::collections::HashMap::new(),
            }
        }

        pub fn with_root(mut self, name: &str) -> Self {
            let cat = create::run(&mut self.catalog, CategoryDraft::new(name)).unwrap();
            self.ids.insert(name.to_string(), cat.id);
            self
        }

        pub fn with_child(mut self, name: &str, parent: &str) -> Self {
            let parent_id = self.id(parent);
            let cat = create::run(
                &mut self.catalog,
                CategoryDraft::new(name).with_parent(parent_id),
            )
            .unwrap();
            self.ids.insert(name.to_string(), cat.id);
            self
        }

        pub fn with_purchase(mut self, product: &str, category: Option<&str>) -> Self {
            let category_id = category.map(|name| self.id(name));
            purchases::add(&mut self.catalog, product, category_id.as_deref()).unwrap();
            self
        }

        pub fn id(&self, name: &str) -> String {
            self.ids
                .get(name)
                .cloned()
                .unwrap_or_else(|| panic!("fixture has no category named {}", name))
        }
    }
}
