use crate::error::{Result, ShelfError};
use crate::model::{default_category_color, Category, CategoryDraft};
use crate::store::{Catalog, StorageBackend};

use super::helpers::dedup_tags;

pub fn run<B: StorageBackend>(catalog: &mut Catalog<B>, draft: CategoryDraft) -> Result<Category> {
    let category = insert(catalog, draft)?;
    catalog.persist_categories();
    tracing::debug!(id = %category.id, name = %category.name, level = category.level, "created category");
    Ok(category)
}

/// Create without persisting. Bulk callers persist once at the end.
pub(crate) fn insert<B: StorageBackend>(
    catalog: &mut Catalog<B>,
    draft: CategoryDraft,
) -> Result<Category> {
    let name = draft.name.trim().to_string();
    if name.is_empty() {
        return Err(ShelfError::InvalidInput(
            "Category name must not be empty".to_string(),
        ));
    }

    // Parent must exist; its path seeds ours
    let path = match &draft.parent_category {
        Some(parent_id) => {
            let parent = catalog.require(parent_id)?;
            let mut path = parent.path.clone();
            path.push(parent.id.clone());
            path
        }
        None => Vec::new(),
    };

    let mut category = Category::new(name);
    category.color = draft
        .color
        .unwrap_or_else(|| default_category_color(&category.name));
    category.icon = draft.icon;
    category.parent_category = draft.parent_category;
    category.level = path.len();
    category.path = path;
    category.tags = dedup_tags(draft.tags);
    category.metadata.description = draft.description;
    category.permissions = draft.permissions.unwrap_or_default();
    if category.permissions.owner.is_empty() {
        category.permissions.owner = draft.created_by.clone();
    }
    category.modified_by = draft.created_by.clone();
    category.created_by = draft.created_by;

    if let Some(parent_id) = &category.parent_category {
        let parent = catalog.require_mut(parent_id)?;
        parent.sub_categories.push(category.id.clone());
    }

    catalog
        .categories
        .insert(category.id.clone(), category.clone());
    Ok(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CategoryStatus;
    use crate::store::memory::InMemoryCatalog;

    #[test]
    fn test_create_root() {
        let mut catalog = InMemoryCatalog::new();
        let cat = run(&mut catalog, CategoryDraft::new("Lebensmittel")).unwrap();

        assert_eq!(cat.level, 0);
        assert!(cat.path.is_empty());
        assert_eq!(cat.status, CategoryStatus::Active);
        assert!(!cat.color.is_empty());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_create_child_copies_parent_path() {
        let mut catalog = InMemoryCatalog::new();
        let root = run(&mut catalog, CategoryDraft::new("Lebensmittel")).unwrap();
        let child = run(
            &mut catalog,
            CategoryDraft::new("Milchprodukte").with_parent(&root.id),
        )
        .unwrap();
        let grandchild = run(
            &mut catalog,
            CategoryDraft::new("Käse").with_parent(&child.id),
        )
        .unwrap();

        assert_eq!(child.path, vec![root.id.clone()]);
        assert_eq!(child.level, 1);
        assert_eq!(grandchild.path, vec![root.id.clone(), child.id.clone()]);
        assert_eq!(grandchild.level, 2);

        let root_after = catalog.require(&root.id).unwrap();
        assert_eq!(root_after.sub_categories, vec![child.id.clone()]);
    }

    #[test]
    fn test_create_with_missing_parent_fails() {
        let mut catalog = InMemoryCatalog::new();
        let res = run(&mut catalog, CategoryDraft::new("Waise").with_parent("ghost"));

        match res {
            Err(ShelfError::CategoryNotFound(id)) => assert_eq!(id, "ghost"),
            other => panic!("Expected CategoryNotFound, got {:?}", other),
        }
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let mut catalog = InMemoryCatalog::new();
        assert!(run(&mut catalog, CategoryDraft::new("   ")).is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_create_keeps_explicit_fields() {
        let mut catalog = InMemoryCatalog::new();
        let cat = run(
            &mut catalog,
            CategoryDraft::new("Getränke")
                .with_color("#123456")
                .with_icon("cup")
                .with_tags(["flüssig", "kalt"])
                .with_description("Alles zum Trinken")
                .created_by("anna"),
        )
        .unwrap();

        assert_eq!(cat.color, "#123456");
        assert_eq!(cat.icon.as_deref(), Some("cup"));
        assert_eq!(cat.tags, vec!["flüssig", "kalt"]);
        assert_eq!(cat.metadata.description, "Alles zum Trinken");
        assert_eq!(cat.created_by, "anna");
        assert_eq!(cat.permissions.owner, "anna");
    }

    #[test]
    fn test_create_persists() {
        let mut catalog = InMemoryCatalog::new();
        let cat = run(&mut catalog, CategoryDraft::new("Obst")).unwrap();

        catalog.reload_categories().unwrap();
        assert!(catalog.contains(&cat.id));
    }
}
