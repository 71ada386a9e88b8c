use crate::error::{Result, ShelfError};
use crate::model::{Category, CategoryUpdate, Permissions};
use crate::store::{Catalog, StorageBackend};

use super::helpers::dedup_tags;

/// Apply a field edit. Hierarchy fields are not editable here; use `move_category`.
pub fn run<B: StorageBackend>(
    catalog: &mut Catalog<B>,
    id: &str,
    update: CategoryUpdate,
) -> Result<Category> {
    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(ShelfError::InvalidInput(
                "Category name must not be empty".to_string(),
            ));
        }
    }

    let cat = catalog.require_mut(id)?;
    if let Some(name) = update.name {
        cat.name = name.trim().to_string();
    }
    if let Some(color) = update.color {
        cat.color = color;
    }
    if let Some(icon) = update.icon {
        cat.icon = icon;
    }
    if let Some(tags) = update.tags {
        cat.tags = dedup_tags(tags);
    }
    if let Some(description) = update.description {
        cat.metadata.description = description;
    }
    if let Some(fields) = update.custom_fields {
        cat.metadata.custom_fields = fields;
    }
    if let Some(translations) = update.translations {
        cat.metadata.translations = translations;
    }
    if let Some(user) = update.modified_by {
        cat.modified_by = user;
    }
    cat.touch();
    let updated = cat.clone();

    catalog.persist_categories();
    tracing::debug!(id, "updated category");
    Ok(updated)
}

/// Replace the permissions object wholesale.
pub fn permissions<B: StorageBackend>(
    catalog: &mut Catalog<B>,
    id: &str,
    permissions: Permissions,
) -> Result<Category> {
    let cat = catalog.require_mut(id)?;
    cat.permissions = permissions;
    cat.touch();
    let updated = cat.clone();

    catalog.persist_categories();
    tracing::debug!(id, "replaced category permissions");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use crate::store::memory::fixtures::CatalogFixture;

    #[test]
    fn test_update_fields() {
        let mut f = CatalogFixture::new().with_root("Obst");
        let id = f.id("Obst");
        let before = f.catalog.require(&id).unwrap().last_modified;

        let updated = run(
            &mut f.catalog,
            &id,
            CategoryUpdate {
                name: Some(" Obst & Gemüse ".into()),
                icon: Some(Some("apple".into())),
                tags: Some(vec!["frisch".into(), "frisch".into(), "bio".into()]),
                modified_by: Some("ben".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.name, "Obst & Gemüse");
        assert_eq!(updated.icon.as_deref(), Some("apple"));
        assert_eq!(updated.tags, vec!["frisch", "bio"]);
        assert_eq!(updated.modified_by, "ben");
        assert!(updated.last_modified >= before);
    }

    #[test]
    fn test_update_clears_icon() {
        let mut f = CatalogFixture::new().with_root("Obst");
        let id = f.id("Obst");
        run(
            &mut f.catalog,
            &id,
            CategoryUpdate {
                icon: Some(Some("apple".into())),
                ..Default::default()
            },
        )
        .unwrap();

        let updated = run(
            &mut f.catalog,
            &id,
            CategoryUpdate {
                icon: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(updated.icon.is_none());
    }

    #[test]
    fn test_update_rejects_empty_name() {
        let mut f = CatalogFixture::new().with_root("Obst");
        let id = f.id("Obst");
        let res = run(
            &mut f.catalog,
            &id,
            CategoryUpdate {
                name: Some("  ".into()),
                ..Default::default()
            },
        );
        assert!(matches!(res, Err(ShelfError::InvalidInput(_))));
        assert_eq!(f.catalog.require(&id).unwrap().name, "Obst");
    }

    #[test]
    fn test_permissions_full_replace() {
        let mut f = CatalogFixture::new().with_root("Obst");
        let id = f.id("Obst");

        let perms = Permissions {
            owner: "anna".into(),
            shared_with: vec!["ben".into(), "carla".into()],
            public: true,
            role: Role::Editor,
        };
        let updated = permissions(&mut f.catalog, &id, perms.clone()).unwrap();
        assert_eq!(updated.permissions, perms);

        let narrowed = Permissions {
            owner: "anna".into(),
            ..Default::default()
        };
        let updated = permissions(&mut f.catalog, &id, narrowed).unwrap();
        assert!(updated.permissions.shared_with.is_empty());
        assert!(!updated.permissions.public);
    }
}
