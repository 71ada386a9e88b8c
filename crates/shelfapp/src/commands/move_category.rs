use crate::error::{Result, ShelfError};
use crate::model::Category;
use crate::store::{Catalog, StorageBackend};

use super::helpers::{is_self_or_descendant, refresh_paths};

/// Re-parent `id` under `new_parent` (or make it a root with `None`).
///
/// Fails without touching anything if the move would make the category its own
/// ancestor. Paths and levels of the whole moved subtree are recomputed and the
/// category document is written once.
pub fn run<B: StorageBackend>(
    catalog: &mut Catalog<B>,
    id: &str,
    new_parent: Option<&str>,
) -> Result<Category> {
    let old_parent = catalog.require(id)?.parent_category.clone();

    if let Some(parent_id) = new_parent {
        catalog.require(parent_id)?;
        if is_self_or_descendant(&catalog.categories, id, parent_id) {
            return Err(ShelfError::Cycle {
                id: id.to_string(),
                parent: parent_id.to_string(),
            });
        }
    }

    if old_parent.as_deref() == new_parent {
        tracing::debug!(id, "category already at destination");
        return catalog.require(id).cloned();
    }

    if let Some(old) = &old_parent {
        if let Some(parent) = catalog.categories.get_mut(old) {
            parent.sub_categories.retain(|child| child != id);
        }
    }
    if let Some(parent_id) = new_parent {
        let parent = catalog.require_mut(parent_id)?;
        parent.sub_categories.push(id.to_string());
    }

    {
        let category = catalog.require_mut(id)?;
        category.parent_category = new_parent.map(str::to_string);
        category.touch();
    }
    let changed = refresh_paths(&mut catalog.categories, id);

    catalog.persist_categories();
    tracing::debug!(id, parent = ?new_parent, recomputed = changed.len(), "moved category");
    catalog.require(id).cloned()
}
