use crate::error::Result;
use crate::model::CategoryStatus;
use crate::store::{Catalog, StorageBackend};

use super::helpers::descendant_ids;

/// Archive `id` and its whole subtree.
///
/// Nodes that are already archived are left as they are, so repeating the call
/// changes nothing. Returns the ids that were newly archived.
pub fn run<B: StorageBackend>(catalog: &mut Catalog<B>, id: &str) -> Result<Vec<String>> {
    catalog.require(id)?;

    let mut targets = vec![id.to_string()];
    targets.extend(descendant_ids(&catalog.categories, id));

    let mut archived = Vec::new();
    for target in targets {
        if let Some(cat) = catalog.categories.get_mut(&target) {
            if cat.status == CategoryStatus::Archived {
                continue;
            }
            cat.status = CategoryStatus::Archived;
            cat.touch();
            archived.push(target);
        }
    }

    catalog.persist_categories();
    tracing::debug!(id, archived = archived.len(), "archived category subtree");
    Ok(archived)
}

/// Restore a single archived category. Descendants stay archived.
pub fn unarchive<B: StorageBackend>(catalog: &mut Catalog<B>, id: &str) -> Result<bool> {
    let cat = catalog.require_mut(id)?;
    if cat.status == CategoryStatus::Active {
        return Ok(false);
    }
    cat.status = CategoryStatus::Active;
    cat.touch();

    catalog.persist_categories();
    tracing::debug!(id, "unarchived category");
    Ok(true)
}
