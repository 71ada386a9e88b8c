use chrono::Utc;

use crate::error::{Result, ShelfError};
use crate::model::{normalize_product_name, Seasonality, ShoppingHistoryItem};
use crate::store::{Catalog, StorageBackend};

/// Record a purchase in the ledger.
///
/// An existing entry gets its frequency bumped; a supplied category overwrites
/// the stored one with full confidence. A new entry starts at frequency 1.
pub fn add<B: StorageBackend>(
    catalog: &mut Catalog<B>,
    product_name: &str,
    category_id: Option<&str>,
) -> Result<ShoppingHistoryItem> {
    let key = normalize_product_name(product_name);
    if key.is_empty() {
        return Err(ShelfError::InvalidInput(
            "Product name cannot be empty".to_string(),
        ));
    }
    if let Some(id) = category_id {
        catalog.require(id)?;
    }

    let entry = match catalog.history.get_mut(&key) {
        Some(existing) => {
            existing.frequency = existing.frequency.saturating_add(1);
            existing.last_purchased = Utc::now();
            if let Some(id) = category_id {
                existing.category = Some(id.to_string());
                existing.confidence = 1.0;
            }
            existing.clone()
        }
        None => {
            let item = ShoppingHistoryItem::new(&key, category_id.map(str::to_string));
            catalog.history.insert(key.clone(), item.clone());
            item
        }
    };

    catalog.persist_history();
    tracing::debug!(product = %key, frequency = entry.frequency, "recorded purchase");
    Ok(entry)
}

/// Attach per-season weights to a ledger entry. Weights are clamped to `[0, 1]`.
pub fn set_seasonality<B: StorageBackend>(
    catalog: &mut Catalog<B>,
    product_name: &str,
    weights: Seasonality,
) -> Result<ShoppingHistoryItem> {
    let key = normalize_product_name(product_name);
    let entry = catalog
        .history
        .get_mut(&key)
        .ok_or_else(|| ShelfError::ProductNotFound(key.clone()))?;

    let clamp = |w: f64| if w.is_finite() { w.clamp(0.0, 1.0) } else { 0.0 };
    entry.metadata.seasonality = Some(Seasonality {
        winter: clamp(weights.winter),
        spring: clamp(weights.spring),
        summer: clamp(weights.summer),
        autumn: clamp(weights.autumn),
    });
    let updated = entry.clone();

    catalog.persist_history();
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::CatalogFixture;
    use crate::store::memory::InMemoryCatalog;

    #[test]
    fn test_new_entry_without_category() {
        let mut catalog = InMemoryCatalog::new();
        let item = add(&mut catalog, "  Bio-Milch 1L ", None).unwrap();
        assert_eq!(item.product_name, "bio-milch 1l");
        assert_eq!(item.frequency, 1);
        assert_eq!(item.confidence, 0.0);
        assert!(item.category.is_none());
    }

    #[test]
    fn test_repeat_purchase_increments_frequency() {
        let mut f = CatalogFixture::new().with_root("Milchprodukte");
        let dairy = f.id("Milchprodukte");

        add(&mut f.catalog, "Milch", None).unwrap();
        let first = f.catalog.history_entry("milch").unwrap().last_purchased;
        let item = add(&mut f.catalog, "MILCH", Some(&dairy)).unwrap();

        assert_eq!(item.frequency, 2);
        assert_eq!(item.category.as_deref(), Some(dairy.as_str()));
        assert_eq!(item.confidence, 1.0);
        assert!(item.last_purchased >= first);
        assert_eq!(f.catalog.history().count(), 1);
    }

    #[test]
    fn test_repeat_without_category_keeps_assignment() {
        let mut f = CatalogFixture::new()
            .with_root("Milchprodukte")
            .with_purchase("Milch", Some("Milchprodukte"));
        let item = add(&mut f.catalog, "milch", None).unwrap();
        assert_eq!(item.category, Some(f.id("Milchprodukte")));
        assert_eq!(item.confidence, 1.0);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut catalog = InMemoryCatalog::new();
        assert!(matches!(
            add(&mut catalog, "Milch", Some("ghost")),
            Err(ShelfError::CategoryNotFound(_))
        ));
        assert_eq!(catalog.history().count(), 0);
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut catalog = InMemoryCatalog::new();
        assert!(matches!(
            add(&mut catalog, "   ", None),
            Err(ShelfError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_set_seasonality_clamps() {
        let mut f = CatalogFixture::new().with_purchase("Erdbeeren", None);
        let item = set_seasonality(
            &mut f.catalog,
            "Erdbeeren",
            Seasonality {
                summer: 1.5,
                spring: -0.2,
                ..Default::default()
            },
        )
        .unwrap();
        let s = item.metadata.seasonality.unwrap();
        assert_eq!(s.summer, 1.0);
        assert_eq!(s.spring, 0.0);
    }

    #[test]
    fn test_set_seasonality_unknown_product() {
        let mut catalog = InMemoryCatalog::new();
        assert!(matches!(
            set_seasonality(&mut catalog, "nope", Seasonality::default()),
            Err(ShelfError::ProductNotFound(_))
        ));
    }
}
