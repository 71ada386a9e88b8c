//! Category suggestions for free-text product names.
//!
//! Every active category is scored on four factors in `[0, 1]`:
//!
//! | Factor | Weight |
//! |--------|--------|
//! | purchase history | 0.4 |
//! | name similarity | 0.3 |
//! | seasonality | 0.2 |
//! | user preference | 0.1 |
//!
//! The best score wins, the next three become alternatives. The reported reason
//! is the largest *raw* factor of the winner, ties going to the earlier row.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{normalize_product_name, Category, Season, ShoppingHistoryItem};
use crate::similarity::name_similarity;
use crate::store::{Catalog, StorageBackend};

pub const PURCHASE_HISTORY_WEIGHT: f64 = 0.4;
pub const NAME_SIMILARITY_WEIGHT: f64 = 0.3;
pub const SEASONALITY_WEIGHT: f64 = 0.2;
pub const USER_PREFERENCE_WEIGHT: f64 = 0.1;

const MAX_ALTERNATIVES: usize = 3;
const MAX_SIMILAR_PRODUCTS: usize = 5;
const SIMILAR_PRODUCT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionReason {
    PurchaseHistory,
    NameSimilarity,
    Seasonality,
    UserPreference,
}

impl SuggestionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionReason::PurchaseHistory => "purchase_history",
            SuggestionReason::NameSimilarity => "name_similarity",
            SuggestionReason::Seasonality => "seasonality",
            SuggestionReason::UserPreference => "user_preference",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScores {
    pub purchase_history: f64,
    pub name_similarity: f64,
    pub seasonality: f64,
    pub user_preference: f64,
}

impl FactorScores {
    pub fn weighted(&self) -> f64 {
        PURCHASE_HISTORY_WEIGHT * self.purchase_history
            + NAME_SIMILARITY_WEIGHT * self.name_similarity
            + SEASONALITY_WEIGHT * self.seasonality
            + USER_PREFERENCE_WEIGHT * self.user_preference
    }

    /// Largest raw factor; on ties the earlier factor wins.
    pub fn dominant(&self) -> SuggestionReason {
        let ordered = [
            (SuggestionReason::PurchaseHistory, self.purchase_history),
            (SuggestionReason::NameSimilarity, self.name_similarity),
            (SuggestionReason::Seasonality, self.seasonality),
            (SuggestionReason::UserPreference, self.user_preference),
        ];
        let mut best = ordered[0];
        for candidate in &ordered[1..] {
            if candidate.1 > best.1 {
                best = *candidate;
            }
        }
        best.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeCategory {
    pub category_id: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarProduct {
    pub product_name: String,
    pub category: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionMetadata {
    pub frequency: u32,
    pub seasonal_confidence: f64,
    pub last_purchase: Option<DateTime<Utc>>,
    pub similar_products: Vec<SimilarProduct>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySuggestion {
    pub product_name: String,
    pub suggested_category: String,
    pub confidence: f64,
    pub reason: SuggestionReason,
    pub factors: FactorScores,
    pub alternative_categories: Vec<AlternativeCategory>,
    pub metadata: SuggestionMetadata,
}

/// Suggest a category for `product_name` as of now.
///
/// Returns `None` only when there is no active category to suggest.
pub fn run<B: StorageBackend>(
    catalog: &Catalog<B>,
    product_name: &str,
) -> Option<CategorySuggestion> {
    run_at(catalog, product_name, Utc::now())
}

/// Same as [`run`], with the season taken from `now`.
pub fn run_at<B: StorageBackend>(
    catalog: &Catalog<B>,
    product_name: &str,
    now: DateTime<Utc>,
) -> Option<CategorySuggestion> {
    let key = normalize_product_name(product_name);
    let entry = catalog.history_entry(&key);
    let season = Season::of(&now);
    let ledger: Vec<&ShoppingHistoryItem> = catalog.history().collect();

    let mut scored: Vec<(&Category, FactorScores)> = catalog
        .active_categories()
        .map(|cat| (cat, factors_for(cat, &key, entry, season, &ledger)))
        .collect();
    // Stable: equal scores keep catalog order.
    scored.sort_by(|a, b| b.1.weighted().total_cmp(&a.1.weighted()));

    let (winner, factors) = scored.first()?;
    let alternatives = scored
        .iter()
        .skip(1)
        .take(MAX_ALTERNATIVES)
        .map(|(cat, f)| AlternativeCategory {
            category_id: cat.id.clone(),
            confidence: f.weighted(),
        })
        .collect();

    let suggestion = CategorySuggestion {
        product_name: product_name.to_string(),
        suggested_category: winner.id.clone(),
        confidence: factors.weighted(),
        reason: factors.dominant(),
        factors: *factors,
        alternative_categories: alternatives,
        metadata: SuggestionMetadata {
            frequency: entry.map(|e| e.frequency).unwrap_or(0),
            seasonal_confidence: entry.map(|e| e.seasonal_weight(season)).unwrap_or(0.0),
            last_purchase: entry.map(|e| e.last_purchased),
            similar_products: similar_products(catalog, product_name),
        },
    };
    tracing::debug!(
        product = %key,
        category = %suggestion.suggested_category,
        confidence = suggestion.confidence,
        reason = suggestion.reason.as_str(),
        "suggested category"
    );
    Some(suggestion)
}

fn factors_for(
    category: &Category,
    key: &str,
    entry: Option<&ShoppingHistoryItem>,
    season: Season,
    ledger: &[&ShoppingHistoryItem],
) -> FactorScores {
    let assigned_here =
        |item: &ShoppingHistoryItem| item.category.as_deref() == Some(category.id.as_str());

    let purchase_history = match entry {
        Some(e) if assigned_here(e) => 1.0,
        _ => 0.0,
    };
    let user_preference = if ledger.is_empty() {
        0.0
    } else {
        ledger.iter().filter(|e| assigned_here(**e)).count() as f64 / ledger.len() as f64
    };

    FactorScores {
        purchase_history,
        name_similarity: name_similarity(key, &category.name),
        seasonality: entry.map(|e| e.seasonal_weight(season)).unwrap_or(0.0),
        user_preference,
    }
}

/// Other categorized ledger entries whose names resemble `product_name`.
pub fn similar_products<B: StorageBackend>(
    catalog: &Catalog<B>,
    product_name: &str,
) -> Vec<SimilarProduct> {
    let key = normalize_product_name(product_name);
    let mut similar: Vec<SimilarProduct> = catalog
        .history()
        .filter(|item| item.product_name != key)
        .filter_map(|item| {
            let category = item.category.clone()?;
            let similarity = name_similarity(&key, &item.product_name);
            (similarity > SIMILAR_PRODUCT_THRESHOLD).then(|| SimilarProduct {
                product_name: item.product_name.clone(),
                category,
                similarity,
            })
        })
        .collect();
    similar.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    similar.truncate(MAX_SIMILAR_PRODUCTS);
    similar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::purchases;
    use crate::model::Seasonality;
    use crate::store::memory::fixtures::CatalogFixture;
    use crate::store::memory::InMemoryCatalog;
    use chrono::TimeZone;

    fn summer() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_no_active_categories() {
        let catalog = InMemoryCatalog::new();
        assert!(run(&catalog, "Milch").is_none());
    }

    #[test]
    fn test_purchase_history_dominates() {
        let f = CatalogFixture::new()
            .with_root("Haushalt")
            .with_root("Getränke")
            .with_purchase("Spülmittel", Some("Haushalt"));

        let s = run(&f.catalog, "spülmittel").unwrap();
        assert_eq!(s.suggested_category, f.id("Haushalt"));
        assert_eq!(s.reason, SuggestionReason::PurchaseHistory);
        assert_eq!(s.factors.purchase_history, 1.0);
        assert_eq!(s.factors.user_preference, 1.0);
        assert_eq!(s.metadata.frequency, 1);
        assert_eq!(s.alternative_categories.len(), 1);
    }

    #[test]
    fn test_name_similarity_without_history() {
        let f = CatalogFixture::new().with_root("Obst").with_root("Getränke");
        let s = run(&f.catalog, "Obst").unwrap();
        assert_eq!(s.suggested_category, f.id("Obst"));
        assert_eq!(s.reason, SuggestionReason::NameSimilarity);
        assert!((s.confidence - NAME_SIMILARITY_WEIGHT).abs() < 1e-9);
        assert_eq!(s.metadata.frequency, 0);
        assert!(s.metadata.last_purchase.is_none());
    }

    #[test]
    fn test_padding_does_not_change_similarity() {
        let f = CatalogFixture::new().with_root("Milchprodukte");
        let s = run(&f.catalog, "  Milchprodukte ").unwrap();
        assert!((s.factors.name_similarity - 1.0).abs() < 1e-9);
        assert_eq!(s.product_name, "  Milchprodukte ");
    }

    #[test]
    fn test_archived_categories_are_ignored() {
        let mut f = CatalogFixture::new().with_root("Obst").with_root("Gemüse");
        let obst = f.id("Obst");
        crate::commands::archive::run(&mut f.catalog, &obst).unwrap();

        let s = run(&f.catalog, "Obst").unwrap();
        assert_eq!(s.suggested_category, f.id("Gemüse"));
        assert!(s.alternative_categories.is_empty());
    }

    #[test]
    fn test_at_most_three_alternatives() {
        let f = CatalogFixture::new()
            .with_root("A")
            .with_root("B")
            .with_root("C")
            .with_root("D")
            .with_root("E");
        let s = run(&f.catalog, "A").unwrap();
        assert_eq!(s.alternative_categories.len(), 3);
        assert!(s
            .alternative_categories
            .iter()
            .all(|a| a.category_id != s.suggested_category));
        assert!(s
            .alternative_categories
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
    }

    #[test]
    fn test_seasonality_uses_current_season() {
        let mut f = CatalogFixture::new()
            .with_root("Obst")
            .with_purchase("Erdbeeren", Some("Obst"));
        purchases::set_seasonality(
            &mut f.catalog,
            "Erdbeeren",
            Seasonality {
                summer: 0.9,
                ..Default::default()
            },
        )
        .unwrap();

        let s = run_at(&f.catalog, "Erdbeeren", summer()).unwrap();
        assert_eq!(s.factors.seasonality, 0.9);
        assert_eq!(s.metadata.seasonal_confidence, 0.9);

        let winter = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let s = run_at(&f.catalog, "Erdbeeren", winter).unwrap();
        assert_eq!(s.factors.seasonality, 0.0);
    }

    #[test]
    fn test_assigning_history_never_lowers_score() {
        let mut f = CatalogFixture::new()
            .with_root("Milchprodukte")
            .with_root("Backwaren")
            .with_purchase("Joghurt", None);
        let dairy = f.id("Milchprodukte");

        let before = run(&f.catalog, "Joghurt").unwrap();
        let before_score = std::iter::once((&before.suggested_category, before.confidence))
            .chain(
                before
                    .alternative_categories
                    .iter()
                    .map(|a| (&a.category_id, a.confidence)),
            )
            .find(|(id, _)| **id == dairy)
            .map(|(_, c)| c)
            .unwrap();

        purchases::add(&mut f.catalog, "Joghurt", Some(&dairy)).unwrap();
        let after = run(&f.catalog, "Joghurt").unwrap();

        assert_eq!(after.suggested_category, dairy);
        assert_eq!(after.factors.purchase_history, 1.0);
        assert!(after.confidence > before_score);
    }

    #[test]
    fn test_reason_tie_prefers_earlier_factor() {
        let f = FactorScores {
            purchase_history: 1.0,
            name_similarity: 0.2,
            seasonality: 0.0,
            user_preference: 1.0,
        };
        assert_eq!(f.dominant(), SuggestionReason::PurchaseHistory);

        let f = FactorScores {
            user_preference: 0.5,
            ..Default::default()
        };
        assert_eq!(f.dominant(), SuggestionReason::UserPreference);

        assert_eq!(
            FactorScores::default().dominant(),
            SuggestionReason::PurchaseHistory
        );
    }

    #[test]
    fn test_similar_products() {
        let f = CatalogFixture::new()
            .with_root("Milchprodukte")
            .with_purchase("Vollmilch", Some("Milchprodukte"))
            .with_purchase("Vollmilch 1L", Some("Milchprodukte"))
            .with_purchase("Vollmilc", None)
            .with_purchase("Zahnpasta", Some("Milchprodukte"));

        let similar = similar_products(&f.catalog, "Vollmilch");
        let names: Vec<&str> = similar.iter().map(|s| s.product_name.as_str()).collect();
        assert_eq!(names, vec!["vollmilch 1l"]);
        assert!(similar[0].similarity > 0.5);
    }

    #[test]
    fn test_reason_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SuggestionReason::NameSimilarity).unwrap(),
            "\"name_similarity\""
        );
    }
}
