//! # Domain Model
//!
//! This module defines the entities the catalog owns: [`Category`], [`CategoryRule`]
//! and [`ShoppingHistoryItem`], together with their small value types.
//!
//! ## Ids, not pointers
//!
//! Categories never hold references to each other. `parent_category` and
//! `sub_categories` are plain id fields and the catalog's id-keyed map is the only
//! owner. This keeps the tree trivially serializable and avoids ownership cycles.
//!
//! ## Hierarchy Fields
//!
//! | Field | Invariant |
//! |-------|-----------|
//! | `path` | `parent.path ++ [parent.id]`, or `[]` for a root |
//! | `level` | `path.len()` |
//! | `sub_categories` | ids of categories whose `parent_category` is this id |
//!
//! The commands in [`crate::commands`] are responsible for keeping these in sync.
//!
//! ## Wire Format
//!
//! All entities serialize with camelCase keys (`parentCategory`, `subCategories`,
//! `lastModified`, ...). Exported files are consumed by other clients, so field
//! names are part of the contract.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryStatus {
    #[default]
    Active,
    Archived,
}

impl CategoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryStatus::Active => "active",
            CategoryStatus::Archived => "archived",
        }
    }
}

impl FromStr for CategoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(CategoryStatus::Active),
            "archived" => Ok(CategoryStatus::Archived),
            other => Err(format!("Unknown status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Admin,
    Editor,
    Viewer,
}

/// Sharing settings. Persisted and exported, never enforced by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub shared_with: Vec<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub role: Role,
}

/// Localized name/description for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Translation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Where an imported category came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub source: String,
    pub imported_at: DateTime<Utc>,
}

/// Open metadata bag attached to a category.
///
/// The named fields are the ones the catalog itself reads. Anything else a client
/// stores here survives a load/save cycle through `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMetadata {
    #[serde(default)]
    pub description: String,
    /// Ids of [`CategoryRule`]s that classify into this category.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom_fields: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, Translation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_from: Option<Provenance>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub parent_category: Option<String>,
    #[serde(default)]
    pub sub_categories: Vec<String>,
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub level: usize,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: CategoryMetadata,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub status: CategoryStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub modified_by: String,
}

impl Category {
    /// A fresh root category with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            color: default_category_color(&name),
            name,
            icon: None,
            parent_category: None,
            sub_categories: Vec::new(),
            path: Vec::new(),
            level: 0,
            tags: Vec::new(),
            metadata: CategoryMetadata::default(),
            permissions: Permissions::default(),
            status: CategoryStatus::Active,
            created_at: now,
            last_modified: now,
            created_by: String::new(),
            modified_by: String::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CategoryStatus::Active
    }

    pub fn is_root(&self) -> bool {
        self.parent_category.is_none()
    }

    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

/// Input for creating a category. Everything but the name is optional.
#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub parent_category: Option<String>,
    pub tags: Vec<String>,
    pub description: String,
    pub permissions: Option<Permissions>,
    pub created_by: String,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_category = Some(parent_id.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn created_by(mut self, user: impl Into<String>) -> Self {
        self.created_by = user.into();
        self
    }
}

/// Partial edit of a category. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    /// `Some(None)` clears the icon.
    pub icon: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub description: Option<String>,
    pub custom_fields: Option<Map<String, Value>>,
    pub translations: Option<BTreeMap<String, Translation>>,
    pub modified_by: Option<String>,
}

const DEFAULT_CATEGORY_COLORS: &[&str] = &[
    "#43A047", // Green
    "#1E88E5", // Blue
    "#8E24AA", // Purple
    "#E53935", // Red
    "#FB8C00", // Orange
    "#00ACC1", // Cyan
    "#D81B60", // Pink
    "#5E35B1", // Deep Purple
];

/// Pick a deterministic palette color from the category name.
pub fn default_category_color(name: &str) -> String {
    let hash = name
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
    DEFAULT_CATEGORY_COLORS[(hash % DEFAULT_CATEGORY_COLORS.len() as u64) as usize].to_string()
}

// --- Rules ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOperator {
    Contains,
    Equals,
    StartsWith,
    EndsWith,
    Regex,
}

impl RuleOperator {
    pub const ALL: [RuleOperator; 5] = [
        RuleOperator::Contains,
        RuleOperator::Equals,
        RuleOperator::StartsWith,
        RuleOperator::EndsWith,
        RuleOperator::Regex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleOperator::Contains => "contains",
            RuleOperator::Equals => "equals",
            RuleOperator::StartsWith => "startsWith",
            RuleOperator::EndsWith => "endsWith",
            RuleOperator::Regex => "regex",
        }
    }

    /// Apply the operator to `text`, ignoring case.
    ///
    /// A regex that fails to compile matches nothing.
    pub fn evaluate(&self, text: &str, value: &str) -> bool {
        let folded_text = text.to_lowercase();
        let folded_value = value.to_lowercase();
        match self {
            RuleOperator::Contains => folded_text.contains(&folded_value),
            RuleOperator::Equals => folded_text == folded_value,
            RuleOperator::StartsWith => folded_text.starts_with(&folded_value),
            RuleOperator::EndsWith => folded_text.ends_with(&folded_value),
            RuleOperator::Regex => RegexBuilder::new(value)
                .case_insensitive(true)
                .build()
                .map(|re| re.is_match(text))
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for RuleOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown operator '{}' (expected one of: contains, equals, startsWith, endsWith, regex)",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub field: String,
    pub operator: RuleOperator,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRule {
    pub id: String,
    pub name: String,
    pub condition: RuleCondition,
    pub priority: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl CategoryRule {
    pub fn matches(&self, text: &str) -> bool {
        self.condition
            .operator
            .evaluate(text, &self.condition.value)
    }

    /// Two rules are duplicates when they test the same thing.
    pub fn same_condition(&self, other: &CategoryRule) -> bool {
        self.condition.operator == other.condition.operator
            && self.condition.value == other.condition.value
    }
}

// --- Purchase ledger ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Meteorological seasons: Mar-May spring, Jun-Aug summer, Sep-Nov autumn.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn of(date: &DateTime<Utc>) -> Self {
        Self::from_month(date.month())
    }
}

/// Per-season purchase weights in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Seasonality {
    #[serde(default)]
    pub winter: f64,
    #[serde(default)]
    pub spring: f64,
    #[serde(default)]
    pub summer: f64,
    #[serde(default)]
    pub autumn: f64,
}

impl Seasonality {
    pub fn weight(&self, season: Season) -> f64 {
        match season {
            Season::Winter => self.winter,
            Season::Spring => self.spring,
            Season::Summer => self.summer,
            Season::Autumn => self.autumn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonality: Option<Seasonality>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One ledger entry. The ledger holds at most one per normalized product name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingHistoryItem {
    pub id: String,
    pub product_name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub purchase_date: DateTime<Utc>,
    pub last_purchased: DateTime<Utc>,
    pub frequency: u32,
    pub confidence: f64,
    #[serde(default)]
    pub metadata: HistoryMetadata,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl ShoppingHistoryItem {
    pub fn new(product_name: &str, category: Option<String>) -> Self {
        let now = Utc::now();
        let confidence = if category.is_some() { 1.0 } else { 0.0 };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            product_name: normalize_product_name(product_name),
            category,
            purchase_date: now,
            last_purchased: now,
            frequency: 1,
            confidence,
            metadata: HistoryMetadata::default(),
            tags: Vec::new(),
            notes: String::new(),
        }
    }

    pub fn seasonal_weight(&self, season: Season) -> f64 {
        self.metadata
            .seasonality
            .map(|s| s.weight(season))
            .unwrap_or(0.0)
    }
}

/// Ledger key for a product name: trimmed and lower-cased.
pub fn normalize_product_name(name: &str) -> String {
    name.trim().to_lowercase()
}
