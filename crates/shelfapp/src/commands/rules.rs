//! # Rule Engine
//!
//! Rules are small text tests (`contains`, `equals`, `startsWith`, `endsWith`,
//! `regex`) with a priority. A category opts into a rule by listing the rule id
//! in `metadata.rules`; the rule itself knows nothing about categories.
//!
//! ## Validation
//!
//! [`add`] validates everything before inserting anything:
//!
//! - a condition must be present
//! - the operator must be one of the five known names
//! - a `regex` value must compile
//! - priority must be a non-negative integer
//! - `isActive`, if given, must be a boolean
//!
//! The last two can only go wrong in untyped input, so they are checked in
//! [`RuleDraft::from_value`], the JSON boundary used by import.
//!
//! ## Matching
//!
//! [`find_matching_category`] scans active rules by descending priority (ties keep
//! insertion order) and returns the first active category that references a
//! matching rule. Rule sets are small, so this is a plain linear scan.

use chrono::{DateTime, Utc};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ShelfError};
use crate::model::{Category, CategoryRule, RuleCondition, RuleOperator};
use crate::store::{Catalog, StorageBackend};

fn default_field() -> String {
    "name".to_string()
}

/// Condition as supplied by a caller; the operator is still a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionDraft {
    #[serde(default = "default_field")]
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl ConditionDraft {
    pub fn new(operator: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: default_field(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// Unvalidated rule input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDraft {
    pub name: String,
    pub condition: Option<ConditionDraft>,
    pub priority: i64,
    pub is_active: Option<bool>,
}

impl RuleDraft {
    pub fn new(name: impl Into<String>, condition: ConditionDraft) -> Self {
        Self {
            name: name.into(),
            condition: Some(condition),
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = Some(active);
        self
    }

    /// Read a draft from loosely-typed JSON (`{name, condition, priority, isActive}`).
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ShelfError::InvalidRule("rule must be an object".to_string()))?;

        let name = match obj.get("name") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(ShelfError::InvalidRule("name must be a string".to_string())),
        };

        let condition = match obj.get("condition") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(serde_json::from_value::<ConditionDraft>(raw.clone()).map_err(
                |e| ShelfError::InvalidRule(format!("malformed condition: {}", e)),
            )?),
        };

        let priority = match obj.get("priority") {
            None | Some(Value::Null) => 0,
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
                ShelfError::InvalidRule(format!("priority must be a non-negative integer, got {}", n))
            })?,
            Some(other) => {
                return Err(ShelfError::InvalidRule(format!(
                    "priority must be a number, got {}",
                    other
                )))
            }
        };

        let is_active = match obj.get("isActive") {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(other) => {
                return Err(ShelfError::InvalidRule(format!(
                    "isActive must be a boolean, got {}",
                    other
                )))
            }
        };

        Ok(Self {
            name,
            condition,
            priority,
            is_active,
        })
    }
}

/// A draft that passed validation.
#[derive(Debug, Clone)]
pub struct ValidRule {
    pub name: String,
    pub condition: RuleCondition,
    pub priority: u32,
    pub is_active: bool,
}

impl ValidRule {
    pub fn into_rule(self, id: String, created_at: DateTime<Utc>) -> CategoryRule {
        CategoryRule {
            id,
            name: self.name,
            condition: self.condition,
            priority: self.priority,
            is_active: self.is_active,
            created_at,
        }
    }
}

pub fn validate(draft: &RuleDraft) -> Result<ValidRule> {
    let condition = draft
        .condition
        .as_ref()
        .ok_or_else(|| ShelfError::InvalidRule("condition is required".to_string()))?;

    let operator: RuleOperator = condition.operator.parse().map_err(ShelfError::InvalidRule)?;

    if operator == RuleOperator::Regex {
        RegexBuilder::new(&condition.value)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                ShelfError::InvalidRule(format!("invalid regex '{}': {}", condition.value, e))
            })?;
    }

    if draft.priority < 0 {
        return Err(ShelfError::InvalidRule(format!(
            "priority must be non-negative, got {}",
            draft.priority
        )));
    }
    let priority = u32::try_from(draft.priority).map_err(|_| {
        ShelfError::InvalidRule(format!("priority {} is out of range", draft.priority))
    })?;

    Ok(ValidRule {
        name: draft.name.trim().to_string(),
        condition: RuleCondition {
            field: condition.field.clone(),
            operator,
            value: condition.value.clone(),
        },
        priority,
        is_active: draft.is_active.unwrap_or(true),
    })
}

/// Validate and store a new rule. Nothing is stored if validation fails.
pub fn add<B: StorageBackend>(catalog: &mut Catalog<B>, draft: RuleDraft) -> Result<CategoryRule> {
    let valid = validate(&draft)?;
    let rule = valid.into_rule(uuid::Uuid::new_v4().to_string(), Utc::now());

    catalog.rules.push(rule.clone());
    catalog.persist_rules();
    tracing::debug!(id = %rule.id, operator = %rule.condition.operator, priority = rule.priority, "added rule");
    Ok(rule)
}

/// Does `text` satisfy `rule`? Ignores `is_active`.
pub fn test_rule(text: &str, rule: &CategoryRule) -> bool {
    rule.matches(text)
}

/// All rules in evaluation order: highest priority first, insertion order
/// among equals.
pub fn ordered_rules(rules: &[CategoryRule]) -> Vec<&CategoryRule> {
    let mut ordered: Vec<&CategoryRule> = rules.iter().collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
    ordered
}

pub fn ordered_active_rules(rules: &[CategoryRule]) -> Vec<&CategoryRule> {
    let mut active = ordered_rules(rules);
    active.retain(|r| r.is_active);
    active
}

pub fn find_matching_category<'a, B: StorageBackend>(
    catalog: &'a Catalog<B>,
    text: &str,
) -> Option<&'a Category> {
    for rule in ordered_active_rules(catalog.rules()) {
        if !test_rule(text, rule) {
            continue;
        }
        if let Some(cat) = catalog
            .active_categories()
            .find(|c| c.metadata.rules.iter().any(|id| id == &rule.id))
        {
            return Some(cat);
        }
    }
    None
}

/// Reference `rule_id` from a category's `metadata.rules`.
pub fn assign<B: StorageBackend>(
    catalog: &mut Catalog<B>,
    category_id: &str,
    rule_id: &str,
) -> Result<Category> {
    if catalog.rule(rule_id).is_none() {
        return Err(ShelfError::RuleNotFound(rule_id.to_string()));
    }
    let cat = catalog.require_mut(category_id)?;
    if !cat.metadata.rules.iter().any(|id| id == rule_id) {
        cat.metadata.rules.push(rule_id.to_string());
        cat.touch();
    }
    let updated = cat.clone();

    catalog.persist_categories();
    Ok(updated)
}

pub fn unassign<B: StorageBackend>(
    catalog: &mut Catalog<B>,
    category_id: &str,
    rule_id: &str,
) -> Result<Category> {
    let cat = catalog.require_mut(category_id)?;
    let before = cat.metadata.rules.len();
    cat.metadata.rules.retain(|id| id != rule_id);
    if cat.metadata.rules.len() != before {
        cat.touch();
    }
    let updated = cat.clone();

    catalog.persist_categories();
    Ok(updated)
}

pub fn set_active<B: StorageBackend>(
    catalog: &mut Catalog<B>,
    rule_id: &str,
    active: bool,
) -> Result<CategoryRule> {
    let rule = catalog.rule_mut(rule_id)?;
    rule.is_active = active;
    let updated = rule.clone();

    catalog.persist_rules();
    Ok(updated)
}
