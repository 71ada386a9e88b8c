//! # Rendering
//!
//! Every function here turns library values into a `String` ready for stdout.
//! Nothing prints; handlers decide where output goes. Styling goes through
//! [`super::styles`], so tests strip ANSI codes before comparing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use shelfapp::commands::import::ImportReport;
use shelfapp::commands::suggest::CategorySuggestion;
use shelfapp::commands::{CmdMessage, MessageLevel};
use shelfapp::model::{Category, CategoryRule, ShoppingHistoryItem};

use super::styles;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

pub fn render_messages(messages: &[CmdMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        let style = match message.level {
            MessageLevel::Info => styles::muted(),
            MessageLevel::Success => styles::success(),
            MessageLevel::Warning => styles::warning(),
            MessageLevel::Error => styles::error(),
        };
        out.push_str(&style.apply_to(&message.content).to_string());
        out.push('\n');
    }
    out
}

fn category_label(cat: &Category) -> String {
    let icon = cat.icon.as_deref().map(|i| format!("{} ", i)).unwrap_or_default();
    let name = if cat.is_active() {
        styles::title().apply_to(&cat.name).to_string()
    } else {
        format!(
            "{} {}",
            styles::archived().apply_to(&cat.name),
            styles::archived().apply_to("(archived)")
        )
    };
    format!("{}{} {}", icon, name, styles::id().apply_to(&cat.id))
}

/// Draw the categories as a tree. Categories whose parent is not in the slice
/// are drawn as roots.
pub fn render_tree(categories: &[&Category]) -> String {
    if categories.is_empty() {
        return "No categories.\n".to_string();
    }
    let by_id: HashMap<&str, &Category> =
        categories.iter().map(|c| (c.id.as_str(), *c)).collect();
    let mut roots: Vec<&Category> = categories
        .iter()
        .copied()
        .filter(|c| {
            c.parent_category
                .as_deref()
                .map_or(true, |p| !by_id.contains_key(p))
        })
        .collect();
    roots.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = String::new();
    for root in roots {
        out.push_str(&category_label(root));
        out.push('\n');
        render_children(root, &by_id, "", &mut out);
    }
    out
}

fn render_children(
    parent: &Category,
    by_id: &HashMap<&str, &Category>,
    prefix: &str,
    out: &mut String,
) {
    let children: Vec<&Category> = parent
        .sub_categories
        .iter()
        .filter_map(|id| by_id.get(id.as_str()).copied())
        .collect();
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        out.push_str(prefix);
        out.push_str(if last { LAST_BRANCH } else { BRANCH });
        out.push_str(&category_label(child));
        out.push('\n');
        let next = format!("{}{}", prefix, if last { SPACE } else { PIPE });
        render_children(child, by_id, &next, out);
    }
}

/// Detail view of one category. `path_names` are the ancestor names, root first.
pub fn render_category(cat: &Category, path_names: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&category_label(cat));
    out.push('\n');

    let mut field = |label: &str, value: String| {
        out.push_str(&format!("  {:<10} {}\n", styles::muted().apply_to(label), value));
    };
    if !path_names.is_empty() {
        field("path", path_names.join(" / "));
    }
    field("level", cat.level.to_string());
    field("color", cat.color.clone());
    if !cat.tags.is_empty() {
        field("tags", cat.tags.join(", "));
    }
    if !cat.metadata.description.is_empty() {
        field("about", cat.metadata.description.clone());
    }
    if !cat.sub_categories.is_empty() {
        field("children", cat.sub_categories.len().to_string());
    }
    if !cat.metadata.rules.is_empty() {
        field("rules", cat.metadata.rules.join(", "));
    }
    if let Some(origin) = &cat.metadata.imported_from {
        field(
            "imported",
            format!("from {} {}", origin.source, format_time_ago(origin.imported_at)),
        );
    }
    field("modified", format_time_ago(cat.last_modified));
    out
}

/// Rules in the order given, with the categories that use each one.
pub fn render_rules(rules: &[&CategoryRule], owners: &HashMap<String, Vec<String>>) -> String {
    if rules.is_empty() {
        return "No rules.\n".to_string();
    }
    let mut out = String::new();
    for rule in rules {
        let line = format!(
            "{:>4}  {} {} \"{}\"",
            rule.priority, rule.name, rule.condition.operator, rule.condition.value
        );
        if rule.is_active {
            out.push_str(&line);
        } else {
            out.push_str(&styles::inactive().apply_to(format!("{} (disabled)", line)).to_string());
        }
        out.push_str(&format!("  {}", styles::id().apply_to(&rule.id)));
        if let Some(names) = owners.get(&rule.id).filter(|n| !n.is_empty()) {
            out.push_str(&format!(" → {}", names.join(", ")));
        }
        out.push('\n');
    }
    out
}

/// `name_of` turns a category id into something readable.
pub fn render_suggestion(
    suggestion: &CategorySuggestion,
    name_of: impl Fn(&str) -> String,
) -> String {
    let mut out = format!(
        "{} → {} {}\n",
        suggestion.product_name,
        styles::highlight().apply_to(name_of(&suggestion.suggested_category)),
        styles::muted().apply_to(format!(
            "({:.0}%, {})",
            suggestion.confidence * 100.0,
            suggestion.reason.as_str()
        )),
    );
    for alt in &suggestion.alternative_categories {
        out.push_str(&format!(
            "  {} {}\n",
            name_of(&alt.category_id),
            styles::muted().apply_to(format!("({:.0}%)", alt.confidence * 100.0))
        ));
    }
    if !suggestion.metadata.similar_products.is_empty() {
        let similar: Vec<String> = suggestion
            .metadata
            .similar_products
            .iter()
            .map(|p| p.product_name.clone())
            .collect();
        out.push_str(&format!(
            "  {} {}\n",
            styles::muted().apply_to("similar:"),
            similar.join(", ")
        ));
    }
    out
}

pub fn render_history(
    items: &[&ShoppingHistoryItem],
    name_of: impl Fn(&str) -> String,
) -> String {
    if items.is_empty() {
        return "No purchases recorded.\n".to_string();
    }
    let width = items
        .iter()
        .map(|i| i.product_name.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for item in items {
        let category = item
            .category
            .as_deref()
            .map(&name_of)
            .unwrap_or_else(|| "-".to_string());
        let padding = width - item.product_name.chars().count();
        out.push_str(&format!(
            "{}{}  x{:<3} {}  {}\n",
            item.product_name,
            " ".repeat(padding),
            item.frequency,
            category,
            styles::time().apply_to(format_time_ago(item.last_purchased)),
        ));
    }
    out
}

pub fn render_import_report(report: &ImportReport) -> String {
    let mut out = format!(
        "{} imported, {} skipped, {} errors\n",
        report.imported,
        report.skipped,
        report.errors.len()
    );
    if report.rules_imported > 0 || report.rules_skipped > 0 {
        out.push_str(&format!(
            "rules: {} imported, {} skipped\n",
            report.rules_imported, report.rules_skipped
        ));
    }
    out.push_str(&render_messages(&report.messages));
    for err in &report.errors {
        out.push_str(&format!(
            "  {} {}\n",
            styles::error().apply_to(&err.id),
            err.error
        ));
    }
    out
}

pub fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    timeago::Formatter::new().convert(duration.to_std().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use console::strip_ansi_codes;
    use shelfapp::commands::import::ImportError;
    use shelfapp::model::{CategoryStatus, RuleCondition, RuleOperator};

    fn cat(id: &str, name: &str, parent: Option<&str>, children: &[&str]) -> Category {
        let mut c = Category::new(name);
        c.id = id.to_string();
        c.parent_category = parent.map(str::to_string);
        c.sub_categories = children.iter().map(|s| s.to_string()).collect();
        c
    }

    #[test]
    fn test_tree_draws_branches() {
        let food = cat("food", "Lebensmittel", None, &["dairy", "bakery"]);
        let dairy = cat("dairy", "Milchprodukte", Some("food"), &["cheese"]);
        let bakery = cat("bakery", "Backwaren", Some("food"), &[]);
        let cheese = cat("cheese", "Käse", Some("dairy"), &[]);
        let out = render_tree(&[&food, &dairy, &bakery, &cheese]);
        let plain = strip_ansi_codes(&out);

        let lines: Vec<&str> = plain.lines().collect();
        assert_eq!(lines[0], "Lebensmittel food");
        assert_eq!(lines[1], "├── Milchprodukte dairy");
        assert_eq!(lines[2], "│   └── Käse cheese");
        assert_eq!(lines[3], "└── Backwaren bakery");
    }

    #[test]
    fn test_tree_orphans_become_roots() {
        let dairy = cat("dairy", "Milchprodukte", Some("hidden"), &[]);
        let plain = strip_ansi_codes(&render_tree(&[&dairy])).to_string();
        assert_eq!(plain, "Milchprodukte dairy\n");
    }

    #[test]
    fn test_archived_is_marked() {
        let mut old = cat("old", "Alt", None, &[]);
        old.status = CategoryStatus::Archived;
        let plain = strip_ansi_codes(&render_tree(&[&old])).to_string();
        assert!(plain.contains("(archived)"));
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(render_tree(&[]), "No categories.\n");
    }

    #[test]
    fn test_rules_show_owners_and_state() {
        let rule = CategoryRule {
            id: "r1".into(),
            name: "milch".into(),
            condition: RuleCondition {
                field: "name".into(),
                operator: RuleOperator::Contains,
                value: "milch".into(),
            },
            priority: 10,
            is_active: false,
            created_at: Utc::now(),
        };
        let owners = HashMap::from([("r1".to_string(), vec!["Milchprodukte".to_string()])]);
        let plain = strip_ansi_codes(&render_rules(&[&rule], &owners)).to_string();
        assert!(plain.contains("contains \"milch\""));
        assert!(plain.contains("(disabled)"));
        assert!(plain.contains("→ Milchprodukte"));
    }

    #[test]
    fn test_import_report_lists_errors() {
        let report = ImportReport {
            imported: 2,
            skipped: 1,
            errors: vec![ImportError {
                id: "row 3".into(),
                error: "Parent category not found: ghost".into(),
            }],
            ..Default::default()
        };
        let plain = strip_ansi_codes(&render_import_report(&report)).to_string();
        assert!(plain.starts_with("2 imported, 1 skipped, 1 errors"));
        assert!(plain.contains("row 3 Parent category not found: ghost"));
        assert!(!plain.contains("rules:"));
    }

    #[test]
    fn test_messages_keep_order() {
        let plain = strip_ansi_codes(&render_messages(&[
            CmdMessage::success("done"),
            CmdMessage::warning("careful"),
        ]))
        .to_string();
        assert_eq!(plain, "done\ncareful\n");
    }

    #[test]
    fn test_time_ago() {
        let an_hour_ago = Utc::now() - chrono::Duration::hours(1);
        assert!(format_time_ago(an_hour_ago).contains("hour"));
    }
}
