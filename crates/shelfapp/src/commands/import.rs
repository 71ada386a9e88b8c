//! # Import
//!
//! Reads JSON export documents and CSV files back into the catalog.
//!
//! Import is partial-failure: a document that cannot be parsed at all is an
//! `Err`, but a bad row or rule only adds an entry to [`ImportReport::errors`]
//! and processing continues with the next one.
//!
//! ## Order of Work
//!
//! 1. Rules (JSON only, when requested). Each is validated like a new rule.
//!    A rule testing the same operator and value as an existing one is a
//!    duplicate and is skipped.
//! 2. Categories, one at a time, in document order. Exports list parents
//!    first, so hierarchy validation sees a parent before its children.
//! 3. If anything was imported, the hierarchy is rebuilt from
//!    `parentCategory` and persisted once. Loops introduced by the data are
//!    cut by detaching one member to the root and reporting it.
//!
//! ## Conflicts
//!
//! When an incoming id already exists, [`ConflictResolution`] decides:
//!
//! | Policy | Effect |
//! |--------|--------|
//! | `skip` | existing entry untouched, counted as skipped |
//! | `overwrite` | incoming entry replaces it (CSV only replaces its own columns) |
//! | `rename` | incoming entry gets `<id>_imported_<millis>` and a localized name suffix |
//!
//! Under `rename`, children in the same document follow their renamed parent.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::export::{ExportFormat, TAG_SEPARATOR};
use super::helpers::rebuild_hierarchy;
use super::rules::RuleDraft;
use super::{rules, CmdMessage};
use crate::error::{Result, ShelfError};
use crate::i18n::{self, Text};
use crate::model::{default_category_color, Category, CategoryStatus, Provenance};
use crate::store::{Catalog, StorageBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictResolution {
    #[default]
    Skip,
    Overwrite,
    Rename,
}

impl fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConflictResolution::Skip => "skip",
            ConflictResolution::Overwrite => "overwrite",
            ConflictResolution::Rename => "rename",
        };
        f.write_str(name)
    }
}

impl FromStr for ConflictResolution {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(ConflictResolution::Skip),
            "overwrite" => Ok(ConflictResolution::Overwrite),
            "rename" => Ok(ConflictResolution::Rename),
            other => Err(format!(
                "Unknown conflict resolution '{}' (expected skip, overwrite or rename)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub format: ExportFormat,
    pub conflict_resolution: ConflictResolution,
    /// Reject categories whose parent is not in the catalog.
    pub validate_hierarchy: bool,
    pub import_rules: bool,
    /// Locale of the rename suffix.
    pub locale: String,
    /// Recorded in `metadata.importedFrom.source`.
    pub source: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Json,
            conflict_resolution: ConflictResolution::Skip,
            validate_hierarchy: true,
            import_rules: false,
            locale: "de".to_string(),
            source: "import".to_string(),
        }
    }
}

/// One rejected row, rule or category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportError {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
    pub rules_imported: usize,
    pub rules_skipped: usize,
    /// Ids of incoming rules that repeat an existing condition.
    pub duplicate_rules: Vec<String>,
    #[serde(skip)]
    pub messages: Vec<CmdMessage>,
}

impl ImportReport {
    pub(crate) fn error(&mut self, id: impl Into<String>, error: impl Into<String>) {
        let id = id.into();
        let error = error.into();
        tracing::warn!(id = %id, error = %error, "import rejected entry");
        self.errors.push(ImportError { id, error });
    }
}

pub fn run<B: StorageBackend>(
    catalog: &mut Catalog<B>,
    data: &str,
    options: &ImportOptions,
) -> Result<ImportReport> {
    let report = match options.format {
        ExportFormat::Json => import_json(catalog, data, options)?,
        ExportFormat::Csv => import_csv(catalog, data, options)?,
    };
    tracing::debug!(
        imported = report.imported,
        skipped = report.skipped,
        errors = report.errors.len(),
        rules = report.rules_imported,
        "import finished"
    );
    Ok(report)
}

// --- JSON ---

fn import_json<B: StorageBackend>(
    catalog: &mut Catalog<B>,
    data: &str,
    options: &ImportOptions,
) -> Result<ImportReport> {
    let doc: Value = serde_json::from_str(data)
        .map_err(|e| ShelfError::InvalidDocument(format!("not valid JSON: {}", e)))?;
    let categories = doc
        .get("categories")
        .and_then(Value::as_array)
        .ok_or_else(|| ShelfError::InvalidDocument("missing 'categories' array".to_string()))?;

    let raw_rules = match doc.get("rules") {
        _ if !options.import_rules => None,
        None | Some(Value::Null) => None,
        Some(Value::Array(list)) => Some(list),
        Some(_) => {
            return Err(ShelfError::InvalidDocument(
                "'rules' must be an array".to_string(),
            ))
        }
    };

    let mut session = Session::new(options);
    if let Some(list) = raw_rules {
        session.import_rules(catalog, list);
    }

    for (index, raw) in categories.iter().enumerate() {
        let label = raw
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", index));

        let mut incoming = match serde_json::from_value::<Category>(raw.clone()) {
            Ok(cat) => cat,
            Err(e) => {
                session.report.error(label, format!("malformed category: {}", e));
                continue;
            }
        };
        if incoming.id.trim().is_empty() || incoming.name.trim().is_empty() {
            session.report.error(label, "category needs an id and a name");
            continue;
        }
        if incoming.color.trim().is_empty() {
            incoming.color = default_category_color(&incoming.name);
        }
        session.place(catalog, incoming);
    }

    Ok(session.finish(catalog))
}

// --- CSV ---

fn import_csv<B: StorageBackend>(
    catalog: &mut Catalog<B>,
    data: &str,
    options: &ImportOptions,
) -> Result<ImportReport> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    if reader.headers()?.is_empty() {
        return Err(ShelfError::InvalidDocument("CSV header is empty".to_string()));
    }

    let mut session = Session::new(options);
    for (index, record) in reader.records().enumerate() {
        // header is line 1
        let label = format!("row {}", index + 2);
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                session.report.error(label, e.to_string());
                continue;
            }
        };
        match category_from_row(catalog, &record, options.conflict_resolution) {
            Ok(cat) => session.place(catalog, cat),
            Err(msg) => {
                let id = record
                    .get(0)
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_string)
                    .unwrap_or(label);
                session.report.error(id, msg);
            }
        }
    }

    Ok(session.finish(catalog))
}

/// Columns: id, name, color, icon, parentCategory, level, tags, status.
/// `level` is recomputed, so its value is ignored.
fn category_from_row<B: StorageBackend>(
    catalog: &Catalog<B>,
    record: &csv::StringRecord,
    policy: ConflictResolution,
) -> std::result::Result<Category, String> {
    let field = |i: usize| record.get(i).unwrap_or_default();
    // Only a blank cell means "none"; anything else is kept as written.
    let optional = |i: usize| Some(field(i)).filter(|s| !s.trim().is_empty()).map(str::to_string);

    let id = field(0);
    let name = field(1);
    if id.trim().is_empty() {
        return Err("missing id".to_string());
    }
    if name.trim().is_empty() {
        return Err("missing name".to_string());
    }
    let status = match field(7).trim() {
        "" => CategoryStatus::Active,
        raw => raw.parse::<CategoryStatus>()?,
    };
    let tags: Vec<String> = match field(6) {
        "" => Vec::new(),
        raw => raw.split(TAG_SEPARATOR).map(str::to_string).collect(),
    };

    let mut cat = match catalog.category(id) {
        Some(existing) if policy == ConflictResolution::Overwrite => {
            let mut merged = existing.clone();
            merged.touch();
            merged
        }
        _ => {
            let mut fresh = Category::new(name);
            fresh.id = id.to_string();
            fresh
        }
    };
    cat.name = name.to_string();
    cat.color = optional(2).unwrap_or_else(|| default_category_color(name));
    cat.icon = optional(3);
    cat.parent_category = optional(4);
    cat.tags = tags;
    cat.status = status;
    Ok(cat)
}

// --- Shared placement ---

struct Session<'o> {
    options: &'o ImportOptions,
    report: ImportReport,
    /// Incoming id -> id it was stored under (rename policy).
    renamed: HashMap<String, String>,
    now: DateTime<Utc>,
}

impl<'o> Session<'o> {
    fn new(options: &'o ImportOptions) -> Self {
        Self {
            options,
            report: ImportReport::default(),
            renamed: HashMap::new(),
            now: Utc::now(),
        }
    }

    fn place<B: StorageBackend>(&mut self, catalog: &mut Catalog<B>, mut cat: Category) {
        let incoming = cat.id.clone();
        let mut renamed_to = None;
        if let Some(parent) = cat.parent_category.as_ref().and_then(|p| self.renamed.get(p)) {
            cat.parent_category = Some(parent.clone());
        }

        if catalog.contains(&cat.id) {
            match self.options.conflict_resolution {
                ConflictResolution::Skip => {
                    self.report.skipped += 1;
                    return;
                }
                ConflictResolution::Overwrite => {}
                ConflictResolution::Rename => {
                    cat.id = renamed_id(|id| catalog.contains(id), &incoming, self.now);
                    cat.name = format!(
                        "{} {}",
                        cat.name,
                        i18n::text(&self.options.locale, Text::ImportedSuffix)
                    );
                    renamed_to = Some(cat.id.clone());
                }
            }
        }

        if self.options.validate_hierarchy {
            if let Some(parent) = &cat.parent_category {
                if !catalog.contains(parent) {
                    self.report
                        .error(incoming, format!("Parent category not found: {}", parent));
                    return;
                }
            }
        }

        cat.metadata.imported_from = Some(Provenance {
            source: self.options.source.clone(),
            imported_at: self.now,
        });
        catalog.categories.insert(cat.id.clone(), cat);
        self.report.imported += 1;
        // Later children follow only a parent that actually landed.
        if let Some(new_id) = renamed_to {
            self.renamed.insert(incoming, new_id);
        }
    }

    fn import_rules<B: StorageBackend>(&mut self, catalog: &mut Catalog<B>, list: &[Value]) {
        let mut changed = false;

        for (index, raw) in list.iter().enumerate() {
            let incoming_id = raw.get("id").and_then(Value::as_str).map(str::to_string);
            let label = incoming_id.clone().unwrap_or_else(|| format!("rule #{}", index));

            let valid = match RuleDraft::from_value(raw).and_then(|d| rules::validate(&d)) {
                Ok(v) => v,
                Err(e) => {
                    self.report.error(label, e.to_string());
                    continue;
                }
            };
            let created_at = raw
                .get("createdAt")
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or(self.now);
            let mut rule = valid.into_rule(
                incoming_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                created_at,
            );

            if catalog.rules().iter().any(|existing| existing.same_condition(&rule)) {
                self.report.duplicate_rules.push(rule.id.clone());
                self.report.rules_skipped += 1;
                continue;
            }

            let id_taken = catalog.rule(&rule.id).is_some();
            if id_taken {
                match self.options.conflict_resolution {
                    ConflictResolution::Skip => {
                        self.report.rules_skipped += 1;
                        continue;
                    }
                    ConflictResolution::Overwrite => {
                        if let Ok(slot) = catalog.rule_mut(&rule.id) {
                            *slot = rule;
                        }
                        self.report.rules_imported += 1;
                        changed = true;
                        continue;
                    }
                    ConflictResolution::Rename => {
                        rule.id = renamed_id(|id| catalog.rule(id).is_some(), &rule.id, self.now);
                    }
                }
            }

            catalog.rules.push(rule);
            self.report.rules_imported += 1;
            changed = true;
        }

        if !self.report.duplicate_rules.is_empty() {
            self.report.messages.push(CmdMessage::info(format!(
                "{} duplicate rule(s) skipped",
                self.report.duplicate_rules.len()
            )));
        }
        if changed {
            catalog.persist_rules();
        }
    }

    fn finish<B: StorageBackend>(mut self, catalog: &mut Catalog<B>) -> ImportReport {
        if self.report.imported > 0 {
            for cycle in rebuild_hierarchy(&mut catalog.categories) {
                let msg = format!(
                    "Parent '{}' would make this category its own ancestor; moved to root",
                    cycle.parent
                );
                self.report
                    .messages
                    .push(CmdMessage::error(format!("{}: {}", cycle.id, msg)));
                self.report.error(cycle.id, msg);
            }
            catalog.persist_categories();
        }
        self.report
    }
}

/// `<id>_imported_<millis>`, with a counter if even that is taken.
pub(crate) fn renamed_id(
    taken: impl Fn(&str) -> bool,
    id: &str,
    now: DateTime<Utc>,
) -> String {
    let base = format!("{}_imported_{}", id, now.timestamp_millis());
    if !taken(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::export::{self, ExportOptions};
    use crate::commands::rules::ConditionDraft;
    use crate::commands::MessageLevel;
    use crate::store::memory::fixtures::CatalogFixture;
    use crate::store::memory::InMemoryCatalog;
    use serde_json::json;

    fn fixture() -> CatalogFixture {
        CatalogFixture::new()
            .with_root("Lebensmittel")
            .with_child("Milchprodukte", "Lebensmittel")
            .with_child("Käse", "Milchprodukte")
            .with_root("Haushalt")
    }

    fn json_options(policy: ConflictResolution) -> ImportOptions {
        ImportOptions {
            conflict_resolution: policy,
            ..Default::default()
        }
    }

    #[test]
    fn test_skip_reimport_changes_nothing() {
        let mut f = fixture();
        let exported = export::run(&f.catalog, &ExportOptions::default()).unwrap();
        let before = f.catalog.categories_snapshot().unwrap();

        let report =
            run(&mut f.catalog, &exported, &json_options(ConflictResolution::Skip)).unwrap();

        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped, 4);
        assert!(report.errors.is_empty());
        assert_eq!(f.catalog.categories_snapshot().unwrap(), before);
    }

    #[test]
    fn test_import_into_empty_catalog() {
        let f = fixture();
        let exported = export::run(&f.catalog, &ExportOptions::default()).unwrap();

        let mut target = InMemoryCatalog::new();
        let report = run(&mut target, &exported, &ImportOptions::default()).unwrap();

        assert_eq!(report.imported, 4);
        let kaese = target.require(&f.id("Käse")).unwrap();
        assert_eq!(kaese.level, 2);
        assert_eq!(
            kaese.path,
            vec![f.id("Lebensmittel"), f.id("Milchprodukte")]
        );
        assert_eq!(kaese.metadata.imported_from.as_ref().unwrap().source, "import");
    }

    #[test]
    fn test_missing_categories_array_is_fatal() {
        let mut catalog = InMemoryCatalog::new();
        let res = run(&mut catalog, r#"{"version":"1.0"}"#, &ImportOptions::default());
        assert!(matches!(res, Err(ShelfError::InvalidDocument(_))));

        let res = run(&mut catalog, "not json", &ImportOptions::default());
        assert!(matches!(res, Err(ShelfError::InvalidDocument(_))));
    }

    #[test]
    fn test_missing_parent_rejects_only_that_category() {
        let mut catalog = InMemoryCatalog::new();
        let doc = json!({
            "version": "1.0",
            "categories": [
                {"id": "a", "name": "Obst"},
                {"id": "b", "name": "Äpfel", "parentCategory": "ghost"},
                {"id": "c", "name": "Birnen", "parentCategory": "a"},
                {"name": "ohne id"}
            ]
        });

        let report = run(&mut catalog, &doc.to_string(), &ImportOptions::default()).unwrap();

        assert_eq!(report.imported, 2);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].id, "b");
        assert!(report.errors[0].error.contains("ghost"));
        assert_eq!(report.errors[1].id, "#3");
        assert_eq!(catalog.require("a").unwrap().sub_categories, vec!["c"]);
    }

    #[test]
    fn test_overwrite_replaces() {
        let mut f = fixture();
        let id = f.id("Haushalt");
        let doc = json!({
            "categories": [{"id": id, "name": "Drogerie", "color": "#000000"}]
        });

        let report = run(
            &mut f.catalog,
            &doc.to_string(),
            &json_options(ConflictResolution::Overwrite),
        )
        .unwrap();

        assert_eq!(report.imported, 1);
        let cat = f.catalog.require(&id).unwrap();
        assert_eq!(cat.name, "Drogerie");
        assert_eq!(cat.color, "#000000");
    }

    #[test]
    fn test_rename_keeps_both_and_follows_parent() {
        let mut f = fixture();
        let exported = export::run(&f.catalog, &ExportOptions::default()).unwrap();

        let options = ImportOptions {
            conflict_resolution: ConflictResolution::Rename,
            locale: "en".to_string(),
            ..Default::default()
        };
        let report = run(&mut f.catalog, &exported, &options).unwrap();

        assert_eq!(report.imported, 4);
        assert_eq!(f.catalog.len(), 8);

        let copy = f
            .catalog
            .categories()
            .find(|c| c.name == "Milchprodukte (Imported)")
            .unwrap();
        assert!(copy.id.starts_with(&format!("{}_imported_", f.id("Milchprodukte"))));
        let parent = f.catalog.require(copy.parent_category.as_ref().unwrap()).unwrap();
        assert_eq!(parent.name, "Lebensmittel (Imported)");
    }

    #[test]
    fn test_rename_rejected_parent_leaves_children_on_original() {
        let mut f = CatalogFixture::new()
            .with_root("Obst")
            .with_child("Äpfel", "Obst");
        let (p, c) = (f.id("Obst"), f.id("Äpfel"));
        let doc = json!({
            "categories": [
                {"id": p, "name": "Obst", "parentCategory": "ghost"},
                {"id": c, "name": "Äpfel", "parentCategory": p}
            ]
        });

        let report = run(
            &mut f.catalog,
            &doc.to_string(),
            &json_options(ConflictResolution::Rename),
        )
        .unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].id, p);
        assert!(report.errors[0].error.contains("ghost"));

        let copy = f
            .catalog
            .categories()
            .find(|cat| cat.id.starts_with(&format!("{}_imported_", c)))
            .unwrap();
        assert_eq!(copy.parent_category.as_deref(), Some(p.as_str()));
        assert!(f.catalog.require(&p).unwrap().sub_categories.contains(&copy.id));
    }

    #[test]
    fn test_rename_suffix_defaults_to_german() {
        let mut f = CatalogFixture::new().with_root("Obst");
        let id = f.id("Obst");
        let doc = json!({"categories": [{"id": id, "name": "Obst"}]});

        run(
            &mut f.catalog,
            &doc.to_string(),
            &json_options(ConflictResolution::Rename),
        )
        .unwrap();

        assert!(f.catalog.categories().any(|c| c.name == "Obst (Importiert)"));
    }

    #[test]
    fn test_cycle_in_document_is_cut() {
        let mut catalog = InMemoryCatalog::new();
        let doc = json!({
            "categories": [
                {"id": "a", "name": "A", "parentCategory": "b"},
                {"id": "b", "name": "B", "parentCategory": "a"}
            ]
        });
        let options = ImportOptions {
            validate_hierarchy: false,
            ..Default::default()
        };

        let report = run(&mut catalog, &doc.to_string(), &options).unwrap();

        assert_eq!(report.imported, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report
                .messages
                .iter()
                .filter(|m| m.level == MessageLevel::Error)
                .count(),
            1
        );
        for cat in catalog.categories() {
            assert!(!cat.path.contains(&cat.id));
            assert_eq!(cat.level, cat.path.len());
        }
    }

    #[test]
    fn test_rules_are_validated_and_deduplicated() {
        let mut catalog = InMemoryCatalog::new();
        rules::add(
            &mut catalog,
            RuleDraft::new("milk", ConditionDraft::new("contains", "milch")),
        )
        .unwrap();

        let doc = json!({
            "categories": [],
            "rules": [
                {"id": "r1", "name": "dup", "condition": {"field": "name", "operator": "contains", "value": "milch"}},
                {"id": "r2", "name": "bad", "condition": {"field": "name", "operator": "like", "value": "x"}},
                {"id": "r3", "name": "neg", "condition": {"field": "name", "operator": "contains", "value": "x"}, "priority": -2},
                {"id": "r4", "name": "ok", "condition": {"field": "name", "operator": "regex", "value": "^brot"}, "priority": 3}
            ]
        });
        let options = ImportOptions {
            import_rules: true,
            ..Default::default()
        };

        let report = run(&mut catalog, &doc.to_string(), &options).unwrap();

        assert_eq!(report.rules_imported, 1);
        assert_eq!(report.duplicate_rules, vec!["r1"]);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(catalog.rules().len(), 2);
        assert_eq!(catalog.rule("r4").unwrap().priority, 3);
    }

    #[test]
    fn test_rules_ignored_unless_requested() {
        let mut catalog = InMemoryCatalog::new();
        let doc = json!({
            "categories": [],
            "rules": [{"id": "r", "condition": {"operator": "contains", "value": "x"}}]
        });
        let report = run(&mut catalog, &doc.to_string(), &ImportOptions::default()).unwrap();
        assert_eq!(report.rules_imported, 0);
        assert!(catalog.rules().is_empty());
    }

    #[test]
    fn test_csv_round_trip_with_overwrite() {
        let mut f = fixture();
        let id = f.id("Haushalt");
        {
            let cat = f.catalog.require_mut(&id).unwrap();
            cat.name = "Haushalt, \"Putzen\"".to_string();
            cat.tags = vec!["reinigung".into(), "küche, bad".into()];
            cat.icon = Some("🧽".into());
        }
        let before: Vec<Category> = f.catalog.categories().cloned().collect();

        let csv_out = export::run(
            &f.catalog,
            &ExportOptions {
                format: ExportFormat::Csv,
                ..Default::default()
            },
        )
        .unwrap();
        let options = ImportOptions {
            format: ExportFormat::Csv,
            conflict_resolution: ConflictResolution::Overwrite,
            ..Default::default()
        };
        let report = run(&mut f.catalog, &csv_out, &options).unwrap();

        assert_eq!(report.imported, 4);
        assert_eq!(report.skipped, 0);
        assert!(report.errors.is_empty());
        for old in &before {
            let new = f.catalog.require(&old.id).unwrap();
            assert_eq!(new.name, old.name);
            assert_eq!(new.color, old.color);
            assert_eq!(new.icon, old.icon);
            assert_eq!(new.parent_category, old.parent_category);
            assert_eq!(new.level, old.level);
            assert_eq!(new.tags, old.tags);
            assert_eq!(new.status, old.status);
        }
    }

    #[test]
    fn test_csv_keeps_json_imported_values_verbatim() {
        let mut catalog = InMemoryCatalog::new();
        let doc = json!({
            "categories": [
                {"id": "o", "name": " Obst ", "icon": " 🍎", "tags": ["x", "x", " y"]}
            ]
        });
        run(&mut catalog, &doc.to_string(), &ImportOptions::default()).unwrap();
        let before = catalog.require("o").unwrap().clone();

        let csv_out = export::run(
            &catalog,
            &ExportOptions {
                format: ExportFormat::Csv,
                ..Default::default()
            },
        )
        .unwrap();
        let options = ImportOptions {
            format: ExportFormat::Csv,
            conflict_resolution: ConflictResolution::Overwrite,
            ..Default::default()
        };
        let report = run(&mut catalog, &csv_out, &options).unwrap();

        assert_eq!(report.imported, 1);
        let after = catalog.require("o").unwrap();
        assert_eq!(after.name, " Obst ");
        assert_eq!(after.icon, before.icon);
        assert_eq!(after.tags, vec!["x", "x", " y"]);
        assert_eq!(after.color, before.color);
    }

    #[test]
    fn test_csv_bad_rows_are_reported() {
        let mut catalog = InMemoryCatalog::new();
        let data = "id,name,color,icon,parentCategory,level,tags,status\n\
                    a,Obst,,,,0,,active\n\
                    b,,,,,0,,active\n\
                    c,Gemüse,,,,0,,deleted\n";
        let options = ImportOptions {
            format: ExportFormat::Csv,
            ..Default::default()
        };

        let report = run(&mut catalog, data, &options).unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].id, "b");
        assert_eq!(report.errors[1].id, "c");
        assert!(!catalog.require("a").unwrap().color.is_empty());
    }

    #[test]
    fn test_renamed_id_avoids_taken_ids() {
        let now = Utc::now();
        let base = format!("x_imported_{}", now.timestamp_millis());
        let taken = base.clone();
        let id = renamed_id(|id| id == taken, "x", now);
        assert_eq!(id, format!("{}_2", base));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "Overwrite".parse::<ConflictResolution>(),
            Ok(ConflictResolution::Overwrite)
        );
        assert!("merge".parse::<ConflictResolution>().is_err());
    }
}
