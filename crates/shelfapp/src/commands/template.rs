//! Portable multi-language category templates.
//!
//! A template carries names and descriptions as `locale -> text` maps so one
//! file can seed catalogs in several languages. Exports only know the catalog's
//! own language, so they seed the default language; richer maps come from
//! hand-edited or previously imported templates.
//!
//! Importing never collides with existing ids: every category gets a fresh id
//! and `parentCategory` references inside the template are remapped. A parent
//! id that is neither in the template nor in the catalog becomes a root, with a
//! warning.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::create;
use super::import::ImportReport;
use super::CmdMessage;
use crate::error::{Result, ShelfError};
use crate::i18n::{self, Text};
use crate::model::{Category, CategoryDraft, Provenance, Translation};
use crate::store::{Catalog, StorageBackend};

pub const TEMPLATE_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOptions {
    pub languages: Vec<String>,
    pub default_language: String,
    /// Carry custom fields and stored translations along.
    pub include_metadata: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            languages: vec!["de".to_string(), "en".to_string()],
            default_language: "de".to_string(),
            include_metadata: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub default_language: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCategoryMetadata {
    #[serde(default)]
    pub translations: BTreeMap<String, Translation>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom_fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCategory {
    pub id: String,
    #[serde(default)]
    pub name: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub description: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: TemplateCategoryMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTemplate {
    pub version: String,
    pub categories: Vec<TemplateCategory>,
    pub metadata: TemplateMetadata,
}

/// Build a template from the given categories, or from all when `ids` is empty.
pub fn export<B: StorageBackend>(
    catalog: &Catalog<B>,
    ids: &[String],
    options: &TemplateOptions,
) -> Result<CategoryTemplate> {
    let mut selected: Vec<&Category> = if ids.is_empty() {
        catalog.categories().collect()
    } else {
        ids.iter()
            .map(|id| catalog.require(id))
            .collect::<Result<_>>()?
    };
    selected.sort_by(|a, b| {
        a.level
            .cmp(&b.level)
            .then(a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    selected.dedup_by(|a, b| a.id == b.id);

    let lang = options.default_language.clone();
    let categories = selected
        .into_iter()
        .map(|cat| {
            let mut description = BTreeMap::new();
            if !cat.metadata.description.is_empty() {
                description.insert(lang.clone(), cat.metadata.description.clone());
            }
            let metadata = if options.include_metadata {
                TemplateCategoryMetadata {
                    translations: cat.metadata.translations.clone(),
                    custom_fields: cat.metadata.custom_fields.clone(),
                }
            } else {
                TemplateCategoryMetadata::default()
            };
            TemplateCategory {
                id: cat.id.clone(),
                name: BTreeMap::from([(lang.clone(), cat.name.clone())]),
                description,
                color: Some(cat.color.clone()),
                icon: cat.icon.clone(),
                parent_category: cat.parent_category.clone(),
                tags: cat.tags.clone(),
                metadata,
            }
        })
        .collect();

    let mut languages = options.languages.clone();
    if !languages.contains(&lang) {
        languages.insert(0, lang.clone());
    }

    Ok(CategoryTemplate {
        version: TEMPLATE_VERSION.to_string(),
        categories,
        metadata: TemplateMetadata {
            languages,
            default_language: lang,
            created_at: Utc::now(),
        },
    })
}

pub fn parse(data: &str) -> Result<CategoryTemplate> {
    serde_json::from_str(data)
        .map_err(|e| ShelfError::InvalidDocument(format!("not a category template: {}", e)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateImportOptions {
    pub target_language: String,
    pub fallback_language: String,
    pub source: String,
}

impl Default for TemplateImportOptions {
    fn default() -> Self {
        Self {
            target_language: "de".to_string(),
            fallback_language: "en".to_string(),
            source: "template".to_string(),
        }
    }
}

/// Text for `target`, else for `fallback`. Blank entries count as missing.
fn resolve<'a>(
    map: &'a BTreeMap<String, String>,
    target: &str,
    fallback: &str,
) -> Option<&'a str> {
    [target, fallback]
        .into_iter()
        .filter_map(|lang| map.get(lang))
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
}

/// Template ids ordered so that a parent inside the template precedes its children.
fn parents_first(template: &CategoryTemplate) -> Vec<&TemplateCategory> {
    let by_id: HashMap<&str, &TemplateCategory> = template
        .categories
        .iter()
        .map(|c| (c.id.as_str(), c))
        .collect();

    let depth = |start: &TemplateCategory| {
        let mut seen: HashSet<&str> = HashSet::from([start.id.as_str()]);
        let mut depth = 0usize;
        let mut current = start.parent_category.as_deref();
        while let Some(parent) = current.and_then(|id| by_id.get(id)) {
            if !seen.insert(parent.id.as_str()) {
                break;
            }
            depth += 1;
            current = parent.parent_category.as_deref();
        }
        depth
    };

    let mut ordered: Vec<(usize, &TemplateCategory)> =
        template.categories.iter().map(|c| (depth(c), c)).collect();
    ordered.sort_by_key(|(d, _)| *d);
    ordered.into_iter().map(|(_, c)| c).collect()
}

pub fn import<B: StorageBackend>(
    catalog: &mut Catalog<B>,
    template: &CategoryTemplate,
    options: &TemplateImportOptions,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    let target = options.target_language.as_str();
    let fallback = options.fallback_language.as_str();

    for lang in [target, fallback] {
        if !template.metadata.languages.iter().any(|l| l == lang) {
            tracing::warn!(language = lang, "language not declared by template");
            report.messages.push(CmdMessage::warning(format!(
                "Template does not declare language '{}'",
                lang
            )));
        }
    }

    let now = Utc::now();
    let mut id_map: HashMap<String, String> = HashMap::new();

    for entry in parents_first(template) {
        let Some(name) = resolve(&entry.name, target, fallback) else {
            let label = entry
                .name
                .values()
                .map(|s| s.trim())
                .find(|s| !s.is_empty())
                .unwrap_or_else(|| i18n::text(target, Text::Unknown))
                .to_string();
            report.messages.push(CmdMessage::warning(format!(
                "Skipped '{}': no name in '{}' or '{}'",
                label, target, fallback
            )));
            report.error(label, format!("no name in '{}' or '{}'", target, fallback));
            report.skipped += 1;
            continue;
        };

        let parent = match entry.parent_category.as_deref() {
            None => None,
            Some(p) => match id_map.get(p) {
                Some(mapped) => Some(mapped.clone()),
                None if catalog.contains(p) => Some(p.to_string()),
                None => {
                    report.messages.push(CmdMessage::warning(format!(
                        "'{}': parent '{}' not found, imported as root",
                        name, p
                    )));
                    None
                }
            },
        };

        let mut draft = CategoryDraft::new(name).with_tags(entry.tags.clone());
        draft.parent_category = parent;
        draft.color = entry.color.clone().filter(|c| !c.trim().is_empty());
        draft.icon = entry.icon.clone();
        draft.description = resolve(&entry.description, target, fallback)
            .unwrap_or_default()
            .to_string();

        let created = match create::insert(catalog, draft) {
            Ok(cat) => cat,
            Err(e) => {
                report.error(entry.id.clone(), e.to_string());
                continue;
            }
        };

        let cat = catalog.require_mut(&created.id)?;
        cat.metadata.translations = translations_of(entry);
        cat.metadata.custom_fields = entry.metadata.custom_fields.clone();
        cat.metadata.imported_from = Some(Provenance {
            source: options.source.clone(),
            imported_at: now,
        });

        id_map.insert(entry.id.clone(), created.id);
        report.imported += 1;
    }

    if report.imported > 0 {
        catalog.persist_categories();
    }
    tracing::debug!(
        imported = report.imported,
        skipped = report.skipped,
        "imported template"
    );
    Ok(report)
}

/// Per-locale name/description from the template maps, over any stored translations.
fn translations_of(entry: &TemplateCategory) -> BTreeMap<String, Translation> {
    let mut out = entry.metadata.translations.clone();
    for (lang, name) in &entry.name {
        out.entry(lang.clone()).or_default().name = Some(name.clone());
    }
    for (lang, description) in &entry.description {
        out.entry(lang.clone()).or_default().description = Some(description.clone());
    }
    out
}
