use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ShelfError};
use crate::model::{Category, CategoryRule};
use crate::store::{Catalog, StorageBackend};

pub const EXPORT_VERSION: &str = "1.0";

/// Column order of the CSV format. Existing files depend on it.
pub const CSV_COLUMNS: [&str; 8] = [
    "id",
    "name",
    "color",
    "icon",
    "parentCategory",
    "level",
    "tags",
    "status",
];

pub const TAG_SEPARATOR: char = ';';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => f.write_str("json"),
            ExportFormat::Csv => f.write_str("csv"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("Unknown format '{}' (expected json or csv)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Keep each category's `metadata` object (JSON only).
    pub include_metadata: bool,
    /// Add the rule list (JSON only).
    pub include_rules: bool,
    pub include_archived: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Json,
            include_metadata: true,
            include_rules: false,
            include_archived: true,
        }
    }
}

/// The JSON export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub categories: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<CategoryRule>>,
}

/// Serialize the catalog in the requested format.
pub fn run<B: StorageBackend>(catalog: &Catalog<B>, options: &ExportOptions) -> Result<String> {
    let output = match options.format {
        ExportFormat::Json => {
            let doc = document(catalog, options)?;
            serde_json::to_string_pretty(&doc)?
        }
        ExportFormat::Csv => to_csv(&ordered(catalog, options.include_archived))?,
    };
    tracing::debug!(format = %options.format, bytes = output.len(), "exported categories");
    Ok(output)
}

pub fn document<B: StorageBackend>(
    catalog: &Catalog<B>,
    options: &ExportOptions,
) -> Result<ExportDocument> {
    let categories = ordered(catalog, options.include_archived)
        .into_iter()
        .map(|cat| -> Result<Value> {
            let mut value = serde_json::to_value(cat)?;
            if !options.include_metadata {
                if let Some(obj) = value.as_object_mut() {
                    obj.remove("metadata");
                }
            }
            Ok(value)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ExportDocument {
        version: EXPORT_VERSION.to_string(),
        export_date: Utc::now(),
        categories,
        rules: options.include_rules.then(|| catalog.rules().to_vec()),
    })
}

/// Parents before children: by level, then creation time, then id.
pub fn ordered<B: StorageBackend>(catalog: &Catalog<B>, include_archived: bool) -> Vec<&Category> {
    let mut cats: Vec<&Category> = catalog
        .categories()
        .filter(|c| include_archived || c.is_active())
        .collect();
    cats.sort_by(|a, b| {
        a.level
            .cmp(&b.level)
            .then(a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    cats
}

pub fn to_csv(categories: &[&Category]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(CSV_COLUMNS)?;
    for cat in categories {
        let level = cat.level.to_string();
        let tags = cat.tags.join(&TAG_SEPARATOR.to_string());
        writer.write_record([
            cat.id.as_str(),
            cat.name.as_str(),
            cat.color.as_str(),
            cat.icon.as_deref().unwrap_or_default(),
            cat.parent_category.as_deref().unwrap_or_default(),
            level.as_str(),
            tags.as_str(),
            cat.status.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ShelfError::Io(std::io::Error::new(e.error().kind(), e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| ShelfError::InvalidDocument(e.to_string()))
}
