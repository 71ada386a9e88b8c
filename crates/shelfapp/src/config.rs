//! # Configuration
//!
//! Settings are loaded with [`confique`] from, in priority order:
//!
//! 1. **Environment variables**: `SHELF_LOCALE`, `SHELF_DATA_DIR`, ...
//! 2. **Config file**: `--config <path>`, else `shelf.toml` in the OS config
//!    directory (via `directories`).
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data dir | Where the catalog documents are stored |
//! | `locale` | `de` | Locale for generated strings (rename suffix, "unknown") |
//! | `fallback_locale` | `en` | Second choice when importing templates |
//! | `conflict_resolution` | `skip` | Default import policy: `skip`, `overwrite`, `rename` |
//! | `validate_hierarchy` | `true` | Reject imported categories with a missing parent |

use std::path::{Path, PathBuf};

use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::commands::export::ExportFormat;
use crate::commands::import::{ConflictResolution, ImportOptions};
use crate::commands::template::TemplateImportOptions;
use crate::error::{Result, ShelfError};

pub const CONFIG_FILE_NAME: &str = "shelf.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShelfConfig {
    /// Directory for the catalog documents.
    #[config(env = "SHELF_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[config(default = "de", env = "SHELF_LOCALE")]
    pub locale: String,

    #[config(default = "en", env = "SHELF_FALLBACK_LOCALE")]
    pub fallback_locale: String,

    #[config(default = "skip", env = "SHELF_CONFLICT_RESOLUTION")]
    pub conflict_resolution: ConflictResolution,

    #[config(default = true, env = "SHELF_VALIDATE_HIERARCHY")]
    pub validate_hierarchy: bool,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            locale: "de".to_string(),
            fallback_locale: "en".to_string(),
            conflict_resolution: ConflictResolution::Skip,
            validate_hierarchy: true,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "shelf")
}

impl ShelfConfig {
    /// Load from the environment and `path`, or from the default config file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path.map(Path::to_path_buf).or_else(Self::default_path);
        let mut builder = Self::builder().env();
        if let Some(file) = &file {
            builder = builder.file(file);
        }
        builder
            .load()
            .map_err(|e| ShelfError::Config(e.to_string()))
    }

    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Configured data directory, else the OS data directory, else `./.shelf`.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from(".shelf"))
    }

    /// Import options seeded from the configured defaults.
    pub fn import_options(&self, format: ExportFormat) -> ImportOptions {
        ImportOptions {
            format,
            conflict_resolution: self.conflict_resolution,
            validate_hierarchy: self.validate_hierarchy,
            locale: self.locale.clone(),
            ..Default::default()
        }
    }

    pub fn template_import_options(&self) -> TemplateImportOptions {
        TemplateImportOptions {
            target_language: self.locale.clone(),
            fallback_language: self.fallback_locale.clone(),
            ..Default::default()
        }
    }
}
