//! # Command Layer
//!
//! Each operation on the catalog lives in its own submodule as plain functions
//! taking `&mut Catalog<B>` (or `&Catalog<B>` for reads). Commands:
//!
//! - validate input and return [`crate::error::ShelfError`] on violations, leaving
//!   the catalog untouched
//! - mutate the in-memory maps and persist the affected document once
//! - never print, prompt or exit; rendering belongs to the client
//!
//! ## Testing Strategy
//!
//! Most tests live here. Every module has a `tests` submodule that runs against
//! [`crate::store::memory::InMemoryCatalog`], so no filesystem is involved.
//!
//! ## Modules
//!
//! - [`create`], [`move_category`], [`archive`], [`update`]: the taxonomy
//! - [`rules`]: rule validation, matching and assignment
//! - [`purchases`]: the purchase ledger
//! - [`suggest`]: weighted category suggestions
//! - [`export`], [`import`]: JSON and CSV transport
//! - [`template`]: multi-language category templates
//! - [`helpers`]: tree walks shared by the above

use serde::Serialize;

pub mod archive;
pub mod create;
pub mod export;
pub mod helpers;
pub mod import;
pub mod move_category;
pub mod purchases;
pub mod rules;
pub mod suggest;
pub mod template;
pub mod update;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-facing note produced by a command (import warnings and the like).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    fn at(level: MessageLevel, content: impl Into<String>) -> Self {
        Self {
            level,
            content: content.into(),
        }
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self::at(MessageLevel::Info, content)
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::at(MessageLevel::Success, content)
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self::at(MessageLevel::Warning, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::at(MessageLevel::Error, content)
    }
}
