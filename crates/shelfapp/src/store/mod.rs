//! # Storage Layer
//!
//! The catalog keeps three JSON documents in a key/value store:
//!
//! | Key | Content |
//! |-----|---------|
//! | `categories` | object: category id → [`Category`](crate::model::Category) |
//! | `category_rules` | array of [`CategoryRule`](crate::model::CategoryRule), insertion order |
//! | `shopping_history` | object: normalized product name → ledger entry |
//!
//! ## Split of Responsibilities
//!
//! - [`backend::StorageBackend`]: raw `get_item`/`set_item`. Knows nothing about
//!   categories.
//! - [`catalog::Catalog`]: owns the in-memory maps, decides which document to
//!   write after a mutation.
//!
//! ## Write Failures
//!
//! Mutations update memory first and then persist. A failing write is logged and
//! the in-memory change stays in place; there is no retry and no rollback. Use
//! [`catalog::Catalog::save_all`] to re-attempt and observe the error.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: one `<key>.json` file per document, atomic writes.
//! - [`mem_backend::MemBackend`]: for testing logic without filesystem I/O.

pub mod backend;
pub mod catalog;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;

pub use backend::StorageBackend;
pub use catalog::Catalog;

/// Storage keys for the catalog documents.
pub mod keys {
    pub const CATEGORIES: &str = "categories";
    pub const RULES: &str = "category_rules";
    pub const HISTORY: &str = "shopping_history";
}
