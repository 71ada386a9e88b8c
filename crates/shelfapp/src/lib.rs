//! # shelfapp
//!
//! The category engine behind a shopping-list app: a hierarchical taxonomy of
//! categories, text rules that classify product names, a purchase ledger that
//! drives category suggestions, and JSON/CSV/template import and export.
//!
//! ## Architecture
//!
//! ```text
//! Client (CLI, app)     parses input, renders output
//!     │
//! api::ShelfApi         one method per operation
//!     │
//! commands::*           the operations themselves
//!     │
//! store::Catalog        in-memory maps, persisted per document
//!     │
//! StorageBackend        get_item / set_item (file or memory)
//! ```
//!
//! The library never prints and never exits. Every operation returns a
//! [`error::Result`]; logging goes through `tracing` and is up to the client to
//! collect.
//!
//! ## Quick Start
//!
//! ```
//! use shelfapp::api::ShelfApi;
//! use shelfapp::config::ShelfConfig;
//! use shelfapp::model::CategoryDraft;
//! use shelfapp::store::mem_backend::MemBackend;
//!
//! let mut api = ShelfApi::open(MemBackend::new(), ShelfConfig::default()).unwrap();
//! let food = api.create_category(CategoryDraft::new("Lebensmittel")).unwrap();
//! let dairy = api
//!     .create_category(CategoryDraft::new("Milchprodukte").with_parent(&food.id))
//!     .unwrap();
//! assert_eq!(dairy.path, vec![food.id.clone()]);
//!
//! api.add_purchase("Bio-Milch 1L", Some(&dairy.id)).unwrap();
//! let suggestion = api.suggest_category("Bio-Milch 1L").unwrap();
//! assert_eq!(suggestion.suggested_category, dairy.id);
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod i18n;
pub mod model;
pub mod similarity;
pub mod store;
