use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    #[error("Cannot move category '{id}' under '{parent}': it would become its own ancestor")]
    Cycle { id: String, parent: String },

    #[error("Product not found in purchase history: {0}")]
    ProductNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, ShelfError>;
