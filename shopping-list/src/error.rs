//! Error types for the shopping list core
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to a front end as plain messages.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Suggestion not found: {0}")]
    SuggestionNotFound(String),

    #[error("Task store is not open")]
    StoreNotOpen,

    #[error("Title must not be empty")]
    InvalidTitle,

    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    #[error("Position {index} is out of range for a list of {len} items")]
    InvalidPosition { index: usize, len: usize },

    #[error("Free tier is limited to {0} items")]
    FreeTierLimit(usize),
}

impl AppError {
    /// True for errors caused by referencing an id that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::TaskNotFound(_) | AppError::SuggestionNotFound(_)
        )
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
