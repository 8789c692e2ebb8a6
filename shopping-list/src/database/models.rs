//! Database models
//!
//! Rust structs representing database entities.
//! All models use serde for serialization to a front end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An item on the shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub quantity: i64,
    pub completed: bool,
    /// Manual sort position, rewritten 0..N-1 on every reorder
    #[sqlx(rename = "sort_order")]
    pub order: i64,
    pub created_at: DateTime<Utc>,
}

/// Create task request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub quantity: i64,
}

/// Update task request; `None` fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub id: String,
    pub title: Option<String>,
    pub quantity: Option<i64>,
    pub completed: Option<bool>,
}

impl UpdateTaskRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.quantity.is_none() && self.completed.is_none()
    }
}

/// A frequently added title offered back to the user as a chip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SuggestedItem {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Addition counter for one normalized title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SuggestionHistory {
    pub id: String,
    pub title: String,
    pub count: i64,
}
