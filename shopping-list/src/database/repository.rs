//! Repository layer for database operations
//!
//! This module provides the queries behind the task store and the
//! suggestion tracker. Every multi-statement write runs in one transaction.

use super::models::*;
use crate::error::{AppError, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, title, quantity, completed, sort_order, created_at";

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Close the underlying pool; later queries fail with a pool error
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    // ===== Tasks =====

    /// Create a task at the end of the manual order
    pub async fn create_task(&self, req: CreateTaskRequest) -> Result<Task> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let next_order: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(sort_order), -1) + 1 FROM tasks")
                .fetch_one(&mut *tx)
                .await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (id, title, quantity, completed, sort_order, created_at)
            VALUES (?, ?, ?, 0, ?, ?)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(&id)
        .bind(&req.title)
        .bind(req.quantity)
        .bind(next_order)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!("Created task: {} at order {}", id, next_order);
        Ok(task)
    }

    /// Get a task by ID
    pub async fn get_task(&self, id: &str) -> Result<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::TaskNotFound(id.to_string()))?;

        Ok(task)
    }

    /// List all tasks in visible order: open first, then manual order, then title
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS} FROM tasks
            ORDER BY completed ASC, sort_order ASC, title ASC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    pub async fn count_tasks(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Apply a partial update; an empty request returns the stored task untouched
    pub async fn update_task(&self, req: UpdateTaskRequest) -> Result<Task> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"
        ))
        .bind(&req.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::TaskNotFound(req.id.clone()))?;

        if req.is_empty() {
            return Ok(current);
        }

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks SET title = ?, quantity = ?, completed = ?
            WHERE id = ?
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(req.title.as_deref().unwrap_or(&current.title))
        .bind(req.quantity.unwrap_or(current.quantity))
        .bind(req.completed.unwrap_or(current.completed))
        .bind(&req.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!("Updated task: {}", task.id);
        Ok(task)
    }

    /// Permanently delete a task
    pub async fn delete_task(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::TaskNotFound(id.to_string()));
        }

        tracing::debug!("Deleted task: {}", id);
        Ok(())
    }

    /// Delete every task, returning how many were removed
    pub async fn delete_all_tasks(&self) -> Result<u64> {
        let rows = sqlx::query("DELETE FROM tasks")
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!("Deleted all tasks ({} rows)", rows);
        Ok(rows)
    }

    /// Rewrite `sort_order` so each task's order equals its index in `ids`
    pub async fn renumber_tasks(&self, ids: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for (index, id) in ids.iter().enumerate() {
            sqlx::query("UPDATE tasks SET sort_order = ? WHERE id = ?")
                .bind(index as i64)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::debug!("Renumbered {} tasks", ids.len());
        Ok(())
    }

    // ===== Suggestions =====

    /// List suggested items in the order they were promoted
    pub async fn list_suggested_items(&self) -> Result<Vec<SuggestedItem>> {
        let items = sqlx::query_as::<_, SuggestedItem>(
            r#"
            SELECT id, title, created_at FROM suggested_items
            ORDER BY rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn list_suggestion_history(&self) -> Result<Vec<SuggestionHistory>> {
        let history = sqlx::query_as::<_, SuggestionHistory>(
            "SELECT id, title, count FROM suggestion_history ORDER BY title ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }

    /// Count one addition of `title` and promote it once the count passes
    /// `threshold`.
    ///
    /// `title` must already be normalized for display. Matching against
    /// existing records is case-insensitive. Returns the suggested item
    /// created by this call, if any.
    pub async fn record_suggestion(
        &self,
        title: &str,
        threshold: i64,
    ) -> Result<Option<SuggestedItem>> {
        let key = title.to_lowercase();
        let mut tx = self.pool.begin().await?;

        let history = sqlx::query_as::<_, SuggestionHistory>(
            "SELECT id, title, count FROM suggestion_history",
        )
        .fetch_all(&mut *tx)
        .await?;

        let Some(existing) = history.into_iter().find(|h| h.title.to_lowercase() == key) else {
            sqlx::query("INSERT INTO suggestion_history (id, title, count) VALUES (?, ?, 1)")
                .bind(Uuid::new_v4().to_string())
                .bind(title)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            tracing::debug!("Started suggestion history for: {}", title);
            return Ok(None);
        };

        let count = existing.count + 1;
        sqlx::query("UPDATE suggestion_history SET count = ? WHERE id = ?")
            .bind(count)
            .bind(&existing.id)
            .execute(&mut *tx)
            .await?;

        let mut promoted = None;
        if count > threshold {
            let suggested: Vec<String> = sqlx::query_scalar("SELECT title FROM suggested_items")
                .fetch_all(&mut *tx)
                .await?;

            if !suggested.iter().any(|t| t.to_lowercase() == key) {
                let item = sqlx::query_as::<_, SuggestedItem>(
                    r#"
                    INSERT INTO suggested_items (id, title, created_at)
                    VALUES (?, ?, ?)
                    RETURNING id, title, created_at
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(title)
                .bind(Utc::now())
                .fetch_one(&mut *tx)
                .await?;

                promoted = Some(item);
            }
        }

        tx.commit().await?;

        tracing::debug!("Suggestion history for {} now at {}", title, count);
        Ok(promoted)
    }

    /// Delete a suggested item and reset the matching history count to zero
    pub async fn delete_suggested_item(&self, id: &str) -> Result<SuggestedItem> {
        let mut tx = self.pool.begin().await?;

        let item = sqlx::query_as::<_, SuggestedItem>(
            "SELECT id, title, created_at FROM suggested_items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::SuggestionNotFound(id.to_string()))?;

        sqlx::query("DELETE FROM suggested_items WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let key = item.title.to_lowercase();
        let history = sqlx::query_as::<_, SuggestionHistory>(
            "SELECT id, title, count FROM suggestion_history",
        )
        .fetch_all(&mut *tx)
        .await?;

        if let Some(record) = history.into_iter().find(|h| h.title.to_lowercase() == key) {
            sqlx::query("UPDATE suggestion_history SET count = 0 WHERE id = ?")
                .bind(&record.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::debug!("Deleted suggested item: {}", id);
        Ok(item)
    }
}
