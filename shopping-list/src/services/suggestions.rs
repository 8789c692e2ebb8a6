//! Suggestion tracker
//!
//! Counts how often each normalized title is added and promotes titles
//! that keep coming back into suggested items.

use crate::config::SUGGESTION_PROMOTION_THRESHOLD;
use crate::database::{Repository, SuggestedItem, SuggestionHistory};
use crate::error::{AppError, Result};
use crate::services::entitlement::EntitlementProvider;
use crate::services::titles::display_title;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Service for tracking repeat additions
#[derive(Clone)]
pub struct SuggestionTracker {
    repo: Repository,
    entitlement: Arc<dyn EntitlementProvider>,
    write_lock: Arc<Mutex<()>>,
}

impl SuggestionTracker {
    pub fn new(repo: Repository, entitlement: Arc<dyn EntitlementProvider>) -> Self {
        Self {
            repo,
            entitlement,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Shared repository, unless the task store closed it
    fn repo(&self) -> Result<&Repository> {
        if self.repo.is_closed() {
            return Err(AppError::StoreNotOpen);
        }
        Ok(&self.repo)
    }

    /// Record one addition of `title`.
    ///
    /// Does nothing for users without entitlement or for blank titles.
    /// Returns the suggested item this call promoted, if any.
    pub async fn record_addition(&self, title: &str) -> Result<Option<SuggestedItem>> {
        if !self.entitlement.is_entitled() {
            return Ok(None);
        }

        let title = display_title(title);
        if title.is_empty() {
            return Ok(None);
        }

        let _guard = self.write_lock.lock().await;
        let promoted = self
            .repo()?
            .record_suggestion(&title, SUGGESTION_PROMOTION_THRESHOLD)
            .await?;

        if let Some(item) = &promoted {
            tracing::info!("Promoted {} to suggested items", item.title);
        }

        Ok(promoted)
    }

    /// Remove a suggestion; its title must be added afresh past the
    /// threshold before it is suggested again.
    pub async fn delete_suggestion(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let item = self.repo()?.delete_suggested_item(id).await?;

        tracing::info!("Removed suggestion {} ({})", item.title, item.id);
        Ok(())
    }

    /// Suggested items in promotion order
    pub async fn list_suggestions(&self) -> Result<Vec<SuggestedItem>> {
        self.repo()?.list_suggested_items().await
    }

    pub async fn history(&self) -> Result<Vec<SuggestionHistory>> {
        self.repo()?.list_suggestion_history().await
    }
}
