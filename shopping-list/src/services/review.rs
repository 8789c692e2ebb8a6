//! Review prompt counter
//!
//! Decides when the front end should ask the platform for an app review:
//! after enough item additions, and at most once per app version.

use crate::config::REVIEW_PROMPT_THRESHOLD;
use crate::error::Result;
use crate::services::settings::{ReviewSettings, SettingsService};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct ReviewPromptService {
    settings: SettingsService,
    lock: Arc<Mutex<()>>,
}

impl ReviewPromptService {
    pub fn new(settings: SettingsService) -> Self {
        Self {
            settings,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Count one item addition. Returns true when a review prompt should be
    /// shown now for `app_version`.
    pub async fn record_item_added(&self, app_version: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;

        let mut review = self.settings.get_review().await?;
        review.items_added_count = review.items_added_count.saturating_add(1);

        let prompt = review.items_added_count >= REVIEW_PROMPT_THRESHOLD
            && review.last_version_prompted.as_deref() != Some(app_version);

        if prompt {
            review.last_version_prompted = Some(app_version.to_string());
            tracing::info!("Requesting review prompt for version {}", app_version);
        }

        self.settings.update_review(review).await?;
        Ok(prompt)
    }

    /// Clear the counter and the prompted version
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.settings.update_review(ReviewSettings::default()).await
    }
}
