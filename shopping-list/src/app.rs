//! Application state and initialization
//!
//! This module wires configuration, storage and services together.
//! A front end holds one `AppState` and calls through it.

use crate::config::{StoreConfig, DEFAULT_TOP_FREQUENT, FREE_TIER_ITEM_LIMIT};
use crate::database::{SuggestedItem, Task};
use crate::error::{AppError, Result};
use crate::services::{
    format_share_text, top_frequent, EntitlementProvider, PremiumFlag, ReviewPromptService,
    SettingsService, SuggestionTracker, TaskStore,
};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of adding an item through the app
#[derive(Debug, Clone, Serialize)]
pub struct AddedItem {
    pub task: Task,
    /// Suggestion promoted by this addition, if any
    pub promoted: Option<SuggestedItem>,
    /// Whether the front end should request an app review now
    pub prompt_review: bool,
}

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub config: StoreConfig,
    pub tasks: TaskStore,
    pub suggestions: SuggestionTracker,
    pub settings: SettingsService,
    pub reviews: ReviewPromptService,
    premium: PremiumFlag,
}

impl AppState {
    /// Open storage and load settings for `config`
    pub async fn open(config: StoreConfig) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("App data directory: {:?}", config.data_dir);

        std::fs::create_dir_all(&config.data_dir)?;

        let settings = SettingsService::new(&config.data_dir);
        let premium = PremiumFlag::new(settings.is_premium().await?);

        let tasks = TaskStore::new(config.clone());
        tasks.open().await?;

        let suggestions = SuggestionTracker::new(tasks.repository().await?, Arc::new(premium.clone()));
        let reviews = ReviewPromptService::new(settings.clone());

        tracing::info!("Application initialized successfully");

        Ok(Self {
            config,
            tasks,
            suggestions,
            settings,
            reviews,
            premium,
        })
    }

    pub fn is_premium(&self) -> bool {
        self.premium.is_entitled()
    }

    /// Persist the premium flag and apply it immediately
    pub async fn set_premium(&self, premium: bool) -> Result<()> {
        self.settings.set_premium(premium).await?;
        self.premium.set(premium);
        tracing::info!("Premium entitlement set to {}", premium);
        Ok(())
    }

    /// Add an item, enforcing the free tier limit, then feed suggestion
    /// tracking and the review counter.
    ///
    /// Once the task is saved the call succeeds. A failure in suggestion
    /// tracking or the review counter is logged and reported as no
    /// promotion and no prompt.
    pub async fn add_item(&self, title: &str, quantity: i64) -> Result<AddedItem> {
        let limit = (!self.is_premium()).then_some(FREE_TIER_ITEM_LIMIT);
        let task = self.tasks.create_within_limit(title, quantity, limit).await?;

        let promoted = match self.suggestions.record_addition(&task.title).await {
            Ok(promoted) => promoted,
            Err(e) => {
                tracing::warn!("Failed to record suggestion for {}: {}", task.title, e);
                None
            }
        };
        let prompt_review = match self.reviews.record_item_added(env!("CARGO_PKG_VERSION")).await {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::warn!("Failed to update review counter: {}", e);
                false
            }
        };

        Ok(AddedItem {
            task,
            promoted,
            prompt_review,
        })
    }

    /// Add a suggestion chip to the list
    pub async fn add_suggestion(&self, id: &str) -> Result<AddedItem> {
        let item = self
            .suggestions
            .list_suggestions()
            .await?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::SuggestionNotFound(id.to_string()))?;

        self.add_item(&item.title, 1).await
    }

    /// Most frequent titles on the current list
    pub async fn most_frequent(&self) -> Result<Vec<String>> {
        let tasks = self.tasks.snapshot().await?;
        Ok(top_frequent(&tasks, DEFAULT_TOP_FREQUENT))
    }

    /// Shareable text for the current list; `None` when the list is empty
    pub async fn share_text(&self) -> Result<Option<String>> {
        let tasks = self.tasks.snapshot().await?;
        Ok(format_share_text(&tasks))
    }

    /// Close the task store. The suggestion tracker shares its database,
    /// so tracker calls fail with `StoreNotOpen` afterwards too.
    pub async fn close(&self) {
        self.tasks.close().await;
    }
}
