//! Settings service
//!
//! Manages application settings persistence using JSON file storage.

use crate::config::SETTINGS_FILE_NAME;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Review prompt bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSettings {
    /// Items added since the counter was last reset
    #[serde(default)]
    pub items_added_count: u32,
    /// App version the review prompt was last requested for
    #[serde(default)]
    pub last_version_prompted: Option<String>,
}

/// Complete application settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub is_premium_user: bool,
    #[serde(default)]
    pub review: ReviewSettings,
}

/// Service for managing application settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: &Path) -> Self {
        Self {
            settings_path: app_data_dir.join(SETTINGS_FILE_NAME),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<AppSettings> {
        if !fs::try_exists(&self.settings_path).await? {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: AppSettings = serde_json::from_str(&content)?;

        Ok(settings)
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        let content = serde_json::to_string_pretty(settings)?;

        fs::write(&self.settings_path, content).await?;
        tracing::debug!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    pub async fn is_premium(&self) -> Result<bool> {
        Ok(self.load().await?.is_premium_user)
    }

    pub async fn set_premium(&self, premium: bool) -> Result<()> {
        let mut settings = self.load().await?;
        settings.is_premium_user = premium;
        self.save(&settings).await
    }

    pub async fn get_review(&self) -> Result<ReviewSettings> {
        Ok(self.load().await?.review)
    }

    pub async fn update_review(&self, review: ReviewSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.review = review;
        self.save(&settings).await
    }
}
