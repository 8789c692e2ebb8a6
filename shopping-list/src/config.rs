//! Application configuration
//!
//! Central location for the tuning constants used throughout the crate,
//! plus the explicit configuration object a store is opened with.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ===== Suggestions =====

/// A history record whose count rises above this value is promoted to a
/// suggested item (the third addition of a title promotes it).
pub const SUGGESTION_PROMOTION_THRESHOLD: i64 = 2;

/// Default number of titles returned by the most-frequent ranking
pub const DEFAULT_TOP_FREQUENT: usize = 3;

// ===== Free Tier =====

/// Number of items a user without premium entitlement may keep on the list
pub const FREE_TIER_ITEM_LIMIT: usize = 6;

// ===== Review Prompt =====

/// Item additions required before the review prompt is requested
pub const REVIEW_PROMPT_THRESHOLD: u32 = 4;

// ===== Storage =====

/// Buffered store events per subscriber before slow receivers start lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Maximum pooled connections for a file-backed database
pub const MAX_POOL_CONNECTIONS: u32 = 5;

/// How long a connection waits on a locked database before failing
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// File name of the database inside the data directory
pub const DATABASE_FILE_NAME: &str = "shopping_list.db";

/// File name of the settings file inside the data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Where task and suggestion records live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Storage {
    /// SQLite database file, created if missing
    File(PathBuf),
    /// Private in-memory database, discarded when the store closes
    Memory,
}

/// Configuration a store is opened against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the database and settings files
    pub data_dir: PathBuf,
    pub storage: Storage,
}

impl StoreConfig {
    /// File-backed configuration rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let storage = Storage::File(data_dir.join(DATABASE_FILE_NAME));
        Self { data_dir, storage }
    }

    /// In-memory database; settings still persist under `data_dir`
    pub fn in_memory(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            storage: Storage::Memory,
        }
    }
}
