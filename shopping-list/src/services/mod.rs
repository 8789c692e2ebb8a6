//! Services module
//!
//! Business logic services that coordinate between callers and the repository.

pub mod entitlement;
pub mod ranking;
pub mod review;
pub mod settings;
pub mod share;
pub mod suggestions;
pub mod tasks;
pub mod titles;

pub use entitlement::{EntitlementProvider, PremiumFlag, StaticEntitlement};
pub use ranking::top_frequent;
pub use review::ReviewPromptService;
pub use settings::{AppSettings, SettingsService};
pub use share::format_share_text;
pub use suggestions::SuggestionTracker;
pub use tasks::{StoreEvent, TaskStore};
