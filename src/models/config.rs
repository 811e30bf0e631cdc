//! Application configuration structures.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Category;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Channel handle to watch, with or without the leading '@'
    pub channel: String,

    /// Discord bot token used to authorize announcement posts
    pub token: String,

    /// Listing fetch behavior settings
    #[serde(default)]
    pub listing: ListingConfig,

    /// Watch loop cadence settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Announcement delivery settings
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Per-category announcement targets
    pub announcements: HashMap<Category, AnnouncementTarget>,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    ///
    /// Any failure here is fatal: a missing file, malformed TOML, or a
    /// config that fails validation leaves no valid starting state.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read {path:?}: {e}")))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.channel.trim().is_empty() {
            return Err(AppError::validation("channel is empty"));
        }
        if self.token.trim().is_empty() {
            return Err(AppError::validation("token is empty"));
        }
        if self.listing.user_agent.trim().is_empty() {
            return Err(AppError::validation("listing.user_agent is empty"));
        }
        if self.listing.timeout_secs == 0 {
            return Err(AppError::validation("listing.timeout_secs must be > 0"));
        }
        if self.watch.interval_secs == 0 {
            return Err(AppError::validation("watch.interval_secs must be > 0"));
        }
        if self.watch.scan_limit == 0 {
            return Err(AppError::validation("watch.scan_limit must be > 0"));
        }
        if self.delivery.timeout_secs == 0 {
            return Err(AppError::validation("delivery.timeout_secs must be > 0"));
        }
        for category in Category::ALL {
            let Some(target) = self.announcements.get(&category) else {
                return Err(AppError::validation(format!(
                    "No announcement target for '{category}'"
                )));
            };
            if target.channel_id.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "announcements.{category}.channel_id is empty"
                )));
            }
        }
        Ok(())
    }

    /// Announcement target for a category.
    pub fn target(&self, category: Category) -> Option<&AnnouncementTarget> {
        self.announcements.get(&category)
    }
}

/// Listing fetch behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// User-Agent header for listing requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::listing_timeout")]
    pub timeout_secs: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::listing_timeout(),
        }
    }
}

/// Watch loop cadence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Seconds slept between scan cycles
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Per-cycle fetch cap; sized to exceed plausible new uploads per cycle
    #[serde(default = "defaults::scan_limit")]
    pub scan_limit: usize,

    /// Optional cap on the baseline fetch; `None` walks the full listing
    #[serde(default)]
    pub baseline_limit: Option<usize>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            scan_limit: defaults::scan_limit(),
            baseline_limit: None,
        }
    }
}

/// Announcement delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Timeout for each announcement post in seconds
    #[serde(default = "defaults::delivery_timeout")]
    pub timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::delivery_timeout(),
        }
    }
}

/// Per-category announcement target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementTarget {
    /// Discord channel ID the announcement is posted to
    pub channel_id: String,

    /// Message prefix placed ahead of the watch URL
    pub message: String,
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; herald/0.1)".into()
    }
    pub fn listing_timeout() -> u64 {
        30
    }
    pub fn interval() -> u64 {
        60
    }
    pub fn scan_limit() -> usize {
        28
    }
    pub fn delivery_timeout() -> u64 {
        60
    }
}
