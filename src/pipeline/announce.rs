// src/pipeline/announce.rs

//! Announcement delivery to Discord.
//!
//! Posts one message per newly listed video to the category's configured
//! channel through the bot messages API. Success is any 2xx status; the
//! caller records the ID as known only after a successful post.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{AnnouncementTarget, DeliveryConfig};
use crate::utils::watch_url;

const API_BASE: &str = "https://discord.com/api/v10";

/// Destination for announcements about newly listed videos.
#[async_trait]
pub trait AnnouncementSink {
    /// Post one announcement. An `Err` leaves the video unannounced; the
    /// watch loop retries it on the next cycle.
    async fn announce(&self, target: &AnnouncementTarget, video_id: &str) -> Result<()>;
}

/// Sink posting announcements to Discord channels.
pub struct DiscordAnnouncer {
    client: Client,
    token: String,
    timeout: Duration,
}

impl DiscordAnnouncer {
    /// Create a new announcer authorized with the given bot token.
    pub fn new(token: impl Into<String>, config: &DeliveryConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            token: token.into(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

/// Compose the announcement text: configured prefix plus the watch URL.
pub fn compose_message(target: &AnnouncementTarget, video_id: &str) -> String {
    format!("{} {}", target.message, watch_url(video_id))
}

#[async_trait]
impl AnnouncementSink for DiscordAnnouncer {
    async fn announce(&self, target: &AnnouncementTarget, video_id: &str) -> Result<()> {
        let url = format!("{API_BASE}/channels/{}/messages", target.channel_id);
        let content = compose_message(target, video_id);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header(AUTHORIZATION, format!("Bot {}", self.token))
            .json(&json!({ "content": content }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::AnnounceTimeout {
                        timeout_secs: self.timeout.as_secs(),
                    }
                } else {
                    AppError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::AnnounceRejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
