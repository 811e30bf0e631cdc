// src/services/listing.rs

//! Channel listing service.
//!
//! Fetches the currently listed video IDs for a channel tab by loading the
//! public tab page, reading the embedded `ytInitialData` payload, and
//! following continuation tokens through the browse endpoint until the
//! requested cap or the end of the listing.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::{Category, ListingConfig};
use crate::utils::channel_tab_url;

/// Client version sent with browse requests; the endpoint accepts any
/// recent value for the web client.
const CLIENT_VERSION: &str = "2.20240601.00.00";

/// Renderer keys whose objects carry a listed video ID directly.
const ITEM_RENDERERS: [&str; 3] = ["videoRenderer", "gridVideoRenderer", "reelItemRenderer"];

/// Source of currently listed video IDs for a channel.
#[async_trait]
pub trait VideoSource {
    /// Fetch listed video IDs for a category, most recent first.
    ///
    /// `limit` caps the result to the N most recently listed items; `None`
    /// walks the full listing. Failure is reported immediately, with no
    /// retries inside the source.
    async fn fetch_ids(&self, category: Category, limit: Option<usize>) -> Result<Vec<String>>;
}

/// Service fetching video listings from a channel's public tab pages.
pub struct ChannelListing {
    client: Client,
    channel: String,
}

impl ChannelListing {
    /// Create a new listing service for the given channel handle.
    pub fn new(channel: impl Into<String>, config: &ListingConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            channel: channel.into(),
        })
    }

    /// Fetch one continuation page from the browse endpoint.
    async fn browse(&self, api_key: &str, token: &str) -> reqwest::Result<Value> {
        let body = json!({
            "context": {
                "client": {
                    "clientName": "WEB",
                    "clientVersion": CLIENT_VERSION,
                }
            },
            "continuation": token,
        });

        self.client
            .post(format!(
                "https://www.youtube.com/youtubei/v1/browse?key={api_key}"
            ))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
}

#[async_trait]
impl VideoSource for ChannelListing {
    async fn fetch_ids(&self, category: Category, limit: Option<usize>) -> Result<Vec<String>> {
        let url = channel_tab_url(&self.channel, category)?;

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::listing(category, e))?;
        let html = response
            .text()
            .await
            .map_err(|e| AppError::listing(category, e))?;

        let payload = extract_initial_data(&html)
            .ok_or_else(|| AppError::listing(category, "missing ytInitialData payload"))?;
        let initial: Value =
            serde_json::from_str(payload).map_err(|e| AppError::listing(category, e))?;
        let api_key = extract_api_key(&html);

        let mut ids = Vec::new();
        let mut continuation = collect_listed_ids(&initial, &mut ids);

        // Page through continuations until the cap is met or the listing ends.
        while !reached(limit, ids.len()) {
            let Some(token) = continuation.take() else {
                break;
            };
            let Some(key) = api_key.as_deref() else {
                break;
            };
            let page = self
                .browse(key, &token)
                .await
                .map_err(|e| AppError::listing(category, e))?;
            continuation = collect_listed_ids(&page, &mut ids);
        }

        // Continuation pages can repeat entries; first occurrence wins.
        let mut seen = HashSet::new();
        ids.retain(|id| seen.insert(id.clone()));

        if let Some(limit) = limit {
            ids.truncate(limit);
        }
        Ok(ids)
    }
}

fn reached(limit: Option<usize>, count: usize) -> bool {
    limit.is_some_and(|l| count >= l)
}

/// Extract the raw `ytInitialData` JSON text from a tab page.
fn extract_initial_data(html: &str) -> Option<&str> {
    let re = Regex::new(r"var ytInitialData\s*=\s*").ok()?;
    let m = re.find(html)?;
    let rest = &html[m.end()..];
    let end = rest.find(";</script>")?;
    Some(&rest[..end])
}

/// Extract the innertube API key used for continuation requests.
fn extract_api_key(html: &str) -> Option<String> {
    let re = Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).ok()?;
    re.captures(html).map(|caps| caps[1].to_string())
}

/// Walk a response payload in document order, collecting video IDs.
///
/// Returns the continuation token for the next page, if any. Document
/// order is the listing's recency order, which the caller's cap relies on.
fn collect_listed_ids(value: &Value, ids: &mut Vec<String>) -> Option<String> {
    let mut continuation = None;
    walk(value, ids, &mut continuation);
    continuation
}

fn walk(value: &Value, ids: &mut Vec<String>, continuation: &mut Option<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if ITEM_RENDERERS.contains(&key.as_str()) {
                    if let Some(id) = child.get("videoId").and_then(Value::as_str) {
                        ids.push(id.to_string());
                        continue;
                    }
                }
                // Shorts tabs list items through a view model instead of a renderer.
                if key == "shortsLockupViewModel" {
                    if let Some(id) = child
                        .pointer("/onTap/innertubeCommand/reelWatchEndpoint/videoId")
                        .and_then(Value::as_str)
                    {
                        ids.push(id.to_string());
                        continue;
                    }
                }
                if key == "continuationItemRenderer" {
                    if let Some(token) = child
                        .pointer("/continuationEndpoint/continuationCommand/token")
                        .and_then(Value::as_str)
                    {
                        *continuation = Some(token.to_string());
                        continue;
                    }
                }
                walk(child, ids, continuation);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, ids, continuation);
            }
        }
        _ => {}
    }
}
