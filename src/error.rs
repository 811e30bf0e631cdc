// src/error.rs

//! Unified error handling for the announcer application.

use std::fmt;

use thiserror::Error;

/// Result type alias for announcer operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Listing fetch failed; the category is skipped for the cycle
    #[error("Listing fetch failed for '{category}': {message}")]
    Listing { category: String, message: String },

    /// Baseline fetch failed; fatal at startup
    #[error("Baseline fetch failed for '{category}': {message}")]
    Baseline { category: String, message: String },

    /// Announcement post exceeded its timeout; retried next cycle
    #[error("Announcement timed out after {timeout_secs}s")]
    AnnounceTimeout { timeout_secs: u64 },

    /// Announcement post returned a non-success status; retried next cycle
    #[error("Announcement rejected with status {status}: {body}")]
    AnnounceRejected { status: u16, body: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a listing fetch error for a category.
    pub fn listing(category: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Listing {
            category: category.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a baseline fetch error for a category.
    pub fn baseline(category: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Baseline {
            category: category.to_string(),
            message: message.to_string(),
        }
    }
}
