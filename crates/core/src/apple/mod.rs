//! Apple Podcasts Connect analytics access.
//!
//! The connector only depends on the [`PodcastAnalytics`] trait; the bundled
//! [`AppleConnector`] is a thin HTTP client that replays the calls the
//! Podcasts Connect web app makes with an authenticated browser session.

mod connector;

pub use connector::AppleConnector;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

/// Errors returned by the analytics API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// The analytics endpoints captured for one show.
#[async_trait]
pub trait PodcastAnalytics: Send + Sync {
    /// Show overview (followers, listeners, headline numbers).
    async fn overview(&self) -> Result<Value, ApiError>;

    /// Listening trends between `start` and `end`.
    async fn trends(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Value, ApiError>;

    /// All episodes of the show, shaped `{"content": {"results": {<id>: {...}}}}`.
    async fn episodes(&self) -> Result<Value, ApiError>;

    /// Details for a single episode.
    async fn episode(&self, episode_id: &str) -> Result<Value, ApiError>;
}
