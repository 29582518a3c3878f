//! Mock analytics API for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::apple::{ApiError, PodcastAnalytics};

/// A recorded analytics call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedAnalyticsCall {
    Overview,
    Trends {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Episodes,
    Episode {
        id: String,
    },
}

/// Mock implementation of the PodcastAnalytics trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable payloads per endpoint
/// - Track calls for ordering assertions
/// - Simulate failures per endpoint or per episode
///
/// Endpoints without a configured payload answer with a 404.
///
/// # Example
///
/// ```rust,ignore
/// use podcapture_core::testing::{fixtures, MockAnalytics};
///
/// let analytics = MockAnalytics::new();
/// analytics.set_episodes(fixtures::episodes_payload(&["e1", "e2"])).await;
/// analytics.fail_endpoint("overview").await;
/// ```
#[derive(Debug, Default)]
pub struct MockAnalytics {
    overview: Arc<RwLock<Option<Value>>>,
    trends: Arc<RwLock<Option<Value>>>,
    episodes: Arc<RwLock<Option<Value>>>,
    episode_details: Arc<RwLock<HashMap<String, Value>>>,
    failing_endpoints: Arc<RwLock<HashSet<String>>>,
    failing_episodes: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<RecordedAnalyticsCall>>>,
}

impl MockAnalytics {
    /// Create a mock with no payloads configured.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Payload Configuration
    // =========================================================================

    pub async fn set_overview(&self, payload: Value) {
        *self.overview.write().await = Some(payload);
    }

    pub async fn set_trends(&self, payload: Value) {
        *self.trends.write().await = Some(payload);
    }

    pub async fn set_episodes(&self, payload: Value) {
        *self.episodes.write().await = Some(payload);
    }

    /// Set the details payload for one episode.
    pub async fn set_episode(&self, id: &str, payload: Value) {
        self.episode_details
            .write()
            .await
            .insert(id.to_string(), payload);
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Make every call to an endpoint fail (`overview`, `trends`,
    /// `episodes` or `episodeDetails`).
    pub async fn fail_endpoint(&self, endpoint: &str) {
        self.failing_endpoints
            .write()
            .await
            .insert(endpoint.to_string());
    }

    /// Make the details call for a single episode fail.
    pub async fn fail_episode(&self, id: &str) {
        self.failing_episodes.write().await.insert(id.to_string());
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// All calls made, in order.
    pub async fn recorded_calls(&self) -> Vec<RecordedAnalyticsCall> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    async fn respond(
        &self,
        call: RecordedAnalyticsCall,
        endpoint: &str,
        payload: Option<Value>,
    ) -> Result<Value, ApiError> {
        self.calls.write().await.push(call);

        if self.failing_endpoints.read().await.contains(endpoint) {
            return Err(ApiError::Status {
                status: 500,
                message: format!("{} unavailable", endpoint),
            });
        }

        payload.ok_or_else(|| ApiError::Status {
            status: 404,
            message: format!("no {} data", endpoint),
        })
    }
}

#[async_trait]
impl PodcastAnalytics for MockAnalytics {
    async fn overview(&self) -> Result<Value, ApiError> {
        let payload = self.overview.read().await.clone();
        self.respond(RecordedAnalyticsCall::Overview, "overview", payload)
            .await
    }

    async fn trends(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Value, ApiError> {
        let payload = self.trends.read().await.clone();
        self.respond(RecordedAnalyticsCall::Trends { start, end }, "trends", payload)
            .await
    }

    async fn episodes(&self) -> Result<Value, ApiError> {
        let payload = self.episodes.read().await.clone();
        self.respond(RecordedAnalyticsCall::Episodes, "episodes", payload)
            .await
    }

    async fn episode(&self, episode_id: &str) -> Result<Value, ApiError> {
        let payload = if self.failing_episodes.read().await.contains(episode_id) {
            None
        } else {
            self.episode_details.read().await.get(episode_id).cloned()
        };
        self.respond(
            RecordedAnalyticsCall::Episode {
                id: episode_id.to_string(),
            },
            "episodeDetails",
            payload,
        )
        .await
    }
}
