//! HTTP client for the Podcasts Connect analytics API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::cookie::Jar;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use crate::config::AppleConfig;
use crate::session::{SessionTokens, ITCTX, MYACINFO};

use super::{ApiError, PodcastAnalytics};

/// Podcasts Connect analytics client authenticated with session cookies.
pub struct AppleConnector {
    client: Client,
    base_url: String,
    podcast_id: String,
}

impl AppleConnector {
    /// Create a client for `podcast_id` using the bootstrapped session.
    pub fn new(
        config: &AppleConfig,
        podcast_id: &str,
        tokens: &SessionTokens,
    ) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let origin = Url::parse(&base_url).map_err(|e| ApiError::Parse(e.to_string()))?;

        let jar = Jar::default();
        jar.add_cookie_str(&format!("{}={}", MYACINFO, tokens.myacinfo), &origin);
        jar.add_cookie_str(&format!("{}={}", ITCTX, tokens.itctx), &origin);

        let mut builder = Client::builder().cookie_provider(Arc::new(jar));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            podcast_id: podcast_id.to_string(),
        })
    }

    fn show_url(&self, path: &str) -> String {
        format!(
            "{}/shows/{}/{}",
            self.base_url,
            urlencoding::encode(&self.podcast_id),
            path
        )
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        debug!("Apple analytics request: {}", url);

        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl PodcastAnalytics for AppleConnector {
    async fn overview(&self) -> Result<Value, ApiError> {
        self.get_json(&self.show_url("overview"), &[]).await
    }

    async fn trends(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Value, ApiError> {
        let query = [
            ("start", start.format("%Y-%m-%d").to_string()),
            ("end", end.format("%Y-%m-%d").to_string()),
        ];
        self.get_json(&self.show_url("trends"), &query).await
    }

    async fn episodes(&self) -> Result<Value, ApiError> {
        self.get_json(&self.show_url("episodes"), &[]).await
    }

    async fn episode(&self, episode_id: &str) -> Result<Value, ApiError> {
        let url = format!(
            "{}/episodes/{}",
            self.base_url,
            urlencoding::encode(episode_id)
        );
        self.get_json(&url, &[]).await
    }
}
