//! Client for the remote cookie-issuing service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::config::CookieServiceConfig;

use super::types::{SessionCookie, SessionTokens};
use super::{SessionError, SessionProvider};

/// Fetches a fresh cookie set from the cookie service over HTTP.
pub struct CookieServiceClient {
    client: Client,
    url: String,
}

impl CookieServiceClient {
    /// Create a new client for the configured service.
    pub fn new(config: &CookieServiceConfig) -> Result<Self, SessionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// Fetch the raw cookie list.
    pub async fn fetch_cookies(&self) -> Result<Vec<SessionCookie>, SessionError> {
        debug!(url = %self.url, "Requesting cookies");

        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        info!("Got cookies response: {}", status.as_u16());

        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::CookieService {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Vec<SessionCookie>>()
            .await
            .map_err(|e| SessionError::Parse(e.to_string()))
    }
}

#[async_trait]
impl SessionProvider for CookieServiceClient {
    async fn get_session(&self) -> Result<SessionTokens, SessionError> {
        let cookies = self.fetch_cookies().await?;
        let tokens = SessionTokens::from_cookies(&cookies)?;
        info!("Got session cookies ({} in set)", cookies.len());
        Ok(tokens)
    }
}
