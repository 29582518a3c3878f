//! HTTP client for the ingestion API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::IngestionConfig;

use super::envelope::CaptureEnvelope;
use super::IngestionError;

/// What the ingestion service answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionResponse {
    pub status: u16,
    pub body: String,
}

impl IngestionResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Destination for capture envelopes.
#[async_trait]
pub trait IngestionSink: Send + Sync {
    /// Send one envelope. Only transport failures are errors; the
    /// response status is returned as-is.
    async fn capture(&self, envelope: &CaptureEnvelope)
        -> Result<IngestionResponse, IngestionError>;
}

/// Bearer-authenticated client for the connector endpoint.
pub struct IngestionClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl IngestionClient {
    pub fn new(config: &IngestionConfig) -> Result<Self, IngestionError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl IngestionSink for IngestionClient {
    async fn capture(
        &self,
        envelope: &CaptureEnvelope,
    ) -> Result<IngestionResponse, IngestionError> {
        debug!(endpoint = %self.endpoint, "Posting capture envelope");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(envelope)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(IngestionResponse { status, body })
    }
}
