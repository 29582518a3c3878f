//! Mock ingestion service for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ingest::{CaptureEnvelope, IngestionError, IngestionResponse, IngestionSink};

/// Mock implementation of the IngestionSink trait.
///
/// Records every envelope it receives. Answers `200 {"status":"ok"}` unless
/// told otherwise; envelopes for failing endpoints produce a transport error
/// and are not recorded.
#[derive(Debug)]
pub struct MockIngestion {
    envelopes: Arc<RwLock<Vec<CaptureEnvelope>>>,
    response: Arc<RwLock<IngestionResponse>>,
    failing_endpoints: Arc<RwLock<HashSet<String>>>,
}

impl Default for MockIngestion {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIngestion {
    pub fn new() -> Self {
        Self {
            envelopes: Arc::new(RwLock::new(Vec::new())),
            response: Arc::new(RwLock::new(IngestionResponse {
                status: 200,
                body: r#"{"status":"ok"}"#.to_string(),
            })),
            failing_endpoints: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Set the response returned for every delivered envelope.
    pub async fn set_response(&self, status: u16, body: &str) {
        *self.response.write().await = IngestionResponse {
            status,
            body: body.to_string(),
        };
    }

    /// Fail delivery of envelopes whose `endpoint` meta equals `endpoint`.
    pub async fn fail_endpoint(&self, endpoint: &str) {
        self.failing_endpoints
            .write()
            .await
            .insert(endpoint.to_string());
    }

    /// All delivered envelopes, in order.
    pub async fn envelopes(&self) -> Vec<CaptureEnvelope> {
        self.envelopes.read().await.clone()
    }

    pub async fn capture_count(&self) -> usize {
        self.envelopes.read().await.len()
    }

    /// Endpoint names of delivered envelopes, in order.
    pub async fn captured_endpoints(&self) -> Vec<String> {
        self.envelopes
            .read()
            .await
            .iter()
            .map(|e| e.meta.get("endpoint").cloned().unwrap_or_default())
            .collect()
    }
}

#[async_trait]
impl IngestionSink for MockIngestion {
    async fn capture(
        &self,
        envelope: &CaptureEnvelope,
    ) -> Result<IngestionResponse, IngestionError> {
        let endpoint = envelope.meta.get("endpoint").cloned().unwrap_or_default();
        if self.failing_endpoints.read().await.contains(&endpoint) {
            return Err(IngestionError::Unavailable(format!(
                "connection refused while sending {}",
                endpoint
            )));
        }

        self.envelopes.write().await.push(envelope.clone());
        Ok(self.response.read().await.clone())
    }
}
