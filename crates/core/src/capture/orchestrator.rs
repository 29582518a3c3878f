//! Fetch-and-forward for a single source.
//!
//! Only the fetch itself is failure-isolated. Storage failures always end the
//! run; ingestion failures end it unless the policy is
//! [`IngestionFailurePolicy::Isolate`].

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::config::IngestionFailurePolicy;
use crate::ingest::{build_envelope, merge_meta, CaptureMeta, IngestionSink, TimeRange};
use crate::storage::LocalStore;

use super::producer::Producer;
use super::types::{CaptureError, FetchOutcome, RunSummary, Source};

/// Invoke `producer` and classify the result.
pub async fn fetch<'a>(source: Source, producer: impl Producer<'a>) -> FetchOutcome {
    match producer.produce().await {
        Ok(payload) => FetchOutcome::Fetched(payload),
        Err(error) => FetchOutcome::Failed { source, error },
    }
}

/// Drives one fetch-and-forward operation per source.
pub struct CaptureOrchestrator {
    show: String,
    ingestion: Arc<dyn IngestionSink>,
    store: Option<LocalStore>,
    policy: IngestionFailurePolicy,
    summary: RwLock<RunSummary>,
}

impl CaptureOrchestrator {
    /// Create an orchestrator capturing for `show`.
    pub fn new(show: impl Into<String>, ingestion: Arc<dyn IngestionSink>) -> Self {
        Self {
            show: show.into(),
            ingestion,
            store: None,
            policy: IngestionFailurePolicy::default(),
            summary: RwLock::new(RunSummary::default()),
        }
    }

    /// Also write every fetched payload to `store`.
    pub fn with_store(mut self, store: LocalStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Set how ingestion transport failures are handled.
    pub fn with_failure_policy(mut self, policy: IngestionFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Show id stamped into every envelope's `show` meta key.
    pub fn show(&self) -> &str {
        &self.show
    }

    /// Snapshot of what has been captured so far.
    pub async fn summary(&self) -> RunSummary {
        self.summary.read().await.clone()
    }

    /// Clear the summary before a new run.
    pub async fn reset_summary(&self) {
        *self.summary.write().await = RunSummary::default();
    }

    /// Fetch one source and forward it to the ingestion service.
    ///
    /// Returns `Ok(None)` when the source could not be fetched; that failure
    /// is logged and never reaches the caller. On success the raw payload is
    /// returned so callers can inspect its structure.
    pub async fn fetch_and_capture<'a>(
        &self,
        source: Source,
        producer: impl Producer<'a>,
        range: TimeRange,
        extra_meta: &CaptureMeta,
    ) -> Result<Option<Value>, CaptureError> {
        info!("Fetching {}", source);

        let payload = match fetch(source, producer).await {
            FetchOutcome::Fetched(payload) => payload,
            FetchOutcome::Failed { source, error } => {
                // Some sources are empty for small shows, so this is routine.
                error!("Failed to fetch data from {} endpoint: {}", source, error);
                self.summary.write().await.skipped.push(source);
                return Ok(None);
            }
        };

        if let Some(store) = &self.store {
            store
                .save(source.storage_prefix(), &payload)
                .await
                .map_err(|error| CaptureError::Storage {
                    endpoint: source,
                    error,
                })?;
        }

        let meta = merge_meta(&self.show, source.as_str(), extra_meta);
        let envelope = build_envelope(payload, range, meta);

        match self.ingestion.capture(&envelope).await {
            Ok(response) => {
                if !response.is_success() {
                    warn!(
                        "Ingestion service answered {} for {}",
                        response.status, source
                    );
                }
                info!("{}: {}", source, response.body);
                self.summary.write().await.captured += 1;
            }
            Err(error) => match self.policy {
                IngestionFailurePolicy::Abort => {
                    return Err(CaptureError::Ingestion {
                        endpoint: source,
                        error,
                    });
                }
                IngestionFailurePolicy::Isolate => {
                    error!("Failed to send {} capture: {}", source, error);
                    self.summary.write().await.skipped.push(source);
                }
            },
        }

        Ok(Some(envelope.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apple::ApiError;
    use crate::capture::producer::ProduceFuture;
    use crate::testing::MockIngestion;
    use chrono::Utc;
    use serde_json::json;
    use tempfile::TempDir;

    fn ok(payload: Value) -> impl FnOnce() -> ProduceFuture<'static> + Send {
        move || -> ProduceFuture<'static> {
            Box::pin(async move { Ok::<Value, ApiError>(payload) })
        }
    }

    fn failing(status: u16) -> impl FnOnce() -> ProduceFuture<'static> + Send {
        move || -> ProduceFuture<'static> {
            Box::pin(async move {
                Err::<Value, ApiError>(ApiError::Status {
                    status,
                    message: "no data".to_string(),
                })
            })
        }
    }

    fn week() -> TimeRange {
        TimeRange::trailing_days(Utc::now(), 7)
    }

    #[tokio::test]
    async fn test_fetch_outcome() {
        let outcome = fetch(Source::Overview, ok(json!({"a": 1}))).await;
        assert!(outcome.is_fetched());

        let outcome = fetch(Source::Overview, failing(404)).await;
        match outcome {
            FetchOutcome::Failed { source, error } => {
                assert_eq!(source, Source::Overview);
                assert!(matches!(error, ApiError::Status { status: 404, .. }));
            }
            FetchOutcome::Fetched(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_is_swallowed() {
        let ingestion = Arc::new(MockIngestion::new());
        let orchestrator = CaptureOrchestrator::new("show-1", ingestion.clone());

        let result = orchestrator
            .fetch_and_capture(Source::Overview, failing(500), week(), &CaptureMeta::new())
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(ingestion.capture_count().await, 0);

        let summary = orchestrator.summary().await;
        assert_eq!(summary.captured, 0);
        assert_eq!(summary.skipped, vec![Source::Overview]);
    }

    #[tokio::test]
    async fn test_successful_capture_returns_payload() {
        let ingestion = Arc::new(MockIngestion::new());
        let orchestrator = CaptureOrchestrator::new("show-1", ingestion.clone());

        let payload = json!({"content": {"results": {}}});
        let result = orchestrator
            .fetch_and_capture(Source::Episodes, ok(payload.clone()), week(), &CaptureMeta::new())
            .await
            .unwrap();

        assert_eq!(result, Some(payload.clone()));

        let envelopes = ingestion.envelopes().await;
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].data, payload);
        assert_eq!(envelopes[0].meta["show"], "show-1");
        assert_eq!(envelopes[0].meta["endpoint"], "episodes");
        assert_eq!(orchestrator.summary().await.captured, 1);
    }

    #[tokio::test]
    async fn test_standard_meta_wins_over_extra_meta() {
        let ingestion = Arc::new(MockIngestion::new());
        let orchestrator = CaptureOrchestrator::new("show-1", ingestion.clone());

        let mut extra = CaptureMeta::new();
        extra.insert("show".to_string(), "other-show".to_string());
        extra.insert("endpoint".to_string(), "other".to_string());
        extra.insert("episode".to_string(), "e1".to_string());

        orchestrator
            .fetch_and_capture(Source::EpisodeDetails, ok(json!({})), week(), &extra)
            .await
            .unwrap();

        let envelope = &ingestion.envelopes().await[0];
        assert_eq!(envelope.meta["show"], "show-1");
        assert_eq!(envelope.meta["endpoint"], "episodeDetails");
        assert_eq!(envelope.meta["episode"], "e1");
    }

    #[tokio::test]
    async fn test_rejected_response_is_not_an_error() {
        let ingestion = Arc::new(MockIngestion::new());
        ingestion.set_response(401, "unauthorized").await;
        let orchestrator = CaptureOrchestrator::new("show-1", ingestion.clone());

        let result = orchestrator
            .fetch_and_capture(Source::Overview, ok(json!({})), week(), &CaptureMeta::new())
            .await;

        assert!(matches!(result, Ok(Some(_))));
    }

    #[tokio::test]
    async fn test_ingestion_failure_aborts_by_default() {
        let ingestion = Arc::new(MockIngestion::new());
        ingestion.fail_endpoint("overview").await;
        let orchestrator = CaptureOrchestrator::new("show-1", ingestion.clone());

        let result = orchestrator
            .fetch_and_capture(Source::Overview, ok(json!({})), week(), &CaptureMeta::new())
            .await;

        assert!(matches!(
            result,
            Err(CaptureError::Ingestion {
                endpoint: Source::Overview,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_ingestion_failure_isolated_by_policy() {
        let ingestion = Arc::new(MockIngestion::new());
        ingestion.fail_endpoint("overview").await;
        let orchestrator = CaptureOrchestrator::new("show-1", ingestion.clone())
            .with_failure_policy(IngestionFailurePolicy::Isolate);

        let result = orchestrator
            .fetch_and_capture(Source::Overview, ok(json!({"x": 1})), week(), &CaptureMeta::new())
            .await
            .unwrap();

        assert_eq!(result, Some(json!({"x": 1})));
        assert_eq!(orchestrator.summary().await.skipped, vec![Source::Overview]);
    }

    #[tokio::test]
    async fn test_reset_summary() {
        let ingestion = Arc::new(MockIngestion::new());
        let orchestrator = CaptureOrchestrator::new("show-1", ingestion.clone());

        orchestrator
            .fetch_and_capture(Source::Overview, ok(json!({})), week(), &CaptureMeta::new())
            .await
            .unwrap();
        orchestrator
            .fetch_and_capture(Source::Trends, failing(404), week(), &CaptureMeta::new())
            .await
            .unwrap();

        orchestrator.reset_summary().await;

        assert_eq!(orchestrator.summary().await, RunSummary::default());
    }

    #[tokio::test]
    async fn test_payload_stored_when_enabled() {
        let temp = TempDir::new().unwrap();
        let ingestion = Arc::new(MockIngestion::new());
        let orchestrator = CaptureOrchestrator::new("show-1", ingestion.clone())
            .with_store(LocalStore::new(temp.path()));

        orchestrator
            .fetch_and_capture(Source::Trends, ok(json!({"t": 1})), week(), &CaptureMeta::new())
            .await
            .unwrap();

        let files: Vec<_> = std::fs::read_dir(temp.path().join("podcast/trends"))
            .unwrap()
            .collect();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let ingestion = Arc::new(MockIngestion::new());
        let orchestrator = CaptureOrchestrator::new("show-1", ingestion.clone())
            .with_store(LocalStore::new(&blocker));

        let result = orchestrator
            .fetch_and_capture(Source::Overview, ok(json!({})), week(), &CaptureMeta::new())
            .await;

        assert!(matches!(result, Err(CaptureError::Storage { .. })));
        assert_eq!(ingestion.capture_count().await, 0);
    }

    #[tokio::test]
    async fn test_repeated_capture_differs_only_in_retrieved() {
        let ingestion = Arc::new(MockIngestion::new());
        let orchestrator = CaptureOrchestrator::new("show-1", ingestion.clone());
        let range = week();

        for _ in 0..2 {
            orchestrator
                .fetch_and_capture(Source::Overview, ok(json!({"n": 5})), range, &CaptureMeta::new())
                .await
                .unwrap();
        }

        let mut first = serde_json::to_value(&ingestion.envelopes().await[0]).unwrap();
        let mut second = serde_json::to_value(&ingestion.envelopes().await[1]).unwrap();
        first.as_object_mut().unwrap().remove("retrieved");
        second.as_object_mut().unwrap().remove("retrieved");
        assert_eq!(first, second);
    }
}
