//! One complete capture run.
//!
//! The run is linear: bootstrap, then `overview`, `trends` and `episodes`
//! in that order, then one `episodeDetails` capture per episode. Fetch
//! failures skip a source; every other failure ends the run.

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::apple::{ApiError, PodcastAnalytics};
use crate::config::Config;
use crate::ingest::{CaptureMeta, IngestionSink, TimeRange};
use crate::session::{SessionProvider, SessionTokens};
use crate::storage::LocalStore;

use super::clock::{Clock, SystemClock};
use super::fanout::{extract_episodes, EpisodeFanOut};
use super::orchestrator::CaptureOrchestrator;
use super::types::{CaptureError, RunError, RunSummary, Source};

/// Drives a full capture for the configured show.
pub struct CaptureRun {
    config: Arc<Config>,
    orchestrator: CaptureOrchestrator,
    clock: Arc<dyn Clock>,
}

impl CaptureRun {
    /// Create a run. Local payload storage follows `config.storage`.
    pub fn new(config: Arc<Config>, ingestion: Arc<dyn IngestionSink>) -> Self {
        let mut orchestrator = CaptureOrchestrator::new(&config.show.podcast_id, ingestion)
            .with_failure_policy(config.capture.ingestion_failure_policy);

        if config.storage.enabled {
            orchestrator = orchestrator.with_store(LocalStore::new(&config.storage.root));
        }

        Self {
            config,
            orchestrator,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` instead of wall-clock time for capture windows.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Bootstrap a session, connect, and capture every source.
    ///
    /// `connect` builds the analytics client from the session tokens; it is
    /// only called once bootstrap has succeeded.
    pub async fn execute<F>(
        &self,
        session: &dyn SessionProvider,
        connect: F,
    ) -> Result<RunSummary, RunError>
    where
        F: FnOnce(&SessionTokens) -> Result<Arc<dyn PodcastAnalytics>, ApiError>,
    {
        let span = info_span!(
            "capture_run",
            run_id = %Uuid::new_v4(),
            show = %self.config.show.podcast_id
        );

        async move {
            let tokens = session.get_session().await?;
            let analytics = connect(&tokens)?;
            let summary = self.capture_all(analytics.as_ref()).await?;

            info!(
                "Run complete: {} captured, {} skipped",
                summary.captured,
                summary.skipped.len()
            );
            Ok::<_, RunError>(summary)
        }
        .instrument(span)
        .await
    }

    /// Capture every source with an already connected client.
    ///
    /// The returned summary covers this call only.
    pub async fn capture_all(
        &self,
        analytics: &dyn PodcastAnalytics,
    ) -> Result<RunSummary, CaptureError> {
        self.orchestrator.reset_summary().await;
        let capture = &self.config.capture;
        let no_meta = CaptureMeta::new();

        let range = self.window(capture.overview_window_days);
        self.orchestrator
            .fetch_and_capture(Source::Overview, || analytics.overview(), range, &no_meta)
            .await?;

        let range = self.window(capture.trends_window_days);
        self.orchestrator
            .fetch_and_capture(
                Source::Trends,
                || analytics.trends(range.start(), range.end()),
                range,
                &no_meta,
            )
            .await?;

        let range = self.window(capture.episodes_window_days);
        let episodes = self
            .orchestrator
            .fetch_and_capture(Source::Episodes, || analytics.episodes(), range, &no_meta)
            .await?;

        match episodes {
            Some(payload) => {
                let episodes = extract_episodes(&payload);
                info!("Found {} episodes", episodes.len());
                EpisodeFanOut::new(Arc::clone(&self.clock), capture.episode_window_days)
                    .run(&self.orchestrator, analytics, &episodes)
                    .await?;
            }
            None => warn!("No episodes payload, skipping episode details"),
        }

        Ok(self.orchestrator.summary().await)
    }

    fn window(&self, days: u32) -> TimeRange {
        TimeRange::trailing_days(self.clock.now(), days)
    }
}
