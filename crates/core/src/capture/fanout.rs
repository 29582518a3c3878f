//! Per-episode fan-out after a successful `episodes` capture.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::apple::PodcastAnalytics;
use crate::ingest::{CaptureMeta, TimeRange};

use super::clock::Clock;
use super::orchestrator::CaptureOrchestrator;
use super::types::{CaptureError, Source};

/// One episode listed in the `episodes` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRef {
    pub id: String,
    pub descriptor: Value,
}

/// Extract episode refs from `{"content": {"results": {<id>: {...}}}}`.
///
/// Refs come back in payload key order. A payload of any other shape yields
/// no episodes.
pub fn extract_episodes(payload: &Value) -> Vec<EpisodeRef> {
    match payload.pointer("/content/results").and_then(Value::as_object) {
        Some(results) => results
            .iter()
            .map(|(id, descriptor)| EpisodeRef {
                id: id.clone(),
                descriptor: descriptor.clone(),
            })
            .collect(),
        None => {
            warn!("Episodes payload has no content.results mapping");
            Vec::new()
        }
    }
}

/// Issues one `episodeDetails` capture per episode.
pub struct EpisodeFanOut {
    clock: Arc<dyn Clock>,
    window_days: u32,
}

impl EpisodeFanOut {
    pub fn new(clock: Arc<dyn Clock>, window_days: u32) -> Self {
        Self { clock, window_days }
    }

    /// Capture details for every episode, in order.
    ///
    /// The window is taken from the clock at the start of each iteration,
    /// so a run crossing midnight reports later episodes against the new day.
    /// Returns how many episodes produced a payload.
    pub async fn run(
        &self,
        orchestrator: &CaptureOrchestrator,
        analytics: &dyn PodcastAnalytics,
        episodes: &[EpisodeRef],
    ) -> Result<usize, CaptureError> {
        let mut fetched = 0;

        for episode in episodes {
            let range = TimeRange::trailing_days(self.clock.now(), self.window_days);

            let mut meta = CaptureMeta::new();
            meta.insert("episode".to_string(), episode.id.clone());

            let payload = orchestrator
                .fetch_and_capture(
                    Source::EpisodeDetails,
                    || analytics.episode(&episode.id),
                    range,
                    &meta,
                )
                .await?;

            if payload.is_some() {
                fetched += 1;
            }
        }

        info!(
            "Episode details fetched for {}/{} episodes",
            fetched,
            episodes.len()
        );
        Ok(fetched)
    }
}
