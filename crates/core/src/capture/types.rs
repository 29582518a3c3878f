//! Types for capture orchestration.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::apple::ApiError;
use crate::ingest::IngestionError;
use crate::session::SessionError;
use crate::storage::StorageError;

/// A named remote data feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Source {
    #[serde(rename = "overview")]
    Overview,
    #[serde(rename = "trends")]
    Trends,
    #[serde(rename = "episodes")]
    Episodes,
    #[serde(rename = "episodeDetails")]
    EpisodeDetails,
}

impl Source {
    /// Endpoint name reported in envelope metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Overview => "overview",
            Source::Trends => "trends",
            Source::Episodes => "episodes",
            Source::EpisodeDetails => "episodeDetails",
        }
    }

    /// Key prefix for debug payload files, relative to the storage root.
    pub fn storage_prefix(&self) -> &'static str {
        match self {
            Source::Overview => "podcast/overview/",
            Source::Trends => "podcast/trends/",
            Source::Episodes => "podcast/episodes/",
            Source::EpisodeDetails => "episodes/details/",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of invoking a producer.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The source returned a payload.
    Fetched(Value),
    /// The source could not be fetched. Never carries data forward.
    Failed { source: Source, error: ApiError },
}

impl FetchOutcome {
    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched(_))
    }
}

/// Failures that terminate a run once fetching has started.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The envelope could not be delivered to the ingestion service.
    #[error("failed to send {endpoint} capture: {error}")]
    Ingestion {
        endpoint: Source,
        #[source]
        error: IngestionError,
    },

    /// The raw payload could not be written to the debug store.
    #[error("failed to store {endpoint} payload: {error}")]
    Storage {
        endpoint: Source,
        #[source]
        error: StorageError,
    },
}

/// Failures that terminate a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("session bootstrap failed: {0}")]
    Session(#[from] SessionError),

    #[error("failed to create analytics client: {0}")]
    Connect(#[from] ApiError),

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// What a run captured and what it had to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Envelopes delivered to the ingestion service.
    pub captured: usize,
    /// Sources that produced no envelope, in the order they were attempted.
    pub skipped: Vec<Source>,
}
