//! Envelope construction and delivery to the Open Podcast ingestion API.

mod client;
mod envelope;

pub use client::{IngestionClient, IngestionResponse, IngestionSink};
pub use envelope::{
    build_envelope, merge_meta, CaptureEnvelope, CaptureMeta, InvalidTimeRange, TimeRange,
    ENVELOPE_VERSION, PROVIDER,
};

use thiserror::Error;

/// Errors that can occur when sending an envelope.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service could not be reached for a reason other than HTTP.
    #[error("Ingestion service unavailable: {0}")]
    Unavailable(String),
}
