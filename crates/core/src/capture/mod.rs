//! Capture orchestration.
//!
//! - [`CaptureOrchestrator`] fetches one source and forwards it, isolating
//!   fetch failures.
//! - [`EpisodeFanOut`] issues one capture per episode.
//! - [`CaptureRun`] sequences a whole run.

mod clock;
mod fanout;
mod orchestrator;
mod producer;
mod run;
mod types;

pub use clock::{Clock, SystemClock};
pub use fanout::{extract_episodes, EpisodeFanOut, EpisodeRef};
pub use orchestrator::{fetch, CaptureOrchestrator};
pub use producer::{ProduceFuture, Producer};
pub use run::CaptureRun;
pub use types::{CaptureError, FetchOutcome, RunError, RunSummary, Source};
