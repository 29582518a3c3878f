pub mod apple;
pub mod capture;
pub mod config;
pub mod ingest;
pub mod session;
pub mod storage;
pub mod testing;

pub use apple::{ApiError, AppleConnector, PodcastAnalytics};
pub use capture::{
    extract_episodes, CaptureError, CaptureOrchestrator, CaptureRun, Clock, EpisodeFanOut,
    EpisodeRef, FetchOutcome, Producer, RunError, RunSummary, Source, SystemClock,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
    IngestionFailurePolicy,
};
pub use ingest::{
    build_envelope, CaptureEnvelope, CaptureMeta, IngestionClient, IngestionError,
    IngestionResponse, IngestionSink, TimeRange,
};
pub use session::{CookieServiceClient, SessionError, SessionProvider, SessionTokens};
pub use storage::{LocalStore, StorageError};
