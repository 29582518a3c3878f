use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub show: ShowConfig,
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub cookie_service: CookieServiceConfig,
    #[serde(default)]
    pub apple: AppleConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// The show whose analytics are captured
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShowConfig {
    /// Apple Podcasts show identifier (legacy env: `PODCAST_ID`)
    #[serde(deserialize_with = "string_or_integer")]
    pub podcast_id: String,
}

/// Open Podcast ingestion API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestionConfig {
    /// Connector endpoint receiving capture envelopes
    #[serde(default = "default_ingestion_endpoint")]
    pub endpoint: String,
    /// Bearer token (legacy env: `OPENPODCAST_API_TOKEN`)
    #[serde(deserialize_with = "string_or_integer")]
    pub token: String,
    /// Optional request timeout. Unset means the HTTP client default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_ingestion_endpoint() -> String {
    "https://api.openpodcast.dev/connector".to_string()
}

/// Remote cookie service used to bootstrap a session
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CookieServiceConfig {
    #[serde(default = "default_cookie_url")]
    pub url: String,
    /// The service drives a real browser, so this is deliberately long.
    #[serde(default = "default_cookie_timeout")]
    pub timeout_secs: u64,
}

impl Default for CookieServiceConfig {
    fn default() -> Self {
        Self {
            url: default_cookie_url(),
            timeout_secs: default_cookie_timeout(),
        }
    }
}

fn default_cookie_url() -> String {
    "https://apple-automation.openpodcast.dev/cookies".to_string()
}

fn default_cookie_timeout() -> u64 {
    600
}

/// Apple Podcasts Connect analytics API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppleConfig {
    #[serde(default = "default_apple_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for AppleConfig {
    fn default() -> Self {
        Self {
            base_url: default_apple_base_url(),
            timeout_secs: None,
        }
    }
}

fn default_apple_base_url() -> String {
    "https://podcastsconnect.apple.com/analytics/api/v1".to_string()
}

/// Local debug persistence of raw payloads
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Legacy env: `STORE_DATA`, deployed as `0`/`1`
    #[serde(default, deserialize_with = "figment::util::bool_from_str_or_int")]
    pub enabled: bool,
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            root: default_storage_root(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("data")
}

/// What to do when the ingestion service cannot be reached.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IngestionFailurePolicy {
    /// Stop the run on the first transport failure.
    #[default]
    Abort,
    /// Log the failure and keep capturing the remaining sources.
    Isolate,
}

/// Capture windows and failure policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    #[serde(default = "default_overview_window")]
    pub overview_window_days: u32,
    #[serde(default = "default_weekly_window")]
    pub trends_window_days: u32,
    #[serde(default = "default_weekly_window")]
    pub episodes_window_days: u32,
    #[serde(default = "default_weekly_window")]
    pub episode_window_days: u32,
    #[serde(default)]
    pub ingestion_failure_policy: IngestionFailurePolicy,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            overview_window_days: default_overview_window(),
            trends_window_days: default_weekly_window(),
            episodes_window_days: default_weekly_window(),
            episode_window_days: default_weekly_window(),
            ingestion_failure_policy: IngestionFailurePolicy::default(),
        }
    }
}

fn default_overview_window() -> u32 {
    1
}

fn default_weekly_window() -> u32 {
    7
}

/// Show ids are all digits, so TOML and env values may arrive as integers.
fn string_or_integer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInteger {
        String(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match StringOrInteger::deserialize(deserializer)? {
        StringOrInteger::String(s) => s,
        StringOrInteger::Unsigned(n) => n.to_string(),
        StringOrInteger::Signed(n) => n.to_string(),
    })
}

impl Config {
    /// Minimal configuration with every optional section at its default.
    pub fn new(podcast_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            show: ShowConfig {
                podcast_id: podcast_id.into(),
            },
            ingestion: IngestionConfig {
                endpoint: default_ingestion_endpoint(),
                token: token.into(),
                timeout_secs: None,
            },
            cookie_service: CookieServiceConfig::default(),
            apple: AppleConfig::default(),
            storage: StorageConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}
