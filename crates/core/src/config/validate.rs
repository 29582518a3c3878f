use reqwest::Url;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Show id and ingestion token are present
/// - Every remote endpoint is a parseable URL
/// - Timeouts and capture windows are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.show.podcast_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "show.podcast_id cannot be empty".to_string(),
        ));
    }

    if config.ingestion.token.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "ingestion.token cannot be empty".to_string(),
        ));
    }

    for (field, value) in [
        ("ingestion.endpoint", &config.ingestion.endpoint),
        ("cookie_service.url", &config.cookie_service.url),
        ("apple.base_url", &config.apple.base_url),
    ] {
        Url::parse(value).map_err(|e| {
            ConfigError::ValidationError(format!("{} is not a valid URL: {}", field, e))
        })?;
    }

    if config.cookie_service.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "cookie_service.timeout_secs cannot be 0".to_string(),
        ));
    }

    let capture = &config.capture;
    for (field, days) in [
        ("capture.overview_window_days", capture.overview_window_days),
        ("capture.trends_window_days", capture.trends_window_days),
        ("capture.episodes_window_days", capture.episodes_window_days),
        ("capture.episode_window_days", capture.episode_window_days),
    ] {
        if days == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be 0",
                field
            )));
        }
    }

    Ok(())
}
