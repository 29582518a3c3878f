use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for structured environment overrides, e.g. `PODCAPTURE_SHOW__PODCAST_ID`.
const ENV_PREFIX: &str = "PODCAPTURE_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(Figment::new().merge(Toml::file(path)))
}

/// Load configuration from environment variables only.
///
/// Used when the connector is deployed without a config file, as a plain
/// scheduled container with `PODCAST_ID` and `OPENPODCAST_API_TOKEN` set.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    extract(Figment::new())
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Identifier-like keys and the env vars that set them, lowest precedence first.
const VERBATIM_KEYS: &[(&str, &[&str])] = &[
    ("show.podcast_id", &["PODCAST_ID", "PODCAPTURE_SHOW__PODCAST_ID"]),
    (
        "ingestion.token",
        &["OPENPODCAST_API_TOKEN", "PODCAPTURE_INGESTION__TOKEN"],
    ),
];

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .merge(legacy_env())
        .merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["CONFIG", "LOG_FORMAT"])
                .split("__"),
        )
        .merge(verbatim_env())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Re-applies identifier variables as raw strings.
///
/// `Env` parses values, so `0042` would otherwise become the integer `42`.
fn verbatim_env() -> Figment {
    let mut figment = Figment::new();
    for (key, vars) in VERBATIM_KEYS {
        for var in *vars {
            if let Ok(value) = std::env::var(var) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }
    }
    figment
}

/// Variable names the connector has always been deployed with.
fn legacy_env() -> Env {
    Env::raw()
        .only(&["PODCAST_ID", "OPENPODCAST_API_TOKEN", "STORE_DATA"])
        .map(|key| {
            let key = key.as_str();
            if key.eq_ignore_ascii_case("PODCAST_ID") {
                "show.podcast_id".into()
            } else if key.eq_ignore_ascii_case("OPENPODCAST_API_TOKEN") {
                "ingestion.token".into()
            } else {
                "storage.enabled".into()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngestionFailurePolicy;
    use figment::Jail;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[show]
podcast_id = "1234567890"

[ingestion]
token = "secret"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.show.podcast_id, "1234567890");
        assert_eq!(
            config.ingestion.endpoint,
            "https://api.openpodcast.dev/connector"
        );
        assert_eq!(config.cookie_service.timeout_secs, 600);
        assert!(!config.storage.enabled);
    }

    #[test]
    fn test_load_config_from_str_missing_show() {
        let toml = r#"
[ingestion]
token = "secret"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[show]
podcast_id = "42"

[ingestion]
endpoint = "http://localhost:8080/connector"
token = "abc"

[storage]
enabled = true
root = "/tmp/podcapture"

[capture]
ingestion_failure_policy = "isolate"
"#,
            )?;

            let config = load_config(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.ingestion.endpoint, "http://localhost:8080/connector");
            assert!(config.storage.enabled);
            assert_eq!(config.storage.root.to_str(), Some("/tmp/podcapture"));
            assert_eq!(
                config.capture.ingestion_failure_policy,
                IngestionFailurePolicy::Isolate
            );
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[show]
podcast_id = "42"

[ingestion]
token = "abc"
"#,
            )?;
            jail.set_env("PODCAPTURE_SHOW__PODCAST_ID", "1000584606852");
            jail.set_env("PODCAPTURE_CAPTURE__TRENDS_WINDOW_DAYS", "14");

            let config = load_config(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.show.podcast_id, "1000584606852");
            assert_eq!(config.ingestion.token, "abc");
            assert_eq!(config.capture.trends_window_days, 14);
            Ok(())
        });
    }

    #[test]
    fn test_load_config_from_legacy_env() {
        Jail::expect_with(|jail| {
            jail.set_env("PODCAST_ID", "1000584606852");
            jail.set_env("OPENPODCAST_API_TOKEN", "12345");

            let config = load_config_from_env().map_err(|e| e.to_string())?;
            assert_eq!(config.show.podcast_id, "1000584606852");
            assert_eq!(config.ingestion.token, "12345");
            assert!(!config.storage.enabled);
            Ok(())
        });
    }

    #[test]
    fn test_numeric_env_values_kept_verbatim() {
        Jail::expect_with(|jail| {
            jail.set_env("PODCAST_ID", "0042");
            jail.set_env("OPENPODCAST_API_TOKEN", "00123456789012345678901234567890");

            let config = load_config_from_env().map_err(|e| e.to_string())?;
            assert_eq!(config.show.podcast_id, "0042");
            assert_eq!(config.ingestion.token, "00123456789012345678901234567890");
            Ok(())
        });
    }

    #[test]
    fn test_store_data_flag_values() {
        for (value, expected) in [("0", false), ("1", true), ("true", true), ("false", false)] {
            Jail::expect_with(|jail| {
                jail.set_env("PODCAST_ID", "1000");
                jail.set_env("OPENPODCAST_API_TOKEN", "tok");
                jail.set_env("STORE_DATA", value);

                let config = load_config_from_env().map_err(|e| e.to_string())?;
                assert_eq!(config.storage.enabled, expected, "STORE_DATA={}", value);
                Ok(())
            });
        }
    }

    #[test]
    fn test_prefixed_env_wins_over_legacy() {
        Jail::expect_with(|jail| {
            jail.set_env("PODCAST_ID", "1000");
            jail.set_env("PODCAPTURE_SHOW__PODCAST_ID", "2000");
            jail.set_env("OPENPODCAST_API_TOKEN", "legacy");
            jail.set_env("PODCAPTURE_INGESTION__TOKEN", "current");
            jail.set_env("PODCAPTURE_STORAGE__ENABLED", "1");

            let config = load_config_from_env().map_err(|e| e.to_string())?;
            assert_eq!(config.show.podcast_id, "2000");
            assert_eq!(config.ingestion.token, "current");
            assert!(config.storage.enabled);
            Ok(())
        });
    }

    #[test]
    fn test_load_config_from_env_missing_show() {
        Jail::expect_with(|jail| {
            jail.set_env("OPENPODCAST_API_TOKEN", "tok");

            let result = load_config_from_env();
            assert!(matches!(result, Err(ConfigError::ParseError(_))));
            Ok(())
        });
    }
}
