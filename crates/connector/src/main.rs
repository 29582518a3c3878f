use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use podcapture_core::{
    load_config, load_config_from_env, validate_config, AppleConnector, CaptureRun,
    CookieServiceClient, IngestionClient, PodcastAnalytics,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let json = std::env::var("PODCAPTURE_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn run() -> Result<()> {
    info!("Starting apple-connector v{}", VERSION);

    // Determine config path
    let config_path = std::env::var("PODCAPTURE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Fall back to environment-only configuration when there is no file
    let config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!("No config file at {:?}, using environment", config_path);
        load_config_from_env().context("Failed to load config from environment")?
    };

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Show: {}", config.show.podcast_id);
    info!("Ingestion endpoint: {}", config.ingestion.endpoint);
    if config.storage.enabled {
        info!("Storing raw payloads under {:?}", config.storage.root);
    }

    let config = Arc::new(config);

    let session = CookieServiceClient::new(&config.cookie_service)
        .context("Failed to create cookie service client")?;
    let ingestion =
        IngestionClient::new(&config.ingestion).context("Failed to create ingestion client")?;

    let capture_run = CaptureRun::new(Arc::clone(&config), Arc::new(ingestion));

    let apple_config = config.apple.clone();
    let podcast_id = config.show.podcast_id.clone();
    let summary = capture_run
        .execute(&session, move |tokens| {
            let connector = AppleConnector::new(&apple_config, &podcast_id, tokens)?;
            Ok(Arc::new(connector) as Arc<dyn PodcastAnalytics>)
        })
        .await
        .context("Capture run failed")?;

    info!(
        "Summary: {}",
        serde_json::to_string(&summary).unwrap_or_default()
    );

    Ok(())
}
