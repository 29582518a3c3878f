//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every external collaborator
//! of a capture run, allowing full runs to be tested without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use podcapture_core::testing::{fixtures, MockAnalytics, MockIngestion, MockSessionProvider};
//!
//! let session = MockSessionProvider::with_cookies(fixtures::session_cookies());
//! let analytics = MockAnalytics::new();
//! let ingestion = MockIngestion::new();
//!
//! analytics.set_overview(fixtures::overview_payload()).await;
//! ```

mod mock_analytics;
mod mock_ingestion;
mod mock_session;

pub use mock_analytics::{MockAnalytics, RecordedAnalyticsCall};
pub use mock_ingestion::MockIngestion;
pub use mock_session::MockSessionProvider;

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::capture::Clock;

/// Clock that starts at a fixed instant and advances by `step` on every read.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl ManualClock {
    /// A clock frozen at `start`.
    pub fn fixed(start: DateTime<Utc>) -> Self {
        Self::ticking(start, Duration::zero())
    }

    /// A clock that moves forward by `step` after each read.
    pub fn ticking(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            now: Mutex::new(start),
            step,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        let current = *now;
        *now = current + self.step;
        current
    }
}

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Map, Value};

    use crate::config::Config;
    use crate::session::{SessionCookie, ITCTX, MYACINFO};

    /// A cookie set containing both required tokens plus noise.
    pub fn session_cookies() -> Vec<SessionCookie> {
        vec![
            SessionCookie::new("dslang", "US-EN"),
            SessionCookie::new(MYACINFO, "test-myacinfo"),
            SessionCookie::new(ITCTX, "test-itctx"),
        ]
    }

    /// A config for show `1000` with a dummy token.
    pub fn config() -> Config {
        Config::new("1000", "test-token")
    }

    pub fn overview_payload() -> Value {
        json!({"followers": 120, "listeners": 80, "engagedListeners": 35})
    }

    pub fn trends_payload() -> Value {
        json!({"data": [{"date": "2024-01-01", "listeners": 12}]})
    }

    /// An `episodes` payload listing `ids` in order.
    pub fn episodes_payload(ids: &[&str]) -> Value {
        let mut results = Map::new();
        for id in ids {
            results.insert(
                id.to_string(),
                json!({"id": id, "title": format!("Episode {}", id)}),
            );
        }
        json!({"content": {"results": results}})
    }

    pub fn episode_payload(id: &str) -> Value {
        json!({"id": id, "plays": 42, "averageConsumption": 0.73})
    }
}
