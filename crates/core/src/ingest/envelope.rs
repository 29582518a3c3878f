//! The normalized wire envelope wrapping every captured payload.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Provider identifier sent with every envelope.
pub const PROVIDER: &str = "apple";

/// Wire schema version of [`CaptureEnvelope`].
pub const ENVELOPE_VERSION: u32 = 1;

/// Metadata attached to an envelope.
pub type CaptureMeta = BTreeMap<String, String>;

/// Rejected attempt to build a range whose start lies after its end.
#[derive(Debug, Error)]
#[error("invalid time range: start {start} is after end {end}")]
pub struct InvalidTimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The period a payload covers.
///
/// Serialized as calendar days (`YYYY-MM-DD`) whatever the time of day of
/// the underlying instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidTimeRange> {
        if start > end {
            return Err(InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The `days` days leading up to `now`.
    pub fn trailing_days(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: now - Duration::days(i64::from(days)),
            end: now,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

impl Serialize for TimeRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Days {
            start: String,
            end: String,
        }

        Days {
            start: self.start.format("%Y-%m-%d").to_string(),
            end: self.end.format("%Y-%m-%d").to_string(),
        }
        .serialize(serializer)
    }
}

/// Envelope posted to the ingestion API.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureEnvelope {
    pub provider: &'static str,
    pub version: u32,
    pub retrieved: DateTime<Utc>,
    pub meta: CaptureMeta,
    pub range: TimeRange,
    pub data: Value,
}

/// Wrap `data` in an envelope stamped with the current time.
pub fn build_envelope(data: Value, range: TimeRange, meta: CaptureMeta) -> CaptureEnvelope {
    CaptureEnvelope {
        provider: PROVIDER,
        version: ENVELOPE_VERSION,
        retrieved: Utc::now(),
        meta,
        range,
        data,
    }
}

/// Caller metadata overlaid with the standard `show` and `endpoint` keys.
///
/// The standard keys always win over caller keys of the same name.
pub fn merge_meta(show: &str, endpoint: &str, extra: &CaptureMeta) -> CaptureMeta {
    let mut meta = extra.clone();
    meta.insert("show".to_string(), show.to_string());
    meta.insert("endpoint".to_string(), endpoint.to_string());
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_range_serializes_as_days() {
        let range = TimeRange::new(at(2024, 3, 1, 23, 59), at(2024, 3, 8, 0, 1)).unwrap();
        assert_eq!(
            serde_json::to_value(range).unwrap(),
            json!({"start": "2024-03-01", "end": "2024-03-08"})
        );
    }

    #[test]
    fn test_range_rejects_inverted() {
        let result = TimeRange::new(at(2024, 3, 8, 0, 0), at(2024, 3, 1, 0, 0));
        assert!(result.is_err());
    }

    #[test]
    fn test_range_same_instant_is_valid() {
        let now = at(2024, 1, 1, 12, 0);
        assert!(TimeRange::new(now, now).is_ok());
    }

    #[test]
    fn test_trailing_days() {
        let range = TimeRange::trailing_days(at(2024, 1, 3, 10, 30), 7);
        assert_eq!(range.start(), at(2023, 12, 27, 10, 30));
        assert_eq!(range.end(), at(2024, 1, 3, 10, 30));
    }

    #[test]
    fn test_merge_meta_standard_keys_win() {
        let mut extra = CaptureMeta::new();
        extra.insert("show".to_string(), "spoofed".to_string());
        extra.insert("endpoint".to_string(), "spoofed".to_string());
        extra.insert("episode".to_string(), "e1".to_string());

        let meta = merge_meta("1234", "episodeDetails", &extra);
        assert_eq!(meta["show"], "1234");
        assert_eq!(meta["endpoint"], "episodeDetails");
        assert_eq!(meta["episode"], "e1");
        assert_eq!(meta.len(), 3);
    }

    #[test]
    fn test_envelope_wire_shape() {
        let range = TimeRange::trailing_days(at(2024, 5, 10, 8, 0), 1);
        let meta = merge_meta("1234", "overview", &CaptureMeta::new());
        let envelope = build_envelope(json!({"followers": 10}), range, meta);

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["provider"], "apple");
        assert_eq!(value["version"], 1);
        assert_eq!(value["meta"], json!({"endpoint": "overview", "show": "1234"}));
        assert_eq!(value["range"], json!({"start": "2024-05-09", "end": "2024-05-10"}));
        assert_eq!(value["data"], json!({"followers": 10}));
        assert!(value["retrieved"].as_str().unwrap().contains('T'));
    }
}
