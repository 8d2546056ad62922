//! Timestamp helpers for completion records and artifacts.
//!
//! Records are written as `YYYY-MM-DDTHH:MM:SS.ffffff+00:00`. Reading accepts
//! any RFC 3339 offset (including `Z`) plus naive ISO forms, which are taken
//! as UTC.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Represents a timestamp that can be serialized/deserialized.
pub type Timestamp = DateTime<Utc>;

const WRITE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f+00:00";

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Formats a timestamp as an ISO 8601 string with microsecond precision.
#[must_use]
pub fn format_iso8601(dt: &Timestamp) -> String {
    dt.format(WRITE_FORMAT).to_string()
}

/// Parses an ISO 8601 timestamp.
pub fn parse_iso8601(s: &str) -> Option<Timestamp> {
    let trimmed = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Serde adapter for [`Timestamp`] fields using [`format_iso8601`].
pub mod iso8601 {
    use super::{format_iso8601, parse_iso8601, Timestamp};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes a timestamp.
    pub fn serialize<S: Serializer>(dt: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_iso8601(dt))
    }

    /// Deserializes a timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_iso8601(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid ISO 8601 timestamp: {raw}")))
    }
}

/// Serde adapter for timestamps written by other processes.
///
/// Accepts ISO 8601 strings and Unix seconds. Anything else reads as the
/// epoch instead of failing the whole record.
pub mod lenient {
    use super::{parse_iso8601, Timestamp};
    use chrono::DateTime;
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    pub use super::iso8601::serialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        UnixSeconds(i64),
        Other(IgnoredAny),
    }

    /// Deserializes a timestamp, falling back to the epoch.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let parsed = match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Text(raw) => parse_iso8601(&raw),
            RawTimestamp::UnixSeconds(secs) => DateTime::from_timestamp(secs, 0),
            RawTimestamp::Other(_) => None,
        };
        Ok(parsed.unwrap_or_default())
    }
}
