//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC-only timestamp truncated to seconds
//! precision. Attestations, proof bundles, and ledger records all carry
//! timestamps; a local timezone offset or sub-second component would make
//! the same instant serialize to different bytes in different processes.
//!
//! Serialized form is always `YYYY-MM-DDTHH:MM:SSZ` — no sub-seconds, no
//! `+00:00`, always `Z`.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::VerisError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::from_epoch_secs()`] — from a Unix timestamp.
/// - [`Timestamp::parse()`] — from an ISO8601 string, rejecting non-UTC offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating
    /// sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, VerisError> {
        let dt = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| VerisError::Validation(format!("invalid Unix timestamp: {secs}")))?;
        Ok(Self(dt))
    }

    /// Parse a timestamp from an RFC 3339 string.
    ///
    /// **Rejects non-UTC inputs.** Only the `Z` suffix is accepted; explicit
    /// offsets — even `+00:00` — are rejected so that every stored timestamp
    /// has exactly one textual form.
    pub fn parse(s: &str) -> Result<Self, VerisError> {
        if !s.ends_with('Z') {
            return Err(VerisError::Validation(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            VerisError::Validation(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    // with_nanosecond(0) only fails for out-of-range values; 0 never is.
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn iso8601_format() {
        let ts = Timestamp::from_epoch_secs(1_700_000_000).unwrap();
        assert_eq!(ts.to_iso8601(), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn parse_requires_z_suffix() {
        assert!(Timestamp::parse("2023-11-14T22:13:20Z").is_ok());
        assert!(Timestamp::parse("2023-11-14T22:13:20+00:00").is_err());
        assert!(Timestamp::parse("2023-11-14T22:13:20+05:30").is_err());
        assert!(Timestamp::parse("not a timestamp").is_err());
    }

    #[test]
    fn parse_truncates_subseconds() {
        let ts = Timestamp::parse("2023-11-14T22:13:20.123456Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn serde_roundtrip() {
        let ts = Timestamp::from_epoch_secs(1_700_000_000).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2023-11-14T22:13:20Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn ordering_follows_time() {
        let a = Timestamp::from_epoch_secs(100).unwrap();
        let b = Timestamp::from_epoch_secs(200).unwrap();
        assert!(a < b);
    }
}
