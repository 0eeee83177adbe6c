//! Instants used by grant validity windows.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A Unix timestamp in whole seconds.
///
/// Grants persist `nbf`/`exp` as `int64` seconds, so this is the unit every
/// window comparison uses. Nothing here reads a clock: the caller converts
/// its own clock reading and passes the instant in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_unix(seconds: i64) -> Self {
        Self(seconds)
    }

    pub const fn as_unix(&self) -> i64 {
        self.0
    }

    /// Offset by a signed number of seconds, saturating at the `i64` bounds.
    pub const fn saturating_add_secs(self, seconds: i64) -> Self {
        Self(self.0.saturating_add(seconds))
    }

    /// Convert back to a UTC datetime (`None` when out of chrono's range).
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.0, 0).single()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp())
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for i64 {
    fn from(value: Timestamp) -> Self {
        value.0
    }
}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "@{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_datetimes_to_seconds() {
        let dt = Utc.timestamp_opt(1_700_000_000, 999_000_000).unwrap();
        assert_eq!(Timestamp::from(dt).as_unix(), 1_700_000_000);
    }

    #[test]
    fn serializes_as_plain_integer() {
        let ts = Timestamp::from_unix(42);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "42");
        assert_eq!(serde_json::from_str::<Timestamp>("42").unwrap(), ts);
    }

    #[test]
    fn add_saturates() {
        assert_eq!(Timestamp::from_unix(i64::MAX).saturating_add_secs(1).as_unix(), i64::MAX);
        assert_eq!(Timestamp::from_unix(10).saturating_add_secs(-3).as_unix(), 7);
    }
}
