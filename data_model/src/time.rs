//! Module with [`Timestamp`] type.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Point in time received from the backend.
///
/// The backend emits both offset-aware RFC 3339 strings and naive ISO datetimes (stored in UTC),
/// so both are accepted. Always serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Parse a timestamp in any of the supported formats.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self(with_offset.with_timezone(&Utc)));
        }

        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_err| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| Self(naive.and_utc()))
    }

    /// Format as `dd.mm.yyyy`.
    #[must_use]
    pub fn date(&self) -> String {
        self.0.format("%d.%m.%Y").to_string()
    }

    /// Format as `dd.mm.yyyy, HH:MM`.
    #[must_use]
    pub fn date_time(&self) -> String {
        self.0.format("%d.%m.%Y, %H:%M").to_string()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid timestamp: `{raw}`")))
    }
}
