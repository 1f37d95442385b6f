//! Event tracking identifiers.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a wildfire event.
///
/// The base form encodes the first detection's day-of-year and coarse
/// location as `{day_of_year:03}{|round(lon*10)|:03}{|round(lat*10)|:03}`,
/// e.g. `217789012` for day 217 at (-78.9, -1.2). A 2-digit suffix is
/// appended only when the base collides with an already-issued ID, so the
/// same fire reappearing across runs keeps the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(pub String);

impl TrackingId {
    /// Build the base ID from a WGS84 location and acquisition date.
    pub fn base(lon: f64, lat: f64, date: NaiveDate) -> Self {
        Self(format!(
            "{:03}{:03}{:03}",
            date.ordinal(),
            (lon * 10.0).round().abs() as u64,
            (lat * 10.0).round().abs() as u64,
        ))
    }

    /// Append a 2-digit collision suffix (`1..=99`).
    pub fn with_suffix(&self, suffix: u8) -> Self {
        Self(format!("{}{:02}", self.0, suffix))
    }

    /// Create from an existing string (e.g. an ID listed by the store).
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
