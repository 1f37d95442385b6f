//! Structured run outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate statistics for one completed pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Total enriched polygon records produced.
    pub total_polygons: usize,
    /// Distinct events among them.
    pub unique_events: usize,
    /// Events at or above the large-event area threshold.
    pub large_events: usize,
    /// Sum of per-record increment areas in hectares.
    pub total_area_ha: f64,
    /// Whether the persist step succeeded end to end.
    pub uploaded: bool,
}

/// Terminal result of one pipeline run.
///
/// The worker always returns one of these, success or not; failures carry
/// the specific stage error string instead of propagating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<RunStats>,
    pub processed_at: DateTime<Utc>,
}

impl RunOutcome {
    /// Successful run with its stats.
    pub fn success(message: impl Into<String>, stats: RunStats) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            stats: Some(stats),
            processed_at: Utc::now(),
        }
    }

    /// Failed run with a stage-specific error string.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            stats: None,
            processed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_carries_error_only() {
        let outcome = RunOutcome::failure("no detections fetched");
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("no detections fetched"));
        assert!(outcome.stats.is_none());
    }

    #[test]
    fn test_success_serializes_stats() {
        let outcome = RunOutcome::success(
            "incremental run completed",
            RunStats {
                total_polygons: 4,
                unique_events: 2,
                large_events: 1,
                total_area_ha: 42.5,
                uploaded: true,
            },
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["stats"]["unique_events"], 2);
        assert!(json.get("error").is_none());
    }
}
