//! Enriched increment records with administrative location and metrics.

use chrono::NaiveDate;

use crate::{Footprint, TrackingId};

/// A de-duplicated increment joined with administrative boundaries and
/// event-level metrics. Terminal pipeline artifact; the store client
/// serializes these for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedPolygon {
    pub event: TrackingId,
    pub date: NaiveDate,
    /// 1-based day index within the event.
    pub day_of_fire: u32,
    /// Province of the event's first increment.
    pub province: String,
    /// Canton of the event's first increment.
    pub canton: String,
    /// Parish of the event's first increment.
    pub parish: String,
    /// Area of this increment in hectares.
    pub area_ha: f64,
    /// Cumulative area of the whole event in hectares.
    pub total_area_ha: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Inclusive duration: `end_date - start_date + 1`.
    pub duration_days: i64,
    pub footprint: Footprint,
}

impl EnrichedPolygon {
    /// Whether the owning event crosses the large-event area threshold.
    pub fn is_large(&self, threshold_ha: f64) -> bool {
        self.total_area_ha >= threshold_ha
    }
}
