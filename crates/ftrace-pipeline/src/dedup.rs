//! Temporal de-duplication of daily footprints.
//!
//! Daily footprints are cumulative, so summing their areas would count
//! every previously burned hectare again each day. This stage converts
//! each event's footprint sequence into additive increments: the part of
//! each day's coverage not already attributed to an earlier day.

use std::collections::BTreeMap;

use geo::BooleanOps;
use geo_types::MultiPolygon;
use tracing::debug;

use ftrace_models::{Footprint, FootprintRecord, TrackingId};

/// Strip already-counted coverage from each footprint, per event.
///
/// Records must be ordered by date within each event (the builder emits
/// them that way). Dates whose increment comes out empty are dropped.
/// Post-condition: per event, kept increments are pairwise disjoint and
/// union to the union of all input footprints.
pub fn deduplicate(records: Vec<FootprintRecord>) -> Vec<FootprintRecord> {
    let mut order: Vec<TrackingId> = Vec::new();
    let mut by_event: BTreeMap<String, Vec<FootprintRecord>> = BTreeMap::new();
    for record in records {
        if !by_event.contains_key(record.event.as_str()) {
            order.push(record.event.clone());
        }
        by_event
            .entry(record.event.as_str().to_string())
            .or_default()
            .push(record);
    }

    let mut increments = Vec::new();

    for event in &order {
        let mut coverage: Option<MultiPolygon<f64>> = None;
        let mut last_degenerate: Option<Footprint> = None;

        for record in by_event.remove(event.as_str()).unwrap_or_default() {
            match &record.footprint {
                Footprint::Region(region) => {
                    let increment = match &coverage {
                        None => region.clone(),
                        Some(covered) => region.difference(covered),
                    };

                    if increment.0.is_empty() {
                        continue;
                    }

                    coverage = Some(match coverage.take() {
                        None => increment.clone(),
                        Some(covered) => covered.union(&increment),
                    });

                    increments.push(FootprintRecord {
                        footprint: Footprint::Region(increment),
                        ..record
                    });
                }
                degenerate => {
                    // Points and segments carry no area. Emit one only when
                    // it differs from the last emitted degenerate, so an
                    // unchanged footprint is not re-reported; once coverage
                    // is polygonal, degenerates cannot occur (footprints
                    // grow monotonically).
                    if coverage.is_some() || last_degenerate.as_ref() == Some(degenerate) {
                        continue;
                    }
                    last_degenerate = Some(degenerate.clone());
                    increments.push(record);
                }
            }
        }
    }

    debug!(increments = increments.len(), "De-duplication complete");
    increments
}
