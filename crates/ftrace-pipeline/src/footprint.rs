//! Daily footprint synthesis from clustered detections.
//!
//! Per event and per calendar date, all detections accumulated up to that
//! date are Delaunay-triangulated; triangles that bridge unrelated
//! clusters (long edges) or amount to sensor noise (oversized area) are
//! discarded and the survivors unioned into the day's coverage, which is
//! further unioned with the previous day's footprint so the area history
//! never shrinks. Below three accumulated points the footprint degenerates
//! to a segment or a single point.

use std::collections::BTreeMap;

use geo::{Area, BooleanOps};
use geo_types::{Coord, Line, LineString, MultiPolygon, Point, Polygon};
use spade::{DelaunayTriangulation, InsertionError, Point2, Triangulation};
use tracing::{debug, warn};

use ftrace_models::{Detection, Footprint, FootprintRecord, PipelineParams, TrackingId};

/// Drop events with fewer detections than the validity minimum.
pub fn filter_small_events(detections: Vec<Detection>, min_detections: usize) -> Vec<Detection> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for d in &detections {
        if let Some(event) = &d.event {
            *counts.entry(event.as_str()).or_insert(0) += 1;
        }
    }

    let valid: Vec<String> = counts
        .iter()
        .filter(|(_, &count)| count >= min_detections)
        .map(|(id, _)| id.to_string())
        .collect();

    debug!(
        valid = valid.len(),
        total = counts.len(),
        "Events passing the size filter"
    );

    detections
        .into_iter()
        .filter(|d| {
            d.event
                .as_ref()
                .is_some_and(|e| valid.iter().any(|v| v == e.as_str()))
        })
        .collect()
}

/// Build the cumulative daily footprint sequence for every event.
///
/// Input must already be clustered (every detection carries an event) and
/// filtered; detections are grouped by event in first-seen order, then by
/// ascending date. One record is emitted per (event, date) whose footprint
/// is non-empty.
pub fn build_daily_footprints(
    detections: &[Detection],
    params: &PipelineParams,
) -> Vec<FootprintRecord> {
    let mut order: Vec<TrackingId> = Vec::new();
    let mut by_event: BTreeMap<&str, BTreeMap<chrono::NaiveDate, Vec<Coord<f64>>>> =
        BTreeMap::new();

    for d in detections {
        let Some(event) = &d.event else { continue };
        if !by_event.contains_key(event.as_str()) {
            order.push(event.clone());
        }
        by_event
            .entry(event.as_str())
            .or_default()
            .entry(d.acq_date)
            .or_default()
            .push(d.coord());
    }

    let mut records = Vec::new();

    for event in &order {
        let days = &by_event[event.as_str()];
        let mut accumulated: Vec<Coord<f64>> = Vec::new();
        let mut prev_region: Option<MultiPolygon<f64>> = None;

        for (&date, coords) in days {
            accumulated.extend_from_slice(coords);

            let footprint = match accumulated.len() {
                0 => None,
                1 => Some(Footprint::Point(Point(accumulated[0]))),
                2 => Some(two_point_footprint(accumulated[0], accumulated[1])),
                _ => match triangulated_region(&accumulated, params) {
                    Ok(region) if !region.0.is_empty() => {
                        let grown = match &prev_region {
                            Some(prev) => region.union(prev),
                            None => region,
                        };
                        prev_region = Some(grown.clone());
                        Some(Footprint::Region(grown))
                    }
                    Ok(_) => {
                        // All triangles filtered out; keep yesterday's coverage
                        prev_region.clone().map(Footprint::Region)
                    }
                    Err(e) => {
                        warn!(event = %event, %date, "Triangulation failed, reusing previous footprint: {}", e);
                        prev_region.clone().map(Footprint::Region)
                    }
                },
            };

            if let Some(footprint) = footprint {
                if !footprint.is_empty() {
                    records.push(FootprintRecord {
                        event: event.clone(),
                        date,
                        footprint,
                    });
                }
            }
        }
    }

    records
}

/// Delaunay-triangulate the accumulated points and union the triangles
/// passing both quality filters (longest edge, area).
///
/// Returns an empty multipolygon when no triangle survives, and an error
/// only when the point set itself is rejected (non-finite coordinates).
/// Collinear point sets triangulate to zero faces, which lands in the
/// empty-result case rather than the error case.
pub fn triangulated_region(
    points: &[Coord<f64>],
    params: &PipelineParams,
) -> Result<MultiPolygon<f64>, InsertionError> {
    let vertices: Vec<Point2<f64>> = points.iter().map(|c| Point2::new(c.x, c.y)).collect();
    let triangulation: DelaunayTriangulation<Point2<f64>> =
        DelaunayTriangulation::bulk_load(vertices)?;

    let mut kept: Vec<Polygon<f64>> = Vec::new();

    for face in triangulation.inner_faces() {
        let [a, b, c] = face.positions();

        let longest_edge = edge_length(a, b)
            .max(edge_length(b, c))
            .max(edge_length(c, a));
        if longest_edge > params.max_triangle_edge_m {
            continue;
        }

        let triangle = Polygon::new(
            LineString::from(vec![(a.x, a.y), (b.x, b.y), (c.x, c.y), (a.x, a.y)]),
            vec![],
        );
        if triangle.unsigned_area() / 10_000.0 > params.max_triangle_area_ha {
            continue;
        }

        kept.push(triangle);
    }

    Ok(union_all(kept))
}

fn two_point_footprint(a: Coord<f64>, b: Coord<f64>) -> Footprint {
    if a == b {
        Footprint::Point(Point(a))
    } else {
        Footprint::Segment(Line::new(a, b))
    }
}

fn edge_length(a: Point2<f64>, b: Point2<f64>) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

fn union_all(polygons: Vec<Polygon<f64>>) -> MultiPolygon<f64> {
    let mut iter = polygons.into_iter();
    let Some(first) = iter.next() else {
        return MultiPolygon::new(vec![]);
    };

    let mut acc = MultiPolygon::new(vec![first]);
    for polygon in iter {
        acc = acc.union(&MultiPolygon::new(vec![polygon]));
    }
    acc
}
