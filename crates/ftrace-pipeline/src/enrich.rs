//! Administrative enrichment and per-event metrics.
//!
//! Each event's earliest increment is joined against the administrative
//! boundary layer; the resolved province/canton/parish is broadcast to all
//! of the event's increments, which then receive a 1-based day index and
//! the event-level aggregates (total area, start/end date, duration).

use std::collections::BTreeMap;
use std::path::Path;

use geo::{Area, BooleanOps, Centroid, Distance, Euclidean, Intersects, MapCoords};
use geo_types::{Geometry, MultiPolygon, Point};
use tracing::{debug, info};

use ftrace_models::{EnrichedPolygon, Footprint, FootprintRecord, TrackingId};

use crate::error::{PipelineError, PipelineResult};
use crate::proj;

/// GeoJSON property keys of the parish boundary layer.
const PROP_PROVINCE: &str = "DPA_DESPRO";
const PROP_CANTON: &str = "DPA_DESCAN";
const PROP_PARISH: &str = "DPA_DESPAR";

/// One administrative boundary polygon with its names.
#[derive(Debug, Clone)]
pub struct AdminRegion {
    pub province: String,
    pub canton: String,
    pub parish: String,
    /// Boundary geometry, projected into the working (UTM) system.
    pub geometry: MultiPolygon<f64>,
}

/// The administrative boundary reference layer.
#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    regions: Vec<AdminRegion>,
}

impl BoundaryLayer {
    pub fn new(regions: Vec<AdminRegion>) -> Self {
        Self { regions }
    }

    /// Load the layer from a GeoJSON file in WGS84, projecting every
    /// feature into the working coordinate system. Missing or malformed
    /// files are fatal: the run cannot locate events without boundaries.
    pub fn from_geojson_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::boundary_layer(format!("{}: {}", path.display(), e))
        })?;
        Self::from_geojson_str(&contents)
    }

    /// Parse the layer from GeoJSON text (WGS84).
    pub fn from_geojson_str(contents: &str) -> PipelineResult<Self> {
        let geojson: geojson::GeoJson = contents
            .parse()
            .map_err(|e: geojson::Error| PipelineError::boundary_layer(e.to_string()))?;

        let geojson::GeoJson::FeatureCollection(collection) = geojson else {
            return Err(PipelineError::boundary_layer(
                "expected a FeatureCollection",
            ));
        };

        let mut regions = Vec::new();

        for feature in collection.features {
            let Some(geometry) = feature.geometry else { continue };
            let geometry: Geometry<f64> = geometry
                .try_into()
                .map_err(|e: geojson::Error| PipelineError::boundary_layer(e.to_string()))?;

            let Some(polygons) = as_multipolygon(geometry) else { continue };
            let projected = polygons.map_coords(|c| proj::project(c.x, c.y));

            let prop = |key: &str| -> String {
                feature
                    .properties
                    .as_ref()
                    .and_then(|p| p.get(key))
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string()
            };

            regions.push(AdminRegion {
                province: prop(PROP_PROVINCE),
                canton: prop(PROP_CANTON),
                parish: prop(PROP_PARISH),
                geometry: projected,
            });
        }

        if regions.is_empty() {
            return Err(PipelineError::boundary_layer(
                "boundary layer contains no polygon features",
            ));
        }

        debug!(regions = regions.len(), "Boundary layer loaded");
        Ok(Self { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Resolve the boundary for a footprint, deterministically.
    ///
    /// Among boundaries intersecting the footprint, the one with the
    /// largest overlap area wins; when every overlap is zero (point or
    /// segment footprints), the boundary whose centroid is nearest wins.
    /// Layer order breaks exact ties, and the layer is never reordered.
    fn resolve(&self, footprint: &Footprint) -> Option<&AdminRegion> {
        let shape = footprint.to_geometry();
        let candidates: Vec<&AdminRegion> = self
            .regions
            .iter()
            .filter(|r| r.geometry.intersects(&shape))
            .collect();

        if candidates.is_empty() {
            return None;
        }

        if let Footprint::Region(region) = footprint {
            let best = candidates
                .iter()
                .map(|r| (r, r.geometry.intersection(region).unsigned_area()))
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(r, _)| *r);
            if let Some(region) = best {
                return Some(region);
            }
        }

        let anchor = representative_point(footprint);
        candidates.into_iter().min_by(|a, b| {
            let da = a
                .geometry
                .centroid()
                .map_or(f64::INFINITY, |c| Euclidean.distance(c, anchor));
            let db = b
                .geometry
                .centroid()
                .map_or(f64::INFINITY, |c| Euclidean.distance(c, anchor));
            da.total_cmp(&db)
        })
    }
}

fn as_multipolygon(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        Geometry::MultiPolygon(mp) => Some(mp),
        _ => None,
    }
}

fn representative_point(footprint: &Footprint) -> Point<f64> {
    match footprint {
        Footprint::Point(p) => *p,
        Footprint::Segment(l) => Point::new(
            (l.start.x + l.end.x) / 2.0,
            (l.start.y + l.end.y) / 2.0,
        ),
        Footprint::Region(mp) => mp.centroid().unwrap_or_else(|| Point::new(0.0, 0.0)),
    }
}

/// Join increments against the boundary layer and compute metrics.
///
/// Events whose earliest increment matches no boundary are dropped with a
/// log line; everything else is returned enriched. Event order follows
/// first appearance in the input, dates ascending within each event.
pub fn enrich(increments: Vec<FootprintRecord>, layer: &BoundaryLayer) -> Vec<EnrichedPolygon> {
    let mut order: Vec<TrackingId> = Vec::new();
    let mut by_event: BTreeMap<String, Vec<FootprintRecord>> = BTreeMap::new();
    for record in increments {
        if !by_event.contains_key(record.event.as_str()) {
            order.push(record.event.clone());
        }
        by_event
            .entry(record.event.as_str().to_string())
            .or_default()
            .push(record);
    }

    let mut enriched = Vec::new();
    let mut dropped = 0usize;

    for event in &order {
        let mut records = by_event.remove(event.as_str()).unwrap_or_default();
        records.sort_by_key(|r| r.date);

        let Some(first) = records.first() else { continue };
        let Some(region) = layer.resolve(&first.footprint) else {
            dropped += 1;
            info!(event = %event, "Event outside every boundary, dropped");
            continue;
        };

        let province = region.province.clone();
        let canton = region.canton.clone();
        let parish = region.parish.clone();

        let start_date = records.first().map(|r| r.date).unwrap_or_default();
        let end_date = records.last().map(|r| r.date).unwrap_or_default();
        let duration_days = (end_date - start_date).num_days() + 1;
        let total_area_ha: f64 = records.iter().map(|r| r.footprint.area_ha()).sum();

        for (index, record) in records.into_iter().enumerate() {
            let area_ha = record.footprint.area_ha();
            enriched.push(EnrichedPolygon {
                event: record.event,
                date: record.date,
                day_of_fire: index as u32 + 1,
                province: province.clone(),
                canton: canton.clone(),
                parish: parish.clone(),
                area_ha,
                total_area_ha,
                start_date,
                end_date,
                duration_days,
                footprint: record.footprint,
            });
        }
    }

    debug!(
        records = enriched.len(),
        dropped_events = dropped,
        "Enrichment complete"
    );
    enriched
}
