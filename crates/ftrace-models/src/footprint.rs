//! Daily burned-area footprints.

use chrono::NaiveDate;
use geo::Area;
use geo_types::{Geometry, Line, MultiPolygon, Point};

use crate::TrackingId;

/// Cumulative fire-affected geometry for one event as of one date.
///
/// The variant follows the accumulated-point count of the builder: a single
/// detection yields a point, two detections a segment, three or more a
/// triangulated polygon union. Keeping the degenerate cases as explicit
/// variants lets the builder and de-duplicator branch on them directly
/// instead of probing geometry types.
#[derive(Debug, Clone, PartialEq)]
pub enum Footprint {
    /// One accumulated detection.
    Point(Point<f64>),
    /// Two accumulated detections (their convex hull).
    Segment(Line<f64>),
    /// Triangulated, unioned coverage.
    Region(MultiPolygon<f64>),
}

impl Footprint {
    /// Area in square metres. Zero for degenerate variants.
    pub fn area_m2(&self) -> f64 {
        match self {
            Footprint::Point(_) | Footprint::Segment(_) => 0.0,
            Footprint::Region(mp) => mp.unsigned_area(),
        }
    }

    /// Area in hectares.
    pub fn area_ha(&self) -> f64 {
        self.area_m2() / 10_000.0
    }

    /// True when the footprint carries no geometry at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Footprint::Point(_) | Footprint::Segment(_) => false,
            Footprint::Region(mp) => mp.0.iter().all(|p| p.exterior().0.is_empty()),
        }
    }

    /// True for triangulated (polygonal) coverage.
    pub fn is_polygonal(&self) -> bool {
        matches!(self, Footprint::Region(_))
    }

    /// Borrow the polygonal coverage, if any.
    pub fn as_region(&self) -> Option<&MultiPolygon<f64>> {
        match self {
            Footprint::Region(mp) => Some(mp),
            _ => None,
        }
    }

    /// Convert to a generic geometry for spatial predicates and WKT.
    pub fn to_geometry(&self) -> Geometry<f64> {
        match self {
            Footprint::Point(p) => Geometry::Point(*p),
            Footprint::Segment(l) => Geometry::Line(*l),
            Footprint::Region(mp) => Geometry::MultiPolygon(mp.clone()),
        }
    }
}

/// One (event, date) footprint, the unit flowing between the polygon
/// builder, the de-duplicator and enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct FootprintRecord {
    pub event: TrackingId,
    pub date: NaiveDate,
    pub footprint: Footprint,
}
