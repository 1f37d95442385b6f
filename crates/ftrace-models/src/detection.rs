//! Hotspot detections and fetch geometry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::TrackingId;

/// Geographic bounding box for a detection feed request (WGS84 degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Ecuador operational region.
    pub fn ecuador() -> Self {
        Self::new(-92.0, -5.0, -75.2, 1.7)
    }

    /// Comma-separated `min_lon,min_lat,max_lon,max_lat`, the form the
    /// FIRMS area API expects in its URL path.
    pub fn to_area_string(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// A single satellite hotspot observation.
///
/// Positions are carried twice: the WGS84 coordinates as fetched (used for
/// tracking-ID allocation) and the projected metric coordinates (used for
/// all distance and area computations). Immutable after ingest except for
/// event assignment during clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// WGS84 longitude.
    pub longitude: f64,
    /// WGS84 latitude.
    pub latitude: f64,
    /// Projected easting in metres (UTM zone 17S).
    pub x: f64,
    /// Projected northing in metres (UTM zone 17S).
    pub y: f64,
    /// Acquisition date (day resolution, drives clustering).
    pub acq_date: NaiveDate,
    /// Acquisition time as reported by the feed (HHMM).
    pub acq_time: String,
    /// Brightness temperature of the detection channel (Kelvin).
    pub brightness: f64,
    /// Brightness temperature of the secondary channel (Kelvin).
    pub bright_t31: f64,
    /// Fire radiative power (MW).
    pub frp: f64,
    /// Along-scan pixel size.
    pub scan: f64,
    /// Along-track pixel size.
    pub track: f64,
    /// Detection confidence class (`l`/`n`/`h` for VIIRS).
    pub confidence: String,
    /// Satellite identifier.
    pub satellite: String,
    /// Instrument identifier.
    pub instrument: String,
    /// Collection version string.
    pub version: String,
    /// Day/night flag (`D`/`N`).
    pub daynight: String,
    /// Assigned event, `None` until clustering.
    pub event: Option<TrackingId>,
}

impl Detection {
    /// Projected position as a `geo` point.
    pub fn position(&self) -> geo_types::Point<f64> {
        geo_types::Point::new(self.x, self.y)
    }

    /// Projected position as a raw coordinate.
    pub fn coord(&self) -> geo_types::Coord<f64> {
        geo_types::Coord {
            x: self.x,
            y: self.y,
        }
    }
}
