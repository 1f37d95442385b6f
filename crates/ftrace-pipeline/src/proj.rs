//! WGS84 ↔ UTM zone 17S coordinate conversion (EPSG:32717).
//!
//! All clustering distances and polygon areas are computed in this
//! projected metric system; only geometry bound for the store is converted
//! back to geographic coordinates. The zone is fixed: the operational
//! bounding box sits inside UTM zone 17, southern hemisphere.
//!
//! Forward and inverse transverse Mercator use the standard series
//! expansions (Snyder, "Map Projections: A Working Manual", eqs. 8-9ff),
//! accurate to well under a metre inside the zone.

use geo::MapCoords;
use geo_types::{Coord, MultiPolygon};

// WGS84 ellipsoid
const A: f64 = 6_378_137.0;
const F: f64 = 1.0 / 298.257_223_563;

// UTM constants for zone 17 south
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING: f64 = 10_000_000.0;
/// Central meridian of zone 17: -183 + 6 * 17.
const LON_ORIGIN_DEG: f64 = -81.0;

/// Project a WGS84 position (degrees) to UTM 17S metres.
pub fn project(lon: f64, lat: f64) -> Coord<f64> {
    let e2 = F * (2.0 - F);
    let ep2 = e2 / (1.0 - e2);

    let phi = lat.to_radians();
    let lambda = (lon - LON_ORIGIN_DEG).to_radians();

    let sin_phi = phi.sin();
    let cos_phi = phi.cos();
    let tan_phi = phi.tan();

    let n = A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = tan_phi * tan_phi;
    let c = ep2 * cos_phi * cos_phi;
    let a_ = cos_phi * lambda;

    let m = meridional_arc(phi, e2);

    let easting = K0
        * n
        * (a_
            + (1.0 - t + c) * a_.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a_.powi(5) / 120.0)
        + FALSE_EASTING;

    let northing = K0
        * (m + n
            * tan_phi
            * (a_ * a_ / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a_.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a_.powi(6) / 720.0))
        + FALSE_NORTHING;

    Coord {
        x: easting,
        y: northing,
    }
}

/// Inverse projection: UTM 17S metres back to WGS84 `(lon, lat)` degrees.
pub fn unproject(coord: Coord<f64>) -> (f64, f64) {
    let e2 = F * (2.0 - F);
    let ep2 = e2 / (1.0 - e2);
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

    let x = coord.x - FALSE_EASTING;
    let m = (coord.y - FALSE_NORTHING) / K0;

    let mu = m / (A * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0));

    // Footpoint latitude
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let c1 = ep2 * cos_phi1 * cos_phi1;
    let t1 = tan_phi1 * tan_phi1;
    let n1 = A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
    let r1 = A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = x / (n1 * K0);

    let phi = phi1
        - (n1 * tan_phi1 / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);

    let lambda = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
            * d.powi(5)
            / 120.0)
        / cos_phi1;

    (
        LON_ORIGIN_DEG + lambda.to_degrees(),
        phi.to_degrees(),
    )
}

/// Re-project a whole multipolygon back to WGS84 for persistence.
pub fn multipolygon_to_wgs84(mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    mp.map_coords(|c| {
        let (lon, lat) = unproject(c);
        Coord { x: lon, y: lat }
    })
}

/// Meridional arc length from the equator (Snyder eq. 3-21).
fn meridional_arc(phi: f64, e2: f64) -> f64 {
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    A * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}
