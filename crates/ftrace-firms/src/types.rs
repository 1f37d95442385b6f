//! FIRMS CSV row types.

use chrono::NaiveDate;
use serde::Deserialize;

use ftrace_models::Detection;

/// One row of the FIRMS area CSV feed (VIIRS column names; MODIS aliases
/// accepted for the brightness channels).
#[derive(Debug, Clone, Deserialize)]
pub struct FirmsRow {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(alias = "brightness")]
    pub bright_ti4: f64,
    pub scan: f64,
    pub track: f64,
    pub acq_date: NaiveDate,
    pub acq_time: String,
    pub satellite: String,
    pub instrument: String,
    pub confidence: String,
    pub version: String,
    #[serde(alias = "bright_t31")]
    pub bright_ti5: f64,
    pub frp: f64,
    pub daynight: String,
}

impl FirmsRow {
    /// Convert into a pipeline detection, given the projected position.
    pub fn into_detection(self, x: f64, y: f64) -> Detection {
        Detection {
            longitude: self.longitude,
            latitude: self.latitude,
            x,
            y,
            acq_date: self.acq_date,
            acq_time: self.acq_time,
            brightness: self.bright_ti4,
            bright_t31: self.bright_ti5,
            frp: self.frp,
            scan: self.scan,
            track: self.track,
            confidence: self.confidence,
            satellite: self.satellite,
            instrument: self.instrument,
            version: self.version,
            daynight: self.daynight,
            event: None,
        }
    }
}

/// Parse a FIRMS CSV body. An empty or whitespace-only body yields an
/// empty vector, which is how FIRMS reports "no detections".
pub fn parse_csv(body: &str) -> crate::FeedResult<Vec<FirmsRow>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    for row in reader.deserialize::<FirmsRow>() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
latitude,longitude,bright_ti4,scan,track,acq_date,acq_time,satellite,instrument,confidence,version,bright_ti5,frp,daynight
-1.2345,-78.9012,331.2,0.39,0.36,2025-08-05,0612,N20,VIIRS,n,2.0NRT,291.4,2.5,N
-1.2350,-78.9020,340.8,0.39,0.36,2025-08-05,0612,N20,VIIRS,h,2.0NRT,295.0,5.1,N
";

    #[test]
    fn test_parse_sample_rows() {
        let rows = parse_csv(SAMPLE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].satellite, "N20");
        assert_eq!(
            rows[0].acq_date,
            NaiveDate::from_ymd_opt(2025, 8, 5).unwrap()
        );
        assert_eq!(rows[1].confidence, "h");
    }

    #[test]
    fn test_empty_body_is_no_detections() {
        assert!(parse_csv("").unwrap().is_empty());
        assert!(parse_csv("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_into_detection_carries_projected_position() {
        let rows = parse_csv(SAMPLE).unwrap();
        let det = rows[0].clone().into_detection(732_000.0, 9_863_000.0);
        assert_eq!(det.x, 732_000.0);
        assert_eq!(det.y, 9_863_000.0);
        assert_eq!(det.longitude, -78.9012);
        assert!(det.event.is_none());
    }
}
