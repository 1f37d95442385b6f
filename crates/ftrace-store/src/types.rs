//! Wire types for the event store API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One persisted row: an enriched increment of a large event, geometry as
/// WGS84 well-known text, dates as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: String,
    pub date: NaiveDate,
    pub day_of_fire: u32,
    pub province: String,
    pub canton: String,
    pub parish: String,
    pub area_ha: f64,
    pub total_area_ha: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i64,
    /// WKT geometry in WGS84.
    pub geom: String,
}

/// Row shape returned by the ID listing query. The store allows null IDs
/// on legacy rows; those are skipped.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EventIdRow {
    pub event_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_iso_dates() {
        let record = EventRecord {
            event_id: "217789012".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 8, 5).unwrap(),
            day_of_fire: 1,
            province: "Loja".to_string(),
            canton: "Loja".to_string(),
            parish: "Malacatos".to_string(),
            area_ha: 12.5,
            total_area_ha: 12.5,
            start_date: NaiveDate::from_ymd_opt(2025, 8, 5).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 8, 5).unwrap(),
            duration_days: 1,
            geom: "POLYGON((0 0,1 0,1 1,0 0))".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2025-08-05");
        assert_eq!(json["geom"], "POLYGON((0 0,1 0,1 1,0 0))");
    }
}
