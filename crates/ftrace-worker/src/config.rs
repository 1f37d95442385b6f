//! Worker configuration.

use chrono::NaiveTime;
use tracing::warn;

use ftrace_models::BoundingBox;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Region of interest for the detection feed (WGS84).
    pub bbox: BoundingBox,
    /// Path to the administrative boundary GeoJSON file.
    pub boundary_path: String,
    /// Fixed UTC times the scheduled loop fires at.
    pub run_times: Vec<NaiveTime>,
    /// Run a single pipeline pass and exit instead of looping.
    pub run_once: bool,
    /// Days subtracted from today to form the feed reference date, which
    /// absorbs the feed's publication lag.
    pub reference_offset_days: i64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            bbox: BoundingBox::ecuador(),
            boundary_path: "data/parroquias.geojson".to_string(),
            run_times: default_run_times(),
            run_once: false,
            reference_offset_days: 3,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bbox: std::env::var("FTRACE_BBOX")
                .ok()
                .and_then(|s| parse_bbox(&s))
                .unwrap_or(defaults.bbox),
            boundary_path: std::env::var("FTRACE_BOUNDARY_PATH")
                .unwrap_or(defaults.boundary_path),
            run_times: std::env::var("FTRACE_RUN_TIMES")
                .ok()
                .and_then(|s| match parse_run_times(&s) {
                    Some(times) => Some(times),
                    None => {
                        warn!(value = %s, "Unparsable FTRACE_RUN_TIMES, using defaults");
                        None
                    }
                })
                .unwrap_or(defaults.run_times),
            run_once: std::env::var("FTRACE_RUN_ONCE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            reference_offset_days: std::env::var("FTRACE_REFERENCE_OFFSET_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.reference_offset_days),
        }
    }
}

fn default_run_times() -> Vec<NaiveTime> {
    ["06:00", "12:00", "18:00"]
        .iter()
        .map(|t| NaiveTime::parse_from_str(t, "%H:%M").expect("valid default time"))
        .collect()
}

/// Parse `min_lon,min_lat,max_lon,max_lat`.
fn parse_bbox(s: &str) -> Option<BoundingBox> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts[..] {
        [min_lon, min_lat, max_lon, max_lat] => {
            Some(BoundingBox::new(min_lon, min_lat, max_lon, max_lat))
        }
        _ => None,
    }
}

/// Parse a comma-separated list of `HH:MM` times. Returns `None` when any
/// entry is malformed or the list is empty.
pub fn parse_run_times(s: &str) -> Option<Vec<NaiveTime>> {
    let times: Vec<NaiveTime> = s
        .split(',')
        .map(|t| NaiveTime::parse_from_str(t.trim(), "%H:%M"))
        .collect::<Result<_, _>>()
        .ok()?;
    if times.is_empty() {
        return None;
    }
    Some(times)
}
