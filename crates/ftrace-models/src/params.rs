//! Pipeline policy parameters.

use chrono::NaiveDate;

/// Inclusive operational date window; detections outside it are ignored
/// by clustering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// All externally configurable policy constants of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineParams {
    /// Feed lookback window in days.
    pub lookback_days: u32,
    /// Temporal adjacency window T_L in days.
    pub temporal_window_days: i64,
    /// Spatial adjacency radius D_T in metres (projected).
    pub distance_threshold_m: f64,
    /// Minimum detections for an event to reach polygon construction.
    pub min_detections: usize,
    /// Longest-edge filter for triangulation triangles, metres.
    pub max_triangle_edge_m: f64,
    /// Area filter for triangulation triangles, hectares.
    pub max_triangle_area_ha: f64,
    /// Cumulative area at which an event counts as large, hectares.
    pub large_event_ha: f64,
    /// Operational season window.
    pub season: DateWindow,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            lookback_days: 10,
            temporal_window_days: 3,
            distance_threshold_m: 1000.0,
            min_detections: 5,
            max_triangle_edge_m: 2000.0,
            max_triangle_area_ha: 500.0,
            large_event_ha: 10.0,
            season: DateWindow::new(
                NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid date"),
                NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date"),
            ),
        }
    }
}

impl PipelineParams {
    /// Create params from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            lookback_days: env_parse("FTRACE_LOOKBACK_DAYS", defaults.lookback_days),
            temporal_window_days: env_parse(
                "FTRACE_TEMPORAL_WINDOW_DAYS",
                defaults.temporal_window_days,
            ),
            distance_threshold_m: env_parse(
                "FTRACE_DISTANCE_THRESHOLD_M",
                defaults.distance_threshold_m,
            ),
            min_detections: env_parse("FTRACE_MIN_DETECTIONS", defaults.min_detections),
            max_triangle_edge_m: env_parse(
                "FTRACE_MAX_TRIANGLE_EDGE_M",
                defaults.max_triangle_edge_m,
            ),
            max_triangle_area_ha: env_parse(
                "FTRACE_MAX_TRIANGLE_AREA_HA",
                defaults.max_triangle_area_ha,
            ),
            large_event_ha: env_parse("FTRACE_LARGE_EVENT_HA", defaults.large_event_ha),
            season: DateWindow::new(
                env_parse("FTRACE_SEASON_START", defaults.season.start),
                env_parse("FTRACE_SEASON_END", defaults.season.end),
            ),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
