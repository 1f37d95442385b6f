//! Pipeline orchestrator.
//!
//! Sequences fetch → cluster → footprints → dedup → enrich → persist and
//! folds every failure into a structured [`RunOutcome`]. A stage that
//! produces nothing halts the run with a named error; a failed persist
//! step is reported in the stats while the run itself still succeeds.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{info, warn};
use wkt::ToWkt;

use ftrace_firms::FirmsClient;
use ftrace_models::{
    BoundingBox, Detection, EnrichedPolygon, PipelineParams, RunOutcome, RunStats,
};
use ftrace_pipeline::{
    build_daily_footprints, cluster_detections, deduplicate, enrich, filter_small_events, proj,
    BoundaryLayer,
};
use ftrace_store::{EventRecord, EventStoreClient};

use crate::config::WorkerConfig;
use crate::error::WorkerResult;

/// One fully wired pipeline runner.
pub struct FireProcessor {
    firms: FirmsClient,
    store: EventStoreClient,
    boundaries: BoundaryLayer,
    params: PipelineParams,
    bbox: BoundingBox,
    reference_offset_days: i64,
}

impl FireProcessor {
    pub fn new(
        firms: FirmsClient,
        store: EventStoreClient,
        boundaries: BoundaryLayer,
        params: PipelineParams,
        bbox: BoundingBox,
        reference_offset_days: i64,
    ) -> Self {
        Self {
            firms,
            store,
            boundaries,
            params,
            bbox,
            reference_offset_days,
        }
    }

    /// Wire a processor from the environment. Fails fast on missing
    /// credentials or an unreadable boundary layer.
    pub fn from_env(config: &WorkerConfig) -> WorkerResult<Self> {
        let firms = FirmsClient::from_env()?;
        let store = EventStoreClient::from_env()?;
        let boundaries = BoundaryLayer::from_geojson_file(&config.boundary_path)?;
        Ok(Self::new(
            firms,
            store,
            boundaries,
            PipelineParams::from_env(),
            config.bbox,
            config.reference_offset_days,
        ))
    }

    /// Feed reference date: today minus the publication-lag offset.
    pub fn reference_date(&self) -> NaiveDate {
        Utc::now().date_naive() - Duration::days(self.reference_offset_days)
    }

    /// Run the pipeline for the current reference date.
    pub async fn run_now(&self) -> RunOutcome {
        self.run(self.reference_date()).await
    }

    /// Run the full pipeline for one reference date.
    pub async fn run(&self, reference_date: NaiveDate) -> RunOutcome {
        info!(%reference_date, "Pipeline run started");

        let rows = self
            .firms
            .fetch_all(&self.bbox, self.params.lookback_days, reference_date)
            .await;
        if rows.is_empty() {
            return RunOutcome::failure("no detections fetched from any source");
        }

        let detections: Vec<Detection> = rows
            .into_iter()
            .map(|row| {
                let coord = proj::project(row.longitude, row.latitude);
                row.into_detection(coord.x, coord.y)
            })
            .collect();
        info!(detections = detections.len(), "Detections ingested");

        // Persisted IDs seed the allocator so cross-run IDs never collide
        let mut used_ids = match self.store.list_event_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                return RunOutcome::failure(format!("listing persisted event IDs failed: {}", e))
            }
        };

        let clustered = cluster_detections(detections, &mut used_ids, &self.params);
        if clustered.is_empty() {
            return RunOutcome::failure("no detections inside the season window");
        }

        let valid = filter_small_events(clustered, self.params.min_detections);
        if valid.is_empty() {
            return RunOutcome::failure("no event reached the minimum detection count");
        }

        let footprints = build_daily_footprints(&valid, &self.params);
        if footprints.is_empty() {
            return RunOutcome::failure("no daily footprints constructed");
        }

        let increments = deduplicate(footprints);
        if increments.is_empty() {
            return RunOutcome::failure("no new coverage increments");
        }

        let enriched = enrich(increments, &self.boundaries);
        if enriched.is_empty() {
            return RunOutcome::failure("no event matched an administrative boundary");
        }

        let mut unique: HashSet<&str> = HashSet::new();
        let mut large: HashSet<&str> = HashSet::new();
        for record in &enriched {
            unique.insert(record.event.as_str());
            if record.is_large(self.params.large_event_ha) {
                large.insert(record.event.as_str());
            }
        }

        let (uploaded_rows, uploaded) = self.persist(&enriched).await;

        let stats = RunStats {
            total_polygons: enriched.len(),
            unique_events: unique.len(),
            large_events: large.len(),
            total_area_ha: enriched.iter().map(|r| r.area_ha).sum(),
            uploaded,
        };

        info!(
            polygons = stats.total_polygons,
            events = stats.unique_events,
            large = stats.large_events,
            uploaded_rows,
            "Pipeline run completed"
        );
        RunOutcome::success(
            format!("processed {} events", stats.unique_events),
            stats,
        )
    }

    /// Upload new large-event records. Only polygonal increments of events
    /// at or above the size threshold and not already in the store are
    /// persisted, geometry re-projected to WGS84 WKT. Having nothing new
    /// to upload is a successful persist step; only a failed listing or a
    /// failed batch marks it failed.
    async fn persist(&self, enriched: &[EnrichedPolygon]) -> (usize, bool) {
        let persisted = match self.store.list_event_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Persist skipped, could not list stored events: {}", e);
                return (0, false);
            }
        };

        let records: Vec<EventRecord> = enriched
            .iter()
            .filter(|r| r.is_large(self.params.large_event_ha))
            .filter(|r| r.footprint.is_polygonal())
            .filter(|r| !persisted.contains(r.event.as_str()))
            .filter_map(to_record)
            .collect();

        if records.is_empty() {
            info!("No new large events to persist");
            return (0, true);
        }

        match self.store.insert_records(&records).await {
            Ok(count) => (count, true),
            Err(e) => {
                warn!("Persist failed: {}", e);
                (0, false)
            }
        }
    }
}

/// Serialize one enriched increment as a store row. Degenerate footprints
/// carry no polygon and are not persisted.
fn to_record(record: &EnrichedPolygon) -> Option<EventRecord> {
    let region = record.footprint.as_region()?;
    let geom = proj::multipolygon_to_wgs84(region).wkt_string();

    Some(EventRecord {
        event_id: record.event.as_str().to_string(),
        date: record.date,
        day_of_fire: record.day_of_fire,
        province: record.province.clone(),
        canton: record.canton.clone(),
        parish: record.parish.clone(),
        area_ha: record.area_ha,
        total_area_ha: record.total_area_ha,
        start_date: record.start_date,
        end_date: record.end_date,
        duration_days: record.duration_days,
        geom,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    use geo_types::{polygon, MultiPolygon};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use ftrace_firms::FirmsConfig;
    use ftrace_pipeline::enrich::AdminRegion;
    use ftrace_store::{EventStoreConfig, RetryConfig};

    const CSV_HEADER: &str = "latitude,longitude,bright_ti4,scan,track,acq_date,acq_time,satellite,instrument,confidence,version,bright_ti5,frp,daynight";

    fn csv_body(points: &[(f64, f64)]) -> String {
        let mut body = String::from(CSV_HEADER);
        for (lat, lon) in points {
            body.push_str(&format!(
                "\n{},{},331.2,0.39,0.36,2025-08-05,0612,N20,VIIRS,n,2.0NRT,291.4,2.5,N",
                lat, lon
            ));
        }
        body
    }

    fn firms_client(server: &MockServer) -> FirmsClient {
        FirmsClient::new(FirmsConfig {
            base_url: server.uri(),
            map_key: "testkey".to_string(),
            sources: vec!["VIIRS_NOAA20_NRT".to_string()],
            timeout: StdDuration::from_secs(5),
        })
        .unwrap()
    }

    fn store_client(server: &MockServer) -> EventStoreClient {
        EventStoreClient::new(EventStoreConfig {
            base_url: server.uri(),
            api_key: "testkey".to_string(),
            table: "fire_events".to_string(),
            timeout: StdDuration::from_secs(5),
            connect_timeout: StdDuration::from_secs(2),
            retry: RetryConfig {
                max_retries: 1,
                base_delay_ms: 1,
                max_delay_ms: 5,
            },
        })
        .unwrap()
    }

    /// One big parish square around the projected test area.
    fn boundaries() -> BoundaryLayer {
        let center = proj::project(-79.0, -1.2);
        let half = 50_000.0;
        BoundaryLayer::new(vec![AdminRegion {
            province: "Loja".to_string(),
            canton: "Loja".to_string(),
            parish: "Malacatos".to_string(),
            geometry: MultiPolygon::new(vec![polygon![
                (x: center.x - half, y: center.y - half),
                (x: center.x + half, y: center.y - half),
                (x: center.x + half, y: center.y + half),
                (x: center.x - half, y: center.y + half),
            ]]),
        }])
    }

    fn processor(firms: &MockServer, store: &MockServer) -> FireProcessor {
        FireProcessor::new(
            firms_client(firms),
            store_client(store),
            boundaries(),
            PipelineParams::default(),
            BoundingBox::ecuador(),
            3,
        )
    }

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 8).unwrap()
    }

    /// Five detections spread over roughly a kilometre, enough for a
    /// large (> 10 ha) polygonal event.
    fn large_cluster() -> Vec<(f64, f64)> {
        vec![
            (-1.200, -79.000),
            (-1.200, -78.990),
            (-1.190, -79.000),
            (-1.190, -78.990),
            (-1.195, -78.995),
        ]
    }

    #[tokio::test]
    async fn test_run_without_detections_fails() {
        let firms = MockServer::start().await;
        let store = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&firms)
            .await;

        let outcome = processor(&firms, &store).run(reference_date()).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("no detections"));
    }

    #[tokio::test]
    async fn test_full_run_uploads_large_event() {
        let firms = MockServer::start().await;
        let store = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(csv_body(&large_cluster())))
            .mount(&firms)
            .await;
        Mock::given(method("GET"))
            .and(path("/fire_events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&store)
            .await;
        Mock::given(method("POST"))
            .and(path("/fire_events"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&store)
            .await;

        let outcome = processor(&firms, &store).run(reference_date()).await;
        assert!(outcome.success, "run failed: {:?}", outcome.error);

        let stats = outcome.stats.unwrap();
        assert_eq!(stats.unique_events, 1);
        assert_eq!(stats.large_events, 1);
        assert!(stats.uploaded);
        assert!(stats.total_area_ha >= 10.0);
    }

    #[tokio::test]
    async fn test_small_event_is_not_uploaded() {
        let firms = MockServer::start().await;
        let store = MockServer::start().await;

        // A tight cluster well under 10 ha
        let points = vec![
            (-1.2000, -79.0000),
            (-1.2000, -78.9990),
            (-1.1990, -79.0000),
            (-1.1990, -78.9990),
            (-1.1995, -78.9995),
        ];

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(csv_body(&points)))
            .mount(&firms)
            .await;
        Mock::given(method("GET"))
            .and(path("/fire_events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&store)
            .await;
        Mock::given(method("POST"))
            .and(path("/fire_events"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&store)
            .await;

        let outcome = processor(&firms, &store).run(reference_date()).await;
        assert!(outcome.success, "run failed: {:?}", outcome.error);

        let stats = outcome.stats.unwrap();
        assert_eq!(stats.unique_events, 1);
        assert_eq!(stats.large_events, 0);
        // Nothing met the upload criteria, which is a healthy persist step
        assert!(stats.uploaded);
    }

    #[tokio::test]
    async fn test_already_persisted_event_is_not_reuploaded() {
        let firms = MockServer::start().await;
        let store = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(csv_body(&large_cluster())))
            .mount(&firms)
            .await;

        // The first list call seeds the allocator with no IDs, so the
        // event gets its base ID; by the time persist re-lists, the same
        // ID is in the store and the upload must be skipped.
        Mock::given(method("GET"))
            .and(path("/fire_events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .up_to_n_times(1)
            .mount(&store)
            .await;
        // Day 217, lon -79.0 -> 790, lat -1.2 -> 012
        Mock::given(method("GET"))
            .and(path("/fire_events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"event_id": "217790012"}
            ])))
            .mount(&store)
            .await;
        Mock::given(method("POST"))
            .and(path("/fire_events"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&store)
            .await;

        let outcome = processor(&firms, &store).run(reference_date()).await;
        assert!(outcome.success, "run failed: {:?}", outcome.error);

        // An idempotent re-run uploads nothing yet still reports a
        // successful persist step
        let stats = outcome.stats.unwrap();
        assert_eq!(stats.large_events, 1);
        assert!(stats.uploaded);
    }

    #[tokio::test]
    async fn test_failed_upload_reports_stats_without_uploaded_flag() {
        let firms = MockServer::start().await;
        let store = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(csv_body(&large_cluster())))
            .mount(&firms)
            .await;
        Mock::given(method("GET"))
            .and(path("/fire_events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&store)
            .await;
        Mock::given(method("POST"))
            .and(path("/fire_events"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad geometry"))
            .mount(&store)
            .await;

        let outcome = processor(&firms, &store).run(reference_date()).await;
        assert!(outcome.success, "run failed: {:?}", outcome.error);

        let stats = outcome.stats.unwrap();
        assert_eq!(stats.large_events, 1);
        assert!(!stats.uploaded);
    }
}
