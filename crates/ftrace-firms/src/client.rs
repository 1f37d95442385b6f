//! FIRMS area API HTTP client.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use tracing::{debug, info, warn};

use ftrace_models::BoundingBox;

use crate::error::{FeedError, FeedResult};
use crate::types::{parse_csv, FirmsRow};

/// Default satellite sources, unioned before clustering.
pub const DEFAULT_SOURCES: [&str; 3] = ["VIIRS_NOAA20_NRT", "VIIRS_NOAA21_NRT", "VIIRS_SNPP_NRT"];

/// Configuration for the FIRMS client.
#[derive(Debug, Clone)]
pub struct FirmsConfig {
    /// Base URL of the area CSV API.
    pub base_url: String,
    /// FIRMS map key.
    pub map_key: String,
    /// Satellite sources to fetch.
    pub sources: Vec<String>,
    /// Per-source request timeout.
    pub timeout: Duration,
}

impl Default for FirmsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://firms.modaps.eosdis.nasa.gov/api/area/csv".to_string(),
            map_key: String::new(),
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl FirmsConfig {
    /// Create config from environment variables. `FIRMS_MAP_KEY` is
    /// required; everything else has operational defaults.
    pub fn from_env() -> FeedResult<Self> {
        let map_key = std::env::var("FIRMS_MAP_KEY")
            .map_err(|_| FeedError::Config("FIRMS_MAP_KEY must be set".to_string()))?;
        if map_key.is_empty() {
            return Err(FeedError::Config("FIRMS_MAP_KEY cannot be empty".to_string()));
        }

        let defaults = Self::default();
        let sources = std::env::var("FIRMS_SOURCES")
            .map(|s| {
                s.split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.sources);

        Ok(Self {
            base_url: std::env::var("FIRMS_BASE_URL").unwrap_or(defaults.base_url),
            map_key,
            sources,
            timeout: Duration::from_secs(
                std::env::var("FIRMS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        })
    }
}

/// Client for the FIRMS area CSV API.
pub struct FirmsClient {
    http: Client,
    config: FirmsConfig,
}

impl FirmsClient {
    /// Create a new FIRMS client.
    pub fn new(config: FirmsConfig) -> FeedResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(FeedError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> FeedResult<Self> {
        Self::new(FirmsConfig::from_env()?)
    }

    /// Configured satellite sources.
    pub fn sources(&self) -> &[String] {
        &self.config.sources
    }

    /// Fetch one source for a bounding box and lookback window ending at
    /// `date`. Returns the parsed rows; an empty body means no detections.
    pub async fn fetch_source(
        &self,
        source: &str,
        bbox: &BoundingBox,
        lookback_days: u32,
        date: NaiveDate,
    ) -> FeedResult<Vec<FirmsRow>> {
        let url = format!(
            "{}/{}/{}/{}/{}/{}",
            self.config.base_url,
            self.config.map_key,
            source,
            bbox.to_area_string(),
            lookback_days,
            date.format("%Y-%m-%d"),
        );

        debug!(source, %date, "Fetching FIRMS detections");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::RequestFailed(format!(
                "FIRMS returned {} for {}: {}",
                status, source, body
            )));
        }

        let body = response.text().await?;
        parse_csv(&body)
    }

    /// Fetch and concatenate all configured sources. A source that errors
    /// is logged and skipped; the union of the remaining rows is returned.
    pub async fn fetch_all(
        &self,
        bbox: &BoundingBox,
        lookback_days: u32,
        date: NaiveDate,
    ) -> Vec<FirmsRow> {
        let mut all_rows = Vec::new();

        for source in &self.config.sources {
            match self.fetch_source(source, bbox, lookback_days, date).await {
                Ok(rows) => {
                    info!(source, rows = rows.len(), "FIRMS source fetched");
                    all_rows.extend(rows);
                }
                Err(e) => {
                    warn!(source, "FIRMS source skipped: {}", e);
                }
            }
        }

        all_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CSV_BODY: &str = "\
latitude,longitude,bright_ti4,scan,track,acq_date,acq_time,satellite,instrument,confidence,version,bright_ti5,frp,daynight
-1.2345,-78.9012,331.2,0.39,0.36,2025-08-05,0612,N20,VIIRS,n,2.0NRT,291.4,2.5,N
";

    fn test_config(server: &MockServer, sources: Vec<String>) -> FirmsConfig {
        FirmsConfig {
            base_url: server.uri(),
            map_key: "testkey".to_string(),
            sources,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = FirmsConfig::default();
        assert_eq!(config.sources.len(), 3);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_fetch_source_parses_rows() {
        let server = MockServer::start().await;
        let date = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap();

        Mock::given(method("GET"))
            .and(path(
                "/testkey/VIIRS_NOAA20_NRT/-92,-5,-75.2,1.7/10/2025-08-05",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(CSV_BODY))
            .mount(&server)
            .await;

        let client = FirmsClient::new(test_config(
            &server,
            vec!["VIIRS_NOAA20_NRT".to_string()],
        ))
        .unwrap();

        let rows = client
            .fetch_source("VIIRS_NOAA20_NRT", &BoundingBox::ecuador(), 10, date)
            .await
            .unwrap_or_else(|e| panic!("fetch failed: {}", e));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].instrument, "VIIRS");
    }

    #[tokio::test]
    async fn test_fetch_source_error_status() {
        let server = MockServer::start().await;
        let date = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = FirmsClient::new(test_config(
            &server,
            vec!["VIIRS_NOAA20_NRT".to_string()],
        ))
        .unwrap();

        let result = client
            .fetch_source("VIIRS_NOAA20_NRT", &BoundingBox::ecuador(), 10, date)
            .await;
        assert!(matches!(result, Err(FeedError::RequestFailed(_))));
    }

    #[tokio::test]
    async fn test_fetch_all_skips_failing_source() {
        let server = MockServer::start().await;
        let date = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap();

        Mock::given(method("GET"))
            .and(path("/testkey/GOOD/-92,-5,-75.2,1.7/10/2025-08-05"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CSV_BODY))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/testkey/BAD/-92,-5,-75.2,1.7/10/2025-08-05"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = FirmsClient::new(test_config(
            &server,
            vec!["GOOD".to_string(), "BAD".to_string()],
        ))
        .unwrap();

        let rows = client.fetch_all(&BoundingBox::ecuador(), 10, date).await;
        assert_eq!(rows.len(), 1);
    }
}
