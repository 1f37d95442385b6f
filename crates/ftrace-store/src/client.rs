//! Event store REST client.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::metrics::{record_request, record_rows_uploaded};
use crate::retry::{with_retry, RetryConfig};
use crate::types::{EventIdRow, EventRecord};
use crate::MAX_BATCH_SIZE;

/// Event store client configuration.
#[derive(Debug, Clone)]
pub struct EventStoreConfig {
    /// REST root, e.g. `https://project.supabase.co/rest/v1`.
    pub base_url: String,
    /// API key, sent as both `apikey` and bearer token.
    pub api_key: String,
    /// Table holding large fire events.
    pub table: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Retry configuration.
    pub retry: RetryConfig,
}

impl EventStoreConfig {
    /// Create config from environment variables. `STORE_URL` and
    /// `STORE_API_KEY` are required.
    pub fn from_env() -> StoreResult<Self> {
        let base_url = std::env::var("STORE_URL")
            .map_err(|_| StoreError::auth_error("STORE_URL must be set"))?;
        let api_key = std::env::var("STORE_API_KEY")
            .map_err(|_| StoreError::auth_error("STORE_API_KEY must be set"))?;
        if api_key.is_empty() {
            return Err(StoreError::auth_error("STORE_API_KEY cannot be empty"));
        }

        Ok(Self {
            base_url,
            api_key,
            table: std::env::var("STORE_TABLE").unwrap_or_else(|_| "fire_events".to_string()),
            timeout: Duration::from_secs(
                std::env::var("STORE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig::from_env(),
        })
    }
}

/// Client for the persisted fire event store.
pub struct EventStoreClient {
    http: Client,
    config: EventStoreConfig,
}

impl EventStoreClient {
    /// Create a new store client.
    pub fn new(config: EventStoreConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("ftrace-store/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::new(EventStoreConfig::from_env()?)
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.config.base_url, self.config.table)
    }

    /// List the tracking IDs of all persisted events.
    ///
    /// Seeds the allocator's used-ID set and filters already-persisted
    /// events before upload, which is what makes re-runs idempotent.
    pub async fn list_event_ids(&self) -> StoreResult<HashSet<String>> {
        let url = format!("{}?select=event_id", self.table_url());

        let rows: Vec<EventIdRow> = with_retry(&self.config.retry, "list_event_ids", || async {
            let started = Instant::now();
            let response = self
                .http
                .get(&url)
                .header("apikey", &self.config.api_key)
                .bearer_auth(&self.config.api_key)
                .send()
                .await?;

            let status = response.status();
            record_request(
                "list_event_ids",
                status.as_u16(),
                started.elapsed().as_secs_f64() * 1000.0,
            );

            if !status.is_success() {
                let retry_after = retry_after_ms(&response);
                let body = response.text().await.unwrap_or_default();
                return Err(StoreError::from_http_status(
                    status.as_u16(),
                    body,
                    retry_after,
                ));
            }

            Ok(response.json().await?)
        })
        .await?;

        let ids: HashSet<String> = rows.into_iter().filter_map(|r| r.event_id).collect();
        debug!(count = ids.len(), "Persisted event IDs listed");
        Ok(ids)
    }

    /// Append enriched records, batched in groups of at most 1000 rows.
    ///
    /// Every batch must succeed or the whole persist step fails; the error
    /// names the failing batch. Returns the number of rows uploaded.
    pub async fn insert_records(&self, records: &[EventRecord]) -> StoreResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let url = self.table_url();

        for (batch_index, batch) in records.chunks(MAX_BATCH_SIZE).enumerate() {
            with_retry(&self.config.retry, "insert_records", || async {
                let started = Instant::now();
                let response = self
                    .http
                    .post(&url)
                    .header("apikey", &self.config.api_key)
                    .bearer_auth(&self.config.api_key)
                    .header("Prefer", "return=minimal")
                    .json(batch)
                    .send()
                    .await?;

                let status = response.status();
                record_request(
                    "insert_records",
                    status.as_u16(),
                    started.elapsed().as_secs_f64() * 1000.0,
                );

                if !status.is_success() {
                    let retry_after = retry_after_ms(&response);
                    let body = response.text().await.unwrap_or_default();
                    return Err(match StoreError::from_http_status(
                        status.as_u16(),
                        body,
                        retry_after,
                    ) {
                        StoreError::RequestFailed(msg) => StoreError::RequestFailed(format!(
                            "batch {} failed: {}",
                            batch_index + 1,
                            msg
                        )),
                        other => other,
                    });
                }

                Ok(())
            })
            .await?;
        }

        record_rows_uploaded(records.len());
        info!(rows = records.len(), "Event records uploaded");
        Ok(records.len())
    }
}

fn retry_after_ms(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(|secs| secs * 1000)
}
