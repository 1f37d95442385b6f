//! Fixed-time UTC scheduling.
//!
//! The loop sleeps until the next configured wall-clock time, runs the
//! pipeline to completion, then re-computes the next slot. Runs never
//! overlap: the next sleep only starts after the previous run returns.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use tracing::{error, info};

use crate::processor::FireProcessor;

/// Earliest configured run time strictly after `now`, today or tomorrow.
pub fn next_run(now: DateTime<Utc>, times: &[NaiveTime]) -> Option<DateTime<Utc>> {
    let today = now.date_naive();
    times
        .iter()
        .flat_map(|&t| {
            [
                Utc.from_utc_datetime(&today.and_time(t)),
                Utc.from_utc_datetime(&(today + Duration::days(1)).and_time(t)),
            ]
        })
        .filter(|&at| at > now)
        .min()
}

/// Run the pipeline forever on the configured times. Returns on Ctrl-C.
pub async fn run_loop(processor: &FireProcessor, times: &[NaiveTime]) {
    loop {
        let now = Utc::now();
        let Some(at) = next_run(now, times) else {
            error!("No run times configured, scheduler exiting");
            return;
        };

        let wait = (at - now).to_std().unwrap_or_default();
        info!(next_run = %at, "Sleeping until next scheduled run");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                return;
            }
        }

        let outcome = processor.run_now().await;
        if outcome.success {
            info!(message = outcome.message.as_deref().unwrap_or(""), "Scheduled run succeeded");
        } else {
            error!(error = outcome.error.as_deref().unwrap_or(""), "Scheduled run failed");
        }
    }
}
