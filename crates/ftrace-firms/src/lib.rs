//! NASA FIRMS hotspot feed client.
//!
//! Fetches thermal-anomaly detections from the FIRMS area CSV API, one
//! request per satellite source, and parses the rows into typed records.
//! A source that errors or returns nothing is logged and skipped so one
//! bad feed never aborts a run.

pub mod client;
pub mod error;
pub mod types;

pub use client::{FirmsClient, FirmsConfig};
pub use error::{FeedError, FeedResult};
pub use types::FirmsRow;
