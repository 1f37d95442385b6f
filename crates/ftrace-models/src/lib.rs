//! Shared data models for the FireTrace pipeline.
//!
//! This crate provides the types flowing between pipeline stages:
//! - Hotspot detections and the bounding box they are fetched for
//! - Event tracking identifiers
//! - Daily footprints and their de-duplicated increments
//! - Enriched, metric-carrying polygon records
//! - The structured run outcome reported by the worker
//! - Pipeline policy parameters (thresholds, windows)

pub mod detection;
pub mod enriched;
pub mod footprint;
pub mod outcome;
pub mod params;
pub mod tracking;

// Re-export common types
pub use detection::{BoundingBox, Detection};
pub use enriched::EnrichedPolygon;
pub use footprint::{Footprint, FootprintRecord};
pub use outcome::{RunOutcome, RunStats};
pub use params::{DateWindow, PipelineParams};
pub use tracking::TrackingId;
