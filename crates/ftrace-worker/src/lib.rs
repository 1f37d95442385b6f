//! Fire event pipeline worker.
//!
//! Owns sequencing and scheduling: fetches detections, runs the pipeline
//! stages in order, persists large events and reports a structured
//! outcome per run. Runs once or loops on fixed UTC times.

pub mod config;
pub mod error;
pub mod processor;
pub mod schedule;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use processor::FireProcessor;
