//! Core event-construction pipeline.
//!
//! Pure batch processing over projected detections, no network I/O:
//! - [`proj`]: WGS84 to UTM zone 17S coordinate conversion and back
//! - [`tracking`]: collision-free tracking-ID allocation
//! - [`cluster`]: region-growing spatio-temporal clustering
//! - [`footprint`]: daily burned-area polygon synthesis via Delaunay
//!   triangulation with quality filters
//! - [`dedup`]: temporal de-duplication into additive increments
//! - [`enrich`]: administrative boundary join and per-event metrics
//!
//! Data flows strictly downstream: detections → clustered detections →
//! daily footprints → increments → enriched records. The worker crate
//! owns sequencing and persistence.

pub mod cluster;
pub mod dedup;
pub mod enrich;
pub mod error;
pub mod footprint;
pub mod proj;
pub mod tracking;

pub use cluster::cluster_detections;
pub use dedup::deduplicate;
pub use enrich::{enrich, AdminRegion, BoundaryLayer};
pub use error::{PipelineError, PipelineResult};
pub use footprint::{build_daily_footprints, filter_small_events};
pub use tracking::allocate_tracking_id;
