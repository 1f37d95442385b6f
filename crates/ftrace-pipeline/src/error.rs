//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The boundary layer could not be read or parsed. Fatal to the run.
    #[error("Boundary layer unreadable: {0}")]
    BoundaryLayer(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

impl PipelineError {
    pub fn boundary_layer(msg: impl Into<String>) -> Self {
        Self::BoundaryLayer(msg.into())
    }
}
