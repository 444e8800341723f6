//! Error types for capture and dataset export.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    /// Pose grid lists are empty or contain no numeric value.
    #[error("Invalid pose grid parameters: {0}")]
    InvalidParameters(String),

    #[error("No captures to export")]
    EmptyDataset,

    /// A second capture was requested while one is in flight. Nothing was changed.
    #[error("A capture session is already in progress")]
    AlreadyCapturing,

    /// The renderer behind the capture driver stopped answering.
    #[error("Renderer unavailable: {0}")]
    Renderer(String),

    #[error("Archive packaging failed: {0}")]
    Packaging(String),

    #[error("Delivery of {file} failed: {reason}")]
    Delivery { file: String, reason: String },

    #[error("Manifest serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
