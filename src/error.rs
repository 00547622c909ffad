//! Error types for the engine.
//!
//! Only construction and loading can fail. The per-frame path degrades to
//! "no motion" instead of returning errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while building or feeding the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Frame buffer holds {actual} bytes, expected {expected}")]
    InvalidFrame { expected: usize, actual: usize },

    #[error("Cannot split a {width}x{height} frame into {columns}x{rows} regions")]
    InvalidGrid {
        width: u32,
        height: u32,
        columns: u32,
        rows: u32,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load sample {path}: {source}")]
    SampleLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
