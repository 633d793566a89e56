//! Centralized error handling for SliceVis
//!
//! Every fallible operation in the crate returns [`Result`], so a read failure,
//! a bad parameter and a rendering failure all surface through one type.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for SliceVis operations
#[derive(Debug, Error)]
pub enum SliceVisError {
    /// Input container does not exist or cannot be opened
    #[error("Cannot open snapshot container '{}': {reason}", path.display())]
    MissingInput { path: PathBuf, reason: String },

    /// Expected group or dataset is absent in a container
    #[error("Key '{key}' not found in '{}'", path.display())]
    MissingKey { path: PathBuf, key: String },

    /// No timesteps were discovered across the input files
    #[error("Timeline is empty: no timesteps found in any input file")]
    EmptyTimeline,

    /// Render parameters that cannot produce a contour plot
    #[error("Invalid render parameters: {0}")]
    InvalidParameters(String),

    /// Slice array shape or timestep key that does not match the grid
    #[error("Invalid slice data: {message}")]
    InvalidSlice { message: String },

    /// Colormap name is not registered
    #[error("Unknown colormap '{name}'")]
    UnknownColormap { name: String },

    /// Failure inside the rasteriser or image encoder
    #[error("Render backend error: {0}")]
    RenderBackend(String),

    /// Configuration file content errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Thread pool configuration error
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// HDF5 library errors not covered by a more specific variant
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// I/O operation errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Array shape or dimension error
    #[error("Array error: {0}")]
    Array(#[from] ndarray::ShapeError),

    /// JSON parse errors from configuration files
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SliceVisError {
    /// Shorthand for a [`SliceVisError::MissingKey`].
    pub fn missing_key(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self::MissingKey {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Shorthand for a [`SliceVisError::InvalidSlice`].
    pub fn invalid_slice(message: impl Into<String>) -> Self {
        Self::InvalidSlice {
            message: message.into(),
        }
    }
}

/// Result type alias for SliceVis operations
pub type Result<T> = std::result::Result<T, SliceVisError>;
