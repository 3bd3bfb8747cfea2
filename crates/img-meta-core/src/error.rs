//! Error types for the img-meta extraction pipeline.
//!
//! Every fatal extraction error names the file or directory it concerns: the
//! decoder's own errors are generic and would otherwise be unattributable.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level error type for img-meta operations.
#[derive(Error, Debug)]
pub enum ImgMetaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Extraction errors (always carry a path)
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors that abort a batch. Each one names the offending path.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The scan root is missing, not a directory, or cannot be listed
    #[error("Cannot read directory {path}: {reason}")]
    RootUnreadable { path: PathBuf, reason: String },

    /// The decoder could not read or understand the file
    #[error("Failed to decode {path}: {source}")]
    DecodeFailure {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    /// The decoder succeeded but reported no width or height
    #[error("Could not determine dimensions of {path}")]
    MissingDimensions { path: PathBuf },

    /// Two files map to the same report key (e.g. after lossy name conversion)
    #[error("Report key {key} for {path} is already taken by another file")]
    DuplicateKey { path: PathBuf, key: String },
}

impl ExtractionError {
    /// The file or directory this error is about.
    pub fn path(&self) -> &Path {
        match self {
            Self::RootUnreadable { path, .. }
            | Self::DecodeFailure { path, .. }
            | Self::MissingDimensions { path }
            | Self::DuplicateKey { path, .. } => path,
        }
    }
}

/// Generic decoder failure, re-attributed to a file by [`ExtractionError::DecodeFailure`].
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Image(#[from] image::ImageError),

    /// The blocking decode task panicked or was cancelled
    #[error("Decode task failed: {0}")]
    Join(String),

    /// Anything else a decoder implementation wants to report
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for img-meta results.
pub type Result<T> = std::result::Result<T, ImgMetaError>;

/// Convenience type alias for extraction results.
pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;
