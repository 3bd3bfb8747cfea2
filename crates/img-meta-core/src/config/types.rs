//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};

/// Default number of extractions allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Maximum concurrent extractions
    pub concurrency: usize,

    /// File extensions to scan for (case-insensitive, without the dot)
    pub extensions: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "ico".to_string(),
            ],
        }
    }
}

impl ProcessingConfig {
    /// Parse a comma-separated extension list (`"jpg, .PNG,webp"`).
    ///
    /// Leading dots and surrounding whitespace are stripped; empty items are
    /// dropped.
    pub fn parse_extensions(list: &str) -> Vec<String> {
        list.split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("data" or "source")
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "data".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
