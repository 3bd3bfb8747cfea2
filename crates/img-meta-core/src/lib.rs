//! img-meta core - image dimension and geolocation metadata extraction.
//!
//! Scans a directory for images and produces one report mapping each image's
//! root-relative path to its display dimensions, capture time and a map link
//! for where it was taken.
//!
//! # Architecture
//!
//! ```text
//! Directory → Discover → Decode headers (×N, bounded) → Orientation/EXIF/GPS
//!           → AggregateReport → JSON or TypeScript module
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use img_meta_core::{format_report, BatchPipeline, Config, OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> img_meta_core::Result<()> {
//!     let config = Config::load()?;
//!     let report = BatchPipeline::from_config(&config)
//!         .run("./public".as_ref())
//!         .await?;
//!     print!("{}", format_report(&report, OutputFormat::Data, &[])?);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod gps;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    ConfigError, DecodeError, ExtractionError, ExtractionResult, ImgMetaError, Result,
};
pub use output::{format_report, write_report, OutputFormat};
pub use pipeline::{BatchPipeline, FileDecoder, FileDiscovery, ImageDecoder, ImageProcessor};
pub use types::{AggregateReport, DecodedImageInfo, ImageMetadata};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
