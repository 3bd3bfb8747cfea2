//! Metadata extraction pipeline components.
//!
//! - **discovery**: Find image files in directories
//! - **decode**: Read dimensions, orientation and raw EXIF from a file
//! - **orientation**: Correct dimensions for rotated images
//! - **metadata**: Parse capture time and GPS from EXIF
//! - **processor**: Single-file extraction
//! - **batch**: Bounded-concurrency extraction over a directory

pub mod batch;
pub mod decode;
pub mod discovery;
pub mod metadata;
pub mod orientation;
pub mod processor;

// Re-exports for convenient access
pub use batch::BatchPipeline;
pub use decode::{FileDecoder, ImageDecoder};
pub use discovery::{relative_key, FileDiscovery};
pub use metadata::{ExifFields, MetadataExtractor};
pub use processor::ImageProcessor;
