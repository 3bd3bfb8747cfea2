//! Header decoding: pixel dimensions, orientation and the raw EXIF block.
//!
//! Only image headers are read; pixel data is never decoded.

use async_trait::async_trait;
use image::ImageFormat;
use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::Path;

use crate::error::DecodeError;
use crate::types::DecodedImageInfo;

use super::metadata::MetadataExtractor;

/// Reads the header information the extractor needs from one file.
///
/// Errors are generic; callers attach the path.
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    async fn decode(&self, path: &Path) -> Result<DecodedImageInfo, DecodeError>;
}

/// Decoder backed by the `image` crate (dimensions) and `kamadak-exif`
/// (container EXIF lookup). Blocking reads run on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDecoder;

impl FileDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous decode (runs in spawn_blocking).
    pub fn decode_sync(path: &Path) -> Result<DecodedImageInfo, DecodeError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut image_reader = image::ImageReader::new(&mut reader).with_guessed_format()?;
        if image_reader.format().is_none() {
            if let Ok(format) = ImageFormat::from_path(path) {
                image_reader.set_format(format);
            }
        }
        let (width, height) = image_reader.into_dimensions()?;

        reader.rewind()?;
        let (orientation, exif) = match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) => (
                MetadataExtractor::orientation(&exif),
                Some(exif.buf().to_vec()),
            ),
            Err(e) => {
                tracing::trace!("No EXIF in {:?}: {}", path, e);
                (None, None)
            }
        };

        Ok(DecodedImageInfo {
            width: Some(width),
            height: Some(height),
            orientation,
            exif,
        })
    }
}

#[async_trait]
impl ImageDecoder for FileDecoder {
    async fn decode(&self, path: &Path) -> Result<DecodedImageInfo, DecodeError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::decode_sync(&path))
            .await
            .map_err(|e| DecodeError::Join(e.to_string()))?
    }
}
