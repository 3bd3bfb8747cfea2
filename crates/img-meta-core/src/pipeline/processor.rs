//! Single-file extraction: decode, correct orientation, read EXIF extras.

use std::path::Path;
use std::sync::Arc;

use crate::error::{ExtractionError, ExtractionResult};
use crate::gps;
use crate::types::ImageMetadata;

use super::decode::{FileDecoder, ImageDecoder};
use super::metadata::MetadataExtractor;
use super::orientation;

/// Turns one image file into an [`ImageMetadata`] record.
///
/// Cheap to clone; the decoder is shared.
#[derive(Clone)]
pub struct ImageProcessor {
    decoder: Arc<dyn ImageDecoder>,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new(Arc::new(FileDecoder::new()))
    }
}

impl ImageProcessor {
    /// Create a processor around a specific decoder.
    pub fn new(decoder: Arc<dyn ImageDecoder>) -> Self {
        Self { decoder }
    }

    /// Extract display dimensions, capture time and map link for one file.
    ///
    /// Decoder failures and missing dimensions are fatal and name the file.
    /// EXIF problems only drop the optional fields.
    pub async fn extract(&self, path: &Path) -> ExtractionResult<ImageMetadata> {
        let start = std::time::Instant::now();

        let decoded = self
            .decoder
            .decode(path)
            .await
            .map_err(|source| ExtractionError::DecodeFailure {
                path: path.to_path_buf(),
                source,
            })?;

        let (raw_width, raw_height) = match (decoded.width, decoded.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return Err(ExtractionError::MissingDimensions {
                    path: path.to_path_buf(),
                })
            }
        };
        let (width, height) = orientation::normalize(raw_width, raw_height, decoded.orientation);

        let fields = decoded
            .exif
            .as_deref()
            .map(MetadataExtractor::parse)
            .unwrap_or_default();

        let map_link = match (&fields.latitude, &fields.longitude) {
            (Some(lat), Some(lon)) => Some(gps::map_link(lat, lon)),
            _ => None,
        };

        tracing::debug!(
            "Extracted {:?} in {:?} ({}x{})",
            path,
            start.elapsed(),
            width,
            height
        );

        Ok(ImageMetadata {
            width,
            height,
            captured_at: fields.captured_at,
            map_link,
        })
    }
}
