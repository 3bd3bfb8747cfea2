//! Core data types for the img-meta pipeline.
//!
//! These types represent what the decoder hands back for one file, the record
//! produced per image, and the ordered report assembled for a whole directory.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::collections::HashMap;

/// Display dimensions and optional capture/geolocation data for one image.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    /// Width as displayed (after orientation correction)
    pub width: u32,

    /// Height as displayed (after orientation correction)
    pub height: u32,

    /// Capture time, ISO 8601 UTC with millisecond precision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>,

    /// Map-search link for the capture location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_link: Option<String>,
}

/// Raw output of an [`ImageDecoder`](crate::pipeline::ImageDecoder) for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedImageInfo {
    /// Stored pixel width, if the header declares one
    pub width: Option<u32>,
    /// Stored pixel height, if the header declares one
    pub height: Option<u32>,
    /// EXIF orientation code (1-8)
    pub orientation: Option<u16>,
    /// Raw TIFF-structured EXIF block
    pub exif: Option<Vec<u8>>,
}

/// Ordered mapping from root-relative image path to its metadata.
///
/// Keys are `/`-rooted with forward slashes (`/blog/cat.jpg`). Entries keep the
/// order they were pushed in, which the batch pipeline fixes to the sorted
/// order of the discovered files. Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    entries: Vec<(String, ImageMetadata)>,
    index: HashMap<String, usize>,
}

impl AggregateReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Append an entry. Returns `false` (and leaves the report unchanged) if
    /// the key is already present.
    pub fn push(&mut self, key: impl Into<String>, metadata: ImageMetadata) -> bool {
        let key = key.into();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, metadata));
        true
    }

    pub fn get(&self, key: &str) -> Option<&ImageMetadata> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Keys in report order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ImageMetadata)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AggregateReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, metadata) in &self.entries {
            map.serialize_entry(key, metadata)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(width: u32, height: u32) -> ImageMetadata {
        ImageMetadata {
            width,
            height,
            captured_at: None,
            map_link: None,
        }
    }

    #[test]
    fn test_optional_fields_omitted() {
        let json = serde_json::to_string(&meta(4, 3)).unwrap();
        assert_eq!(json, r#"{"width":4,"height":3}"#);
        assert!(!json.contains("null"));
    }

    #[test]
    fn test_camel_case_field_names() {
        let record = ImageMetadata {
            captured_at: Some("2021-05-03T10:20:30.000Z".into()),
            map_link: Some("https://example.com".into()),
            ..meta(1, 1)
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"capturedAt\""));
        assert!(json.contains("\"mapLink\""));
    }

    #[test]
    fn test_report_preserves_insertion_order() {
        let mut report = AggregateReport::new();
        report.push("/z.jpg", meta(1, 1));
        report.push("/a.jpg", meta(2, 2));

        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"/z.jpg":{"width":1,"height":1},"/a.jpg":{"width":2,"height":2}}"#
        );
        assert_eq!(report.keys().collect::<Vec<_>>(), vec!["/z.jpg", "/a.jpg"]);
    }

    #[test]
    fn test_report_rejects_duplicate_keys() {
        let mut report = AggregateReport::new();
        assert!(report.push("/a.jpg", meta(1, 1)));
        assert!(!report.push("/a.jpg", meta(9, 9)));
        assert_eq!(report.len(), 1);
        assert_eq!(report.get("/a.jpg"), Some(&meta(1, 1)));
    }
}
