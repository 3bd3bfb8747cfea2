//! EXIF parsing for capture time and GPS position.

use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};

use crate::gps::{GpsCoordinate, Hemisphere};

/// Marker that prefixes EXIF data inside a JPEG APP1 segment.
const APP1_EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Fields pulled out of an EXIF block. Anything missing or malformed is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifFields {
    /// Capture time as ISO 8601 UTC (`2021-05-03T10:20:30.000Z`)
    pub captured_at: Option<String>,
    pub latitude: Option<GpsCoordinate>,
    pub longitude: Option<GpsCoordinate>,
}

/// Extracts capture metadata from raw EXIF blocks.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Parse a raw TIFF-structured EXIF block.
    ///
    /// This method is intentionally lenient: a block that cannot be parsed at
    /// all yields `ExifFields::default()`, and each field is read on its own.
    pub fn parse(block: &[u8]) -> ExifFields {
        let block = block.strip_prefix(APP1_EXIF_HEADER).unwrap_or(block);
        match Reader::new().read_raw(block.to_vec()) {
            Ok(exif) => Self::fields(&exif),
            Err(e) => {
                tracing::debug!("Ignoring unreadable EXIF block: {}", e);
                ExifFields::default()
            }
        }
    }

    /// Read capture time and GPS position from already-parsed EXIF.
    pub fn fields(exif: &Exif) -> ExifFields {
        ExifFields {
            captured_at: Self::get_datetime(exif),
            latitude: Self::get_gps_coord(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef)
                .filter(|c| matches!(c.hemisphere, Hemisphere::North | Hemisphere::South)),
            longitude: Self::get_gps_coord(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef)
                .filter(|c| matches!(c.hemisphere, Hemisphere::East | Hemisphere::West)),
        }
    }

    /// Orientation code (1-8) if present.
    pub fn orientation(exif: &Exif) -> Option<u16> {
        exif.get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0))
            .and_then(|v| u16::try_from(v).ok())
    }

    /// Get the capture datetime, preferring DateTimeOriginal over DateTime.
    fn get_datetime(exif: &exif::Exif) -> Option<String> {
        [Tag::DateTimeOriginal, Tag::DateTime]
            .into_iter()
            .filter_map(|tag| exif.get_field(tag, In::PRIMARY))
            .filter_map(|f| first_ascii(&f.value))
            .find_map(|s| parse_exif_datetime(&s))
    }

    /// Get one GPS axis as degrees/minutes/seconds plus hemisphere.
    fn get_gps_coord(exif: &exif::Exif, coord_tag: Tag, ref_tag: Tag) -> Option<GpsCoordinate> {
        let coord = exif.get_field(coord_tag, In::PRIMARY)?;
        let reference = exif.get_field(ref_tag, In::PRIMARY)?;

        let hemisphere = Hemisphere::from_ref(&first_ascii(&reference.value)?)?;
        let (degrees, minutes, seconds) = parse_gps_rationals(&coord.value)?;
        Some(GpsCoordinate::new(degrees, minutes, seconds, hemisphere))
    }
}

/// First string of an ASCII-valued field.
fn first_ascii(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(strings) => strings
            .first()
            .map(|s| String::from_utf8_lossy(s).trim_matches(char::from(0)).trim().to_string()),
        _ => None,
    }
}

/// Parse degrees, minutes, seconds from EXIF rational values.
fn parse_gps_rationals(value: &Value) -> Option<(f64, f64, f64)> {
    match value {
        Value::Rational(rationals) if rationals.len() >= 3 => {
            let degrees = rationals[0].to_f64();
            let minutes = rationals[1].to_f64();
            let seconds = rationals[2].to_f64();
            [degrees, minutes, seconds]
                .iter()
                .all(|v| v.is_finite())
                .then_some((degrees, minutes, seconds))
        }
        _ => None,
    }
}

/// Parse an EXIF datetime (`2021:05:03 10:20:30`) into ISO 8601 UTC.
///
/// EXIF local time carries no zone; it is rendered as UTC.
fn parse_exif_datetime(s: &str) -> Option<String> {
    let s = s.trim().trim_matches('"');
    NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}
