//! GPS coordinate conversion from EXIF degrees/minutes/seconds.
//!
//! EXIF stores each axis as three rationals plus a hemisphere letter. This
//! module turns a pair of those into signed decimal degrees and builds a
//! Google Maps search link from them.

/// Base URL for map-search links. Coordinates are appended as `lat,lon`.
pub const MAP_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Decimal places used when rendering a coordinate.
pub const DECIMAL_PLACES: usize = 7;

/// Hemisphere reference from `GPSLatitudeRef` / `GPSLongitudeRef`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Parse an EXIF reference letter (`N`, `S`, `E`, `W`, any case).
    pub fn from_ref(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N" => Some(Self::North),
            "S" => Some(Self::South),
            "E" => Some(Self::East),
            "W" => Some(Self::West),
            _ => None,
        }
    }

    /// Southern and western hemispheres map to negative decimal degrees.
    pub fn is_negative(self) -> bool {
        matches!(self, Self::South | Self::West)
    }
}

/// One axis of a GPS position in sexagesimal form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsCoordinate {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
    pub hemisphere: Hemisphere,
}

impl GpsCoordinate {
    pub fn new(degrees: f64, minutes: f64, seconds: f64, hemisphere: Hemisphere) -> Self {
        Self {
            degrees,
            minutes,
            seconds,
            hemisphere,
        }
    }

    /// Signed decimal degrees, unrounded.
    pub fn to_decimal_degrees(&self) -> f64 {
        let dd = self.degrees + self.minutes / 60.0 + self.seconds / 3600.0;
        // Keep an exact zero positive so it never renders as "-0.0000000".
        if self.hemisphere.is_negative() && dd != 0.0 {
            -dd
        } else {
            dd
        }
    }

    /// Decimal degrees rendered with seven fractional digits.
    pub fn format_decimal_degrees(&self) -> String {
        format!("{:.*}", DECIMAL_PLACES, self.to_decimal_degrees())
    }
}

/// Build a map-search link for a latitude/longitude pair.
pub fn map_link(latitude: &GpsCoordinate, longitude: &GpsCoordinate) -> String {
    format!(
        "{}{},{}",
        MAP_SEARCH_URL,
        latitude.format_decimal_degrees(),
        longitude.format_decimal_degrees()
    )
}
