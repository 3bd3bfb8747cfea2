//! Orientation-aware dimension correction.
//!
//! EXIF orientation codes:
//!
//! | code | transform                  | bounding box |
//! |------|----------------------------|--------------|
//! | 1    | none                       | unchanged    |
//! | 2    | mirrored                   | unchanged    |
//! | 3    | rotated 180°               | unchanged    |
//! | 4    | rotated 180°, mirrored     | unchanged    |
//! | 5    | rotated 90°, mirrored      | swapped      |
//! | 6    | rotated 90°                | swapped      |
//! | 7    | rotated 270°, mirrored     | swapped      |
//! | 8    | rotated 270°               | swapped      |

/// Return `(width, height)` as the image is displayed.
///
/// Codes outside 1-8 are treated as absent.
pub fn normalize(width: u32, height: u32, orientation: Option<u16>) -> (u32, u32) {
    match orientation {
        Some(5..=8) => (height, width),
        _ => (width, height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_swap_for_codes_1_to_4() {
        for code in 1..=4 {
            assert_eq!(normalize(400, 300, Some(code)), (400, 300), "code {code}");
        }
    }

    #[test]
    fn test_swap_for_codes_5_to_8() {
        for code in 5..=8 {
            assert_eq!(normalize(400, 300, Some(code)), (300, 400), "code {code}");
        }
    }

    #[test]
    fn test_absent_orientation() {
        assert_eq!(normalize(400, 300, None), (400, 300));
    }

    #[test]
    fn test_out_of_range_codes_ignored() {
        assert_eq!(normalize(400, 300, Some(0)), (400, 300));
        assert_eq!(normalize(400, 300, Some(9)), (400, 300));
    }
}
