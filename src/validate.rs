use once_cell::sync::Lazy;
use regex::Regex;

// Deliberately a substring match, not anchored to the end of the name:
// "photo.png.bak" and "jpg_report.txt" both count as images. This mirrors
// how the classic upload widgets validate and keeps the check cheap; real
// format errors still surface when the data URL fails to render.
static IMAGE_EXT: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i)jpeg|jpg|gif|bmp|png").expect("image extension pattern"));

/// Whether a filename (or path) looks like a previewable image.
pub fn is_supported_image(name: &str) -> bool {
    IMAGE_EXT.is_match(name)
}
