//! Embedded texture storage and the marker-prefixed reference encoding

/// Marker character introducing an embedded texture reference string.
///
/// A material property string of the form `*<decimal index>` denotes the
/// embedded texture at that index in [`super::Scene::textures`]; any other
/// non-empty string is an external URI.
pub const EMBEDDED_MARKER: char = '*';

/// A texture whose bytes were carried inside the source file.
///
/// The payload is moved out of the source asset exactly once during
/// assembly; the bytes are stored still encoded (PNG, JPEG, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedTexture {
    /// Name of the source image entity.
    pub name: String,
    /// Encoded image bytes.
    pub data: Vec<u8>,
    /// Up to three lowercase characters hinting the encoded format,
    /// e.g. `"png"` or `"jpg"`. Empty when the source gave no MIME type.
    pub format_hint: String,
}

impl EmbeddedTexture {
    /// Maps a MIME type to the 3-character format hint.
    ///
    /// The subtype is truncated to three characters; `image/jpeg` maps to
    /// `"jpg"` rather than `"jpe"`.
    pub fn format_hint_from_mime(mime: &str) -> String {
        let Some(subtype) = mime.split('/').nth(1) else {
            return String::new();
        };
        if subtype.eq_ignore_ascii_case("jpeg") {
            return "jpg".to_string();
        }
        subtype.chars().take(3).map(|c| c.to_ascii_lowercase()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpeg_maps_to_jpg() {
        assert_eq!(EmbeddedTexture::format_hint_from_mime("image/jpeg"), "jpg");
    }

    #[test]
    fn subtype_truncates_to_three_chars() {
        assert_eq!(EmbeddedTexture::format_hint_from_mime("image/png"), "png");
        assert_eq!(EmbeddedTexture::format_hint_from_mime("image/tiff"), "tif");
    }

    #[test]
    fn missing_subtype_gives_empty_hint() {
        assert_eq!(EmbeddedTexture::format_hint_from_mime("garbage"), "");
    }
}
