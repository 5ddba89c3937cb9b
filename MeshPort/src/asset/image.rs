//! Image entities of the structured asset model

/// An image: either an embedded binary payload or an external URI,
/// mutually exclusive.
#[derive(Debug, Clone, Default)]
pub struct Image {
    pub name: String,
    /// MIME type of the payload, e.g. `image/png`.
    pub mime_type: Option<String>,
    data: Option<Vec<u8>>,
    uri: Option<String>,
}

impl Image {
    /// An image embedded in the source file.
    pub fn embedded(name: impl Into<String>, mime_type: Option<String>, data: Vec<u8>) -> Self {
        Image {
            name: name.into(),
            mime_type,
            data: Some(data),
            uri: None,
        }
    }

    /// An image referenced by an external URI.
    pub fn external(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Image {
            name: name.into(),
            mime_type: None,
            data: None,
            uri: Some(uri.into()),
        }
    }

    /// A placeholder for an image that carries neither payload nor URI;
    /// material slots referencing it fall back to their color.
    pub fn empty(name: impl Into<String>) -> Self {
        Image {
            name: name.into(),
            mime_type: None,
            data: None,
            uri: None,
        }
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Moves the embedded payload out, leaving the slot empty.
    ///
    /// Single-use by construction: a second call returns `None`.
    pub fn take_data(&mut self) -> Option<Vec<u8>> {
        self.data.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_taken_exactly_once() {
        let mut img = Image::embedded("tex0", Some("image/png".to_string()), vec![1, 2, 3]);
        assert!(img.has_data());
        assert_eq!(img.take_data(), Some(vec![1, 2, 3]));
        assert!(!img.has_data());
        assert_eq!(img.take_data(), None);
    }

    #[test]
    fn external_image_has_no_payload() {
        let mut img = Image::external("tex1", "wood.png");
        assert!(!img.has_data());
        assert_eq!(img.uri(), Some("wood.png"));
        assert_eq!(img.take_data(), None);
    }
}
