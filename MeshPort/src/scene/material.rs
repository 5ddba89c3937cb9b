//! Material model of the universal scene graph
//!
//! Color-or-texture properties resolve to a flat color, an external URI,
//! or a marker-prefixed embedded texture reference (see
//! [`MaterialProperty::embedded_texture_index`]).

use glam::Vec4;

use super::texture::EMBEDDED_MARKER;

/// One color-or-texture material slot.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialProperty {
    /// Flat RGBA color.
    Color(Vec4),
    /// Texture reference: an external URI, or `*<index>` for an embedded
    /// texture in the owning scene's texture array.
    Texture(String),
}

impl MaterialProperty {
    /// Reference string for the embedded texture at `index`.
    pub fn embedded(index: usize) -> Self {
        MaterialProperty::Texture(format!("{EMBEDDED_MARKER}{index}"))
    }

    /// Decodes a marker-prefixed embedded texture reference.
    ///
    /// Returns `None` for color properties and external URIs.
    pub fn embedded_texture_index(&self) -> Option<usize> {
        match self {
            MaterialProperty::Texture(path) => path
                .strip_prefix(EMBEDDED_MARKER)
                .and_then(|digits| digits.parse().ok()),
            MaterialProperty::Color(_) => None,
        }
    }
}

impl Default for MaterialProperty {
    fn default() -> Self {
        MaterialProperty::Color(Vec4::new(0.0, 0.0, 0.0, 1.0))
    }
}

/// Shading model of a block-parsed material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShadingModel {
    Flat,
    #[default]
    Gouraud,
    Phong,
    Blinn,
    Wire,
}

/// One output material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: MaterialProperty,
    pub diffuse: MaterialProperty,
    pub specular: MaterialProperty,
    pub emissive: MaterialProperty,
    pub shading: ShadingModel,
    pub two_sided: bool,
    /// Opacity in `[0, 1]`; `None` means fully opaque.
    pub opacity: Option<f32>,
    pub shininess: Option<f32>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Material {
            name: name.into(),
            ambient: MaterialProperty::default(),
            diffuse: MaterialProperty::Color(Vec4::new(0.6, 0.6, 0.6, 1.0)),
            specular: MaterialProperty::default(),
            emissive: MaterialProperty::default(),
            shading: ShadingModel::default(),
            two_sided: false,
            opacity: None,
            shininess: None,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::new("DefaultMaterial")
    }
}
