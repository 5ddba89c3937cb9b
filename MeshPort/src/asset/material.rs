//! Material entities of the structured asset model

use glam::Vec4;

/// A material slot that is either a flat color or a reference to an image.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorOrTexture {
    pub color: Vec4,
    /// Index into [`super::Asset::images`] when the slot is textured.
    pub texture: Option<usize>,
}

impl ColorOrTexture {
    pub fn color(color: Vec4) -> Self {
        ColorOrTexture {
            color,
            texture: None,
        }
    }

    pub fn texture(image: usize) -> Self {
        ColorOrTexture {
            color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            texture: Some(image),
        }
    }
}

impl Default for ColorOrTexture {
    fn default() -> Self {
        ColorOrTexture::color(Vec4::new(0.0, 0.0, 0.0, 1.0))
    }
}

/// One material of the asset model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetMaterial {
    pub name: String,
    pub ambient: ColorOrTexture,
    pub diffuse: ColorOrTexture,
    pub specular: ColorOrTexture,
    pub emission: ColorOrTexture,
    pub double_sided: bool,
    /// Opacity in `[0, 1]`; 1 is fully opaque.
    pub transparency: Option<f32>,
    pub shininess: Option<f32>,
}
