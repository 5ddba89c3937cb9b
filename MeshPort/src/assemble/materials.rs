//! Material and embedded-texture binding

use tracing::warn;

use crate::asset::{Asset, ColorOrTexture};
use crate::scene::{EmbeddedTexture, Material, MaterialProperty, Scene};

/// Moves every embedded image payload into the scene's texture array.
///
/// Returns a per-image table mapping image index to its dense output
/// texture index; `None` for images that only carry an external URI.
pub fn extract_embedded_textures(asset: &mut Asset, scene: &mut Scene) -> Vec<Option<usize>> {
    let mut table = vec![None; asset.images.len()];

    for (i, image) in asset.images.iter_mut().enumerate() {
        let Some(data) = image.take_data() else {
            continue;
        };
        let format_hint = image
            .mime_type
            .as_deref()
            .map(EmbeddedTexture::format_hint_from_mime)
            .unwrap_or_default();

        table[i] = Some(scene.textures.len());
        scene.textures.push(EmbeddedTexture {
            name: image.name.clone(),
            data,
            format_hint,
        });
    }
    table
}

/// Resolves one color-or-texture slot against the embedded texture table.
fn resolve_property(
    material_name: &str,
    prop: &ColorOrTexture,
    asset: &Asset,
    embedded: &[Option<usize>],
) -> MaterialProperty {
    let Some(image_idx) = prop.texture else {
        return MaterialProperty::Color(prop.color);
    };
    let Some(image) = asset.images.get(image_idx) else {
        warn!("material '{material_name}' references image {image_idx} out of range, using color");
        return MaterialProperty::Color(prop.color);
    };
    if let Some(Some(tex_idx)) = embedded.get(image_idx) {
        return MaterialProperty::embedded(*tex_idx);
    }
    match image.uri() {
        Some(uri) => MaterialProperty::Texture(uri.to_string()),
        None => {
            warn!(
                "material '{material_name}' references image '{}' with neither payload nor URI",
                image.name
            );
            MaterialProperty::Color(prop.color)
        }
    }
}

/// Converts all asset materials into output materials.
///
/// An asset declaring zero materials still yields exactly one default
/// material so mesh material indices stay valid.
pub fn convert_materials(asset: &Asset, scene: &mut Scene, embedded: &[Option<usize>]) {
    for mat in &asset.materials {
        let mut out = Material::new(mat.name.clone());
        out.ambient = resolve_property(&mat.name, &mat.ambient, asset, embedded);
        out.diffuse = resolve_property(&mat.name, &mat.diffuse, asset, embedded);
        out.specular = resolve_property(&mat.name, &mat.specular, asset, embedded);
        out.emissive = resolve_property(&mat.name, &mat.emission, asset, embedded);
        out.two_sided = mat.double_sided;
        if let Some(t) = mat.transparency {
            if t != 1.0 {
                out.opacity = Some(t);
            }
        }
        if let Some(s) = mat.shininess {
            if s > 0.0 {
                out.shininess = Some(s);
            }
        }
        scene.materials.push(out);
    }

    if scene.materials.is_empty() {
        scene.materials.push(Material::default());
    }
}

/// Clamps a primitive's material reference to a valid output index.
pub fn clamp_material_index(material: Option<usize>, count: usize, mesh_name: &str) -> usize {
    let idx = material.unwrap_or(0);
    if count == 0 {
        return 0;
    }
    if idx >= count {
        warn!(
            "mesh '{mesh_name}' references material {idx} out of range, \
             clamping to {}",
            count - 1
        );
        return count - 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetMaterial, Image};
    use glam::Vec4;

    #[test]
    fn zero_materials_yield_one_default() {
        let asset = Asset::new();
        let mut scene = Scene::new();
        convert_materials(&asset, &mut scene, &[]);
        assert_eq!(scene.materials.len(), 1);
        assert_eq!(scene.materials[0].name, "DefaultMaterial");
    }

    #[test]
    fn embedded_image_becomes_marker_reference() {
        let mut asset = Asset::new();
        asset.images.push(Image::embedded(
            "tex0",
            Some("image/jpeg".to_string()),
            vec![0xFF, 0xD8],
        ));
        asset.materials.push(AssetMaterial {
            name: "skin".to_string(),
            diffuse: ColorOrTexture::texture(0),
            ..AssetMaterial::default()
        });

        let mut scene = Scene::new();
        let embedded = extract_embedded_textures(&mut asset, &mut scene);
        convert_materials(&asset, &mut scene, &embedded);

        assert_eq!(scene.textures.len(), 1);
        assert_eq!(scene.textures[0].format_hint, "jpg");
        assert_eq!(
            scene.materials[0].diffuse,
            MaterialProperty::Texture("*0".to_string())
        );
    }

    #[test]
    fn external_image_keeps_its_uri() {
        let mut asset = Asset::new();
        asset.images.push(Image::external("tex0", "wood.png"));
        asset.materials.push(AssetMaterial {
            name: "crate".to_string(),
            diffuse: ColorOrTexture::texture(0),
            ..AssetMaterial::default()
        });

        let mut scene = Scene::new();
        let embedded = extract_embedded_textures(&mut asset, &mut scene);
        convert_materials(&asset, &mut scene, &embedded);

        assert!(scene.textures.is_empty());
        assert_eq!(
            scene.materials[0].diffuse,
            MaterialProperty::Texture("wood.png".to_string())
        );
    }

    #[test]
    fn untextured_slot_keeps_its_color() {
        let mut asset = Asset::new();
        asset.materials.push(AssetMaterial {
            name: "flat".to_string(),
            diffuse: ColorOrTexture::color(Vec4::new(1.0, 0.0, 0.0, 1.0)),
            ..AssetMaterial::default()
        });
        let mut scene = Scene::new();
        convert_materials(&asset, &mut scene, &[]);
        assert_eq!(
            scene.materials[0].diffuse,
            MaterialProperty::Color(Vec4::new(1.0, 0.0, 0.0, 1.0))
        );
    }

    #[test]
    fn out_of_range_material_reference_clamps() {
        assert_eq!(clamp_material_index(Some(9), 2, "m"), 1);
        assert_eq!(clamp_material_index(Some(1), 2, "m"), 1);
        assert_eq!(clamp_material_index(None, 2, "m"), 0);
    }
}
