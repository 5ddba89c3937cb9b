//! The scene assembly engine
//!
//! Expands a decoded [`Asset`](crate::asset::Asset) into the universal
//! scene graph: embedded textures first, then materials, meshes (one
//! output mesh per primitive), cameras, lights, and finally the node
//! tree. Downstream inconsistencies degrade to warnings and best-effort
//! output; only the asset's own validity marker and a disallowed
//! compression extension abort the assembly.

pub mod materials;
pub mod nodes;
pub mod topology;

pub use nodes::mesh_offsets;
pub use topology::{IndexSource, build_faces, coarse_kind};

use glam::Vec2;
use tracing::{debug, warn};

use crate::asset::Asset;
use crate::error::{Error, Result};
use crate::scene::{Mesh, Scene, SceneMetadata};

/// Assembles the universal scene graph from a decoded asset.
///
/// The asset is read-only apart from embedded image payloads, which are
/// moved into the output texture array exactly once.
///
/// # Errors
/// Returns an error when the asset is missing its top-level marker, or
/// when a mesh carries an unimplemented compression extension alongside
/// more than one primitive.
pub fn assemble(asset: &mut Asset) -> Result<Scene> {
    if !asset.marker_seen {
        return Err(Error::MissingAssetMarker);
    }

    let mut scene = Scene::new();

    let embedded = materials::extract_embedded_textures(asset, &mut scene);
    materials::convert_materials(asset, &mut scene, &embedded);

    convert_meshes(asset, &mut scene)?;
    convert_cameras(asset, &mut scene);
    convert_lights(asset, &mut scene);

    let offsets = nodes::mesh_offsets(asset);
    nodes::build_node_tree(asset, &mut scene, &offsets);

    scene.metadata = SceneMetadata {
        format_version: asset.format_version.clone(),
        generator: asset.generator.clone(),
        copyright: asset.copyright.clone(),
    };

    if scene.meshes.is_empty() {
        scene.incomplete = true;
    }
    debug!(
        "assembled scene: {} meshes, {} materials, {} textures, {} cameras, {} lights",
        scene.meshes.len(),
        scene.materials.len(),
        scene.textures.len(),
        scene.cameras.len(),
        scene.lights.len()
    );
    Ok(scene)
}

fn convert_meshes(asset: &Asset, scene: &mut Scene) -> Result<()> {
    for logical in &asset.meshes {
        if let Some(scheme) = &logical.compression {
            // none of the compression extensions are implemented; with a
            // single primitive the data may still be readable elsewhere
            if logical.primitives.len() > 1 {
                return Err(Error::UnsupportedMeshCompression {
                    scheme: scheme.clone(),
                    mesh: logical.name.clone(),
                    primitives: logical.primitives.len(),
                });
            }
            warn!(
                "mesh '{}' declares unsupported compression '{scheme}', importing uncompressed data",
                logical.name
            );
        }

        for (p, prim) in logical.primitives.iter().enumerate() {
            let mut mesh = if logical.primitives.len() > 1 {
                Mesh::new(format!("{}-{p}", logical.name))
            } else {
                Mesh::new(logical.name.clone())
            };

            mesh.kinds.insert(topology::coarse_kind(prim.mode));
            mesh.positions.clone_from(&prim.positions);
            mesh.normals.clone_from(&prim.normals);

            // normalize the top-left vs. bottom-left origin mismatch
            mesh.texcoords = prim
                .texcoords
                .iter()
                .map(|channel| {
                    channel
                        .iter()
                        .map(|uv| Vec2::new(uv.x, 1.0 - uv.y))
                        .collect()
                })
                .collect();

            let source = match &prim.indices {
                Some(indices) => topology::IndexSource::Explicit(indices),
                None => topology::IndexSource::Implied(mesh.positions.len() as u32),
            };
            mesh.faces = topology::build_faces(&mesh.name, prim.mode, source);

            if !mesh.faces_in_bounds() {
                warn!(
                    "mesh '{}' has face indices beyond its {} vertices",
                    mesh.name,
                    mesh.positions.len()
                );
            }

            mesh.material =
                materials::clamp_material_index(prim.material, scene.materials.len(), &mesh.name);
            scene.meshes.push(mesh);
        }
    }
    Ok(())
}

fn convert_cameras(asset: &Asset, scene: &mut Scene) {
    use crate::asset::AssetCamera;
    use crate::scene::Camera;

    for cam in &asset.cameras {
        let out = match *cam {
            AssetCamera::Perspective {
                aspect,
                yfov,
                znear,
                zfar,
            } => Camera {
                name: String::new(),
                horizontal_fov: yfov * if aspect == 0.0 { 1.0 } else { aspect },
                aspect,
                near_plane: znear,
                far_plane: zfar,
            },
            AssetCamera::Orthographic {
                xmag,
                ymag,
                znear,
                zfar,
            } => Camera {
                name: String::new(),
                horizontal_fov: 0.0,
                aspect: if ymag == 0.0 { 1.0 } else { xmag / ymag },
                near_plane: znear,
                far_plane: zfar,
            },
        };
        scene.cameras.push(out);
    }
}

fn convert_lights(asset: &Asset, scene: &mut Scene) {
    use crate::asset::AssetLightKind;
    use crate::scene::{Light, LightKind};

    for light in &asset.lights {
        let kind = match light.kind {
            AssetLightKind::Directional => LightKind::Directional,
            AssetLightKind::Spot => LightKind::Spot,
            AssetLightKind::Ambient => LightKind::Ambient,
            AssetLightKind::Point => LightKind::Point,
        };
        scene.lights.push(Light {
            name: String::new(),
            kind,
            color: light.color,
            intensity: 1.0,
            outer_cone: light.falloff_angle,
            inner_cone: light.falloff_angle * (1.0 - 1.0 / (1.0 + light.falloff_exponent)),
            attenuation_constant: light.constant_attenuation,
            attenuation_linear: light.linear_attenuation,
            attenuation_quadratic: light.quadratic_attenuation,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetMesh, AssetNode, Primitive, TopologyMode};
    use glam::Vec3;

    fn triangle_primitive() -> Primitive {
        Primitive {
            mode: TopologyMode::Triangles,
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            ..Primitive::default()
        }
    }

    fn marked_asset() -> Asset {
        Asset {
            marker_seen: true,
            ..Asset::default()
        }
    }

    #[test]
    fn missing_marker_is_structural() {
        let mut asset = Asset::new();
        assert!(matches!(
            assemble(&mut asset),
            Err(Error::MissingAssetMarker)
        ));
    }

    #[test]
    fn empty_marked_asset_is_incomplete_but_valid() {
        let mut asset = marked_asset();
        let scene = assemble(&mut asset).unwrap();
        assert!(scene.incomplete);
        assert!(scene.meshes.is_empty());
        // the default material is still there
        assert_eq!(scene.materials.len(), 1);
    }

    #[test]
    fn multi_primitive_mesh_gets_numbered_names() {
        let mut asset = marked_asset();
        asset.meshes.push(AssetMesh {
            name: "body".to_string(),
            primitives: vec![triangle_primitive(), triangle_primitive()],
            compression: None,
        });
        let scene = assemble(&mut asset).unwrap();
        assert_eq!(scene.meshes.len(), 2);
        assert_eq!(scene.meshes[0].name, "body-0");
        assert_eq!(scene.meshes[1].name, "body-1");
        assert!(!scene.incomplete);
    }

    #[test]
    fn single_primitive_keeps_plain_name() {
        let mut asset = marked_asset();
        asset.meshes.push(AssetMesh {
            name: "body".to_string(),
            primitives: vec![triangle_primitive()],
            compression: None,
        });
        let scene = assemble(&mut asset).unwrap();
        assert_eq!(scene.meshes[0].name, "body");
    }

    #[test]
    fn texcoord_v_is_flipped() {
        let mut prim = triangle_primitive();
        prim.texcoords = vec![vec![
            glam::Vec2::new(0.25, 0.0),
            glam::Vec2::new(0.5, 1.0),
            glam::Vec2::new(0.75, 0.25),
        ]];
        let mut asset = marked_asset();
        asset.meshes.push(AssetMesh {
            name: "m".to_string(),
            primitives: vec![prim],
            compression: None,
        });
        let scene = assemble(&mut asset).unwrap();
        let uvs = &scene.meshes[0].texcoords[0];
        assert_eq!(uvs[0], glam::Vec2::new(0.25, 1.0));
        assert_eq!(uvs[1], glam::Vec2::new(0.5, 0.0));
        assert_eq!(uvs[2], glam::Vec2::new(0.75, 0.75));
    }

    #[test]
    fn compressed_multi_primitive_mesh_is_structural() {
        let mut asset = marked_asset();
        asset.meshes.push(AssetMesh {
            name: "packed".to_string(),
            primitives: vec![triangle_primitive(), triangle_primitive()],
            compression: Some("Open3DGC".to_string()),
        });
        assert!(matches!(
            assemble(&mut asset),
            Err(Error::UnsupportedMeshCompression { primitives: 2, .. })
        ));
    }

    #[test]
    fn compressed_single_primitive_degrades_to_warning() {
        let mut asset = marked_asset();
        asset.meshes.push(AssetMesh {
            name: "packed".to_string(),
            primitives: vec![triangle_primitive()],
            compression: Some("Open3DGC".to_string()),
        });
        let scene = assemble(&mut asset).unwrap();
        assert_eq!(scene.meshes.len(), 1);
    }

    #[test]
    fn camera_and_light_adopt_their_node_name() {
        use crate::asset::{AssetCamera, AssetLight};

        let mut asset = marked_asset();
        asset.cameras.push(AssetCamera::Perspective {
            aspect: 0.0,
            yfov: 1.0,
            znear: 0.1,
            zfar: 100.0,
        });
        asset.lights.push(AssetLight::default());
        asset.nodes.push(AssetNode {
            name: "rig".to_string(),
            camera: Some(0),
            light: Some(0),
            ..AssetNode::default()
        });
        asset.scene_roots.push(0);

        let scene = assemble(&mut asset).unwrap();
        assert_eq!(scene.cameras[0].name, "rig");
        assert_eq!(scene.lights[0].name, "rig");
        // aspect 0 leaves the vertical fov as horizontal
        assert_eq!(scene.cameras[0].horizontal_fov, 1.0);
    }
}
