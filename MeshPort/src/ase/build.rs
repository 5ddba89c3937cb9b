//! Conversion of a parsed document into the universal scene graph
//!
//! Node parents are name references, so the tree is resolved in a second
//! pass over an arena of flat entries once every node exists. Meshes
//! whose material carries sub-materials are split per used sub-material
//! id, one output mesh per group, mirroring the per-primitive expansion
//! of the structured-asset path.

use std::collections::BTreeMap;

use glam::{Mat4, Vec2, Vec3, Vec4};
use tracing::warn;

use super::document::{
    AseLight, AseLightKind, AseMaterial, AseMesh, Document, MAX_UV_CHANNELS, NodeInfo,
};
use crate::scene::{
    Bone, Camera, Face, Light, LightKind, Material, MaterialProperty, Mesh, Node, PrimitiveKinds,
    Scene, VertexWeight,
};

/// Builds a scene from a parsed document. Never fails; inconsistencies
/// degrade to warnings and best-effort output.
pub fn build_scene(doc: &Document) -> Scene {
    let mut scene = Scene::new();

    let table = convert_materials(doc, &mut scene);

    // node arena: flat entries resolved into a tree by parent name
    let mut arena: Vec<ArenaNode> = Vec::new();

    for mesh in &doc.meshes {
        let mesh_indices = convert_mesh(mesh, &table, &mut scene);
        arena.push(ArenaNode::new(&mesh.node, mesh_indices));
    }
    for dummy in &doc.dummies {
        arena.push(ArenaNode::new(&dummy.node, Vec::new()));
    }
    for light in &doc.lights {
        arena.push(ArenaNode::new(&light.node, Vec::new()));
        scene.lights.push(convert_light(light));
    }
    for camera in &doc.cameras {
        arena.push(ArenaNode::new(&camera.node, Vec::new()));
        scene.cameras.push(Camera {
            name: camera.node.name.clone(),
            horizontal_fov: camera.fov,
            aspect: 0.0,
            near_plane: camera.near,
            far_plane: camera.far,
        });
    }

    resolve_node_tree(arena, &mut scene);

    scene.metadata.format_version = Some(doc.format_version.to_string());
    if scene.meshes.is_empty() {
        scene.incomplete = true;
    }
    scene
}

// ==================== materials ====================

/// Maps document material references (material index + per-face
/// sub-material id) to output material indices.
struct MaterialTable {
    base: Vec<usize>,
    subs: Vec<Vec<usize>>,
}

impl MaterialTable {
    fn resolve(&self, material_index: u32, sub_id: Option<u32>) -> usize {
        if self.base.is_empty() {
            return 0;
        }
        let mut index = material_index as usize;
        if index >= self.base.len() {
            warn!("material reference {index} out of range, clamping");
            index = self.base.len() - 1;
        }
        let subs = &self.subs[index];
        match sub_id {
            Some(sub) if !subs.is_empty() => {
                let mut sub = sub as usize;
                if sub >= subs.len() {
                    warn!("sub-material id {sub} out of range, clamping");
                    sub = subs.len() - 1;
                }
                subs[sub]
            }
            _ => self.base[index],
        }
    }

    /// Whether the referenced material splits its mesh by face id.
    fn has_subs(&self, material_index: u32) -> bool {
        self.subs
            .get(material_index as usize)
            .is_some_and(|s| !s.is_empty())
    }
}

fn convert_one_material(mat: &AseMaterial) -> Material {
    let mut out = Material::new(mat.name.clone());
    out.ambient = MaterialProperty::Color(mat.ambient.extend(1.0));
    out.diffuse = if mat.tex_diffuse.path.is_empty() {
        MaterialProperty::Color(mat.diffuse.extend(1.0))
    } else {
        MaterialProperty::Texture(mat.tex_diffuse.path.clone())
    };
    out.specular = if mat.tex_specular.path.is_empty() {
        MaterialProperty::Color(mat.specular.extend(1.0))
    } else {
        MaterialProperty::Texture(mat.tex_specular.path.clone())
    };
    out.emissive = if mat.tex_emissive.path.is_empty() {
        MaterialProperty::Color(mat.emissive.extend(1.0))
    } else {
        MaterialProperty::Texture(mat.tex_emissive.path.clone())
    };
    out.shading = mat.shading;
    out.two_sided = mat.two_sided;
    if mat.opacity < 1.0 {
        out.opacity = Some(mat.opacity);
    }
    if mat.specular_exponent > 0.0 {
        out.shininess = Some(mat.specular_exponent);
    }
    out
}

fn convert_materials(doc: &Document, scene: &mut Scene) -> MaterialTable {
    let mut table = MaterialTable {
        base: Vec::with_capacity(doc.materials.len()),
        subs: Vec::with_capacity(doc.materials.len()),
    };
    for mat in &doc.materials {
        table.base.push(scene.materials.len());
        scene.materials.push(convert_one_material(mat));
        let mut subs = Vec::with_capacity(mat.sub_materials.len());
        for sub in &mat.sub_materials {
            subs.push(scene.materials.len());
            scene.materials.push(convert_one_material(sub));
        }
        table.subs.push(subs);
    }
    // a document declaring no materials still yields one default so mesh
    // material references stay valid
    if scene.materials.is_empty() {
        scene.materials.push(Material::default());
    }
    table
}

// ==================== meshes ====================

/// Converts one geometry node, splitting by sub-material id when its
/// material has sub-materials. Returns the output mesh indices produced.
fn convert_mesh(mesh: &AseMesh, table: &MaterialTable, scene: &mut Scene) -> Vec<usize> {
    // faces with unresolvable vertex indices are dropped, never emitted
    let vertex_count = mesh.positions.len() as u32;
    let valid: Vec<usize> = (0..mesh.faces.len())
        .filter(|&f| {
            let ok = mesh.faces[f].indices.iter().all(|&i| i < vertex_count);
            if !ok {
                warn!(
                    "mesh '{}': face {f} references a vertex beyond {vertex_count}, dropping it",
                    mesh.node.name
                );
            }
            ok
        })
        .collect();
    if valid.is_empty() {
        return Vec::new();
    }

    // group by sub-material id only when the material actually has subs
    let mut groups: BTreeMap<Option<u32>, Vec<usize>> = BTreeMap::new();
    if table.has_subs(mesh.material_index) {
        for &f in &valid {
            groups
                .entry(Some(mesh.faces[f].material_id))
                .or_default()
                .push(f);
        }
    } else {
        groups.insert(None, valid);
    }

    let multi = groups.len() > 1;
    let mut produced = Vec::with_capacity(groups.len());

    for (group_index, (sub_id, face_indices)) in groups.into_iter().enumerate() {
        let name = if multi {
            format!("{}-{group_index}", mesh.node.name)
        } else {
            mesh.node.name.clone()
        };
        let mut out = Mesh::new(name);
        out.kinds.insert(PrimitiveKinds::TRIANGLE);
        out.material = table.resolve(mesh.material_index, sub_id);

        // vertices are replicated per face corner so that per-face UV,
        // color and normal indices can disagree with position indices
        let corner_count = face_indices.len() * 3;
        out.positions = Vec::with_capacity(corner_count);
        let mut source_vertices = Vec::with_capacity(corner_count);
        if !mesh.normals.is_empty() {
            out.normals = Some(Vec::with_capacity(corner_count));
        }
        let uv_channels: Vec<usize> = (0..MAX_UV_CHANNELS)
            .filter(|&c| !mesh.texcoords[c].is_empty())
            .collect();
        out.texcoords = vec![Vec::with_capacity(corner_count); uv_channels.len()];
        if !mesh.colors.is_empty() {
            out.colors = Some(Vec::with_capacity(corner_count));
        }

        for &f in &face_indices {
            let face = &mesh.faces[f];
            for corner in 0..3 {
                let vertex = face.indices[corner] as usize;
                out.positions.push(mesh.positions[vertex]);
                source_vertices.push(vertex);

                if let Some(normals) = &mut out.normals {
                    normals.push(
                        mesh.normals
                            .get(f * 3 + corner)
                            .copied()
                            .unwrap_or(Vec3::ZERO),
                    );
                }
                for (slot, &channel) in uv_channels.iter().enumerate() {
                    let uv_index = face.uv_indices[channel][corner] as usize;
                    let uvw = mesh.texcoords[channel]
                        .get(uv_index)
                        .copied()
                        .unwrap_or(Vec3::ZERO);
                    out.texcoords[slot].push(Vec2::new(uvw.x, uvw.y));
                }
                if let Some(colors) = &mut out.colors {
                    let color_index = face.color_indices[corner] as usize;
                    colors.push(
                        mesh.colors
                            .get(color_index)
                            .copied()
                            .unwrap_or(Vec4::new(0.0, 0.0, 0.0, 1.0)),
                    );
                }
            }
            let base = (out.positions.len() - 3) as u32;
            out.faces.push(Face::triangle(base, base + 1, base + 2));
        }

        out.bones = collect_bones(mesh, &source_vertices);

        produced.push(scene.meshes.len());
        scene.meshes.push(out);
    }
    produced
}

/// Inverts the per-vertex weight lists into per-bone weight lists over
/// the replicated vertices.
fn collect_bones(mesh: &AseMesh, source_vertices: &[usize]) -> Vec<Bone> {
    if mesh.bones.is_empty() || mesh.bone_vertices.is_empty() {
        return Vec::new();
    }
    let mut weights: Vec<Vec<VertexWeight>> = vec![Vec::new(); mesh.bones.len()];
    for (out_vertex, &source) in source_vertices.iter().enumerate() {
        let Some(bone_vertex) = mesh.bone_vertices.get(source) else {
            continue;
        };
        for &(bone, weight) in &bone_vertex.weights {
            if let Some(list) = weights.get_mut(bone as usize) {
                list.push(VertexWeight {
                    vertex: out_vertex as u32,
                    weight,
                });
            } else {
                warn!(
                    "mesh '{}': bone index {bone} out of range, dropping weight",
                    mesh.node.name
                );
            }
        }
    }
    mesh.bones
        .iter()
        .zip(weights)
        .filter(|(_, w)| !w.is_empty())
        .map(|(name, weights)| Bone {
            name: name.clone(),
            weights,
        })
        .collect()
}

// ==================== lights ====================

fn convert_light(light: &AseLight) -> Light {
    let kind = match light.kind {
        AseLightKind::Target => LightKind::Spot,
        AseLightKind::Directional => LightKind::Directional,
        AseLightKind::Omni | AseLightKind::Free => LightKind::Point,
    };
    Light {
        name: light.node.name.clone(),
        kind,
        color: light.color,
        intensity: light.intensity,
        // hotspot is the inner cone, falloff the outer, both in degrees
        inner_cone: light.angle.to_radians(),
        outer_cone: if light.falloff > 0.0 {
            light.falloff.to_radians()
        } else {
            light.angle.to_radians()
        },
        attenuation_constant: 1.0,
        attenuation_linear: 0.0,
        attenuation_quadratic: 0.0,
    }
}

// ==================== node tree ====================

struct ArenaNode {
    name: String,
    parent: Option<String>,
    transform: Mat4,
    meshes: Vec<usize>,
    children: Vec<usize>,
}

impl ArenaNode {
    fn new(info: &NodeInfo, meshes: Vec<usize>) -> Self {
        let [r0, r1, r2, t] = info.transform;
        ArenaNode {
            name: info.name.clone(),
            parent: info.parent.clone(),
            transform: Mat4::from_cols(r0.extend(0.0), r1.extend(0.0), r2.extend(0.0), t.extend(1.0)),
            meshes,
            children: Vec::new(),
        }
    }
}

/// Second pass: resolve parent names against the finished arena and
/// materialize the ownership tree.
fn resolve_node_tree(mut arena: Vec<ArenaNode>, scene: &mut Scene) {
    let mut roots: Vec<usize> = Vec::new();
    for i in 0..arena.len() {
        let Some(parent) = arena[i].parent.clone() else {
            roots.push(i);
            continue;
        };
        let parent_index = arena
            .iter()
            .enumerate()
            .find(|&(j, n)| j != i && n.name == parent)
            .map(|(j, _)| j);
        match parent_index {
            Some(p) => arena[p].children.push(i),
            None => {
                warn!(
                    "node '{}' references unknown parent '{parent}', attaching to root",
                    arena[i].name
                );
                roots.push(i);
            }
        }
    }

    let mut visited = vec![false; arena.len()];
    let mut root_nodes: Vec<Node> = roots
        .iter()
        .filter_map(|&i| materialize(&arena, i, &mut visited))
        .collect();

    // nodes trapped in a parent cycle are unreachable from any root;
    // surface them instead of dropping them
    for i in 0..arena.len() {
        if !visited[i] {
            warn!("node '{}' is part of a parent cycle, attaching to root", arena[i].name);
            if let Some(node) = materialize(&arena, i, &mut visited) {
                root_nodes.push(node);
            }
        }
    }

    if root_nodes.len() == 1 {
        scene.root = root_nodes.remove(0);
    } else if !root_nodes.is_empty() {
        scene.root = Node::new("ROOT");
        scene.root.children = root_nodes;
    }
}

fn materialize(arena: &[ArenaNode], index: usize, visited: &mut [bool]) -> Option<Node> {
    if visited[index] {
        return None;
    }
    visited[index] = true;
    let entry = &arena[index];
    let mut node = Node::new(entry.name.clone());
    node.transform = entry.transform;
    node.meshes.clone_from(&entry.meshes);
    for &child in &entry.children {
        if let Some(built) = materialize(arena, child, visited) {
            node.children.push(built);
        }
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ase::document::{AseFace, AseLight, BoneVertex, FORMAT_VERSION_ASE};

    fn doc_with_triangle(name: &str) -> (Document, AseMesh) {
        let doc = Document::new(FORMAT_VERSION_ASE);
        let mut mesh = AseMesh::new(name);
        mesh.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        mesh.faces = vec![AseFace {
            indices: [0, 1, 2],
            ..AseFace::default()
        }];
        (doc, mesh)
    }

    #[test]
    fn vertices_are_replicated_per_face_corner() {
        let (mut doc, mesh) = doc_with_triangle("Tri");
        doc.meshes.push(mesh);
        let scene = build_scene(&doc);
        assert_eq!(scene.meshes.len(), 1);
        let out = &scene.meshes[0];
        assert_eq!(out.positions.len(), 3);
        assert_eq!(out.faces[0].indices(), &[0, 1, 2]);
        assert!(!scene.incomplete);
        // no materials declared, exactly one default
        assert_eq!(scene.materials.len(), 1);
        assert_eq!(out.material, 0);
    }

    #[test]
    fn faces_with_dangling_indices_are_dropped() {
        let (mut doc, mut mesh) = doc_with_triangle("Tri");
        mesh.faces.push(AseFace {
            indices: [0, 1, 9],
            ..AseFace::default()
        });
        doc.meshes.push(mesh);
        let scene = build_scene(&doc);
        assert_eq!(scene.meshes[0].faces.len(), 1);
    }

    #[test]
    fn mesh_without_valid_faces_flags_scene_incomplete() {
        let mut doc = Document::new(FORMAT_VERSION_ASE);
        doc.meshes.push(AseMesh::new("Empty"));
        let scene = build_scene(&doc);
        assert!(scene.incomplete);
        assert!(scene.meshes.is_empty());
        // the node is still present
        assert_eq!(scene.root.name, "Empty");
    }

    #[test]
    fn sub_material_ids_split_the_mesh() {
        let mut doc = Document::new(FORMAT_VERSION_ASE);
        let mut mat = AseMaterial::new("multi");
        mat.sub_materials.push(AseMaterial::new("a"));
        mat.sub_materials.push(AseMaterial::new("b"));
        doc.materials.push(mat);

        let mut mesh = AseMesh::new("Split");
        mesh.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
        mesh.faces = vec![
            AseFace {
                indices: [0, 1, 2],
                material_id: 0,
                ..AseFace::default()
            },
            AseFace {
                indices: [1, 2, 3],
                material_id: 1,
                ..AseFace::default()
            },
        ];
        doc.meshes.push(mesh);

        let scene = build_scene(&doc);
        // base material + two subs
        assert_eq!(scene.materials.len(), 3);
        assert_eq!(scene.meshes.len(), 2);
        assert_eq!(scene.meshes[0].name, "Split-0");
        assert_eq!(scene.meshes[1].name, "Split-1");
        assert_eq!(scene.meshes[0].material, 1);
        assert_eq!(scene.meshes[1].material, 2);
        // the node references both output meshes
        assert_eq!(scene.root.meshes, vec![0, 1]);
    }

    #[test]
    fn parent_names_resolve_into_a_tree() {
        let mut doc = Document::new(FORMAT_VERSION_ASE);
        let (_, mut child) = doc_with_triangle("Child");
        child.node.parent = Some("Parent".to_string());
        let (_, parent) = doc_with_triangle("Parent");
        doc.meshes.push(child);
        doc.meshes.push(parent);

        let scene = build_scene(&doc);
        assert_eq!(scene.root.name, "Parent");
        assert_eq!(scene.root.children.len(), 1);
        assert_eq!(scene.root.children[0].name, "Child");
    }

    #[test]
    fn unknown_parent_degrades_to_root_attachment() {
        let mut doc = Document::new(FORMAT_VERSION_ASE);
        let (_, mut mesh) = doc_with_triangle("Orphan");
        mesh.node.parent = Some("Missing".to_string());
        doc.meshes.push(mesh);

        let scene = build_scene(&doc);
        assert_eq!(scene.root.name, "Orphan");
    }

    #[test]
    fn node_transform_uses_the_parsed_rows() {
        let mut doc = Document::new(FORMAT_VERSION_ASE);
        let (_, mut mesh) = doc_with_triangle("Moved");
        mesh.node.transform[3] = Vec3::new(1.0, 2.0, 3.0);
        doc.meshes.push(mesh);

        let scene = build_scene(&doc);
        let p = scene.root.transform * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(p, Vec4::new(1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn target_light_becomes_a_spot_light() {
        let mut doc = Document::new(FORMAT_VERSION_ASE);
        let mut light = AseLight::new("Spot01");
        light.kind = AseLightKind::Target;
        light.angle = 30.0;
        light.falloff = 45.0;
        doc.lights.push(light);

        let scene = build_scene(&doc);
        let out = &scene.lights[0];
        assert_eq!(out.kind, LightKind::Spot);
        assert_eq!(out.name, "Spot01");
        assert!((out.inner_cone - 30f32.to_radians()).abs() < 1e-6);
        assert!((out.outer_cone - 45f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn bone_weights_follow_replicated_vertices() {
        let mut doc = Document::new(FORMAT_VERSION_ASE);
        let (_, mut mesh) = doc_with_triangle("Skinned");
        mesh.bones = vec!["Root".to_string()];
        mesh.bone_vertices = vec![
            BoneVertex {
                weights: vec![(0, 1.0)],
            },
            BoneVertex::default(),
            BoneVertex::default(),
        ];
        doc.meshes.push(mesh);

        let scene = build_scene(&doc);
        let bones = &scene.meshes[0].bones;
        assert_eq!(bones.len(), 1);
        // source vertex 0 is replicated to output vertex 0 only
        assert_eq!(bones[0].weights.len(), 1);
        assert_eq!(bones[0].weights[0].vertex, 0);
    }
}
