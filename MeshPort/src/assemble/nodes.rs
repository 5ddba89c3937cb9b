//! Node tree construction and logical-mesh index translation

use tracing::warn;

use crate::asset::Asset;
use crate::scene::{Node, Scene};

/// Builds the monotonic offset table mapping logical mesh index to the
/// first output-mesh index; `meshCount + 1` entries, so logical mesh `k`
/// owns output meshes `offsets[k]..offsets[k + 1]`.
pub fn mesh_offsets(asset: &Asset) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(asset.meshes.len() + 1);
    let mut k = 0;
    for mesh in &asset.meshes {
        offsets.push(k);
        k += mesh.primitives.len();
    }
    offsets.push(k);
    offsets
}

/// Builds the scene's node tree from the asset's default scene roots.
///
/// With a single unparented root that node becomes the scene root; with
/// several, a synthetic `"ROOT"` node adopts them all.
pub fn build_node_tree(asset: &Asset, scene: &mut Scene, offsets: &[usize]) {
    let mut visiting = vec![false; asset.nodes.len()];

    let mut roots: Vec<Node> = asset
        .scene_roots
        .iter()
        .filter_map(|&idx| build_node(asset, scene, offsets, idx, &mut visiting))
        .collect();

    if roots.len() == 1 {
        scene.root = roots.remove(0);
    } else if !roots.is_empty() {
        scene.root = Node::new("ROOT");
        scene.root.children = roots;
    }
}

fn build_node(
    asset: &Asset,
    scene: &mut Scene,
    offsets: &[usize],
    index: usize,
    visiting: &mut [bool],
) -> Option<Node> {
    let Some(asset_node) = asset.nodes.get(index) else {
        warn!("node index {index} does not exist in the asset, skipping");
        return None;
    };
    if visiting[index] {
        warn!("node graph contains a cycle at '{}', skipping the edge", asset_node.name);
        return None;
    }
    visiting[index] = true;

    let mut node = Node::new(asset_node.name.clone());
    node.transform = asset_node.transform.to_matrix();

    for &child in &asset_node.children {
        if let Some(built) = build_node(asset, scene, offsets, child, visiting) {
            node.children.push(built);
        }
    }

    // translate logical mesh references into output-mesh index ranges
    for &logical in &asset_node.meshes {
        if logical + 1 >= offsets.len() {
            warn!(
                "node '{}' references logical mesh {logical} out of range, skipping",
                node.name
            );
            continue;
        }
        node.meshes.extend(offsets[logical]..offsets[logical + 1]);
    }

    // cameras and lights are bound to their node by name
    if let Some(cam) = asset_node.camera {
        if let Some(camera) = scene.cameras.get_mut(cam) {
            camera.name.clone_from(&node.name);
        } else {
            warn!("node '{}' references camera {cam} out of range", node.name);
        }
    }
    if let Some(light) = asset_node.light {
        if let Some(light) = scene.lights.get_mut(light) {
            light.name.clone_from(&node.name);
        } else {
            warn!("node '{}' references a light out of range", node.name);
        }
    }

    visiting[index] = false;
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetMesh, AssetNode, Primitive};

    fn asset_with_primitive_counts(counts: &[usize]) -> Asset {
        let mut asset = Asset::new();
        for (i, &n) in counts.iter().enumerate() {
            asset.meshes.push(AssetMesh {
                name: format!("mesh{i}"),
                primitives: vec![Primitive::default(); n],
                compression: None,
            });
        }
        asset
    }

    #[test]
    fn offset_table_counts_primitives() {
        let asset = asset_with_primitive_counts(&[3, 1]);
        assert_eq!(mesh_offsets(&asset), vec![0, 3, 4]);
    }

    #[test]
    fn node_referencing_second_logical_mesh_gets_index_three() {
        let mut asset = asset_with_primitive_counts(&[3, 1]);
        asset.nodes.push(AssetNode {
            name: "n".to_string(),
            meshes: vec![1],
            ..AssetNode::default()
        });
        asset.scene_roots.push(0);

        let offsets = mesh_offsets(&asset);
        let mut scene = Scene::new();
        build_node_tree(&asset, &mut scene, &offsets);
        assert_eq!(scene.root.name, "n");
        assert_eq!(scene.root.meshes, vec![3]);
    }

    #[test]
    fn multiple_roots_get_a_synthetic_parent() {
        let mut asset = asset_with_primitive_counts(&[]);
        for name in ["a", "b"] {
            asset.nodes.push(AssetNode {
                name: name.to_string(),
                ..AssetNode::default()
            });
        }
        asset.scene_roots.extend([0, 1]);

        let mut scene = Scene::new();
        build_node_tree(&asset, &mut scene, &mesh_offsets(&asset));
        assert_eq!(scene.root.name, "ROOT");
        assert_eq!(scene.root.children.len(), 2);
    }

    #[test]
    fn cyclic_node_graph_does_not_recurse_forever() {
        let mut asset = asset_with_primitive_counts(&[]);
        asset.nodes.push(AssetNode {
            name: "a".to_string(),
            children: vec![1],
            ..AssetNode::default()
        });
        asset.nodes.push(AssetNode {
            name: "b".to_string(),
            children: vec![0],
            ..AssetNode::default()
        });
        asset.scene_roots.push(0);

        let mut scene = Scene::new();
        build_node_tree(&asset, &mut scene, &mesh_offsets(&asset));
        assert_eq!(scene.root.name, "a");
        assert_eq!(scene.root.children.len(), 1);
        assert!(scene.root.children[0].children.is_empty());
    }
}
