//! Node graph of the structured asset model

use glam::{Mat4, Quat, Vec3};

/// Transform of an asset node: an explicit matrix, or independently
/// optional translation/rotation/scale components.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeTransform {
    Matrix(Mat4),
    Trs {
        translation: Option<Vec3>,
        rotation: Option<Quat>,
        scale: Option<Vec3>,
    },
}

impl NodeTransform {
    /// Composes the node's local matrix.
    ///
    /// An explicit matrix is used verbatim. TRS components compose in the
    /// fixed order translation, then scale, then rotation outermost:
    /// `M = R * (S * (T * I))`.
    pub fn to_matrix(&self) -> Mat4 {
        match *self {
            NodeTransform::Matrix(m) => m,
            NodeTransform::Trs {
                translation,
                rotation,
                scale,
            } => {
                let mut matrix = Mat4::IDENTITY;
                if let Some(t) = translation {
                    matrix = Mat4::from_translation(t) * matrix;
                }
                if let Some(s) = scale {
                    matrix = Mat4::from_scale(s) * matrix;
                }
                if let Some(r) = rotation {
                    matrix = Mat4::from_quat(r) * matrix;
                }
                matrix
            }
        }
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        NodeTransform::Trs {
            translation: None,
            rotation: None,
            scale: None,
        }
    }
}

/// One node of the asset's parent-to-children graph.
#[derive(Debug, Clone, Default)]
pub struct AssetNode {
    pub name: String,
    /// Child node indices into [`super::Asset::nodes`].
    pub children: Vec<usize>,
    /// Logical mesh indices into [`super::Asset::meshes`].
    pub meshes: Vec<usize>,
    pub camera: Option<usize>,
    pub light: Option<usize>,
    pub transform: NodeTransform,
}
