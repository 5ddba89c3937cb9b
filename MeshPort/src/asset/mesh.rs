//! Mesh and primitive types of the structured asset model

use glam::{Vec2, Vec3};

/// Primitive topology of one draw-call-equivalent unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Default for TopologyMode {
    fn default() -> Self {
        TopologyMode::Triangles
    }
}

/// One primitive: attribute set + topology + optional indices + material.
#[derive(Debug, Clone, Default)]
pub struct Primitive {
    pub mode: TopologyMode,
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    /// Texture coordinate channels, each parallel to `positions`, still in
    /// the source's bottom-origin convention.
    pub texcoords: Vec<Vec<Vec2>>,
    /// Explicit index buffer; `None` means indices are implied by the
    /// vertex count.
    pub indices: Option<Vec<u32>>,
    /// Index into [`super::Asset::materials`].
    pub material: Option<usize>,
}

/// A logical mesh: an ordered list of primitives sharing a name.
///
/// Each primitive expands to one output mesh during assembly.
#[derive(Debug, Clone, Default)]
pub struct AssetMesh {
    pub name: String,
    pub primitives: Vec<Primitive>,
    /// Name of a compression extension applied to this mesh, when the
    /// source declared one. The engine implements none of them.
    pub compression: Option<String>,
}
