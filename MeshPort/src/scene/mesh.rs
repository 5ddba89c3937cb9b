//! Mesh, face and bone types of the universal scene graph

use glam::{Vec2, Vec3, Vec4};

/// Coarse primitive categories present in a mesh, as a bitmask.
///
/// The exact topology sub-mode (strip, fan, loop) is resolved into faces
/// during assembly; only the coarse category survives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimitiveKinds(u32);

impl PrimitiveKinds {
    pub const POINT: PrimitiveKinds = PrimitiveKinds(0x1);
    pub const LINE: PrimitiveKinds = PrimitiveKinds(0x2);
    pub const TRIANGLE: PrimitiveKinds = PrimitiveKinds(0x4);

    pub fn insert(&mut self, other: PrimitiveKinds) {
        self.0 |= other.0;
    }

    pub fn contains(self, other: PrimitiveKinds) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// One face: between one (point) and three (triangle) vertex indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    indices: [u32; 3],
    len: u8,
}

impl Face {
    pub fn point(a: u32) -> Self {
        Face { indices: [a, 0, 0], len: 1 }
    }

    pub fn line(a: u32, b: u32) -> Self {
        Face { indices: [a, b, 0], len: 2 }
    }

    pub fn triangle(a: u32, b: u32, c: u32) -> Self {
        Face { indices: [a, b, c], len: 3 }
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices[..self.len as usize]
    }
}

/// One vertex influenced by a bone, with its weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    pub vertex: u32,
    pub weight: f32,
}

/// A bone referenced by a skinned mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub weights: Vec<VertexWeight>,
}

/// One output mesh.
///
/// A logical source mesh with several primitives expands into several of
/// these, one per primitive; sub-material splits of block-parsed meshes do
/// the same.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// Per-vertex normals. May carry unnormalized sums when the source
    /// format accumulates face and vertex contributions.
    pub normals: Option<Vec<Vec3>>,
    /// Texture coordinate channels, each parallel to `positions`.
    pub texcoords: Vec<Vec<Vec2>>,
    /// Per-vertex colors, parallel to `positions` when present.
    pub colors: Option<Vec<Vec4>>,
    pub faces: Vec<Face>,
    pub kinds: PrimitiveKinds,
    /// Index into [`super::Scene::materials`].
    pub material: usize,
    pub bones: Vec<Bone>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Mesh {
            name: name.into(),
            ..Mesh::default()
        }
    }

    /// True when every face index is resolvable against the vertex array.
    pub fn faces_in_bounds(&self) -> bool {
        let n = self.positions.len() as u32;
        self.faces
            .iter()
            .all(|f| f.indices().iter().all(|&i| i < n))
    }
}
