//! The universal scene graph
//!
//! Every importer produces this model: flat, 0-indexed arrays of meshes,
//! materials, cameras, lights and embedded textures, plus a rooted node
//! tree whose nodes reference the arrays by index. The graph owns all of
//! its data; the importer's intermediate state is discardable once the
//! graph exists.

pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod texture;

pub use camera::Camera;
pub use light::{Light, LightKind};
pub use material::{Material, MaterialProperty, ShadingModel};
pub use mesh::{Bone, Face, Mesh, PrimitiveKinds, VertexWeight};
pub use texture::EmbeddedTexture;

use glam::Mat4;

/// Source-file metadata carried through the import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneMetadata {
    /// Format version string of the source, if it declared one.
    pub format_version: Option<String>,
    /// Tool that generated the source file.
    pub generator: Option<String>,
    /// Copyright note from the source file.
    pub copyright: Option<String>,
}

/// A node in the scene hierarchy.
///
/// Nodes own their children; meshes are referenced by index into
/// [`Scene::meshes`]. Cameras and lights are bound to nodes by name after
/// assembly rather than by index.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    /// Local transform of this node.
    pub transform: Mat4,
    pub children: Vec<Node>,
    /// Indices into [`Scene::meshes`].
    pub meshes: Vec<usize>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            transform: Mat4::IDENTITY,
            children: Vec::new(),
            meshes: Vec::new(),
        }
    }

    /// Depth-first search for a node by name, including `self`.
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

/// The assembled output of one import call.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Root of the node tree. A synthetic `"ROOT"` node when the source
    /// had multiple unparented roots.
    pub root: Node,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub cameras: Vec<Camera>,
    pub lights: Vec<Light>,
    /// Textures whose bytes were carried inside the source file.
    pub textures: Vec<EmbeddedTexture>,
    /// Set when zero meshes were produced; downstream tools should treat
    /// the result as metadata-only.
    pub incomplete: bool,
    pub metadata: SceneMetadata,
}

impl Scene {
    pub fn new() -> Self {
        Scene {
            root: Node::new("ROOT"),
            meshes: Vec::new(),
            materials: Vec::new(),
            cameras: Vec::new(),
            lights: Vec::new(),
            textures: Vec::new(),
            incomplete: false,
            metadata: SceneMetadata::default(),
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
