//! Intermediate document model produced by the block parser
//!
//! Mutable while the parser runs, then handed read-only to the scene
//! build. Parent links are name references resolved in a second pass
//! once every node exists; nothing here points into the node arena.

use glam::{Quat, Vec3, Vec4};

use crate::scene::material::ShadingModel;

/// Texture coordinate channels a mesh may carry.
pub const MAX_UV_CHANNELS: usize = 8;

/// File format version meaning "current" ASE; older versions are the ASC
/// flavor with a different skinning block.
pub const FORMAT_VERSION_ASE: u32 = 200;

/// Default hint for old ASC files without a version keyword.
pub const FORMAT_VERSION_ASC: u32 = 110;

/// One keyframed animation channel set of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackKind {
    #[default]
    Track,
    Bezier,
    Tcb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorKey {
    pub time: f64,
    pub value: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuatKey {
    pub time: f64,
    pub value: Quat,
}

/// Keyframe tracks of one animation channel (node or node target).
#[derive(Debug, Clone, Default)]
pub struct Animation {
    pub position_kind: TrackKind,
    pub rotation_kind: TrackKind,
    pub scaling_kind: TrackKind,
    pub positions: Vec<VectorKey>,
    pub rotations: Vec<QuatKey>,
    pub scalings: Vec<VectorKey>,
}

impl Animation {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.rotations.is_empty() && self.scalings.is_empty()
    }
}

/// Per-axis transform inheritance flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InheritFlags {
    pub position: [bool; 3],
    pub rotation: [bool; 3],
    pub scaling: [bool; 3],
}

impl Default for InheritFlags {
    fn default() -> Self {
        InheritFlags {
            position: [true; 3],
            rotation: [true; 3],
            scaling: [true; 3],
        }
    }
}

/// State shared by every node kind: identity, parent reference, 4×3
/// transform and animation channels.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub name: String,
    /// Name of the parent node; resolved after parsing, not an ownership
    /// link.
    pub parent: Option<String>,
    /// Rows 0-2: orthogonal basis vectors. Row 3: translation.
    pub transform: [Vec3; 4],
    pub inherit: InheritFlags,
    pub anim: Animation,
    /// Animation of the `.Target` channel for target cameras/spot lights.
    pub target_anim: Animation,
    pub target_position: Vec3,
}

impl NodeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        NodeInfo {
            name: name.into(),
            parent: None,
            transform: [Vec3::X, Vec3::Y, Vec3::Z, Vec3::ZERO],
            inherit: InheritFlags::default(),
            anim: Animation::default(),
            target_anim: Animation::default(),
            target_position: Vec3::ZERO,
        }
    }
}

/// One texture map slot of a material.
#[derive(Debug, Clone)]
pub struct TextureMap {
    /// Path to the bitmap; empty when the map is unused.
    pub path: String,
    pub offset_u: f32,
    pub offset_v: f32,
    pub scale_u: f32,
    pub scale_v: f32,
    pub rotation: f32,
    pub blend: f32,
}

impl Default for TextureMap {
    fn default() -> Self {
        TextureMap {
            path: String::new(),
            offset_u: 0.0,
            offset_v: 0.0,
            scale_u: 1.0,
            scale_v: 1.0,
            rotation: 0.0,
            blend: 1.0,
        }
    }
}

/// A material, possibly carrying an ordered sub-material list for
/// multi-material assignment.
#[derive(Debug, Clone)]
pub struct AseMaterial {
    pub name: String,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub emissive: Vec3,
    pub shading: ShadingModel,
    /// Opacity; the file stores transparency, converted on parse.
    pub opacity: f32,
    pub specular_exponent: f32,
    pub shininess_strength: f32,
    pub two_sided: bool,
    pub tex_diffuse: TextureMap,
    pub tex_ambient: TextureMap,
    pub tex_specular: TextureMap,
    pub tex_opacity: TextureMap,
    pub tex_emissive: TextureMap,
    pub tex_bump: TextureMap,
    pub tex_shininess: TextureMap,
    pub sub_materials: Vec<AseMaterial>,
}

impl AseMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        AseMaterial {
            name: name.into(),
            ambient: Vec3::ZERO,
            diffuse: Vec3::splat(0.6),
            specular: Vec3::ZERO,
            emissive: Vec3::ZERO,
            shading: ShadingModel::Gouraud,
            opacity: 1.0,
            specular_exponent: 0.0,
            shininess_strength: 1.0,
            two_sided: false,
            tex_diffuse: TextureMap::default(),
            tex_ambient: TextureMap::default(),
            tex_specular: TextureMap::default(),
            tex_opacity: TextureMap::default(),
            tex_emissive: TextureMap::default(),
            tex_bump: TextureMap::default(),
            tex_shininess: TextureMap::default(),
            sub_materials: Vec::new(),
        }
    }
}

/// One triangular face with per-channel UV indices, color indices, a
/// smoothing-group bitmask and a sub-material id.
#[derive(Debug, Clone)]
pub struct AseFace {
    pub indices: [u32; 3],
    pub uv_indices: [[u32; 3]; MAX_UV_CHANNELS],
    pub color_indices: [u32; 3],
    /// Bit `n` set = face belongs to smoothing group `n` (0-31).
    pub smoothing_mask: u32,
    pub material_id: u32,
}

impl Default for AseFace {
    fn default() -> Self {
        AseFace {
            indices: [0; 3],
            uv_indices: [[0; 3]; MAX_UV_CHANNELS],
            color_indices: [0; 3],
            smoothing_mask: 0,
            material_id: 0,
        }
    }
}

/// Per-vertex bone weights; bone indices point into [`AseMesh::bones`].
#[derive(Debug, Clone, Default)]
pub struct BoneVertex {
    pub weights: Vec<(u32, f32)>,
}

/// A geometry node.
#[derive(Debug, Clone)]
pub struct AseMesh {
    pub node: NodeInfo,
    pub positions: Vec<Vec3>,
    pub faces: Vec<AseFace>,
    /// Texture coordinates per channel; unused channels stay empty.
    pub texcoords: [Vec<Vec3>; MAX_UV_CHANNELS],
    /// Components used per channel (2 for UV, 3 when any W is non-zero).
    pub uv_components: [u32; MAX_UV_CHANNELS],
    pub colors: Vec<Vec4>,
    /// Accumulated per-face-vertex normals, 3 entries per face, summed
    /// without renormalization.
    pub normals: Vec<Vec3>,
    pub bones: Vec<String>,
    pub bone_vertices: Vec<BoneVertex>,
    /// Index into the document's material list.
    pub material_index: u32,
}

impl AseMesh {
    pub fn new(name: impl Into<String>) -> Self {
        AseMesh {
            node: NodeInfo::new(name),
            positions: Vec::new(),
            faces: Vec::new(),
            texcoords: Default::default(),
            uv_components: [2; MAX_UV_CHANNELS],
            colors: Vec::new(),
            normals: Vec::new(),
            bones: Vec::new(),
            bone_vertices: Vec::new(),
            material_index: 0,
        }
    }
}

/// Kind of an ASE light source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AseLightKind {
    #[default]
    Omni,
    Target,
    Free,
    Directional,
}

/// A light node.
#[derive(Debug, Clone)]
pub struct AseLight {
    pub node: NodeInfo,
    pub kind: AseLightKind,
    pub color: Vec3,
    pub intensity: f32,
    /// Hotspot angle in degrees.
    pub angle: f32,
    pub falloff: f32,
}

impl AseLight {
    pub fn new(name: impl Into<String>) -> Self {
        AseLight {
            node: NodeInfo::new(name),
            kind: AseLightKind::default(),
            color: Vec3::ONE,
            intensity: 1.0,
            angle: 45.0,
            falloff: 0.0,
        }
    }
}

/// Kind of an ASE camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AseCameraKind {
    #[default]
    Free,
    Target,
}

/// A camera node.
#[derive(Debug, Clone)]
pub struct AseCamera {
    pub node: NodeInfo,
    pub kind: AseCameraKind,
    pub near: f32,
    pub far: f32,
    /// Field of view in radians, as stored in the file.
    pub fov: f32,
}

impl AseCamera {
    pub fn new(name: impl Into<String>) -> Self {
        AseCamera {
            node: NodeInfo::new(name),
            kind: AseCameraKind::default(),
            near: 0.1,
            far: 1000.0,
            fov: 0.75,
        }
    }
}

/// A helper object: a transform-only node in the hierarchy.
#[derive(Debug, Clone)]
pub struct AseDummy {
    pub node: NodeInfo,
}

impl Default for AseDummy {
    fn default() -> Self {
        AseDummy {
            node: NodeInfo::new("DUMMY"),
        }
    }
}

/// The parsed document: scene-level scalars plus ordered node and
/// material collections.
#[derive(Debug, Clone)]
pub struct Document {
    pub format_version: u32,
    pub background_color: Option<Vec3>,
    pub ambient_color: Option<Vec3>,
    pub first_frame: u32,
    pub last_frame: u32,
    pub frame_speed: u32,
    pub ticks_per_frame: u32,
    pub materials: Vec<AseMaterial>,
    pub meshes: Vec<AseMesh>,
    pub dummies: Vec<AseDummy>,
    pub lights: Vec<AseLight>,
    pub cameras: Vec<AseCamera>,
}

impl Document {
    pub fn new(format_version: u32) -> Self {
        Document {
            format_version,
            background_color: None,
            ambient_color: None,
            first_frame: 0,
            last_frame: 0,
            frame_speed: 30,
            ticks_per_frame: 1,
            materials: Vec::new(),
            meshes: Vec::new(),
            dummies: Vec::new(),
            lights: Vec::new(),
            cameras: Vec::new(),
        }
    }

    /// True for the old ASC flavor with the soft-skin weight block.
    pub fn is_old_format(&self) -> bool {
        self.format_version < FORMAT_VERSION_ASE
    }
}
