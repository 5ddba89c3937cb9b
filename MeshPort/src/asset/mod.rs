//! The structured asset model
//!
//! An already-decoded, randomly-indexable representation of one source
//! file's entities, as produced by a format-specific front end (see
//! [`crate::gltf`]). The scene assembly engine consumes this model
//! read-only, apart from moving embedded image payloads out exactly once.

pub mod image;
pub mod material;
pub mod mesh;
pub mod node;

pub use image::Image;
pub use material::{AssetMaterial, ColorOrTexture};
pub use mesh::{AssetMesh, Primitive, TopologyMode};
pub use node::{AssetNode, NodeTransform};

use glam::Vec3;

/// Camera projection of an asset camera.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetCamera {
    Perspective {
        /// Width / height; 0 when unspecified.
        aspect: f32,
        /// Vertical field of view in radians.
        yfov: f32,
        znear: f32,
        zfar: f32,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        znear: f32,
        zfar: f32,
    },
}

/// Kind of an asset light.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssetLightKind {
    #[default]
    Point,
    Directional,
    Spot,
    Ambient,
}

/// A light in the asset model.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetLight {
    pub kind: AssetLightKind,
    pub color: Vec3,
    /// Outer cone angle in radians.
    pub falloff_angle: f32,
    pub falloff_exponent: f32,
    pub constant_attenuation: f32,
    pub linear_attenuation: f32,
    pub quadratic_attenuation: f32,
}

impl Default for AssetLight {
    fn default() -> Self {
        AssetLight {
            kind: AssetLightKind::default(),
            color: Vec3::ONE,
            falloff_angle: std::f32::consts::PI,
            falloff_exponent: 0.0,
            constant_attenuation: 1.0,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
        }
    }
}

/// A decoded asset: size-known collections addressed by `usize` handles.
#[derive(Debug, Default)]
pub struct Asset {
    /// Whether the source carried its top-level validity marker. Assembly
    /// refuses assets without it.
    pub marker_seen: bool,
    pub meshes: Vec<AssetMesh>,
    pub materials: Vec<AssetMaterial>,
    pub images: Vec<Image>,
    pub cameras: Vec<AssetCamera>,
    pub lights: Vec<AssetLight>,
    /// The node graph; parent-to-children edges by index.
    pub nodes: Vec<AssetNode>,
    /// Root node indices of the designated default scene.
    pub scene_roots: Vec<usize>,
    pub format_version: Option<String>,
    pub generator: Option<String>,
    pub copyright: Option<String>,
}

impl Asset {
    pub fn new() -> Self {
        Asset::default()
    }
}
