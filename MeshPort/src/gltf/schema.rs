//! Serde structs for the JSON subset of the asset format
//!
//! Entities are dictionaries keyed by id string; cross-references are id
//! strings resolved into indices while building the asset model. Only
//! the grammar the assembly engine consumes is modelled.

use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct Root {
    /// The top-level validity marker; assembly refuses assets without it.
    pub asset: Option<AssetInfo>,
    /// Id of the designated default scene.
    pub scene: Option<String>,
    #[serde(default)]
    pub scenes: IndexMap<String, SceneDef>,
    #[serde(default)]
    pub nodes: IndexMap<String, NodeDef>,
    #[serde(default)]
    pub meshes: IndexMap<String, MeshDef>,
    #[serde(default)]
    pub accessors: IndexMap<String, AccessorDef>,
    #[serde(default, rename = "bufferViews")]
    pub buffer_views: IndexMap<String, BufferViewDef>,
    #[serde(default)]
    pub buffers: IndexMap<String, BufferDef>,
    #[serde(default)]
    pub images: IndexMap<String, ImageDef>,
    #[serde(default)]
    pub textures: IndexMap<String, TextureDef>,
    #[serde(default)]
    pub materials: IndexMap<String, MaterialDef>,
    #[serde(default)]
    pub cameras: IndexMap<String, CameraDef>,
    #[serde(default)]
    pub lights: IndexMap<String, LightDef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssetInfo {
    pub version: Option<String>,
    pub generator: Option<String>,
    pub copyright: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SceneDef {
    #[serde(default)]
    pub nodes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeDef {
    pub name: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub meshes: Vec<String>,
    pub camera: Option<String>,
    pub light: Option<String>,
    /// Column-major 4x4 matrix; wins over the TRS components.
    pub matrix: Option<[f32; 16]>,
    pub translation: Option<[f32; 3]>,
    /// Unit quaternion as x, y, z, w.
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MeshDef {
    pub name: Option<String>,
    #[serde(default)]
    pub primitives: Vec<PrimitiveDef>,
    #[serde(default)]
    pub extensions: IndexMap<String, serde_json::Value>,
}

pub(crate) fn default_primitive_mode() -> u32 {
    4 // triangles
}

#[derive(Debug, Deserialize)]
pub(crate) struct PrimitiveDef {
    /// Attribute semantic (POSITION, NORMAL, TEXCOORD_n) to accessor id.
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    pub indices: Option<String>,
    pub material: Option<String>,
    #[serde(default = "default_primitive_mode")]
    pub mode: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccessorDef {
    pub buffer_view: String,
    #[serde(default)]
    pub byte_offset: usize,
    #[serde(default)]
    pub byte_stride: usize,
    pub component_type: u32,
    pub count: usize,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BufferViewDef {
    pub buffer: String,
    #[serde(default)]
    pub byte_offset: usize,
    #[serde(default)]
    pub byte_length: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BufferDef {
    pub uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageDef {
    pub name: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextureDef {
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MaterialDef {
    pub name: Option<String>,
    /// Slot name to either an RGBA array or a texture id string.
    #[serde(default)]
    pub values: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CameraDef {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub perspective: Option<PerspectiveDef>,
    pub orthographic: Option<OrthographicDef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PerspectiveDef {
    #[serde(default)]
    pub aspect_ratio: f32,
    pub yfov: f32,
    #[serde(default = "default_znear")]
    pub znear: f32,
    #[serde(default = "default_zfar")]
    pub zfar: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrthographicDef {
    #[serde(default)]
    pub xmag: f32,
    #[serde(default)]
    pub ymag: f32,
    #[serde(default = "default_znear")]
    pub znear: f32,
    #[serde(default = "default_zfar")]
    pub zfar: f32,
}

pub(crate) fn default_znear() -> f32 {
    0.1
}

pub(crate) fn default_zfar() -> f32 {
    1000.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LightDef {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub color: Option<[f32; 3]>,
    #[serde(default = "default_falloff_angle")]
    pub falloff_angle: f32,
    #[serde(default)]
    pub falloff_exponent: f32,
    #[serde(default = "default_constant_attenuation")]
    pub constant_attenuation: f32,
    #[serde(default)]
    pub linear_attenuation: f32,
    #[serde(default)]
    pub quadratic_attenuation: f32,
}

pub(crate) fn default_falloff_angle() -> f32 {
    std::f32::consts::PI
}

pub(crate) fn default_constant_attenuation() -> f32 {
    1.0
}
