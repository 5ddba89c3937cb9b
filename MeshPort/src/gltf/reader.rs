//! Decoding of the JSON/binary asset document into the asset model
//!
//! Buffers come from base64 data URIs or the binary container body;
//! accessors are resolved through buffer views into typed arrays. All
//! id-to-id references are translated into `usize` handles here so the
//! assembly engine never sees a string id.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use byteorder::{LittleEndian, ReadBytesExt};
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use tracing::warn;

use super::schema::{MaterialDef, Root};
use crate::asset::{
    Asset, AssetCamera, AssetLight, AssetLightKind, AssetMaterial, AssetMesh, AssetNode,
    ColorOrTexture, Image, NodeTransform, Primitive, TopologyMode,
};
use crate::error::{Error, Result};

/// Magic prefix of the binary container flavour.
pub(crate) const CONTAINER_MAGIC: &[u8; 4] = b"glTF";

/// Buffer ids reserved for the binary container body.
const BODY_BUFFER_IDS: [&str; 2] = ["binary_glTF", "KHR_binary_glTF"];

/// Decodes a JSON or binary-container asset into the asset model.
///
/// # Errors
/// Returns an error on a truncated container, malformed JSON, or an
/// accessor addressing bytes outside its buffer view.
pub fn decode(data: &[u8]) -> Result<Asset> {
    let (json, body) = if data.starts_with(CONTAINER_MAGIC) {
        split_container(data)?
    } else {
        (data, &[][..])
    };
    let root: Root = serde_json::from_slice(json)?;
    build_asset(&root, body)
}

/// Splits the binary container into its scene-JSON chunk and body.
///
/// Layout: magic, u32 version, u32 total length, u32 content length,
/// u32 content format (0 = JSON), then content and body.
fn split_container(data: &[u8]) -> Result<(&[u8], &[u8])> {
    let mut cursor = Cursor::new(data);
    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic)?;
    if &magic != CONTAINER_MAGIC {
        return Err(Error::InvalidContainerMagic(magic));
    }
    let _version = cursor.read_u32::<LittleEndian>()?;
    let total_length = cursor.read_u32::<LittleEndian>()? as usize;
    let content_length = cursor.read_u32::<LittleEndian>()? as usize;
    let content_format = cursor.read_u32::<LittleEndian>()?;
    if content_format != 0 {
        return Err(Error::InvalidFormat(format!(
            "unknown scene content format {content_format}"
        )));
    }

    const HEADER_LEN: usize = 20;
    let content_end = HEADER_LEN
        .checked_add(content_length)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| Error::TruncatedContainer {
            message: format!("scene content of {content_length} bytes extends past the input"),
        })?;
    let body_end = total_length.clamp(content_end, data.len());
    Ok((&data[HEADER_LEN..content_end], &data[content_end..body_end]))
}

/// Decodes a `data:<mime>;base64,<payload>` URI.
fn decode_data_uri(uri: &str, entity: &str) -> Result<(Option<String>, Vec<u8>)> {
    let malformed = || Error::MalformedDataUri {
        entity: entity.to_string(),
    };
    let rest = uri.strip_prefix("data:").ok_or_else(malformed)?;
    let (meta, payload) = rest.split_once(',').ok_or_else(malformed)?;
    let meta = meta.strip_suffix(";base64").ok_or_else(malformed)?;
    let mime = if meta.is_empty() {
        None
    } else {
        Some(meta.to_string())
    };
    Ok((mime, BASE64.decode(payload)?))
}

fn load_buffers(root: &Root, body: &[u8]) -> Result<HashMap<String, Vec<u8>>> {
    let mut buffers = HashMap::with_capacity(root.buffers.len());
    for (id, def) in &root.buffers {
        let bytes = if BODY_BUFFER_IDS.contains(&id.as_str()) {
            body.to_vec()
        } else {
            match &def.uri {
                Some(uri) if uri.starts_with("data:") => decode_data_uri(uri, id)?.1,
                Some(uri) => {
                    // external buffer files are an IO concern the engine
                    // does not own
                    warn!("buffer '{id}' references external uri '{uri}', leaving it empty");
                    Vec::new()
                }
                None => body.to_vec(),
            }
        };
        buffers.insert(id.clone(), bytes);
    }
    Ok(buffers)
}

fn view_slice<'b>(
    root: &Root,
    buffers: &'b HashMap<String, Vec<u8>>,
    view_id: &str,
) -> Result<&'b [u8]> {
    let view = root
        .buffer_views
        .get(view_id)
        .ok_or_else(|| Error::DanglingReference {
            kind: "bufferView",
            id: view_id.to_string(),
        })?;
    let buffer = buffers
        .get(&view.buffer)
        .ok_or_else(|| Error::DanglingReference {
            kind: "buffer",
            id: view.buffer.clone(),
        })?;
    view.byte_offset
        .checked_add(view.byte_length)
        .and_then(|end| buffer.get(view.byte_offset..end))
        .ok_or_else(|| {
            Error::InvalidFormat(format!("buffer view '{view_id}' out of bounds of its buffer"))
        })
}

/// Typed contents of one accessor.
enum AccessorValues {
    Scalars(Vec<u32>),
    Vec2s(Vec<Vec2>),
    Vec3s(Vec<Vec3>),
}

fn component_size(component_type: u32) -> Option<usize> {
    match component_type {
        5120 | 5121 => Some(1), // i8 / u8
        5122 | 5123 => Some(2), // i16 / u16
        5125 | 5126 => Some(4), // u32 / f32
        _ => None,
    }
}

fn read_f32_component(bytes: &[u8], offset: usize, component_type: u32) -> f32 {
    match component_type {
        5120 => bytes[offset] as i8 as f32,
        5121 => f32::from(bytes[offset]),
        5122 => i16::from_le_bytes([bytes[offset], bytes[offset + 1]]) as f32,
        5123 => f32::from(u16::from_le_bytes([bytes[offset], bytes[offset + 1]])),
        5125 => u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ]) as f32,
        _ => f32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ]),
    }
}

fn read_index_component(bytes: &[u8], offset: usize, component_type: u32) -> u32 {
    match component_type {
        5120 | 5121 => u32::from(bytes[offset]),
        5122 | 5123 => u32::from(u16::from_le_bytes([bytes[offset], bytes[offset + 1]])),
        _ => read_f32_component(bytes, offset, component_type) as u32,
    }
}

fn read_accessor(
    root: &Root,
    buffers: &HashMap<String, Vec<u8>>,
    id: &str,
) -> Result<AccessorValues> {
    let def = root
        .accessors
        .get(id)
        .ok_or_else(|| Error::DanglingReference {
            kind: "accessor",
            id: id.to_string(),
        })?;
    let bytes = view_slice(root, buffers, &def.buffer_view)?;

    let comp_size = component_size(def.component_type).ok_or_else(|| {
        Error::InvalidFormat(format!(
            "accessor '{id}' has unknown component type {}",
            def.component_type
        ))
    })?;
    let components = match def.kind.as_str() {
        "SCALAR" => 1,
        "VEC2" => 2,
        "VEC3" => 3,
        _ => {
            return Err(Error::InvalidFormat(format!(
                "accessor '{id}' has unsupported type {}",
                def.kind
            )));
        }
    };
    let packed = comp_size * components;
    let stride = if def.byte_stride == 0 {
        packed
    } else {
        def.byte_stride
    };
    let needed = if def.count == 0 {
        def.byte_offset
    } else {
        def.byte_offset + (def.count - 1) * stride + packed
    };
    if needed > bytes.len() {
        return Err(Error::AccessorOutOfBounds {
            id: id.to_string(),
            needed,
            available: bytes.len(),
        });
    }

    let base = def.byte_offset;
    let ct = def.component_type;
    Ok(match components {
        1 => AccessorValues::Scalars(
            (0..def.count)
                .map(|i| read_index_component(bytes, base + i * stride, ct))
                .collect(),
        ),
        2 => AccessorValues::Vec2s(
            (0..def.count)
                .map(|i| {
                    let at = base + i * stride;
                    Vec2::new(
                        read_f32_component(bytes, at, ct),
                        read_f32_component(bytes, at + comp_size, ct),
                    )
                })
                .collect(),
        ),
        _ => AccessorValues::Vec3s(
            (0..def.count)
                .map(|i| {
                    let at = base + i * stride;
                    Vec3::new(
                        read_f32_component(bytes, at, ct),
                        read_f32_component(bytes, at + comp_size, ct),
                        read_f32_component(bytes, at + 2 * comp_size, ct),
                    )
                })
                .collect(),
        ),
    })
}

fn topology_mode(mode: u32, mesh_id: &str) -> TopologyMode {
    match mode {
        0 => TopologyMode::Points,
        1 => TopologyMode::Lines,
        2 => TopologyMode::LineLoop,
        3 => TopologyMode::LineStrip,
        4 => TopologyMode::Triangles,
        5 => TopologyMode::TriangleStrip,
        6 => TopologyMode::TriangleFan,
        other => {
            warn!("mesh '{mesh_id}': unknown primitive mode {other}, assuming triangles");
            TopologyMode::Triangles
        }
    }
}

fn color_value(value: &serde_json::Value) -> Option<Vec4> {
    let arr = value.as_array()?;
    let mut rgba = [0.0f32, 0.0, 0.0, 1.0];
    for (slot, v) in rgba.iter_mut().zip(arr) {
        *slot = v.as_f64()? as f32;
    }
    Some(Vec4::from_array(rgba))
}

fn material_slot(root: &Root, def: &MaterialDef, slot: &str, mat_id: &str) -> ColorOrTexture {
    let Some(value) = def.values.get(slot) else {
        return ColorOrTexture::default();
    };
    match value {
        serde_json::Value::String(texture_id) => {
            let image = root
                .textures
                .get(texture_id)
                .and_then(|t| t.source.as_ref())
                .and_then(|source| root.images.get_index_of(source));
            match image {
                Some(index) => ColorOrTexture::texture(index),
                None => {
                    warn!("material '{mat_id}': texture '{texture_id}' does not resolve to an image");
                    ColorOrTexture::default()
                }
            }
        }
        other => match color_value(other) {
            Some(color) => ColorOrTexture::color(color),
            None => {
                warn!("material '{mat_id}': value '{slot}' is neither a color nor a texture id");
                ColorOrTexture::default()
            }
        },
    }
}

fn build_asset(root: &Root, body: &[u8]) -> Result<Asset> {
    let buffers = load_buffers(root, body)?;
    let mut asset = Asset::new();

    asset.marker_seen = root.asset.is_some();
    if let Some(info) = &root.asset {
        asset.format_version.clone_from(&info.version);
        asset.generator.clone_from(&info.generator);
        asset.copyright.clone_from(&info.copyright);
    }

    // images
    for (id, def) in &root.images {
        let name = def.name.clone().unwrap_or_else(|| id.clone());
        let image = match &def.uri {
            Some(uri) if uri.starts_with("data:") => {
                let (mime, data) = decode_data_uri(uri, id)?;
                Image::embedded(name, mime, data)
            }
            Some(uri) => Image::external(name, uri.clone()),
            None => {
                warn!("image '{id}' carries neither a payload nor a uri");
                Image::empty(name)
            }
        };
        asset.images.push(image);
    }

    // materials
    for (id, def) in &root.materials {
        let mut mat = AssetMaterial {
            name: def.name.clone().unwrap_or_else(|| id.clone()),
            ..AssetMaterial::default()
        };
        mat.ambient = material_slot(root, def, "ambient", id);
        mat.diffuse = material_slot(root, def, "diffuse", id);
        mat.specular = material_slot(root, def, "specular", id);
        mat.emission = material_slot(root, def, "emission", id);
        mat.double_sided = def
            .values
            .get("doubleSided")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        mat.transparency = def
            .values
            .get("transparency")
            .and_then(serde_json::Value::as_f64)
            .map(|v| v as f32);
        mat.shininess = def
            .values
            .get("shininess")
            .and_then(serde_json::Value::as_f64)
            .map(|v| v as f32);
        asset.materials.push(mat);
    }

    // meshes
    for (id, def) in &root.meshes {
        let mut mesh = AssetMesh {
            name: def.name.clone().unwrap_or_else(|| id.clone()),
            primitives: Vec::with_capacity(def.primitives.len()),
            compression: def.extensions.keys().next().cloned(),
        };
        for prim_def in &def.primitives {
            let mut prim = Primitive {
                mode: topology_mode(prim_def.mode, id),
                ..Primitive::default()
            };

            if let Some(accessor) = prim_def.attributes.get("POSITION") {
                match read_accessor(root, &buffers, accessor)? {
                    AccessorValues::Vec3s(values) => prim.positions = values,
                    _ => {
                        warn!("mesh '{id}': POSITION accessor is not VEC3, ignoring");
                    }
                }
            } else {
                warn!("mesh '{id}': primitive has no POSITION attribute");
            }
            if let Some(accessor) = prim_def.attributes.get("NORMAL") {
                if let AccessorValues::Vec3s(values) = read_accessor(root, &buffers, accessor)? {
                    prim.normals = Some(values);
                }
            }

            // TEXCOORD_0, TEXCOORD_1, ... in channel order
            let mut texcoord_keys: Vec<&String> = prim_def
                .attributes
                .keys()
                .filter(|k| k.starts_with("TEXCOORD"))
                .collect();
            texcoord_keys.sort();
            for key in texcoord_keys {
                match read_accessor(root, &buffers, &prim_def.attributes[key])? {
                    AccessorValues::Vec2s(values) => prim.texcoords.push(values),
                    AccessorValues::Vec3s(values) => prim
                        .texcoords
                        .push(values.into_iter().map(|v| Vec2::new(v.x, v.y)).collect()),
                    AccessorValues::Scalars(_) => {
                        warn!("mesh '{id}': texcoord accessor '{key}' is scalar, skipping channel");
                    }
                }
            }

            if let Some(accessor) = &prim_def.indices {
                match read_accessor(root, &buffers, accessor)? {
                    AccessorValues::Scalars(values) => prim.indices = Some(values),
                    _ => {
                        warn!("mesh '{id}': index accessor is not scalar, treating as unindexed");
                    }
                }
            }

            if let Some(material_id) = &prim_def.material {
                match root.materials.get_index_of(material_id) {
                    Some(index) => prim.material = Some(index),
                    None => warn!("mesh '{id}': unknown material '{material_id}'"),
                }
            }
            mesh.primitives.push(prim);
        }
        asset.meshes.push(mesh);
    }

    // cameras
    for (id, def) in &root.cameras {
        let camera = if def.kind.as_deref() == Some("orthographic") {
            let ortho = def.orthographic.as_ref();
            AssetCamera::Orthographic {
                xmag: ortho.map_or(1.0, |o| o.xmag),
                ymag: ortho.map_or(1.0, |o| o.ymag),
                znear: ortho.map_or(0.1, |o| o.znear),
                zfar: ortho.map_or(1000.0, |o| o.zfar),
            }
        } else {
            if def.kind.as_deref() != Some("perspective") {
                warn!("camera '{id}' has no projection type, assuming perspective");
            }
            let persp = def.perspective.as_ref();
            AssetCamera::Perspective {
                aspect: persp.map_or(0.0, |p| p.aspect_ratio),
                yfov: persp.map_or(std::f32::consts::FRAC_PI_4, |p| p.yfov),
                znear: persp.map_or(0.1, |p| p.znear),
                zfar: persp.map_or(1000.0, |p| p.zfar),
            }
        };
        asset.cameras.push(camera);
    }

    // lights
    for def in root.lights.values() {
        let kind = match def.kind.as_deref() {
            Some("directional") => AssetLightKind::Directional,
            Some("spot") => AssetLightKind::Spot,
            Some("ambient") => AssetLightKind::Ambient,
            _ => AssetLightKind::Point,
        };
        asset.lights.push(AssetLight {
            kind,
            color: def.color.map_or(Vec3::ONE, Vec3::from_array),
            falloff_angle: def.falloff_angle,
            falloff_exponent: def.falloff_exponent,
            constant_attenuation: def.constant_attenuation,
            linear_attenuation: def.linear_attenuation,
            quadratic_attenuation: def.quadratic_attenuation,
        });
    }

    // nodes; children and entity references become indices
    for (id, def) in &root.nodes {
        let mut node = AssetNode {
            name: def.name.clone().unwrap_or_else(|| id.clone()),
            ..AssetNode::default()
        };
        for child in &def.children {
            match root.nodes.get_index_of(child) {
                Some(index) => node.children.push(index),
                None => warn!("node '{id}': unknown child '{child}'"),
            }
        }
        for mesh in &def.meshes {
            match root.meshes.get_index_of(mesh) {
                Some(index) => node.meshes.push(index),
                None => warn!("node '{id}': unknown mesh '{mesh}'"),
            }
        }
        node.camera = def.camera.as_ref().and_then(|c| {
            let index = root.cameras.get_index_of(c);
            if index.is_none() {
                warn!("node '{id}': unknown camera '{c}'");
            }
            index
        });
        node.light = def.light.as_ref().and_then(|l| {
            let index = root.lights.get_index_of(l);
            if index.is_none() {
                warn!("node '{id}': unknown light '{l}'");
            }
            index
        });

        node.transform = if let Some(m) = def.matrix {
            NodeTransform::Matrix(Mat4::from_cols_array(&m))
        } else {
            NodeTransform::Trs {
                translation: def.translation.map(Vec3::from_array),
                rotation: def
                    .rotation
                    .map(|r| Quat::from_xyzw(r[0], r[1], r[2], r[3])),
                scale: def.scale.map(Vec3::from_array),
            }
        };
        asset.nodes.push(node);
    }

    // the designated default scene supplies the root set
    if let Some(scene_id) = &root.scene {
        match root.scenes.get(scene_id) {
            Some(scene) => {
                for node_id in &scene.nodes {
                    match root.nodes.get_index_of(node_id) {
                        Some(index) => asset.scene_roots.push(index),
                        None => warn!("scene '{scene_id}': unknown node '{node_id}'"),
                    }
                }
            }
            None => warn!("default scene '{scene_id}' does not exist"),
        }
    }

    Ok(asset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions_uri(points: &[[f32; 3]]) -> (String, usize) {
        let mut bytes = Vec::new();
        for p in points {
            for c in p {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
        }
        let len = bytes.len();
        (format!("data:application/octet-stream;base64,{}", BASE64.encode(bytes)), len)
    }

    fn triangle_json() -> String {
        let (uri, len) = positions_uri(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        format!(
            r#"{{
              "asset": {{ "version": "1.0", "generator": "test" }},
              "scene": "defaultScene",
              "scenes": {{ "defaultScene": {{ "nodes": ["root"] }} }},
              "nodes": {{ "root": {{ "meshes": ["tri"], "translation": [1, 2, 3] }} }},
              "meshes": {{
                "tri": {{ "primitives": [ {{
                  "attributes": {{ "POSITION": "acc" }},
                  "mode": 4,
                  "material": "mat"
                }} ] }}
              }},
              "accessors": {{ "acc": {{
                "bufferView": "view", "componentType": 5126, "count": 3, "type": "VEC3"
              }} }},
              "bufferViews": {{ "view": {{ "buffer": "buf", "byteOffset": 0, "byteLength": {len} }} }},
              "buffers": {{ "buf": {{ "uri": "{uri}" }} }},
              "materials": {{ "mat": {{ "values": {{ "diffuse": "tex" }} }} }},
              "textures": {{ "tex": {{ "source": "img" }} }},
              "images": {{ "img": {{ "uri": "data:image/jpeg;base64,/9g=" }} }}
            }}"#
        )
    }

    #[test]
    fn decodes_a_minimal_document() {
        let asset = decode(triangle_json().as_bytes()).unwrap();
        assert!(asset.marker_seen);
        assert_eq!(asset.format_version.as_deref(), Some("1.0"));
        assert_eq!(asset.meshes.len(), 1);

        let prim = &asset.meshes[0].primitives[0];
        assert_eq!(prim.mode, TopologyMode::Triangles);
        assert_eq!(prim.positions.len(), 3);
        assert_eq!(prim.positions[1], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(prim.material, Some(0));

        // the image payload decoded from its data URI
        assert!(asset.images[0].has_data());
        assert_eq!(asset.images[0].mime_type.as_deref(), Some("image/jpeg"));

        // the material's diffuse slot references image 0
        assert_eq!(asset.materials[0].diffuse.texture, Some(0));

        // node graph
        assert_eq!(asset.scene_roots, vec![0]);
        assert_eq!(asset.nodes[0].meshes, vec![0]);
        assert_eq!(
            asset.nodes[0].transform,
            NodeTransform::Trs {
                translation: Some(Vec3::new(1.0, 2.0, 3.0)),
                rotation: None,
                scale: None,
            }
        );
    }

    #[test]
    fn missing_marker_is_reported_not_raised() {
        let asset = decode(br#"{ "meshes": {} }"#).unwrap();
        assert!(!asset.marker_seen);
    }

    #[test]
    fn accessor_past_view_end_is_an_error() {
        let (uri, _) = positions_uri(&[[0.0, 0.0, 0.0]]);
        let json = format!(
            r#"{{
              "asset": {{ "version": "1.0" }},
              "meshes": {{ "m": {{ "primitives": [ {{ "attributes": {{ "POSITION": "acc" }} }} ] }} }},
              "accessors": {{ "acc": {{
                "bufferView": "view", "componentType": 5126, "count": 9, "type": "VEC3"
              }} }},
              "bufferViews": {{ "view": {{ "buffer": "buf", "byteOffset": 0, "byteLength": 12 }} }},
              "buffers": {{ "buf": {{ "uri": "{uri}" }} }}
            }}"#
        );
        assert!(matches!(
            decode(json.as_bytes()),
            Err(Error::AccessorOutOfBounds { .. })
        ));
    }

    #[test]
    fn container_splits_into_content_and_body() {
        let json = br#"{ "asset": { "version": "1.0" } }"#;
        let body = [1u8, 2, 3, 4];
        let mut data = Vec::new();
        data.extend_from_slice(CONTAINER_MAGIC);
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&((20 + json.len() + body.len()) as u32).to_le_bytes());
        data.extend_from_slice(&(json.len() as u32).to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(json);
        data.extend_from_slice(&body);

        let (content, rest) = split_container(&data).unwrap();
        assert_eq!(content, json);
        assert_eq!(rest, body);

        let asset = decode(&data).unwrap();
        assert!(asset.marker_seen);
    }

    #[test]
    fn truncated_container_is_structural() {
        let mut data = Vec::new();
        data.extend_from_slice(CONTAINER_MAGIC);
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&80u32.to_le_bytes()); // content longer than the input
        data.extend_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            decode(&data),
            Err(Error::TruncatedContainer { .. })
        ));
    }

    #[test]
    fn unindexed_strip_survives_decoding() {
        let (uri, len) = positions_uri(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
        ]);
        let json = format!(
            r#"{{
              "asset": {{ "version": "1.0" }},
              "meshes": {{ "m": {{ "primitives": [ {{
                "attributes": {{ "POSITION": "acc" }}, "mode": 5
              }} ] }} }},
              "accessors": {{ "acc": {{
                "bufferView": "view", "componentType": 5126, "count": 4, "type": "VEC3"
              }} }},
              "bufferViews": {{ "view": {{ "buffer": "buf", "byteOffset": 0, "byteLength": {len} }} }},
              "buffers": {{ "buf": {{ "uri": "{uri}" }} }}
            }}"#
        );
        let asset = decode(json.as_bytes()).unwrap();
        let prim = &asset.meshes[0].primitives[0];
        assert_eq!(prim.mode, TopologyMode::TriangleStrip);
        assert!(prim.indices.is_none());
        assert_eq!(prim.positions.len(), 4);
    }
}
