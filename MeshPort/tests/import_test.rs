use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use meshport::prelude::*;
use pretty_assertions::assert_eq;

const ASE_SCENE: &str = "*3DSMAX_ASCIIEXPORT 200\n\
*SCENE {\n\
\t*SCENE_BACKGROUND_STATIC 0.0 0.0 0.0\n\
\t*SCENE_FIRSTFRAME 0\n\
\t*SCENE_LASTFRAME 100\n\
}\n\
*MATERIAL_LIST {\n\
\t*MATERIAL_COUNT 1\n\
\t*MATERIAL 0 {\n\
\t\t*MATERIAL_NAME \"hull\"\n\
\t\t*MATERIAL_DIFFUSE 0.8 0.2 0.2\n\
\t}\n\
}\n\
*GEOMOBJECT {\n\
\t*NODE_NAME \"Tri\"\n\
\t*NODE_TM {\n\
\t\t*NODE_NAME \"Tri\"\n\
\t\t*TM_ROW0 1.0 0.0 0.0\n\
\t\t*TM_ROW1 0.0 1.0 0.0\n\
\t\t*TM_ROW2 0.0 0.0 1.0\n\
\t\t*TM_ROW3 0.0 0.0 0.0\n\
\t}\n\
\t*MESH {\n\
\t\t*MESH_NUMVERTEX 3\n\
\t\t*MESH_NUMFACES 1\n\
\t\t*MESH_VERTEX_LIST {\n\
\t\t\t*MESH_VERTEX 0 0.0 0.0 0.0\n\
\t\t\t*MESH_VERTEX 1 1.0 0.0 0.0\n\
\t\t\t*MESH_VERTEX 2 0.0 1.0 0.0\n\
\t\t}\n\
\t\t*MESH_FACE_LIST {\n\
\t\t\t*MESH_FACE 0: A: 0 B: 1 C: 2\n\
\t\t}\n\
\t}\n\
\t*MATERIAL_REF 0\n\
}\n";

#[test]
fn ase_import_end_to_end() {
    let config = ImportConfig::default();
    let scene = import_memory(ASE_SCENE.as_bytes(), "scene.ase", &config).unwrap();

    assert!(!scene.incomplete);
    assert_eq!(scene.meshes.len(), 1);
    assert_eq!(scene.meshes[0].name, "Tri");
    assert_eq!(scene.meshes[0].positions.len(), 3);
    assert_eq!(scene.meshes[0].faces.len(), 1);

    assert_eq!(scene.materials.len(), 1);
    assert_eq!(scene.materials[0].name, "hull");

    assert_eq!(scene.root.name, "Tri");
    assert_eq!(scene.root.meshes, vec![0]);
}

#[test]
fn ase_import_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.ase");
    std::fs::write(&path, ASE_SCENE).unwrap();

    let scene = import_file(&path).unwrap();
    assert_eq!(scene.meshes.len(), 1);
}

fn gltf_scene_json() -> String {
    let mut bytes = Vec::new();
    for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for c in p {
            bytes.extend_from_slice(&c.to_le_bytes());
        }
    }
    let len = bytes.len();
    let uri = format!(
        "data:application/octet-stream;base64,{}",
        BASE64.encode(bytes)
    );
    format!(
        r#"{{
          "asset": {{ "version": "1.0", "generator": "import_test" }},
          "scene": "main",
          "scenes": {{ "main": {{ "nodes": ["root"] }} }},
          "nodes": {{ "root": {{ "name": "Root", "meshes": ["tri"] }} }},
          "meshes": {{
            "tri": {{ "primitives": [ {{
              "attributes": {{ "POSITION": "positions" }},
              "mode": 4,
              "material": "skin"
            }} ] }}
          }},
          "accessors": {{ "positions": {{
            "bufferView": "view", "componentType": 5126, "count": 3, "type": "VEC3"
          }} }},
          "bufferViews": {{ "view": {{ "buffer": "buf", "byteOffset": 0, "byteLength": {len} }} }},
          "buffers": {{ "buf": {{ "uri": "{uri}" }} }},
          "materials": {{ "skin": {{ "values": {{ "diffuse": "tex" }} }} }},
          "textures": {{ "tex": {{ "source": "img" }} }},
          "images": {{ "img": {{ "name": "checker", "uri": "data:image/jpeg;base64,/9g=" }} }}
        }}"#
    )
}

#[test]
fn gltf_import_end_to_end() {
    let config = ImportConfig::default();
    let json = gltf_scene_json();
    let scene = import_memory(json.as_bytes(), "scene.gltf", &config).unwrap();

    assert!(!scene.incomplete);
    assert_eq!(scene.meshes.len(), 1);
    assert_eq!(scene.meshes[0].name, "tri");
    assert_eq!(scene.meshes[0].faces.len(), 1);

    // the embedded jpeg became texture 0 with the 3-char format hint
    assert_eq!(scene.textures.len(), 1);
    assert_eq!(scene.textures[0].format_hint, "jpg");
    assert_eq!(scene.textures[0].name, "checker");

    // and the material references it by marker string
    assert_eq!(
        scene.materials[0].diffuse,
        MaterialProperty::Texture("*0".to_string())
    );

    assert_eq!(scene.root.name, "Root");
    assert_eq!(scene.root.meshes, vec![0]);
}

#[test]
fn gltf_detection_without_extension() {
    // content sniffing: a JSON document with the asset marker is claimed
    // by the glTF importer even under a neutral name
    let config = ImportConfig::default();
    let json = gltf_scene_json();
    let scene = import_memory(json.as_bytes(), "download.bin", &config).unwrap();
    assert_eq!(scene.meshes.len(), 1);
}

#[test]
fn unknown_format_is_a_single_error() {
    let config = ImportConfig::default();
    let result = import_memory(b"BM\x00\x00not a scene", "image.bmp", &config);
    assert!(matches!(result, Err(Error::UnknownFormat { .. })));
}

#[test]
fn metadata_only_document_is_flagged_incomplete() {
    let config = ImportConfig::default();
    let json = br#"{ "asset": { "version": "1.0", "copyright": "somebody" } }"#;
    let scene = import_memory(json, "empty.gltf", &config).unwrap();
    assert!(scene.incomplete);
    assert!(scene.meshes.is_empty());
    assert_eq!(scene.metadata.copyright.as_deref(), Some("somebody"));
    // mesh material references stay valid even here
    assert_eq!(scene.materials.len(), 1);
}
