//! glTF-flavored structured-asset import family
//!
//! The front end decodes the JSON document (or the binary container)
//! into the [`crate::asset`] model; the scene assembly engine does the
//! rest. Only the grammar the assembly engine consumes is implemented.

pub mod reader;
pub(crate) mod schema;

pub use reader::decode;

use std::path::Path;

use crate::assemble;
use crate::error::Result;
use crate::importer::{ImportConfig, Importer, has_extension};
use crate::scene::Scene;

/// Importer for the glTF-flavored JSON/binary asset format.
pub struct GltfImporter;

impl Importer for GltfImporter {
    fn name(&self) -> &'static str {
        "glTF importer"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["gltf", "glb"]
    }

    fn can_handle(&self, path: &Path, data: &[u8]) -> bool {
        if data.starts_with(reader::CONTAINER_MAGIC) {
            return true;
        }
        if has_extension(path, self.extensions()) {
            return true;
        }
        // a bare JSON document qualifies when it decodes and carries the
        // top-level marker
        if data.iter().copied().find(|b| !b.is_ascii_whitespace()) == Some(b'{') {
            return reader::decode(data).is_ok_and(|asset| asset.marker_seen);
        }
        false
    }

    fn import(&self, _path: &Path, data: &[u8], _config: &ImportConfig) -> Result<Scene> {
        let mut asset = reader::decode(data)?;
        assemble::assemble(&mut asset)
    }
}
