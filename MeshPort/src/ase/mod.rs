//! ASE/ASK block-format import family
//!
//! The pipeline is scanner primitives → recursive-descent block parser →
//! intermediate document → scene build. The same parser handles the
//! current ASE flavor and the old ASC flavor with its soft-skin block.

pub mod build;
pub mod document;
pub mod parser;
pub mod scanner;

pub use build::build_scene;
pub use document::Document;
pub use parser::Parser;

use std::path::Path;

use crate::error::Result;
use crate::importer::{ImportConfig, Importer, has_extension};
use crate::scene::Scene;
use document::FORMAT_VERSION_ASC;

/// Token every ASE export starts with, used for content sniffing.
const DETECTION_TOKEN: &[u8] = b"*3DSMAX_ASCIIEXPORT";

/// How many leading bytes are scanned for the detection token.
const DETECTION_WINDOW: usize = 4096;

/// Importer for the ASE/ASK text format.
pub struct AseImporter;

impl Importer for AseImporter {
    fn name(&self) -> &'static str {
        "ASE importer"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ase", "ask", "asc"]
    }

    fn can_handle(&self, path: &Path, data: &[u8]) -> bool {
        if has_extension(path, self.extensions()) {
            return true;
        }
        let window = &data[..data.len().min(DETECTION_WINDOW)];
        window
            .windows(DETECTION_TOKEN.len())
            .any(|w| w == DETECTION_TOKEN)
    }

    fn import(&self, path: &Path, data: &[u8], config: &ImportConfig) -> Result<Scene> {
        // .ask/.asc files without a version keyword default to the old
        // flavor
        let hint = if has_extension(path, &["ask", "asc"]) {
            FORMAT_VERSION_ASC
        } else {
            config.ase_format_version
        };
        let document = Parser::new(data, hint).parse()?;
        Ok(build::build_scene(&document))
    }
}
