//! Import entry points and format auto-detection
//!
//! Each importer exposes a cheap `can_handle` check used to pick the
//! right front end before the full import runs. `can_handle` never
//! fails; any decode problem simply means "not mine".

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::ase::AseImporter;
use crate::ase::document::FORMAT_VERSION_ASE;
use crate::error::{Error, Result};
use crate::gltf::GltfImporter;
use crate::scene::Scene;

/// Options controlling an import call.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Format version assumed for block-format files that carry no
    /// version keyword.
    pub ase_format_version: u32,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            ase_format_version: FORMAT_VERSION_ASE,
        }
    }
}

/// A format front end: detection plus the full import.
pub trait Importer {
    /// Human-readable importer name for diagnostics.
    fn name(&self) -> &'static str;

    /// Lowercase file extensions this importer claims.
    fn extensions(&self) -> &'static [&'static str];

    /// Lightweight magic/parse check. Must never fail; a decode error
    /// means "cannot handle".
    fn can_handle(&self, path: &Path, data: &[u8]) -> bool;

    /// Full import of `data` into a scene graph.
    ///
    /// # Errors
    /// Returns an error on a structural failure; no partial scene is
    /// returned.
    fn import(&self, path: &Path, data: &[u8], config: &ImportConfig) -> Result<Scene>;
}

/// Registered importers in detection order.
pub fn importers() -> &'static [&'static dyn Importer] {
    const IMPORTERS: &[&'static dyn Importer] = &[&GltfImporter, &AseImporter];
    IMPORTERS
}

/// True when `path` has one of the given lowercase extensions.
pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            let lower = e.to_ascii_lowercase();
            extensions.contains(&lower.as_str())
        })
}

/// Imports a file with default options.
///
/// # Errors
/// Returns an error if the file cannot be read, no importer recognizes
/// it, or the import fails structurally.
pub fn import_file<P: AsRef<Path>>(path: P) -> Result<Scene> {
    import_file_with_config(path, &ImportConfig::default())
}

/// Imports a file with explicit options.
///
/// # Errors
/// Returns an error if the file cannot be read, no importer recognizes
/// it, or the import fails structurally.
pub fn import_file_with_config<P: AsRef<Path>>(path: P, config: &ImportConfig) -> Result<Scene> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    import_memory(&data, path, config)
}

/// Imports an in-memory buffer. `name_hint` is only used for extension
/// detection and diagnostics.
///
/// # Errors
/// Returns an error if no importer recognizes the input, or the import
/// fails structurally.
pub fn import_memory<P: AsRef<Path>>(data: &[u8], name_hint: P, config: &ImportConfig) -> Result<Scene> {
    let path = name_hint.as_ref();
    for importer in importers() {
        if importer.can_handle(path, data) {
            debug!("importing '{}' with the {}", path.display(), importer.name());
            return importer.import(path, data, config);
        }
    }
    Err(Error::UnknownFormat {
        path: path.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_extension(Path::new("model.ASE"), &["ase", "ask"]));
        assert!(has_extension(Path::new("dir/model.ask"), &["ase", "ask"]));
        assert!(!has_extension(Path::new("model.obj"), &["ase", "ask"]));
        assert!(!has_extension(Path::new("model"), &["ase"]));
    }

    #[test]
    fn unrecognized_input_is_an_error() {
        let result = import_memory(b"not a scene at all", "scene.xyz", &ImportConfig::default());
        assert!(matches!(result, Err(Error::UnknownFormat { .. })));
    }
}
