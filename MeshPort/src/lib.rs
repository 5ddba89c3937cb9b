//! # MeshPort
//!
//! A pure-Rust library that ingests third-party 3D scene files and
//! normalizes them into one in-memory scene graph usable by any
//! downstream renderer or tool.
//!
//! ## Supported Formats
//!
//! - **ASE/ASK** - 3ds Max ASCII scene export, parsed by a recursive-
//!   descent block parser tolerant of truncated and malformed input
//! - **glTF-style assets** - JSON or binary-container documents decoded
//!   into a structured asset model and expanded by the scene assembly
//!   engine
//!
//! ## Quick Start
//!
//! ```no_run
//! use meshport::import_file;
//!
//! // Auto-detect the format and import
//! let scene = import_file("level.ase")?;
//! println!(
//!     "{} meshes, {} materials",
//!     scene.meshes.len(),
//!     scene.materials.len()
//! );
//!
//! // a scene with zero meshes is flagged as metadata-only
//! if scene.incomplete {
//!     println!("no geometry, metadata only");
//! }
//! # Ok::<(), meshport::Error>(())
//! ```
//!
//! ### Importing From Memory
//!
//! ```no_run
//! use meshport::{ImportConfig, import_memory};
//!
//! let data = std::fs::read("model.glb")?;
//! let scene = import_memory(&data, "model.glb", &ImportConfig::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Model
//!
//! Only structural failures (a truncated required section, a missing
//! document marker, an unsupported compression scheme) abort an import.
//! Field-level problems are recovered with defined defaults and logged
//! through `tracing`.

pub mod asset;
pub mod assemble;
pub mod error;
pub mod importer;
pub mod scene;

// Format front ends
pub mod ase;
pub mod gltf;

// Re-exports for convenience
pub use error::{Error, Result};
pub use importer::{ImportConfig, Importer, import_file, import_file_with_config, import_memory};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::importer::{
        ImportConfig, Importer, import_file, import_file_with_config, import_memory,
    };
    pub use crate::scene::{
        Camera, EmbeddedTexture, Face, Light, LightKind, Material, MaterialProperty, Mesh, Node,
        PrimitiveKinds, Scene,
    };

    // Structured asset model and assembly engine
    pub use crate::assemble::assemble;
    pub use crate::asset::{Asset, AssetMesh, AssetNode, Image, Primitive, TopologyMode};

    // Block parser family
    pub use crate::ase::{AseImporter, Document, Parser, build_scene};
    pub use crate::gltf::GltfImporter;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
