//! Error types for `MeshPort`
//!
//! Only structural failures surface here: a structural error aborts the
//! whole import and no partial scene is returned. Field-level problems
//! (malformed numbers, out-of-range indices, unknown enum values) are
//! recovered with defaults and reported through `tracing` instead.

use thiserror::Error;

/// The error type for `MeshPort` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Format Detection Errors ====================
    /// No registered importer recognized the input.
    #[error("no importer recognizes the input: {path}")]
    UnknownFormat {
        /// The offending file path or name hint.
        path: String,
    },

    // ==================== Block Parser Errors ====================
    /// Unexpected end of input inside a section that must be well-bracketed.
    #[error("line {line}: unexpected end of file while parsing a {section} chunk (level {level})")]
    UnexpectedEofInSection {
        /// The line number where the input ended.
        line: u32,
        /// Full name of the section, including the asterisk.
        section: &'static str,
        /// Nesting depth of the section.
        level: u32,
    },

    // ==================== Asset Container Errors ====================
    /// The binary container does not start with the expected magic.
    #[error("invalid container magic: expected glTF, found {0:?}")]
    InvalidContainerMagic([u8; 4]),

    /// The binary container is shorter than its headers claim.
    #[error("truncated binary container: {message}")]
    TruncatedContainer {
        /// What was being read when the data ran out.
        message: String,
    },

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding of an embedded data URI failed.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A data URI did not have the `data:<mime>;base64,<payload>` shape.
    #[error("malformed data URI in {entity}")]
    MalformedDataUri {
        /// The entity (buffer or image id) carrying the URI.
        entity: String,
    },

    /// An accessor addressed bytes outside its buffer view.
    #[error("accessor '{id}' out of bounds: needs {needed} bytes, buffer view has {available}")]
    AccessorOutOfBounds {
        /// The accessor id.
        id: String,
        /// Bytes the accessor needs.
        needed: usize,
        /// Bytes the buffer view provides.
        available: usize,
    },

    /// A referenced entity id does not exist in the asset dictionary.
    #[error("dangling reference: {kind} '{id}' not found")]
    DanglingReference {
        /// The dictionary the id was looked up in.
        kind: &'static str,
        /// The missing id.
        id: String,
    },

    // ==================== Scene Assembly Errors ====================
    /// The asset is missing its top-level validity marker.
    #[error("asset is missing its top-level marker")]
    MissingAssetMarker,

    /// A compressed mesh extension the engine does not implement was found
    /// on a mesh with more than one primitive.
    #[error("unsupported compression '{scheme}' on mesh '{mesh}' with {primitives} primitives")]
    UnsupportedMeshCompression {
        /// The extension/compression scheme name.
        scheme: String,
        /// The mesh name or id.
        mesh: String,
        /// Number of primitives in the mesh.
        primitives: usize,
    },

    // ==================== Generic/Fallback Errors ====================
    /// Invalid format error (use specific variants when possible).
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

/// A specialized Result type for `MeshPort` operations.
pub type Result<T> = std::result::Result<T, Error>;
