//! Error types with diagnostics using miette
//!
//! Parsing and layout never fail: they degrade instead. The enums here cover
//! the boundaries that can fail for real (configuration, strict rendering,
//! export) plus the internal decode error that triggers the parser fallback.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::types::NumericError;

// ============================================================================
// Decode Errors
// ============================================================================

/// Why the structured (YAML) decode of a figure block was abandoned
#[derive(Error, Diagnostic, Debug)]
pub enum DecodeError {
    #[error("figure block is not valid YAML: {0}")]
    #[diagnostic(code(geofig::parse::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("figure block is a YAML {found}, expected a mapping")]
    #[diagnostic(
        code(geofig::parse::not_a_mapping),
        help("start the block with `type:` / `description:` / `elements:` keys")
    )]
    NotAMapping { found: &'static str },
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors raised when building a renderer from a configuration
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("raster output requested but no raster backend is available")]
    #[diagnostic(
        code(geofig::config::missing_raster_backend),
        help("enable the `raster` cargo feature, inject a backend, or set `raster: false`")
    )]
    MissingRasterBackend,

    #[error("invalid {field}: {source}")]
    #[diagnostic(code(geofig::config::invalid_value))]
    InvalidValue {
        field: &'static str,
        #[source]
        source: NumericError,
    },

    #[error("could not read configuration: {0}")]
    #[diagnostic(code(geofig::config::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

// ============================================================================
// Render Errors
// ============================================================================

/// An element the renderer could not draw because a label had no position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedElement {
    /// Element kind, e.g. "line" or "angle"
    pub kind: &'static str,
    /// The labels that were missing from the position map
    pub missing: Vec<String>,
}

impl std::fmt::Display for SkippedElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (missing {})", self.kind, self.missing.join(", "))
    }
}

/// Errors that occur during rendering
#[derive(Error, Diagnostic, Debug)]
pub enum RenderError {
    #[error("{} element(s) reference unpositioned points", skipped.len())]
    #[diagnostic(
        code(geofig::render::unresolved_elements),
        help("give the points coordinates or a relational description, or render in best-effort mode")
    )]
    UnresolvedElements { skipped: Vec<SkippedElement> },

    #[error("infinite or NaN in figure bounds")]
    #[diagnostic(code(geofig::render::invalid_bounds))]
    InvalidBounds,
}

// ============================================================================
// Export Errors
// ============================================================================

/// Errors that occur while writing a canvas out
#[derive(Error, Diagnostic, Debug)]
pub enum ExportError {
    #[error("canvas was already closed")]
    #[diagnostic(
        code(geofig::export::closed),
        help("render the figure again; a canvas can be exported once")
    )]
    CanvasClosed,

    #[error("could not write {}", path.display())]
    #[diagnostic(code(geofig::export::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SVG serialization failed: {0}")]
    #[diagnostic(code(geofig::export::svg))]
    Serialize(String),

    #[error("raster export needs a raster backend")]
    #[diagnostic(code(geofig::export::no_raster_backend))]
    NoRasterBackend,

    #[error("raster backend failed: {0}")]
    #[diagnostic(code(geofig::export::raster))]
    Raster(String),
}

// ============================================================================
// Umbrella
// ============================================================================

/// Any failure on the text → image path, for the batch helpers
#[derive(Error, Diagnostic, Debug)]
pub enum FigureError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),

    #[error("could not create output directory {}", path.display())]
    #[diagnostic(code(geofig::batch::output_dir))]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
