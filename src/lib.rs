//! Schematic geometry figures for exam questions.
//!
//! A figure is described in a small YAML grammar, usually embedded in question
//! text between `[FIGURE]` and `[/FIGURE]`. The pipeline has three stages:
//!
//! 1. [`FigureParser`] turns a block into a [`GeometryFigure`], falling back
//!    to a lenient line-oriented decode when the YAML is malformed.
//! 2. [`PointLayoutEngine`] gives every referenced label a coordinate, from
//!    explicit coordinates, circle and polygon constructions, tangents and
//!    relational descriptions such as "intersection of AC and BD".
//! 3. [`FigureRenderer`] draws the figure onto a [`Canvas`] and exports it as
//!    SVG or, with a raster backend, PNG.
//!
//! ```rust
//! use geofig::{ExportFormat, ExportTarget, FigureParser, FigureRenderer, RenderConfig};
//!
//! let figure = FigureParser::new().parse(
//!     "type: triangle\nelements:\n  - triangle:\n      vertices: [A, B, C]\n",
//! );
//! let renderer = FigureRenderer::with_raster(RenderConfig::default(), None).unwrap();
//! let mut canvas = renderer.render_figure(&figure).unwrap();
//! let mut svg = Vec::new();
//! renderer
//!     .export(&mut canvas, ExportTarget::Memory(&mut svg), ExportFormat::Svg)
//!     .unwrap();
//! assert!(canvas.is_closed());
//! assert!(String::from_utf8(svg).unwrap().contains("<polygon"));
//! ```

use pest_derive::Parser;

pub mod batch;
pub mod config;
pub mod errors;
pub mod layout;
pub mod log;
pub mod parse;
pub mod render;
pub mod schema;
pub mod types;
pub mod validate;

/// Grammar for relational point descriptions
#[derive(Parser)]
#[grammar = "description.pest"]
pub struct DescriptionParser;

pub use batch::{
    DiagramOutcome, create_diagram, ensure_output_directory, render_figure_from_text,
    render_to_buffer,
};
pub use config::{LayoutConfig, RenderConfig, RenderMode};
pub use errors::{ConfigError, ExportError, FigureError, RenderError, SkippedElement};
pub use layout::{PointLayoutEngine, Positions};
pub use parse::FigureParser;
pub use render::{Canvas, ExportFormat, ExportTarget, FigureRenderer, RasterBackend};
pub use schema::{FigureType, GeometryFigure};
pub use validate::{FigureValidator, Validation};
