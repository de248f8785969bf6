//! Helpers for pipelines that turn question text into image files
//!
//! [`create_diagram`] never fails: a figure that cannot be produced becomes a
//! [`DiagramOutcome::Placeholder`] so one bad block does not stop a batch.
//! The other helpers surface errors as [`FigureError`].

use std::path::{Path, PathBuf};

use crate::config::RenderConfig;
use crate::errors::{ConfigError, FigureError};
use crate::parse::FigureParser;
use crate::render::{
    ExportFormat, ExportTarget, FigureRenderer, RasterBackend, default_backend,
};

/// Create `path` and any missing parents. Succeeds if it already exists.
pub fn ensure_output_directory(path: impl AsRef<Path>) -> Result<PathBuf, FigureError> {
    let path = path.as_ref();
    std::fs::create_dir_all(path).map_err(|source| FigureError::OutputDir {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(path.to_path_buf())
}

/// What [`create_diagram`] produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramOutcome {
    /// A freshly rendered image
    Rendered(PathBuf),
    /// The figure points at a pre-rendered image instead
    Referenced(PathBuf),
    /// Text to show in place of the figure
    Placeholder(String),
}

/// Parse `text`, render it and write `<output_dir>/<name>.<ext>`.
pub fn create_diagram(
    name: &str,
    text: &str,
    output_dir: &Path,
    format: ExportFormat,
    renderer: &FigureRenderer,
) -> DiagramOutcome {
    let figure = FigureParser::new().parse(text);
    if let Some(image) = &figure.image_ref {
        crate::log::debug!(name, image = %image, "figure references an existing image");
        return DiagramOutcome::Referenced(PathBuf::from(image));
    }

    let path = output_dir.join(format!("{name}.{}", format.extension()));
    let result = renderer
        .render_figure(&figure)
        .map_err(FigureError::from)
        .and_then(|mut canvas| {
            renderer
                .export(&mut canvas, ExportTarget::File(&path), format)
                .map_err(FigureError::from)
        });

    match result {
        Ok(()) => DiagramOutcome::Rendered(path),
        Err(err) => {
            crate::log::warn!(name, error = %err, "could not produce figure");
            DiagramOutcome::Placeholder(format!("[Figure {name}: {err}]"))
        }
    }
}

/// Render one figure block to `path` with the default configuration. The
/// format follows the extension; anything other than `.svg` is written as PNG.
pub fn render_figure_from_text(
    block: &str,
    path: impl AsRef<Path>,
) -> Result<PathBuf, FigureError> {
    let path = path.as_ref();
    let format = ExportFormat::from_path(path).unwrap_or(ExportFormat::Png);
    let renderer = renderer_for(format, default_backend())?;
    let figure = FigureParser::new().parse(block);
    let mut canvas = renderer.render_figure(&figure)?;
    renderer.export(&mut canvas, ExportTarget::File(path), format)?;
    Ok(path.to_path_buf())
}

/// Render one figure block to encoded bytes with the default configuration.
pub fn render_to_buffer(block: &str, format: ExportFormat) -> Result<Vec<u8>, FigureError> {
    let renderer = renderer_for(format, default_backend())?;
    let figure = FigureParser::new().parse(block);
    let mut canvas = renderer.render_figure(&figure)?;
    let mut bytes = Vec::new();
    renderer.export(&mut canvas, ExportTarget::Memory(&mut bytes), format)?;
    Ok(bytes)
}

/// Default configuration, requiring a raster backend when `format` is PNG so
/// a missing backend fails here rather than at export.
fn renderer_for(
    format: ExportFormat,
    raster: Option<Box<dyn RasterBackend>>,
) -> Result<FigureRenderer, ConfigError> {
    let config = RenderConfig {
        raster: format == ExportFormat::Png,
        ..RenderConfig::default()
    };
    FigureRenderer::with_raster(config, raster)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_renderer_needs_a_backend() {
        assert!(matches!(
            renderer_for(ExportFormat::Png, None),
            Err(ConfigError::MissingRasterBackend)
        ));
        let svg = renderer_for(ExportFormat::Svg, None).unwrap();
        assert!(!svg.config().raster);
        assert!(!svg.has_raster());
    }
}
