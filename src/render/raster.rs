//! Raster (PNG) backends
//!
//! SVG output needs nothing beyond the crate itself. PNG output goes through a
//! [`RasterBackend`], which the renderer checks for when it is constructed.
//! The default backend, [`ResvgBackend`], is compiled in with the `raster`
//! feature.

use crate::errors::ExportError;

/// Turns a serialized SVG document into encoded image bytes
pub trait RasterBackend: std::fmt::Debug + Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Render `svg` to a `width_px` × `height_px` PNG over `background`.
    fn rasterize(
        &self,
        svg: &str,
        width_px: u32,
        height_px: u32,
        background: &str,
    ) -> Result<Vec<u8>, ExportError>;
}

/// The backend compiled into this build, if any
pub fn default_backend() -> Option<Box<dyn RasterBackend>> {
    #[cfg(feature = "raster")]
    {
        Some(Box::new(ResvgBackend::default()))
    }
    #[cfg(not(feature = "raster"))]
    {
        None
    }
}

/// PNG via `usvg` + `resvg` + `tiny-skia`
#[cfg(feature = "raster")]
#[derive(Debug, Clone)]
pub struct ResvgBackend {
    load_system_fonts: bool,
}

#[cfg(feature = "raster")]
impl Default for ResvgBackend {
    fn default() -> Self {
        ResvgBackend {
            load_system_fonts: true,
        }
    }
}

#[cfg(feature = "raster")]
impl ResvgBackend {
    /// Skip the system font scan; text is then dropped from the raster.
    pub fn without_system_fonts() -> Self {
        ResvgBackend {
            load_system_fonts: false,
        }
    }
}

#[cfg(feature = "raster")]
impl RasterBackend for ResvgBackend {
    fn name(&self) -> &'static str {
        "resvg"
    }

    fn rasterize(
        &self,
        svg: &str,
        width_px: u32,
        height_px: u32,
        background: &str,
    ) -> Result<Vec<u8>, ExportError> {
        let mut opt = usvg::Options::default();
        if self.load_system_fonts {
            opt.fontdb_mut().load_system_fonts();
        }
        opt.font_family = "serif".to_string();

        let tree = usvg::Tree::from_str(svg, &opt)
            .map_err(|e| ExportError::Raster(format!("failed to parse SVG: {e}")))?;

        let mut pixmap = tiny_skia::Pixmap::new(width_px.max(1), height_px.max(1))
            .ok_or_else(|| ExportError::Raster("failed to allocate pixmap".to_string()))?;
        if let Some(color) = parse_tiny_skia_color(background) {
            pixmap.fill(color);
        }

        let size = tree.size();
        let sx = pixmap.width() as f32 / size.width();
        let sy = pixmap.height() as f32 / size.height();
        crate::log::debug!(width_px, height_px, sx, sy, "rasterizing canvas");

        resvg::render(&tree, tiny_skia::Transform::from_scale(sx, sy), &mut pixmap.as_mut());
        pixmap
            .encode_png()
            .map_err(|e| ExportError::Raster(format!("failed to encode PNG: {e}")))
    }
}

/// Named colors we emit ourselves, plus `#rgb` / `#rrggbb` hex.
#[cfg(feature = "raster")]
fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "none" | "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::WHITE),
        "black" => return Some(tiny_skia::Color::BLACK),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    let digit = |b: u8| (b as char).to_digit(16).map(|v| v as u8);
    let bytes = hex.as_bytes();
    let (r, g, b) = match bytes.len() {
        3 => (
            digit(bytes[0])? * 17,
            digit(bytes[1])? * 17,
            digit(bytes[2])? * 17,
        ),
        6 => (
            digit(bytes[0])? << 4 | digit(bytes[1])?,
            digit(bytes[2])? << 4 | digit(bytes[3])?,
            digit(bytes[4])? << 4 | digit(bytes[5])?,
        ),
        _ => return None,
    };
    Some(tiny_skia::Color::from_rgba8(r, g, b, 255))
}
