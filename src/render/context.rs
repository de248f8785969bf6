//! Per-render state: the framing of the figure and its derived sizes

use glam::{DVec2, dvec2};

use crate::config::{PX_PER_PT, RenderConfig};
use crate::errors::RenderError;
use crate::layout::Positions;
use crate::types::Scaler;

use super::defaults;

/// Everything a shape needs to draw itself
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub config: &'a RenderConfig,
    pub positions: &'a Positions,
    /// Figure units to SVG pixels
    pub scaler: Scaler,
    /// Bounding-box diagonal, or the fallback for tiny figures
    pub scale: f64,
    pub arc_radius: f64,
    pub label_offset: f64,
    pub ray_extension: f64,
    pub centroid: DVec2,
    /// Side of the square canvas in pixels
    pub size_px: f64,
}

impl<'a> RenderContext<'a> {
    /// Frame the figure: a square viewport centered on the positions'
    /// bounding box, `margin` units wider than its longer side on each end.
    pub fn new(config: &'a RenderConfig, positions: &'a Positions) -> Result<Self, RenderError> {
        let bbox = positions.bbox();
        let (center, width, height) = if bbox.is_empty() {
            (DVec2::ZERO, 0.0, 0.0)
        } else if bbox.is_finite() {
            (bbox.center(), bbox.width(), bbox.height())
        } else {
            return Err(RenderError::InvalidBounds);
        };

        let diagonal = if bbox.is_empty() { 0.0 } else { bbox.diagonal() };
        let scale = if diagonal < 1.0 {
            defaults::FALLBACK_SCALE
        } else {
            diagonal
        };

        let side = width.max(height) + 2.0 * config.margin;
        let side = if side > 0.0 { side } else { 1.0 };
        let size_px = config.svg_size_px();
        let origin = dvec2(center.x - side / 2.0, center.y + side / 2.0);
        let scaler = Scaler::try_new(size_px / side, origin).map_err(|_| RenderError::InvalidBounds)?;

        crate::log::debug!(scale, side, size_px, "framed figure");

        Ok(RenderContext {
            config,
            positions,
            scaler,
            scale,
            arc_radius: config.arc_radius_factor * scale,
            label_offset: config.label_offset_factor * scale,
            ray_extension: config.ray_extension_factor * scale,
            centroid: positions.centroid().unwrap_or(center),
            size_px,
        })
    }

    /// Figure point to SVG pixels
    #[inline]
    pub fn px(&self, p: DVec2) -> DVec2 {
        self.scaler.point(p)
    }

    /// Figure length to SVG pixels
    #[inline]
    pub fn len(&self, units: f64) -> f64 {
        self.scaler.len(units)
    }

    /// Typographic points to SVG pixels
    #[inline]
    pub fn pt(&self, points: f64) -> f64 {
        points * PX_PER_PT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_viewport_around_bbox() {
        let config = RenderConfig::default();
        let positions: Positions = [("A", dvec2(0.0, 0.0)), ("B", dvec2(6.0, 8.0))]
            .into_iter()
            .collect();
        let ctx = RenderContext::new(&config, &positions).unwrap();
        assert_eq!(ctx.scale, 10.0);
        assert!((ctx.arc_radius - 0.8).abs() < 1e-12);
        // side = 8 + 2 * 1.5 = 11, canvas = 768 px
        assert!((ctx.scaler.px_per_unit() - 768.0 / 11.0).abs() < 1e-9);
        let center = ctx.px(dvec2(3.0, 4.0));
        assert!((center - dvec2(384.0, 384.0)).length() < 1e-9);
        // Y-up becomes Y-down
        assert!(ctx.px(dvec2(3.0, 5.0)).y < center.y);
    }

    #[test]
    fn empty_figure_uses_fallback_scale() {
        let config = RenderConfig::default();
        let positions = Positions::new();
        let ctx = RenderContext::new(&config, &positions).unwrap();
        assert_eq!(ctx.scale, defaults::FALLBACK_SCALE);
        assert_eq!(ctx.centroid, DVec2::ZERO);
    }

    #[test]
    fn non_finite_positions_are_rejected() {
        let config = RenderConfig::default();
        let positions: Positions = [("A", dvec2(f64::INFINITY, 0.0))].into_iter().collect();
        assert!(matches!(
            RenderContext::new(&config, &positions),
            Err(RenderError::InvalidBounds)
        ));
    }
}
