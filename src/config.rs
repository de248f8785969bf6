//! Rendering and layout configuration
//!
//! Every aesthetic constant is a field here, defaulting to
//! [`crate::render::defaults`]. Both structs deserialize from a partial
//! YAML document: missing keys keep their defaults.

use glam::{DVec2, dvec2};
use serde::Deserialize;

use crate::errors::ConfigError;
use crate::render::defaults;
use crate::types::positive;

/// What the renderer does with elements whose labels have no position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Skip them, record them on the canvas and log a warning
    #[default]
    BestEffort,
    /// Fail the render with `RenderError::UnresolvedElements`
    Strict,
}

/// Constants used by the point layout engine (figure units unless noted)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub default_radius: f64,
    /// Horizontal distance between auto-placed circle centers
    pub circle_spacing: f64,
    /// Distance from the tangency point to an auto-placed external point
    pub tangent_length: f64,
    /// Position along a segment when nothing else decides it
    pub on_segment_ratio: f64,
    /// Ratios for two unordered points on the same segment
    pub pair_ratios: [f64; 2],
    /// Degrees, counter-clockwise from +x
    pub triangle_angles: [f64; 3],
    pub quadrilateral_angles: [f64; 4],
    pub default_triangle: [[f64; 2]; 3],
    pub default_quadrilateral: [[f64; 2]; 4],
    /// First cell of the fallback grid
    pub grid_origin: [f64; 2],
    pub grid_step: f64,
    pub grid_columns: usize,
    pub max_passes: usize,
    /// Below this, a determinant, squared length or grid distance counts as zero
    pub tolerance: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            default_radius: 3.0,
            circle_spacing: 5.0,
            tangent_length: 2.0,
            on_segment_ratio: 0.4,
            pair_ratios: [0.35, 0.65],
            triangle_angles: [90.0, 210.0, 330.0],
            quadrilateral_angles: [100.0, 20.0, -60.0, 160.0],
            default_triangle: [[0.0, 3.0], [-2.5, -1.5], [2.5, -1.5]],
            default_quadrilateral: [[-2.0, 2.0], [2.0, 2.0], [3.0, -2.0], [-3.0, -2.0]],
            grid_origin: [-4.0, 4.0],
            grid_step: 2.0,
            grid_columns: 3,
            max_passes: 3,
            tolerance: 1e-9,
        }
    }
}

impl LayoutConfig {
    /// Figure-space position of grid cell `index`, filled left to right then downwards.
    pub fn grid_cell(&self, index: usize) -> DVec2 {
        let columns = self.grid_columns.max(1);
        let (row, col) = (index / columns, index % columns);
        dvec2(
            self.grid_origin[0] + col as f64 * self.grid_step,
            self.grid_origin[1] - row as f64 * self.grid_step,
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let check = |field, v: f64| {
            positive(v)
                .map(|_| ())
                .map_err(|source| ConfigError::InvalidValue { field, source })
        };
        check("layout.default_radius", self.default_radius)?;
        check("layout.grid_step", self.grid_step)?;
        check("layout.tolerance", self.tolerance)?;
        Ok(())
    }
}

/// Canvas, palette and typography for the renderer
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Canvas side in inches (the canvas is square)
    pub figsize: f64,
    /// Pixels per inch for raster export
    pub dpi: f64,
    pub background_color: String,

    pub line_color: String,
    pub circle_color: String,
    pub angle_arc_color: String,
    pub construction_color: String,

    /// Stroke widths in points
    pub line_width: f64,
    pub construction_line_width: f64,
    pub angle_line_width: f64,
    pub mark_line_width: f64,

    /// Point marker radius in points
    pub point_radius: f64,
    /// Font size in points
    pub font_size: f64,
    pub font_family: String,

    /// Figure units added on every side of the bounding square
    pub margin: f64,
    /// Side of the tangency square, figure units
    pub perpendicular_mark_size: f64,
    /// Arc radius as a fraction of the figure scale
    pub arc_radius_factor: f64,
    pub label_offset_factor: f64,
    pub ray_extension_factor: f64,
    /// Distance between concentric arcs of a double/triple angle mark, as a fraction of the arc radius
    pub arc_spacing_factor: f64,

    pub show_points: bool,
    pub show_labels: bool,

    pub mode: RenderMode,
    /// The renderer must be able to produce PNG output
    pub raster: bool,

    pub layout: LayoutConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            figsize: defaults::FIGSIZE_INCHES,
            dpi: defaults::DPI,
            background_color: defaults::BACKGROUND.to_string(),
            line_color: defaults::LINE_COLOR.to_string(),
            circle_color: defaults::CIRCLE_COLOR.to_string(),
            angle_arc_color: defaults::ANGLE_ARC_COLOR.to_string(),
            construction_color: defaults::CONSTRUCTION_COLOR.to_string(),
            line_width: defaults::LINE_WIDTH,
            construction_line_width: defaults::CONSTRUCTION_LINE_WIDTH,
            angle_line_width: defaults::ANGLE_LINE_WIDTH,
            mark_line_width: defaults::MARK_LINE_WIDTH,
            point_radius: defaults::POINT_RADIUS,
            font_size: defaults::FONT_SIZE,
            font_family: defaults::FONT_FAMILY.to_string(),
            margin: defaults::MARGIN,
            perpendicular_mark_size: defaults::PERPENDICULAR_MARK_SIZE,
            arc_radius_factor: defaults::ARC_RADIUS_FACTOR,
            label_offset_factor: defaults::LABEL_OFFSET_FACTOR,
            ray_extension_factor: defaults::RAY_EXTENSION_FACTOR,
            arc_spacing_factor: defaults::ARC_SPACING_FACTOR,
            show_points: true,
            show_labels: true,
            mode: RenderMode::BestEffort,
            raster: false,
            layout: LayoutConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Load a (partial) configuration from YAML and validate it.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RenderConfig = if text.trim().is_empty() {
            RenderConfig::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject sizes that would make the canvas or the raster degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let check = |field, v: f64| {
            positive(v)
                .map(|_| ())
                .map_err(|source| ConfigError::InvalidValue { field, source })
        };
        check("figsize", self.figsize)?;
        check("dpi", self.dpi)?;
        check("font_size", self.font_size)?;
        check("arc_radius_factor", self.arc_radius_factor)?;
        self.layout.validate()
    }

    /// SVG side length in CSS pixels
    pub fn svg_size_px(&self) -> f64 {
        self.figsize * PX_PER_INCH
    }

    /// Raster side length in device pixels
    pub fn raster_size_px(&self) -> u32 {
        (self.figsize * self.dpi).round().max(1.0) as u32
    }
}

/// CSS pixels per inch
pub const PX_PER_INCH: f64 = 96.0;
/// CSS pixels per typographic point
pub const PX_PER_PT: f64 = PX_PER_INCH / 72.0;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NumericError;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = RenderConfig::from_yaml_str("dpi: 300\nlayout:\n  default_radius: 4\n").unwrap();
        assert_eq!(config.dpi, 300.0);
        assert_eq!(config.figsize, 8.0);
        assert_eq!(config.layout.default_radius, 4.0);
        assert_eq!(config.layout.max_passes, 3);
        assert_eq!(config.raster_size_px(), 2400);
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(RenderConfig::from_yaml_str("  \n").unwrap(), RenderConfig::default());
    }

    #[test]
    fn non_positive_figsize_is_rejected() {
        let err = RenderConfig::from_yaml_str("figsize: 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "figsize",
                source: NumericError::Zero
            }
        ));
    }

    #[test]
    fn mode_deserializes_snake_case() {
        let config = RenderConfig::from_yaml_str("mode: strict").unwrap();
        assert_eq!(config.mode, RenderMode::Strict);
    }

    #[test]
    fn grid_cells_fill_rows_of_three() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.grid_cell(0), dvec2(-4.0, 4.0));
        assert_eq!(layout.grid_cell(2), dvec2(0.0, 4.0));
        assert_eq!(layout.grid_cell(3), dvec2(-4.0, 2.0));
    }
}
