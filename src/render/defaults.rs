//! Default look of a rendered figure (lengths in points unless noted)

pub const FIGSIZE_INCHES: f64 = 8.0;
pub const DPI: f64 = 150.0;
pub const BACKGROUND: &str = "white";

pub const LINE_COLOR: &str = "#2c3e50";
pub const CIRCLE_COLOR: &str = "#3498db";
pub const ANGLE_ARC_COLOR: &str = "#e74c3c";
pub const CONSTRUCTION_COLOR: &str = "#95a5a6";

pub const LINE_WIDTH: f64 = 1.5;
pub const CONSTRUCTION_LINE_WIDTH: f64 = 1.0;
pub const ANGLE_LINE_WIDTH: f64 = 1.5;
pub const MARK_LINE_WIDTH: f64 = 0.8;
pub const POINT_RADIUS: f64 = 3.5;

pub const FONT_SIZE: f64 = 14.0;
pub const FONT_FAMILY: &str = "serif";
/// Halo drawn behind labels so they stay readable over lines
pub const LABEL_HALO_WIDTH: f64 = 3.0;

/// Figure units
pub const MARGIN: f64 = 1.5;
pub const PERPENDICULAR_MARK_SIZE: f64 = 0.2;

/// Fractions of the figure scale (bounding-box diagonal)
pub const ARC_RADIUS_FACTOR: f64 = 0.08;
pub const LABEL_OFFSET_FACTOR: f64 = 0.04;
pub const RAY_EXTENSION_FACTOR: f64 = 0.15;
/// Gap between concentric angle arcs, as a fraction of the arc radius
pub const ARC_SPACING_FACTOR: f64 = 0.15;
/// Angle values sit this many arc radii from the vertex
pub const VALUE_LABEL_RADIUS: f64 = 1.5;

/// Scale used when the figure is empty or smaller than one unit across
pub const FALLBACK_SCALE: f64 = 10.0;

/// matplotlib's dash patterns, in multiples of the stroke width
pub const DASHED_PATTERN: [f64; 2] = [3.7, 1.6];
pub const DOTTED_PATTERN: [f64; 2] = [1.0, 1.65];
