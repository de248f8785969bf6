//! Figure rendering
//!
//! This module is organized into submodules:
//! - `defaults`: Default palette, widths and scale factors
//! - `context`: Framing of a figure and its derived sizes
//! - `geometry`: Arc sweeps, tangency marks, label offsets
//! - `shapes`: Drawable primitives and their layers
//! - `svg`: Document assembly and serialization
//! - `canvas`: The rendered surface handed to export
//! - `raster`: PNG backends

pub mod canvas;
pub mod context;
pub mod defaults;
pub mod geometry;
pub mod raster;
pub mod shapes;
pub mod svg;

use std::path::Path;

use glam::DVec2;

pub use canvas::Canvas;
pub use context::RenderContext;
#[cfg(feature = "raster")]
pub use raster::ResvgBackend;
pub use raster::{RasterBackend, default_backend};
pub use shapes::{Layer, ShapeEnum};

use crate::config::{RenderConfig, RenderMode};
use crate::errors::{ConfigError, ExportError, RenderError, SkippedElement};
use crate::layout::{PointLayoutEngine, Positions};
use crate::schema::GeometryFigure;
use crate::types::{Bearing, UnitVec};
use geometry::{Sweep, extend_segment, label_anchor, perpendicular_mark};
use shapes::{
    ArcShape, CircleShape, EllipseShape, LabelShape, MarkerShape, PolygonShape, RightAngleMark,
    SegmentShape, Stroke,
};

/// Output encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    /// Pick a format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<ExportFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Some(ExportFormat::Svg),
            "png" => Some(ExportFormat::Png),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
        }
    }
}

/// Where exported bytes go
#[derive(Debug)]
pub enum ExportTarget<'a> {
    /// Created or overwritten
    File(&'a Path),
    /// Appended to the buffer
    Memory(&'a mut Vec<u8>),
}

/// Draws figures onto canvases and exports them.
///
/// Construction checks capabilities: a configuration asking for raster output
/// is rejected unless a [`RasterBackend`] is available.
#[derive(Debug)]
pub struct FigureRenderer {
    config: RenderConfig,
    layout: PointLayoutEngine,
    raster: Option<Box<dyn RasterBackend>>,
}

impl FigureRenderer {
    /// A renderer with the raster backend compiled into this build, if any.
    pub fn new(config: RenderConfig) -> Result<Self, ConfigError> {
        Self::with_raster(config, default_backend())
    }

    /// A renderer with an explicit choice of raster backend.
    pub fn with_raster(
        config: RenderConfig,
        raster: Option<Box<dyn RasterBackend>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.raster && raster.is_none() {
            return Err(ConfigError::MissingRasterBackend);
        }
        Ok(FigureRenderer {
            layout: PointLayoutEngine::new(config.layout.clone()),
            config,
            raster,
        })
    }

    /// Replace the raster backend.
    pub fn with_raster_backend(mut self, backend: impl RasterBackend + 'static) -> Self {
        self.raster = Some(Box::new(backend));
        self
    }

    pub fn has_raster(&self) -> bool {
        self.raster.is_some()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn layout(&self) -> &PointLayoutEngine {
        &self.layout
    }

    /// Draw `figure` using already-resolved `positions`.
    ///
    /// Elements referencing a label without a position are skipped and listed
    /// in [`Canvas::skipped`]; in strict mode they fail the render instead.
    pub fn render(
        &self,
        figure: &GeometryFigure,
        positions: &Positions,
    ) -> Result<Canvas, RenderError> {
        let ctx = RenderContext::new(&self.config, positions)?;
        let mut scene = Scene::new(&ctx);
        scene.add_circles(figure);
        scene.add_lines(figure);
        scene.add_polygons(figure);
        scene.add_tangents(figure);
        scene.add_angles(figure);
        scene.add_arcs(figure);
        scene.add_ellipses(figure);
        scene.add_points();

        let Scene {
            shapes, skipped, ..
        } = scene;
        if !skipped.is_empty() && self.config.mode == RenderMode::Strict {
            return Err(RenderError::UnresolvedElements { skipped });
        }

        crate::log::debug!(
            figure_type = %figure.figure_type,
            shapes = shapes.len(),
            skipped = skipped.len(),
            "rendered figure"
        );
        let document = svg::build_document(&ctx, &shapes);
        Ok(Canvas::new(document, ctx.size_px, skipped))
    }

    /// Lay out and draw a figure.
    pub fn render_figure(&self, figure: &GeometryFigure) -> Result<Canvas, RenderError> {
        let positions = self.layout.resolve(figure);
        self.render(figure, &positions)
    }

    /// Write the canvas out, then close it whatever the outcome.
    pub fn export(
        &self,
        canvas: &mut Canvas,
        target: ExportTarget<'_>,
        format: ExportFormat,
    ) -> Result<(), ExportError> {
        let result = self.write(canvas, target, format);
        canvas.close();
        result
    }

    fn write(
        &self,
        canvas: &Canvas,
        target: ExportTarget<'_>,
        format: ExportFormat,
    ) -> Result<(), ExportError> {
        let svg = canvas.to_svg_string()?;
        let bytes = match format {
            ExportFormat::Svg => svg.into_bytes(),
            ExportFormat::Png => {
                let backend = self.raster.as_deref().ok_or(ExportError::NoRasterBackend)?;
                let side = self.config.raster_size_px();
                crate::log::debug!(backend = backend.name(), side, "rasterizing");
                backend.rasterize(&svg, side, side, &self.config.background_color)?
            }
        };

        match target {
            ExportTarget::File(path) => {
                std::fs::write(path, &bytes).map_err(|source| ExportError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                crate::log::debug!(path = %path.display(), bytes = bytes.len(), "exported");
            }
            ExportTarget::Memory(buffer) => buffer.extend_from_slice(&bytes),
        }
        Ok(())
    }
}

/// Shapes collected for one render, plus what had to be left out
struct Scene<'c, 'a> {
    ctx: &'c RenderContext<'a>,
    shapes: Vec<ShapeEnum>,
    skipped: Vec<SkippedElement>,
}

impl<'c, 'a> Scene<'c, 'a> {
    fn new(ctx: &'c RenderContext<'a>) -> Self {
        Scene {
            ctx,
            shapes: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn push(&mut self, shape: impl Into<ShapeEnum>) {
        self.shapes.push(shape.into());
    }

    /// Positions of `labels`, or `None` after recording the element as skipped.
    fn lookup(&mut self, kind: &'static str, labels: &[&str]) -> Option<Vec<DVec2>> {
        if let Some(points) = self.ctx.positions.all(labels) {
            return Some(points);
        }
        let missing: Vec<String> = self
            .ctx
            .positions
            .missing(labels)
            .into_iter()
            .map(str::to_string)
            .collect();
        crate::log::warn!(kind, missing = ?missing, "skipping element with unpositioned points");
        self.skipped.push(SkippedElement { kind, missing });
        None
    }

    fn stroke(&self, color: &str, width: f64) -> Stroke {
        Stroke::new(color, width)
    }

    fn label(&mut self, at: DVec2, text: &str, color: &str, layer: Layer) {
        if !self.ctx.config.show_labels {
            return;
        }
        self.push(LabelShape {
            at,
            text: text.to_string(),
            color: color.to_string(),
            layer,
        });
    }

    fn add_circles(&mut self, figure: &GeometryFigure) {
        let config = self.ctx.config;
        for circle in &figure.circles {
            let Some(points) = self.lookup("circle", &[circle.center.as_str()]) else {
                continue;
            };
            let radius = circle
                .radius
                .filter(|r| r.is_finite() && *r > 0.0)
                .unwrap_or(config.layout.default_radius);
            let stroke = self.stroke(&config.circle_color, config.line_width);
            self.push(CircleShape {
                center: points[0],
                radius,
                stroke,
            });
        }
    }

    fn add_lines(&mut self, figure: &GeometryFigure) {
        let config = self.ctx.config;
        for line in &figure.lines {
            let Some(points) = self.lookup("line", &[line.start.as_str(), line.end.as_str()]) else {
                continue;
            };
            let (start, end) = (points[0], points[1]);
            let (from, to) = extend_segment(
                start,
                end,
                line.is_ray,
                line.is_extended,
                self.ctx.ray_extension,
            );

            let stroke = self
                .stroke(&config.line_color, config.line_width)
                .with_style(line.style);
            self.push(SegmentShape {
                start,
                end,
                stroke,
                layer: Layer::Lines,
            });

            let construction = self
                .stroke(&config.construction_color, config.construction_line_width)
                .with_style(line.style);
            for (a, b) in [(from, start), (end, to)] {
                if a != b {
                    self.push(SegmentShape {
                        start: a,
                        end: b,
                        stroke: construction.clone(),
                        layer: Layer::Lines,
                    });
                }
            }

            if let Some(text) = &line.label {
                self.label((start + end) / 2.0, text, &config.line_color, Layer::Labels);
            }
        }
    }

    fn add_polygons(&mut self, figure: &GeometryFigure) {
        let config = self.ctx.config;
        for tri in &figure.triangles {
            let labels: Vec<&str> = tri.vertices.iter().map(String::as_str).collect();
            let Some(vertices) = self.lookup("triangle", &labels) else {
                continue;
            };
            let stroke = self
                .stroke(&config.line_color, config.line_width)
                .with_style(tri.style);
            self.push(PolygonShape {
                vertices,
                stroke,
                layer: Layer::Triangles,
            });
        }
        for quad in &figure.quadrilaterals {
            let labels: Vec<&str> = quad.vertices.iter().map(String::as_str).collect();
            let Some(vertices) = self.lookup("quadrilateral", &labels) else {
                continue;
            };
            let stroke = self.stroke(&config.line_color, config.line_width);
            self.push(PolygonShape {
                vertices,
                stroke,
                layer: Layer::Quadrilaterals,
            });
        }
    }

    fn add_tangents(&mut self, figure: &GeometryFigure) {
        let config = self.ctx.config;
        for tangent in &figure.tangents {
            let mut labels = vec![
                tangent.circle_center.as_str(),
                tangent.point_of_tangency.as_str(),
            ];
            labels.extend(tangent.external_point.as_deref());
            let Some(points) = self.lookup("tangent", &labels) else {
                continue;
            };
            let (center, tangency) = (points[0], points[1]);

            if let Some(&external) = points.get(2) {
                let stroke = self.stroke(&config.line_color, config.line_width);
                self.push(SegmentShape {
                    start: tangency,
                    end: external,
                    stroke,
                    layer: Layer::Tangents,
                });
                if let Some(text) = &tangent.label {
                    self.label(
                        (tangency + external) / 2.0,
                        text,
                        &config.line_color,
                        Layer::Labels,
                    );
                }
            }

            match perpendicular_mark(center, tangency, config.perpendicular_mark_size) {
                Some(corners) => {
                    let stroke = self.stroke(&config.line_color, config.mark_line_width);
                    self.push(RightAngleMark { corners, stroke });
                }
                None => crate::log::debug!(
                    point = %tangent.point_of_tangency,
                    "tangency point coincides with center, no mark"
                ),
            }
        }
    }

    fn add_angles(&mut self, figure: &GeometryFigure) {
        let config = self.ctx.config;
        let arc_radius = self.ctx.arc_radius;
        for angle in &figure.angles {
            let labels = [
                angle.vertex.as_str(),
                angle.ray1_end.as_str(),
                angle.ray2_end.as_str(),
            ];
            let Some(points) = self.lookup("angle", &labels) else {
                continue;
            };
            let vertex = points[0];
            let sweep = Sweep::between(
                Bearing::of(vertex, points[1]),
                Bearing::of(vertex, points[2]),
                angle.is_major,
            );

            if angle.marked {
                for i in 0..angle.arc_style.count() {
                    let radius = arc_radius * (1.0 + i as f64 * config.arc_spacing_factor);
                    let stroke = self.stroke(&config.angle_arc_color, config.angle_line_width);
                    self.push(ArcShape {
                        center: vertex,
                        radius,
                        sweep,
                        stroke,
                        layer: Layer::Angles,
                    });
                }
            }

            if let Some(value) = &angle.value {
                let at = vertex
                    + UnitVec::from_degrees(sweep.mid()) * (arc_radius * defaults::VALUE_LABEL_RADIUS);
                self.label(at, value, &config.angle_arc_color, Layer::Angles);
            }
        }
    }

    fn add_arcs(&mut self, figure: &GeometryFigure) {
        let config = self.ctx.config;
        for arc in &figure.arcs {
            let labels = [
                arc.circle_center.as_str(),
                arc.start_point.as_str(),
                arc.end_point.as_str(),
            ];
            let Some(points) = self.lookup("arc", &labels) else {
                continue;
            };
            let (center, start, end) = (points[0], points[1], points[2]);
            let radius = (start - center).length();
            let sweep = Sweep::between(
                Bearing::of(center, start),
                Bearing::of(center, end),
                arc.is_major,
            );
            let stroke = self.stroke(&config.line_color, config.line_width);
            self.push(ArcShape {
                center,
                radius,
                sweep,
                stroke,
                layer: Layer::Arcs,
            });

            if let Some(text) = &arc.label {
                let at = center
                    + UnitVec::from_degrees(sweep.mid()) * (radius + self.ctx.label_offset);
                self.label(at, text, &config.line_color, Layer::Labels);
            }
        }
    }

    fn add_ellipses(&mut self, figure: &GeometryFigure) {
        let config = self.ctx.config;
        let mut ellipses = figure.perspective_ellipses();
        // stable, so equal zorders keep document order
        ellipses.sort_by_key(|e| e.zorder);
        for ellipse in ellipses {
            let Some(points) = self.lookup("ellipse", &[ellipse.center.as_str()]) else {
                continue;
            };
            let stroke = self
                .stroke(&config.line_color, config.line_width)
                .with_style(ellipse.style);
            self.push(EllipseShape {
                center: points[0],
                width: ellipse.width,
                height: ellipse.height,
                angle: ellipse.angle,
                fill: ellipse.fill.then(|| config.background_color.clone()),
                stroke,
            });
        }
    }

    /// Markers and labels for every positioned point
    fn add_points(&mut self) {
        let ctx = self.ctx;
        let config = ctx.config;
        for (label, at) in ctx.positions.iter() {
            if config.show_points {
                self.push(MarkerShape {
                    at,
                    radius: config.point_radius,
                    color: config.line_color.clone(),
                });
            }
            let anchor = label_anchor(at, ctx.centroid, ctx.label_offset);
            self.label(anchor, label, &config.line_color, Layer::Labels);
        }
    }
}
