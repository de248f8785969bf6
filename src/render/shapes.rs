//! Drawable primitives
//!
//! The renderer resolves every figure element against the position map into
//! one or more shapes. Shapes hold figure-space geometry; each knows which
//! layer it belongs to and how to emit itself as SVG nodes.

use enum_dispatch::enum_dispatch;
use facet_svg::{
    Circle as SvgCircle, Ellipse as SvgEllipse, Line as SvgLine, Path as SvgPath,
    Polygon as SvgPolygon, Polyline as SvgPolyline, SvgNode, Text as SvgText, points_attr,
};
use glam::DVec2;

use crate::schema::LineStyle;
use crate::types::UnitVec;

use super::context::RenderContext;
use super::defaults;
use super::geometry::Sweep;
use super::svg::{fmt_num, round_px};

/// Drawing layers, back to front. Each becomes one `<g>` in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Circles,
    Lines,
    Triangles,
    Quadrilaterals,
    Tangents,
    Angles,
    Arcs,
    Ellipses,
    Points,
    Labels,
}

impl Layer {
    pub const ALL: [Layer; 10] = [
        Layer::Circles,
        Layer::Lines,
        Layer::Triangles,
        Layer::Quadrilaterals,
        Layer::Tangents,
        Layer::Angles,
        Layer::Arcs,
        Layer::Ellipses,
        Layer::Points,
        Layer::Labels,
    ];

    /// Group id in the SVG document
    pub fn name(self) -> &'static str {
        match self {
            Layer::Circles => "circles",
            Layer::Lines => "lines",
            Layer::Triangles => "triangles",
            Layer::Quadrilaterals => "quadrilaterals",
            Layer::Tangents => "tangents",
            Layer::Angles => "angles",
            Layer::Arcs => "arcs",
            Layer::Ellipses => "ellipses",
            Layer::Points => "points",
            Layer::Labels => "labels",
        }
    }
}

/// Stroke color, width (points) and dash style
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    pub style: LineStyle,
}

impl Stroke {
    pub fn new(color: &str, width: f64) -> Self {
        Stroke {
            color: color.to_string(),
            width,
            style: LineStyle::Solid,
        }
    }

    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    fn width_attr(&self, ctx: &RenderContext) -> Option<String> {
        Some(fmt_num(ctx.pt(self.width)))
    }

    /// Dash lengths scale with the stroke width
    fn dasharray(&self, ctx: &RenderContext) -> Option<String> {
        let pattern = match self.style {
            LineStyle::Solid => return None,
            LineStyle::Dashed => defaults::DASHED_PATTERN,
            LineStyle::Dotted => defaults::DOTTED_PATTERN,
        };
        let width = ctx.pt(self.width);
        Some(
            pattern
                .iter()
                .map(|p| fmt_num(p * width))
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

/// Common behavior for all shapes
#[enum_dispatch]
pub trait Shape {
    fn layer(&self) -> Layer;

    /// Render this shape to SVG nodes
    fn render_svg(&self, ctx: &RenderContext) -> Vec<SvgNode>;
}

fn px_points(ctx: &RenderContext, points: &[DVec2]) -> String {
    points_attr(points.iter().map(|p| {
        let q = ctx.px(*p);
        (round_px(q.x), round_px(q.y))
    }))
}

// ============================================================================
// Shape Types
// ============================================================================

/// A circle outline
#[derive(Debug, Clone)]
pub struct CircleShape {
    pub center: DVec2,
    pub radius: f64,
    pub stroke: Stroke,
}

impl Shape for CircleShape {
    fn layer(&self) -> Layer {
        Layer::Circles
    }

    fn render_svg(&self, ctx: &RenderContext) -> Vec<SvgNode> {
        let c = ctx.px(self.center);
        vec![SvgNode::Circle(SvgCircle {
            cx: Some(c.x),
            cy: Some(c.y),
            r: Some(ctx.len(self.radius)),
            fill: Some("none".to_string()),
            stroke: Some(self.stroke.color.clone()),
            stroke_width: self.stroke.width_attr(ctx),
            stroke_dasharray: self.stroke.dasharray(ctx),
        })]
    }
}

/// A straight segment
#[derive(Debug, Clone)]
pub struct SegmentShape {
    pub start: DVec2,
    pub end: DVec2,
    pub stroke: Stroke,
    pub layer: Layer,
}

impl Shape for SegmentShape {
    fn layer(&self) -> Layer {
        self.layer
    }

    fn render_svg(&self, ctx: &RenderContext) -> Vec<SvgNode> {
        let (a, b) = (ctx.px(self.start), ctx.px(self.end));
        vec![SvgNode::Line(SvgLine {
            x1: Some(a.x),
            y1: Some(a.y),
            x2: Some(b.x),
            y2: Some(b.y),
            stroke: Some(self.stroke.color.clone()),
            stroke_width: self.stroke.width_attr(ctx),
            stroke_dasharray: self.stroke.dasharray(ctx),
            stroke_linecap: Some("round".to_string()),
        })]
    }
}

/// A closed outline through the vertices in order
#[derive(Debug, Clone)]
pub struct PolygonShape {
    pub vertices: Vec<DVec2>,
    pub stroke: Stroke,
    pub layer: Layer,
}

impl Shape for PolygonShape {
    fn layer(&self) -> Layer {
        self.layer
    }

    fn render_svg(&self, ctx: &RenderContext) -> Vec<SvgNode> {
        vec![SvgNode::Polygon(SvgPolygon {
            points: Some(px_points(ctx, &self.vertices)),
            fill: Some("none".to_string()),
            stroke: Some(self.stroke.color.clone()),
            stroke_width: self.stroke.width_attr(ctx),
            stroke_dasharray: self.stroke.dasharray(ctx),
            stroke_linejoin: Some("round".to_string()),
        })]
    }
}

/// The right-angle square drawn where a tangent touches its circle
#[derive(Debug, Clone)]
pub struct RightAngleMark {
    pub corners: [DVec2; 4],
    pub stroke: Stroke,
}

impl Shape for RightAngleMark {
    fn layer(&self) -> Layer {
        Layer::Tangents
    }

    fn render_svg(&self, ctx: &RenderContext) -> Vec<SvgNode> {
        let [a, b, c, d] = self.corners;
        vec![SvgNode::Polyline(SvgPolyline {
            points: Some(px_points(ctx, &[a, b, c, d, a])),
            fill: Some("none".to_string()),
            stroke: Some(self.stroke.color.clone()),
            stroke_width: self.stroke.width_attr(ctx),
        })]
    }
}

/// A circular arc, counter-clockwise through `sweep` in figure space
#[derive(Debug, Clone)]
pub struct ArcShape {
    pub center: DVec2,
    pub radius: f64,
    pub sweep: Sweep,
    pub stroke: Stroke,
    pub layer: Layer,
}

impl ArcShape {
    /// SVG path data. Y is flipped, so counter-clockwise in the figure is
    /// sweep-flag 0 on screen. A full turn is split in two halves since a
    /// single arc command cannot end where it starts.
    pub fn path_data(&self, ctx: &RenderContext) -> Option<String> {
        let span = self.sweep.span();
        if !(span > 0.0) || !span.is_finite() || self.radius <= 0.0 {
            return None;
        }
        let r = fmt_num(ctx.len(self.radius));
        let at = |deg: f64| {
            let p = ctx.px(self.center + UnitVec::from_degrees(deg) * self.radius);
            format!("{} {}", fmt_num(p.x), fmt_num(p.y))
        };

        let mut d = format!("M {}", at(self.sweep.start));
        if span >= 360.0 {
            let half = self.sweep.start + 180.0;
            d.push_str(&format!(" A {r} {r} 0 0 0 {}", at(half)));
            d.push_str(&format!(" A {r} {r} 0 0 0 {}", at(self.sweep.start + 360.0)));
        } else {
            let large = if span > 180.0 { 1 } else { 0 };
            d.push_str(&format!(" A {r} {r} 0 {large} 0 {}", at(self.sweep.end)));
        }
        Some(d)
    }
}

impl Shape for ArcShape {
    fn layer(&self) -> Layer {
        self.layer
    }

    fn render_svg(&self, ctx: &RenderContext) -> Vec<SvgNode> {
        let Some(d) = self.path_data(ctx) else {
            return Vec::new();
        };
        vec![SvgNode::Path(SvgPath {
            d: Some(d),
            fill: Some("none".to_string()),
            stroke: Some(self.stroke.color.clone()),
            stroke_width: self.stroke.width_attr(ctx),
            stroke_dasharray: self.stroke.dasharray(ctx),
        })]
    }
}

/// A rotated ellipse; `width`/`height` are full axes in figure units
#[derive(Debug, Clone)]
pub struct EllipseShape {
    pub center: DVec2,
    pub width: f64,
    pub height: f64,
    /// Degrees, counter-clockwise
    pub angle: f64,
    /// Paint the interior, hiding what lies behind
    pub fill: Option<String>,
    pub stroke: Stroke,
}

impl Shape for EllipseShape {
    fn layer(&self) -> Layer {
        Layer::Ellipses
    }

    fn render_svg(&self, ctx: &RenderContext) -> Vec<SvgNode> {
        let c = ctx.px(self.center);
        // SVG rotates clockwise on screen
        let transform = (self.angle != 0.0).then(|| {
            format!(
                "rotate({} {} {})",
                fmt_num(-self.angle),
                fmt_num(c.x),
                fmt_num(c.y)
            )
        });
        vec![SvgNode::Ellipse(SvgEllipse {
            cx: Some(c.x),
            cy: Some(c.y),
            rx: Some(ctx.len(self.width / 2.0)),
            ry: Some(ctx.len(self.height / 2.0)),
            transform,
            fill: Some(self.fill.clone().unwrap_or_else(|| "none".to_string())),
            stroke: Some(self.stroke.color.clone()),
            stroke_width: self.stroke.width_attr(ctx),
            stroke_dasharray: self.stroke.dasharray(ctx),
        })]
    }
}

/// A filled dot marking a point; radius in typographic points
#[derive(Debug, Clone)]
pub struct MarkerShape {
    pub at: DVec2,
    pub radius: f64,
    pub color: String,
}

impl Shape for MarkerShape {
    fn layer(&self) -> Layer {
        Layer::Points
    }

    fn render_svg(&self, ctx: &RenderContext) -> Vec<SvgNode> {
        let c = ctx.px(self.at);
        vec![SvgNode::Circle(SvgCircle {
            cx: Some(c.x),
            cy: Some(c.y),
            r: Some(ctx.pt(self.radius)),
            fill: Some(self.color.clone()),
            ..Default::default()
        })]
    }
}

/// Bold text centered on `at`, with a halo in the background color
#[derive(Debug, Clone)]
pub struct LabelShape {
    pub at: DVec2,
    pub text: String,
    pub color: String,
    pub layer: Layer,
}

impl Shape for LabelShape {
    fn layer(&self) -> Layer {
        self.layer
    }

    fn render_svg(&self, ctx: &RenderContext) -> Vec<SvgNode> {
        let p = ctx.px(self.at);
        let halo = format!(
            "paint-order:stroke;stroke:{};stroke-width:{}px;stroke-linejoin:round",
            ctx.config.background_color,
            fmt_num(defaults::LABEL_HALO_WIDTH)
        );
        vec![SvgNode::Text(SvgText {
            x: Some(p.x),
            y: Some(p.y),
            fill: Some(self.color.clone()),
            style: Some(halo),
            font_family: Some(ctx.config.font_family.clone()),
            font_size: Some(format!("{}px", fmt_num(ctx.pt(ctx.config.font_size)))),
            font_weight: Some("bold".to_string()),
            text_anchor: Some("middle".to_string()),
            dominant_baseline: Some("central".to_string()),
            content: self.text.clone(),
        })]
    }
}

// ============================================================================
// Shape Enum
// ============================================================================

/// Any drawable primitive
#[enum_dispatch(Shape)]
#[derive(Debug, Clone)]
pub enum ShapeEnum {
    Circle(CircleShape),
    Segment(SegmentShape),
    Polygon(PolygonShape),
    RightAngle(RightAngleMark),
    Arc(ArcShape),
    Ellipse(EllipseShape),
    Marker(MarkerShape),
    Label(LabelShape),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::layout::Positions;
    use glam::dvec2;

    fn with_ctx(f: impl FnOnce(&RenderContext)) {
        let config = RenderConfig::default();
        let positions: Positions = [("A", dvec2(-5.0, -5.0)), ("B", dvec2(5.0, 5.0))]
            .into_iter()
            .collect();
        let ctx = RenderContext::new(&config, &positions).unwrap();
        f(&ctx)
    }

    #[test]
    fn layers_are_ordered_back_to_front() {
        let mut sorted = Layer::ALL;
        sorted.sort();
        assert_eq!(sorted, Layer::ALL);
        assert_eq!(Layer::ALL.first(), Some(&Layer::Circles));
        assert_eq!(Layer::ALL.last(), Some(&Layer::Labels));
    }

    #[test]
    fn dash_arrays_scale_with_width() {
        with_ctx(|ctx| {
            // 0.75pt is exactly 1px
            let dashed = Stroke::new("black", 0.75).with_style(LineStyle::Dashed);
            assert_eq!(dashed.dasharray(ctx).as_deref(), Some("3.7,1.6"));
            let dotted = Stroke::new("black", 1.5).with_style(LineStyle::Dotted);
            assert_eq!(dotted.dasharray(ctx).as_deref(), Some("2,3.3"));
            assert_eq!(Stroke::new("black", 1.0).dasharray(ctx), None);
        });
    }

    #[test]
    fn minor_arc_uses_small_arc_flag() {
        with_ctx(|ctx| {
            let arc = ArcShape {
                center: DVec2::ZERO,
                radius: 1.0,
                sweep: Sweep { start: 0.0, end: 90.0 },
                stroke: Stroke::new("red", 1.5),
                layer: Layer::Angles,
            };
            let d = arc.path_data(ctx).unwrap();
            assert!(d.starts_with("M "));
            assert_eq!(d.matches(" A ").count(), 1);
            assert!(d.contains(" 0 0 0 "), "{d}");
        });
    }

    #[test]
    fn full_turn_is_two_arcs() {
        with_ctx(|ctx| {
            let arc = ArcShape {
                center: DVec2::ZERO,
                radius: 1.0,
                sweep: Sweep { start: 10.0, end: 370.0 },
                stroke: Stroke::new("red", 1.5),
                layer: Layer::Arcs,
            };
            assert_eq!(arc.path_data(ctx).unwrap().matches(" A ").count(), 2);
        });
    }

    #[test]
    fn empty_sweep_draws_nothing() {
        with_ctx(|ctx| {
            let arc: ShapeEnum = ArcShape {
                center: DVec2::ZERO,
                radius: 1.0,
                sweep: Sweep { start: 30.0, end: 30.0 },
                stroke: Stroke::new("red", 1.5),
                layer: Layer::Arcs,
            }
            .into();
            assert!(arc.render_svg(ctx).is_empty());
        });
    }

    #[test]
    fn labels_carry_a_halo() {
        with_ctx(|ctx| {
            let label: ShapeEnum = LabelShape {
                at: DVec2::ZERO,
                text: "A".to_string(),
                color: "black".to_string(),
                layer: Layer::Labels,
            }
            .into();
            let nodes = label.render_svg(ctx);
            let SvgNode::Text(text) = &nodes[0] else {
                panic!("expected text, got {}", nodes[0].tag());
            };
            assert_eq!(text.content, "A");
            assert!(text.style.as_deref().unwrap().contains("stroke:white"));
            assert_eq!(text.font_weight.as_deref(), Some("bold"));
        });
    }
}
