//! Facet-derived SVG element types.
//!
//! Only the elements a geometry canvas needs are modelled: grouping, the basic
//! shapes, paths and text. Every element round-trips through `facet-xml`.
//!
//! # Example
//!
//! ```rust
//! use facet_svg::{Circle, Svg, SvgNode};
//!
//! let svg = Svg {
//!     view_box: Some("0 0 10 10".to_string()),
//!     children: vec![SvgNode::Circle(Circle {
//!         cx: Some(5.0),
//!         cy: Some(5.0),
//!         r: Some(4.0),
//!         ..Default::default()
//!     })],
//!     ..Default::default()
//! };
//! let xml = facet_svg::facet_xml::to_string(&svg).unwrap();
//! assert!(xml.contains("circle"));
//! ```

use facet::Facet;
use facet_xml as xml;

/// SVG namespace URI
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Root SVG element
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Svg {
    #[facet(xml::attribute)]
    pub xmlns: Option<String>,
    #[facet(xml::attribute)]
    pub width: Option<String>,
    #[facet(xml::attribute)]
    pub height: Option<String>,
    #[facet(xml::attribute, rename = "viewBox")]
    pub view_box: Option<String>,
    #[facet(xml::elements)]
    pub children: Vec<SvgNode>,
}

/// Any node a canvas can hold
#[derive(Facet, Debug, Clone)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
#[repr(u8)]
pub enum SvgNode {
    #[facet(rename = "g")]
    G(Group),
    #[facet(rename = "rect")]
    Rect(Rect),
    #[facet(rename = "circle")]
    Circle(Circle),
    #[facet(rename = "ellipse")]
    Ellipse(Ellipse),
    #[facet(rename = "line")]
    Line(Line),
    #[facet(rename = "path")]
    Path(Path),
    #[facet(rename = "polygon")]
    Polygon(Polygon),
    #[facet(rename = "polyline")]
    Polyline(Polyline),
    #[facet(rename = "text")]
    Text(Text),
}

impl SvgNode {
    /// Element name as it appears in the serialized document.
    pub fn tag(&self) -> &'static str {
        match self {
            SvgNode::G(_) => "g",
            SvgNode::Rect(_) => "rect",
            SvgNode::Circle(_) => "circle",
            SvgNode::Ellipse(_) => "ellipse",
            SvgNode::Line(_) => "line",
            SvgNode::Path(_) => "path",
            SvgNode::Polygon(_) => "polygon",
            SvgNode::Polyline(_) => "polyline",
            SvgNode::Text(_) => "text",
        }
    }
}

/// SVG group element (`<g>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Group {
    #[facet(xml::attribute)]
    pub id: Option<String>,
    #[facet(xml::attribute)]
    pub class: Option<String>,
    #[facet(xml::attribute)]
    pub transform: Option<String>,
    #[facet(xml::elements)]
    pub children: Vec<SvgNode>,
}

/// SVG rect element (`<rect>`), used for canvas backgrounds
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Rect {
    #[facet(xml::attribute)]
    pub x: Option<f64>,
    #[facet(xml::attribute)]
    pub y: Option<f64>,
    #[facet(xml::attribute)]
    pub width: Option<f64>,
    #[facet(xml::attribute)]
    pub height: Option<f64>,
    #[facet(xml::attribute)]
    pub fill: Option<String>,
    #[facet(xml::attribute)]
    pub stroke: Option<String>,
}

/// SVG circle element (`<circle>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Circle {
    #[facet(xml::attribute)]
    pub cx: Option<f64>,
    #[facet(xml::attribute)]
    pub cy: Option<f64>,
    #[facet(xml::attribute)]
    pub r: Option<f64>,
    #[facet(xml::attribute)]
    pub fill: Option<String>,
    #[facet(xml::attribute)]
    pub stroke: Option<String>,
    #[facet(xml::attribute, rename = "stroke-width")]
    pub stroke_width: Option<String>,
    #[facet(xml::attribute, rename = "stroke-dasharray")]
    pub stroke_dasharray: Option<String>,
}

/// SVG ellipse element (`<ellipse>`); `transform` carries the rotation
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Ellipse {
    #[facet(xml::attribute)]
    pub cx: Option<f64>,
    #[facet(xml::attribute)]
    pub cy: Option<f64>,
    #[facet(xml::attribute)]
    pub rx: Option<f64>,
    #[facet(xml::attribute)]
    pub ry: Option<f64>,
    #[facet(xml::attribute)]
    pub transform: Option<String>,
    #[facet(xml::attribute)]
    pub fill: Option<String>,
    #[facet(xml::attribute)]
    pub stroke: Option<String>,
    #[facet(xml::attribute, rename = "stroke-width")]
    pub stroke_width: Option<String>,
    #[facet(xml::attribute, rename = "stroke-dasharray")]
    pub stroke_dasharray: Option<String>,
}

/// SVG line element (`<line>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Line {
    #[facet(xml::attribute)]
    pub x1: Option<f64>,
    #[facet(xml::attribute)]
    pub y1: Option<f64>,
    #[facet(xml::attribute)]
    pub x2: Option<f64>,
    #[facet(xml::attribute)]
    pub y2: Option<f64>,
    #[facet(xml::attribute)]
    pub stroke: Option<String>,
    #[facet(xml::attribute, rename = "stroke-width")]
    pub stroke_width: Option<String>,
    #[facet(xml::attribute, rename = "stroke-dasharray")]
    pub stroke_dasharray: Option<String>,
    #[facet(xml::attribute, rename = "stroke-linecap")]
    pub stroke_linecap: Option<String>,
}

/// SVG path element (`<path>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Path {
    #[facet(xml::attribute)]
    pub d: Option<String>,
    #[facet(xml::attribute)]
    pub fill: Option<String>,
    #[facet(xml::attribute)]
    pub stroke: Option<String>,
    #[facet(xml::attribute, rename = "stroke-width")]
    pub stroke_width: Option<String>,
    #[facet(xml::attribute, rename = "stroke-dasharray")]
    pub stroke_dasharray: Option<String>,
}

/// SVG polygon element (`<polygon>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Polygon {
    #[facet(xml::attribute)]
    pub points: Option<String>,
    #[facet(xml::attribute)]
    pub fill: Option<String>,
    #[facet(xml::attribute)]
    pub stroke: Option<String>,
    #[facet(xml::attribute, rename = "stroke-width")]
    pub stroke_width: Option<String>,
    #[facet(xml::attribute, rename = "stroke-dasharray")]
    pub stroke_dasharray: Option<String>,
    #[facet(xml::attribute, rename = "stroke-linejoin")]
    pub stroke_linejoin: Option<String>,
}

/// SVG polyline element (`<polyline>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Polyline {
    #[facet(xml::attribute)]
    pub points: Option<String>,
    #[facet(xml::attribute)]
    pub fill: Option<String>,
    #[facet(xml::attribute)]
    pub stroke: Option<String>,
    #[facet(xml::attribute, rename = "stroke-width")]
    pub stroke_width: Option<String>,
}

/// SVG text element (`<text>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Text {
    #[facet(xml::attribute)]
    pub x: Option<f64>,
    #[facet(xml::attribute)]
    pub y: Option<f64>,
    #[facet(xml::attribute)]
    pub fill: Option<String>,
    #[facet(xml::attribute)]
    pub style: Option<String>,
    #[facet(xml::attribute, rename = "font-family")]
    pub font_family: Option<String>,
    #[facet(xml::attribute, rename = "font-size")]
    pub font_size: Option<String>,
    #[facet(xml::attribute, rename = "font-weight")]
    pub font_weight: Option<String>,
    #[facet(xml::attribute, rename = "text-anchor")]
    pub text_anchor: Option<String>,
    #[facet(xml::attribute, rename = "dominant-baseline")]
    pub dominant_baseline: Option<String>,
    #[facet(xml::text)]
    pub content: String,
}

/// Format a `points` attribute from `(x, y)` pairs.
pub fn points_attr(points: impl IntoIterator<Item = (f64, f64)>) -> String {
    points
        .into_iter()
        .map(|(x, y)| format!("{},{}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

// Re-export facet_xml for convenience
pub use facet_xml;
