//! Geometry figure model
//!
//! Plain data: the parser fills these in once and everything downstream only
//! reads them. Points are referred to by label everywhere; a label that is
//! used but never declared as a [`Point`] is still a point of the figure.

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;

/// Figure category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FigureType {
    // Circle-related
    CircleInscribedAngle,
    CircleTangent,
    CircleChord,
    CircleSecant,
    CyclicQuadrilateral,
    AlternateSegment,
    // Triangle-related
    SimilarTriangles,
    CongruentTriangles,
    TriangleProperties,
    /// Basic Proportionality Theorem
    BptTriangle,
    // Constructions
    ConstructionTangent,
    ConstructionCircumcircle,
    ConstructionIncircle,
    ConstructionLocus,
    // Coordinate geometry
    CoordinatePoints,
    CoordinateLine,
    CoordinateReflection,
    // Mensuration (3D solids drawn in perspective)
    MensurationCylinder,
    MensurationCone,
    MensurationSphere,
    MensurationCombined,
    #[default]
    Generic,
}

impl FigureType {
    pub const ALL: [FigureType; 22] = [
        FigureType::CircleInscribedAngle,
        FigureType::CircleTangent,
        FigureType::CircleChord,
        FigureType::CircleSecant,
        FigureType::CyclicQuadrilateral,
        FigureType::AlternateSegment,
        FigureType::SimilarTriangles,
        FigureType::CongruentTriangles,
        FigureType::TriangleProperties,
        FigureType::BptTriangle,
        FigureType::ConstructionTangent,
        FigureType::ConstructionCircumcircle,
        FigureType::ConstructionIncircle,
        FigureType::ConstructionLocus,
        FigureType::CoordinatePoints,
        FigureType::CoordinateLine,
        FigureType::CoordinateReflection,
        FigureType::MensurationCylinder,
        FigureType::MensurationCone,
        FigureType::MensurationSphere,
        FigureType::MensurationCombined,
        FigureType::Generic,
    ];

    /// The tag used in figure blocks
    pub fn as_str(self) -> &'static str {
        match self {
            FigureType::CircleInscribedAngle => "circle_inscribed_angle",
            FigureType::CircleTangent => "circle_tangent",
            FigureType::CircleChord => "circle_chord",
            FigureType::CircleSecant => "circle_secant",
            FigureType::CyclicQuadrilateral => "cyclic_quadrilateral",
            FigureType::AlternateSegment => "alternate_segment",
            FigureType::SimilarTriangles => "similar_triangles",
            FigureType::CongruentTriangles => "congruent_triangles",
            FigureType::TriangleProperties => "triangle_properties",
            FigureType::BptTriangle => "bpt_triangle",
            FigureType::ConstructionTangent => "construction_tangent",
            FigureType::ConstructionCircumcircle => "construction_circumcircle",
            FigureType::ConstructionIncircle => "construction_incircle",
            FigureType::ConstructionLocus => "construction_locus",
            FigureType::CoordinatePoints => "coordinate_points",
            FigureType::CoordinateLine => "coordinate_line",
            FigureType::CoordinateReflection => "coordinate_reflection",
            FigureType::MensurationCylinder => "mensuration_cylinder",
            FigureType::MensurationCone => "mensuration_cone",
            FigureType::MensurationSphere => "mensuration_sphere",
            FigureType::MensurationCombined => "mensuration_combined",
            FigureType::Generic => "generic",
        }
    }

    /// Look up a tag; anything unknown is `Generic`.
    pub fn from_tag(tag: &str) -> FigureType {
        let tag = tag.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .unwrap_or(FigureType::Generic)
    }
}

impl std::fmt::Display for FigureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stroke pattern for lines and outlines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// Unknown names fall back to solid.
    pub fn from_name(name: &str) -> LineStyle {
        match name.trim().to_ascii_lowercase().as_str() {
            "dashed" => LineStyle::Dashed,
            "dotted" => LineStyle::Dotted,
            _ => LineStyle::Solid,
        }
    }
}

/// How many concentric arcs mark an angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArcStyle {
    #[default]
    Single,
    Double,
    Triple,
}

impl ArcStyle {
    pub fn from_name(name: &str) -> ArcStyle {
        match name.trim().to_ascii_lowercase().as_str() {
            "double" => ArcStyle::Double,
            "triple" => ArcStyle::Triple,
            _ => ArcStyle::Single,
        }
    }

    pub fn count(self) -> usize {
        match self {
            ArcStyle::Single => 1,
            ArcStyle::Double => 2,
            ArcStyle::Triple => 3,
        }
    }
}

/// A labeled point
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Point {
    pub label: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Center label of a circle this point lies on
    pub on_circle: Option<String>,
    /// Relational placement, e.g. "midpoint of AB"
    pub description: Option<String>,
}

impl Point {
    pub fn new(label: impl Into<String>) -> Self {
        Point {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn at(label: impl Into<String>, x: f64, y: f64) -> Self {
        Point {
            label: label.into(),
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn described(label: impl Into<String>, description: impl Into<String>) -> Self {
        Point {
            label: label.into(),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    /// Explicit coordinates, when both are present
    pub fn coords(&self) -> Option<(f64, f64)> {
        self.x.zip(self.y)
    }
}

/// A segment, ray or extended line between two points
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub start: String,
    pub end: String,
    pub style: LineStyle,
    pub label: Option<String>,
    pub is_ray: bool,
    pub is_extended: bool,
}

impl Line {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Line {
            start: start.into(),
            end: end.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Circle {
    pub center: String,
    /// Falls back to the configured default radius
    pub radius: Option<f64>,
    pub radius_label: Option<String>,
    /// Labels of points on the circumference
    pub points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Angle {
    pub vertex: String,
    pub ray1_end: String,
    pub ray2_end: String,
    /// Literal annotation, e.g. "32°" or "2x+10"
    pub value: Option<String>,
    /// Draw the arc (the value label is drawn either way)
    pub marked: bool,
    pub arc_style: ArcStyle,
    /// Mark the reflex angle instead of the minor one
    pub is_major: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Triangle {
    pub vertices: [String; 3],
    pub inscribed_in: Option<String>,
    pub circumscribed_around: Option<String>,
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Quadrilateral {
    pub vertices: [String; 4],
    pub is_cyclic: bool,
    pub inscribed_in: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tangent {
    pub circle_center: String,
    pub point_of_tangency: String,
    pub external_point: Option<String>,
    pub label: Option<String>,
}

/// An arc of a circle between two points on it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arc {
    pub circle_center: String,
    pub start_point: String,
    pub end_point: String,
    pub label: Option<String>,
    pub is_major: bool,
}

/// A projected ellipse, used for the bases of 3D solids.
///
/// Read from `raw.ellipses`; not a first-class element of the grammar.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PerspectiveEllipse {
    pub center: String,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees, counter-clockwise
    pub angle: f64,
    pub fill: bool,
    pub style: LineStyle,
    /// Draw order among ellipses only, lowest first. All ellipses share one
    /// layer above lines, polygons and arcs whatever their zorder.
    pub zorder: i32,
}

impl Default for PerspectiveEllipse {
    fn default() -> Self {
        PerspectiveEllipse {
            center: String::new(),
            width: 2.0,
            height: 1.0,
            angle: 0.0,
            fill: false,
            style: LineStyle::Solid,
            zorder: 2,
        }
    }
}

/// A complete figure: the aggregate root handed to layout and rendering
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryFigure {
    pub figure_type: FigureType,
    pub description: String,

    pub points: Vec<Point>,
    pub lines: Vec<Line>,
    pub circles: Vec<Circle>,
    pub angles: Vec<Angle>,
    pub triangles: Vec<Triangle>,
    pub quadrilaterals: Vec<Quadrilateral>,
    pub tangents: Vec<Tangent>,
    pub arcs: Vec<Arc>,

    pub given_values: IndexMap<String, String>,
    pub find_values: Vec<String>,

    /// Pre-rendered image that replaces rendering
    pub image_ref: Option<String>,
    /// The decoded block, for renderer extensions
    pub raw: Option<serde_yaml::Value>,
}

impl GeometryFigure {
    pub fn new(figure_type: FigureType, description: impl Into<String>) -> Self {
        GeometryFigure {
            figure_type,
            description: description.into(),
            ..Default::default()
        }
    }

    /// Every label referenced anywhere in the figure, in order of first appearance.
    pub fn all_point_labels(&self) -> Vec<String> {
        let mut labels: IndexSet<&str> = IndexSet::new();
        for p in &self.points {
            labels.insert(&p.label);
        }
        for line in &self.lines {
            labels.insert(&line.start);
            labels.insert(&line.end);
        }
        for circle in &self.circles {
            labels.insert(&circle.center);
            labels.extend(circle.points.iter().map(String::as_str));
        }
        for angle in &self.angles {
            labels.insert(&angle.vertex);
            labels.insert(&angle.ray1_end);
            labels.insert(&angle.ray2_end);
        }
        for tri in &self.triangles {
            labels.extend(tri.vertices.iter().map(String::as_str));
        }
        for quad in &self.quadrilaterals {
            labels.extend(quad.vertices.iter().map(String::as_str));
        }
        for tangent in &self.tangents {
            labels.insert(&tangent.circle_center);
            labels.insert(&tangent.point_of_tangency);
            if let Some(ext) = &tangent.external_point {
                labels.insert(ext);
            }
        }
        for arc in &self.arcs {
            labels.insert(&arc.circle_center);
            labels.insert(&arc.start_point);
            labels.insert(&arc.end_point);
        }
        labels.into_iter().map(str::to_string).collect()
    }

    /// Labels that carry structure: declared points plus everything lines,
    /// circles, polygons and tangents touch. Angles and arcs only annotate.
    pub fn structural_labels(&self) -> IndexSet<&str> {
        let mut labels: IndexSet<&str> = self.points.iter().map(|p| p.label.as_str()).collect();
        for line in &self.lines {
            labels.insert(&line.start);
            labels.insert(&line.end);
        }
        for circle in &self.circles {
            labels.insert(&circle.center);
            labels.extend(circle.points.iter().map(String::as_str));
        }
        for tri in &self.triangles {
            labels.extend(tri.vertices.iter().map(String::as_str));
        }
        for quad in &self.quadrilaterals {
            labels.extend(quad.vertices.iter().map(String::as_str));
        }
        for tangent in &self.tangents {
            labels.insert(&tangent.circle_center);
            labels.insert(&tangent.point_of_tangency);
            if let Some(ext) = &tangent.external_point {
                labels.insert(ext);
            }
        }
        labels
    }

    /// The circle centered at `center`, if the figure declares one
    pub fn circle(&self, center: &str) -> Option<&Circle> {
        self.circles.iter().find(|c| c.center == center)
    }

    /// Perspective ellipses from the raw escape hatch. Malformed entries are dropped.
    pub fn perspective_ellipses(&self) -> Vec<PerspectiveEllipse> {
        let Some(list) = self
            .raw
            .as_ref()
            .and_then(|raw| raw.get("ellipses"))
            .and_then(|v| v.as_sequence())
        else {
            return Vec::new();
        };
        list.iter()
            .filter_map(|entry| serde_yaml::from_value::<PerspectiveEllipse>(entry.clone()).ok())
            .filter(|e| !e.center.is_empty())
            .collect()
    }

    /// True when the figure has something for the layout engine to place
    pub fn has_elements(&self) -> bool {
        !(self.points.is_empty()
            && self.lines.is_empty()
            && self.circles.is_empty()
            && self.angles.is_empty()
            && self.triangles.is_empty()
            && self.quadrilaterals.is_empty()
            && self.tangents.is_empty()
            && self.arcs.is_empty())
    }
}
