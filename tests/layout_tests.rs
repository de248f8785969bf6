//! Point layout: relational descriptions, constructions and the fallback grid

use geofig::layout::PointLayoutEngine;
use geofig::schema::{
    Angle, Circle, FigureType, GeometryFigure, Point, Quadrilateral, Tangent, Triangle,
};
use geofig::{FigureParser, LayoutConfig};
use glam::{DVec2, dvec2};

const EPS: f64 = 1e-9;

fn assert_near(actual: Option<DVec2>, expected: DVec2) {
    let actual = actual.expect("label was not placed");
    assert!(
        (actual - expected).length() < EPS,
        "expected {expected:?}, got {actual:?}"
    );
}

fn resolve(figure: &GeometryFigure) -> geofig::Positions {
    PointLayoutEngine::new(LayoutConfig::default()).resolve(figure)
}

fn with_points(points: Vec<Point>) -> GeometryFigure {
    GeometryFigure {
        figure_type: FigureType::Generic,
        points,
        ..Default::default()
    }
}

fn circle(center: &str, radius: Option<f64>) -> Circle {
    Circle {
        center: center.to_string(),
        radius,
        ..Default::default()
    }
}

#[test]
fn midpoint_of_segment() {
    let fig = with_points(vec![
        Point::at("A", 0.0, 0.0),
        Point::at("B", 10.0, 0.0),
        Point::described("M", "M is the midpoint of AB"),
    ]);
    assert_near(resolve(&fig).get("M"), dvec2(5.0, 0.0));
}

#[test]
fn lone_point_on_segment_uses_default_ratio() {
    let fig = with_points(vec![
        Point::at("A", 0.0, 0.0),
        Point::at("B", 10.0, 0.0),
        Point::described("D", "D lies on AB"),
    ]);
    assert_near(resolve(&fig).get("D"), dvec2(4.0, 0.0));
}

#[test]
fn intersection_of_diagonals() {
    let fig = with_points(vec![
        Point::at("A", 0.0, 0.0),
        Point::at("C", 10.0, 0.0),
        Point::at("B", 5.0, 5.0),
        Point::at("D", 5.0, -5.0),
        Point::described("P", "intersection of AC and BD"),
    ]);
    assert_near(resolve(&fig).get("P"), dvec2(5.0, 0.0));
}

#[test]
fn parallel_lines_fall_back_to_grid() {
    let fig = with_points(vec![
        Point::at("A", 0.0, 0.0),
        Point::at("B", 1.0, 0.0),
        Point::at("C", 0.0, 1.0),
        Point::at("D", 1.0, 1.0),
        Point::described("P", "intersection of AB and CD"),
    ]);
    let config = LayoutConfig::default();
    assert_near(resolve(&fig).get("P"), config.grid_cell(0));
}

#[test]
fn foot_of_altitude() {
    let fig = with_points(vec![
        Point::at("A", 2.0, 5.0),
        Point::at("B", 0.0, 0.0),
        Point::at("C", 6.0, 0.0),
        Point::described("H", "foot of the altitude from A to BC"),
    ]);
    assert_near(resolve(&fig).get("H"), dvec2(2.0, 0.0));
}

#[test]
fn described_points_chain_across_passes() {
    // N depends on M, declared after it
    let fig = with_points(vec![
        Point::described("N", "midpoint of AM"),
        Point::at("A", 0.0, 0.0),
        Point::at("B", 8.0, 0.0),
        Point::described("M", "midpoint of AB"),
    ]);
    let pos = resolve(&fig);
    assert_near(pos.get("M"), dvec2(4.0, 0.0));
    assert_near(pos.get("N"), dvec2(2.0, 0.0));
}

#[test]
fn resolve_is_deterministic() {
    let figure = FigureParser::new().parse(
        "type: circle_theorem\nelements:\n  - circle:\n      center: O\n      points: [A, B, C]\n  - quadrilateral:\n      vertices: [P, Q, R, S]\n      cyclic: true\n  - point:\n      label: M\n      description: midpoint of AB\n",
    );
    let first = resolve(&figure);
    for _ in 0..5 {
        assert_eq!(resolve(&figure), first);
    }
}

#[test]
fn every_referenced_label_is_placed() {
    let figure = FigureParser::new().parse(
        "type: generic\nelements:\n  - line:\n      points: [U, V]\n  - angle:\n      vertex: X\n      rays: [Y, Z]\n  - tangent:\n      circle: O\n      point: T\n      external_point: E\n  - point:\n      label: K\n      description: somewhere nice\n",
    );
    let pos = resolve(&figure);
    for label in figure.all_point_labels() {
        assert!(pos.contains(&label), "{label} has no position");
    }
    assert_eq!(pos.len(), figure.all_point_labels().len());
}

#[test]
fn tangent_point_and_external_point() {
    let fig = GeometryFigure {
        circles: vec![circle("O", None)],
        tangents: vec![Tangent {
            circle_center: "O".into(),
            point_of_tangency: "T".into(),
            external_point: Some("P".into()),
            label: None,
        }],
        ..Default::default()
    };
    let pos = resolve(&fig);
    assert_near(pos.get("O"), dvec2(0.0, 0.0));
    assert_near(pos.get("T"), dvec2(3.0, 0.0));
    assert_near(pos.get("P"), dvec2(3.0, 2.0));
}

#[test]
fn inscribed_triangle_uses_triangle_angles() {
    let fig = GeometryFigure {
        circles: vec![circle("O", Some(2.0))],
        triangles: vec![Triangle {
            vertices: ["A", "B", "C"].map(String::from),
            inscribed_in: Some("O".into()),
            ..Default::default()
        }],
        ..Default::default()
    };
    let pos = resolve(&fig);
    let config = LayoutConfig::default();
    for (label, degrees) in ["A", "B", "C"].iter().zip(config.triangle_angles) {
        let rad = degrees.to_radians();
        assert_near(pos.get(label), dvec2(2.0 * rad.cos(), 2.0 * rad.sin()));
    }
}

#[test]
fn cyclic_quadrilateral_uses_first_circle() {
    let fig = GeometryFigure {
        circles: vec![circle("O", None)],
        quadrilaterals: vec![Quadrilateral {
            vertices: ["A", "B", "C", "D"].map(String::from),
            is_cyclic: true,
            inscribed_in: None,
        }],
        ..Default::default()
    };
    let pos = resolve(&fig);
    let config = LayoutConfig::default();
    for (label, degrees) in ["A", "B", "C", "D"].iter().zip(config.quadrilateral_angles) {
        let rad = degrees.to_radians();
        assert_near(pos.get(label), dvec2(3.0 * rad.cos(), 3.0 * rad.sin()));
        assert!((pos.get(label).unwrap().length() - 3.0).abs() < EPS);
    }
}

#[test]
fn free_triangle_uses_default_shape() {
    let fig = GeometryFigure {
        triangles: vec![Triangle {
            vertices: ["A", "B", "C"].map(String::from),
            ..Default::default()
        }],
        ..Default::default()
    };
    let pos = resolve(&fig);
    assert_near(pos.get("A"), dvec2(0.0, 3.0));
    assert_near(pos.get("B"), dvec2(-2.5, -1.5));
    assert_near(pos.get("C"), dvec2(2.5, -1.5));
}

#[test]
fn circle_points_spread_clockwise_from_top() {
    let fig = GeometryFigure {
        circles: vec![Circle {
            points: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            ..circle("O", Some(1.0))
        }],
        ..Default::default()
    };
    let pos = resolve(&fig);
    assert_near(pos.get("A"), dvec2(0.0, 1.0));
    assert_near(pos.get("B"), dvec2(1.0, 0.0));
    assert_near(pos.get("C"), dvec2(0.0, -1.0));
    assert_near(pos.get("D"), dvec2(-1.0, 0.0));
}

#[test]
fn unconstrained_labels_fill_the_grid() {
    let fig = GeometryFigure {
        angles: vec![Angle {
            vertex: "X".into(),
            ray1_end: "Y".into(),
            ray2_end: "Z".into(),
            ..Default::default()
        }],
        ..Default::default()
    };
    let pos = resolve(&fig);
    assert_near(pos.get("X"), dvec2(-4.0, 4.0));
    assert_near(pos.get("Y"), dvec2(-2.0, 4.0));
    assert_near(pos.get("Z"), dvec2(0.0, 4.0));
}

#[test]
fn grid_skips_occupied_cells() {
    let fig = GeometryFigure {
        points: vec![Point::at("A", -4.0, 4.0)],
        angles: vec![Angle {
            vertex: "A".into(),
            ray1_end: "B".into(),
            ray2_end: "C".into(),
            ..Default::default()
        }],
        ..Default::default()
    };
    let pos = resolve(&fig);
    assert_near(pos.get("A"), dvec2(-4.0, 4.0));
    assert_near(pos.get("B"), dvec2(-2.0, 4.0));
    assert_near(pos.get("C"), dvec2(0.0, 4.0));
}

#[test]
fn nearly_occupied_grid_cell_is_still_free() {
    // 1e-5 away from the first cell: far more than the tolerance
    let fig = GeometryFigure {
        points: vec![Point::at("A", -4.0, 4.00001)],
        angles: vec![Angle {
            vertex: "A".into(),
            ray1_end: "B".into(),
            ray2_end: "C".into(),
            ..Default::default()
        }],
        ..Default::default()
    };
    let pos = resolve(&fig);
    assert_near(pos.get("B"), dvec2(-4.0, 4.0));
    assert_near(pos.get("C"), dvec2(-2.0, 4.0));
}
