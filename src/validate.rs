//! Structural consistency checks for a parsed figure.
//!
//! Validation is advisory: layout and rendering accept invalid figures and do
//! their best with them.

use std::collections::HashSet;

use crate::schema::{FigureType, GeometryFigure};

/// The outcome of validating one figure
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    pub issues: Vec<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FigureValidator;

impl FigureValidator {
    pub fn new() -> Self {
        FigureValidator
    }

    pub fn validate(&self, figure: &GeometryFigure) -> Validation {
        let mut issues = Vec::new();

        if figure.description.trim().is_empty() {
            issues.push("Missing figure description".to_string());
        }

        let mut defined = HashSet::new();
        for p in &figure.points {
            if !defined.insert(p.label.as_str()) {
                issues.push(format!("Duplicate definition for point '{}'", p.label));
            }
        }

        for line in &figure.lines {
            if line.start == line.end {
                issues.push(format!("Line has same start and end point '{}'", line.start));
            }
        }

        for tri in &figure.triangles {
            if distinct(&tri.vertices) < 3 {
                issues.push(format!(
                    "Triangle {} must have 3 distinct vertices",
                    bracketed(&tri.vertices)
                ));
            }
        }

        for quad in &figure.quadrilaterals {
            if distinct(&quad.vertices) < 4 {
                issues.push(format!(
                    "Quadrilateral {} must have 4 distinct vertices",
                    bracketed(&quad.vertices)
                ));
            }
        }

        let structural = figure.structural_labels();
        for angle in &figure.angles {
            if !structural.contains(angle.vertex.as_str()) {
                issues.push(format!(
                    "Angle vertex '{}' not found in structural elements",
                    angle.vertex
                ));
            }
            for end in [&angle.ray1_end, &angle.ray2_end] {
                if !structural.contains(end.as_str()) {
                    issues.push(format!("Angle ray end '{end}' not found in structural elements"));
                }
            }
            if angle.vertex == angle.ray1_end || angle.vertex == angle.ray2_end {
                issues.push(format!(
                    "Angle vertex '{}' cannot be the same as a ray end",
                    angle.vertex
                ));
            }
        }

        if figure.figure_type == FigureType::Generic
            && (!figure.circles.is_empty()
                || !figure.triangles.is_empty()
                || !figure.tangents.is_empty()
                || !figure.quadrilaterals.is_empty())
        {
            issues.push(
                "Figure has elements but type is 'generic' - consider specifying type".to_string(),
            );
        }

        Validation { issues }
    }
}

fn distinct(labels: &[String]) -> usize {
    labels.iter().collect::<HashSet<_>>().len()
}

fn bracketed(labels: &[String]) -> String {
    format!("[{}]", labels.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Angle, Circle, Line, Point, Triangle};

    fn triangle(a: &str, b: &str, c: &str) -> Triangle {
        Triangle {
            vertices: [a.into(), b.into(), c.into()],
            ..Default::default()
        }
    }

    #[test]
    fn clean_figure_is_valid() {
        let mut fig = GeometryFigure::new(FigureType::TriangleProperties, "triangle ABC");
        fig.triangles.push(triangle("A", "B", "C"));
        fig.angles.push(Angle {
            vertex: "A".into(),
            ray1_end: "B".into(),
            ray2_end: "C".into(),
            marked: true,
            ..Default::default()
        });
        assert!(FigureValidator::new().validate(&fig).is_valid());
    }

    #[test]
    fn reports_every_issue() {
        let mut fig = GeometryFigure::new(FigureType::Generic, "");
        fig.points.push(Point::new("A"));
        fig.points.push(Point::new("A"));
        fig.lines.push(Line::new("B", "B"));
        fig.triangles.push(triangle("A", "B", "A"));
        fig.circles.push(Circle {
            center: "O".into(),
            ..Default::default()
        });
        fig.angles.push(Angle {
            vertex: "Z".into(),
            ray1_end: "Z".into(),
            ray2_end: "A".into(),
            ..Default::default()
        });
        let validation = FigureValidator::new().validate(&fig);
        insta::assert_debug_snapshot!(validation.issues, @r#"
        [
            "Missing figure description",
            "Duplicate definition for point 'A'",
            "Line has same start and end point 'B'",
            "Triangle [A, B, A] must have 3 distinct vertices",
            "Angle vertex 'Z' not found in structural elements",
            "Angle ray end 'Z' not found in structural elements",
            "Angle vertex 'Z' cannot be the same as a ray end",
            "Figure has elements but type is 'generic' - consider specifying type",
        ]
        "#);
    }

    #[test]
    fn angle_on_arc_only_label_is_reported() {
        let mut fig = GeometryFigure::new(FigureType::CircleChord, "chord");
        fig.lines.push(Line::new("A", "B"));
        fig.angles.push(Angle {
            vertex: "A".into(),
            ray1_end: "B".into(),
            ray2_end: "Q".into(),
            ..Default::default()
        });
        let validation = FigureValidator::new().validate(&fig);
        assert_eq!(
            validation.issues,
            vec!["Angle ray end 'Q' not found in structural elements".to_string()]
        );
    }
}
