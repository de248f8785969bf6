//! Plane geometry helpers for the layout engine

use glam::DVec2;

use crate::types::UnitVec;

/// Intersection of the infinite lines `p1p2` and `p3p4`.
///
/// Uses the determinant form; returns `None` when the lines are parallel or
/// either is degenerate (`|denominator| < tolerance`).
pub fn line_intersection(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2, tolerance: f64) -> Option<DVec2> {
    let d12 = p1 - p2;
    let d34 = p3 - p4;
    let denom = d12.perp_dot(d34);
    if denom.abs() < tolerance {
        return None;
    }
    let c12 = p1.perp_dot(p2);
    let c34 = p3.perp_dot(p4);
    Some((c12 * d34 - d12 * c34) / denom)
}

/// Foot of the perpendicular from `p` to the line through `a` and `b`.
///
/// A degenerate line (`|ab|² < tolerance`) projects everything onto `a`.
pub fn project_onto_line(p: DVec2, a: DVec2, b: DVec2, tolerance: f64) -> DVec2 {
    let ab = b - a;
    let mag2 = ab.length_squared();
    if mag2 < tolerance {
        return a;
    }
    let u = (p - a).dot(ab) / mag2;
    a + ab * u
}

/// The point a fraction `t` of the way from `a` to `b`
pub fn point_along(a: DVec2, b: DVec2, t: f64) -> DVec2 {
    a + (b - a) * t
}

/// Point on the circle at `degrees` counter-clockwise from +x
pub fn point_on_circle(center: DVec2, radius: f64, degrees: f64) -> DVec2 {
    center + UnitVec::from_degrees(degrees) * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    const TOL: f64 = 1e-9;

    #[test]
    fn crossing_diagonals() {
        let p = line_intersection(
            dvec2(0.0, 0.0),
            dvec2(10.0, 0.0),
            dvec2(5.0, 5.0),
            dvec2(5.0, -5.0),
            TOL,
        );
        assert_eq!(p, Some(dvec2(5.0, 0.0)));
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let p = line_intersection(
            dvec2(0.0, 0.0),
            dvec2(4.0, 0.0),
            dvec2(0.0, 1.0),
            dvec2(4.0, 1.0),
            TOL,
        );
        assert_eq!(p, None);
    }

    #[test]
    fn intersection_off_the_segments() {
        let p = line_intersection(
            dvec2(0.0, 0.0),
            dvec2(1.0, 1.0),
            dvec2(4.0, 0.0),
            dvec2(4.0, 1.0),
            TOL,
        )
        .unwrap();
        assert!((p - dvec2(4.0, 4.0)).length() < 1e-12);
    }

    #[test]
    fn projection_foot() {
        let foot = project_onto_line(dvec2(3.0, 4.0), dvec2(0.0, 0.0), dvec2(10.0, 0.0), TOL);
        assert!((foot - dvec2(3.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn projection_onto_degenerate_line() {
        let a = dvec2(1.0, 1.0);
        assert_eq!(project_onto_line(dvec2(5.0, 5.0), a, a, TOL), a);
    }

    #[test]
    fn circle_point_at_top() {
        let p = point_on_circle(dvec2(1.0, 1.0), 2.0, 90.0);
        assert!((p - dvec2(1.0, 3.0)).length() < 1e-12);
    }
}
