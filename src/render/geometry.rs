//! Geometry derived at draw time: arc sweeps, tangency marks, line extensions
//! and radial label offsets. All in figure space (Y-up).

use glam::DVec2;

use crate::types::{Bearing, UnitVec};

/// An arc's angular range in degrees, counter-clockwise from `start` to
/// `end`, with `end >= start` (it may exceed 360).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub start: f64,
    pub end: f64,
}

impl Sweep {
    /// The minor (`major == false`) or major sweep between two ray bearings.
    ///
    /// With `d = (θ2 − θ1) mod 360`, the minor sweep runs θ1→θ2 when
    /// `d <= 180` and θ2→θ1 otherwise; the major sweep is its complement.
    /// Coincident rays give an empty minor sweep and a full-turn major one.
    pub fn between(b1: Bearing, b2: Bearing, major: bool) -> Sweep {
        let (a1, a2) = (b1.degrees(), b2.degrees());
        let d = (a2 - a1).rem_euclid(360.0);
        let direct = Sweep {
            start: a1,
            end: a1 + d,
        };
        let reverse = Sweep {
            start: a2,
            end: a2 + (360.0 - d),
        };
        match (major, d > 180.0) {
            (false, false) | (true, true) => direct,
            (false, true) | (true, false) => reverse,
        }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Bearing halfway along the sweep
    pub fn mid(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Corners of the small square marking a right angle at the tangency point,
/// aligned with the radius. `None` when the radius has zero length.
pub fn perpendicular_mark(center: DVec2, tangency: DVec2, size: f64) -> Option<[DVec2; 4]> {
    let radial = UnitVec::normalized(tangency - center)?;
    let across = radial.perp();
    Some([
        tangency,
        tangency + across * size,
        tangency + across * size - radial * size,
        tangency - radial * size,
    ])
}

/// Endpoints of a drawn line: rays continue past `end`, extended lines past both ends.
pub fn extend_segment(start: DVec2, end: DVec2, is_ray: bool, is_extended: bool, by: f64) -> (DVec2, DVec2) {
    let Some(dir) = UnitVec::normalized(end - start) else {
        return (start, end);
    };
    let from = if is_extended { start - dir * by } else { start };
    let to = if is_ray || is_extended { end + dir * by } else { end };
    (from, to)
}

/// Where a point label goes: pushed radially away from the figure's centroid,
/// or `offset` along both axes when the point sits on the centroid.
pub fn label_anchor(point: DVec2, centroid: DVec2, offset: f64) -> DVec2 {
    match UnitVec::normalized(point - centroid) {
        Some(dir) => point + dir * offset,
        None => point + DVec2::splat(offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    fn sweep(a: f64, b: f64, major: bool) -> Sweep {
        Sweep::between(Bearing::from_degrees(a), Bearing::from_degrees(b), major)
    }

    #[test]
    fn minor_sweep_between_10_and_80() {
        let s = sweep(10.0, 80.0, false);
        assert_eq!(s, Sweep { start: 10.0, end: 80.0 });
        assert_eq!(s.span(), 70.0);
        assert_eq!(s.mid(), 45.0);
    }

    #[test]
    fn minor_sweep_is_order_independent() {
        assert_eq!(sweep(80.0, 10.0, false), Sweep { start: 10.0, end: 80.0 });
        let s = sweep(350.0, 20.0, false);
        assert_eq!(s, Sweep { start: 350.0, end: 380.0 });
    }

    #[test]
    fn major_sweep_is_the_complement() {
        let s = sweep(10.0, 80.0, true);
        assert_eq!(s, Sweep { start: 80.0, end: 370.0 });
        assert_eq!(s.span(), 290.0);
    }

    #[test]
    fn mark_square_hugs_tangency_point() {
        let corners = perpendicular_mark(dvec2(0.0, 0.0), dvec2(3.0, 0.0), 0.2).unwrap();
        assert_eq!(corners[0], dvec2(3.0, 0.0));
        assert!((corners[1] - dvec2(3.0, 0.2)).length() < 1e-12);
        assert!((corners[2] - dvec2(2.8, 0.2)).length() < 1e-12);
        assert!((corners[3] - dvec2(2.8, 0.0)).length() < 1e-12);
        assert!(perpendicular_mark(dvec2(1.0, 1.0), dvec2(1.0, 1.0), 0.2).is_none());
    }

    #[test]
    fn rays_and_extensions() {
        let (a, b) = (dvec2(0.0, 0.0), dvec2(2.0, 0.0));
        assert_eq!(extend_segment(a, b, false, false, 1.0), (a, b));
        assert_eq!(extend_segment(a, b, true, false, 1.0), (a, dvec2(3.0, 0.0)));
        assert_eq!(
            extend_segment(a, b, false, true, 1.0),
            (dvec2(-1.0, 0.0), dvec2(3.0, 0.0))
        );
    }

    #[test]
    fn labels_move_away_from_centroid() {
        let p = label_anchor(dvec2(2.0, 0.0), DVec2::ZERO, 0.5);
        assert_eq!(p, dvec2(2.5, 0.0));
        let q = label_anchor(dvec2(1.0, 1.0), dvec2(1.0, 1.0), 0.25);
        assert_eq!(q, dvec2(1.25, 1.25));
    }
}
