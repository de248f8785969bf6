//! Small geometric value types shared by layout and rendering.
//!
//! Figure space is Y-up and unitless; SVG space is Y-down pixels. Points are
//! plain `glam::DVec2`; the newtypes here carry the invariants that matter
//! (normalized directions, bearings in `[0, 360)`, validated pixel scale).

use std::fmt;
use std::ops::Mul;

use glam::{DVec2, dvec2};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Check that a value is finite and strictly positive.
pub fn positive(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else if val == 0.0 {
        Err(NumericError::Zero)
    } else if val < 0.0 {
        Err(NumericError::Negative)
    } else {
        Ok(val)
    }
}

/// Direction of a ray in degrees, counter-clockwise from +x, in `[0, 360)`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct Bearing(f64);

impl Bearing {
    /// Wrap any angle in degrees into `[0, 360)`.
    pub fn from_degrees(deg: f64) -> Self {
        let wrapped = deg.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        Bearing(if wrapped >= 360.0 { 0.0 } else { wrapped })
    }

    /// Bearing of the ray `from -> to`.
    pub fn of(from: DVec2, to: DVec2) -> Self {
        let d = to - from;
        Self::from_degrees(d.y.atan2(d.x).to_degrees())
    }

    pub fn degrees(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Bearing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// A unit direction vector (dimensionless, normalized)
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct UnitVec(DVec2);

impl UnitVec {
    /// Normalize a vector. Returns None for zero-length or non-finite input.
    pub fn normalized(v: DVec2) -> Option<Self> {
        let len = v.length();
        if len == 0.0 || !len.is_finite() {
            None
        } else {
            Some(UnitVec(v / len))
        }
    }

    /// Unit vector at `deg` degrees counter-clockwise from +x.
    pub fn from_degrees(deg: f64) -> Self {
        let rad = deg.to_radians();
        UnitVec(dvec2(rad.cos(), rad.sin()))
    }

    /// This direction rotated by +90°.
    pub fn perp(self) -> Self {
        UnitVec(self.0.perp())
    }

    pub fn as_dvec2(self) -> DVec2 {
        self.0
    }
}

/// Scale a direction by a distance to get an offset vector
impl Mul<f64> for UnitVec {
    type Output = DVec2;
    fn mul(self, len: f64) -> DVec2 {
        self.0 * len
    }
}

/// Axis-aligned bounding box in figure space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl Default for BBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BBox {
    /// Create an empty bounding box (will expand on first point)
    pub fn new() -> Self {
        BBox {
            min: DVec2::splat(f64::MAX),
            max: DVec2::splat(f64::MIN),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DVec2>) -> Self {
        let mut bb = BBox::new();
        for p in points {
            bb.expand_point(*p);
        }
        bb
    }

    /// Check if the bbox is empty (never expanded)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn expand_point(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) / 2.0
    }

    /// Length of the min→max diagonal
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).length()
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// Maps figure units to SVG pixels, flipping Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scaler {
    px_per_unit: f64,
    origin: DVec2,
}

impl Scaler {
    /// `origin` is the figure-space point drawn at the SVG top-left corner.
    pub fn try_new(px_per_unit: f64, origin: DVec2) -> Result<Self, NumericError> {
        Ok(Scaler {
            px_per_unit: positive(px_per_unit)?,
            origin,
        })
    }

    pub fn px_per_unit(&self) -> f64 {
        self.px_per_unit
    }

    /// Convert a length in figure units to pixels.
    #[inline]
    pub fn len(&self, units: f64) -> f64 {
        units * self.px_per_unit
    }

    /// Convert a figure-space point to SVG pixels.
    #[inline]
    pub fn point(&self, p: DVec2) -> DVec2 {
        dvec2(
            (p.x - self.origin.x) * self.px_per_unit,
            (self.origin.y - p.y) * self.px_per_unit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_bad_values() {
        assert_eq!(positive(0.0), Err(NumericError::Zero));
        assert_eq!(positive(-1.0), Err(NumericError::Negative));
        assert_eq!(positive(f64::NAN), Err(NumericError::NaN));
        assert_eq!(positive(f64::INFINITY), Err(NumericError::Infinite));
        assert_eq!(positive(2.5), Ok(2.5));
    }

    #[test]
    fn bearing_wraps_into_range() {
        assert_eq!(Bearing::from_degrees(-90.0).degrees(), 270.0);
        assert_eq!(Bearing::from_degrees(360.0).degrees(), 0.0);
        assert_eq!(Bearing::from_degrees(725.0).degrees(), 5.0);
    }

    #[test]
    fn bearing_of_ray() {
        let b = Bearing::of(dvec2(1.0, 1.0), dvec2(1.0, 5.0));
        assert!((b.degrees() - 90.0).abs() < 1e-12);
        let b = Bearing::of(dvec2(0.0, 0.0), dvec2(0.0, -3.0));
        assert!((b.degrees() - 270.0).abs() < 1e-12);
    }

    #[test]
    fn unitvec_normalized_zero_returns_none() {
        assert_eq!(UnitVec::normalized(DVec2::ZERO), None);
        assert_eq!(UnitVec::normalized(dvec2(f64::NAN, 1.0)), None);
    }

    #[test]
    fn unitvec_normalized_valid() {
        let v = UnitVec::normalized(dvec2(3.0, 4.0)).unwrap();
        assert!((v.as_dvec2() - dvec2(0.6, 0.8)).length() < 1e-12);
        assert!((v.perp().as_dvec2() - dvec2(-0.8, 0.6)).length() < 1e-12);
        assert!((v * 5.0 - dvec2(3.0, 4.0)).length() < 1e-12);
    }

    #[test]
    fn bbox_extent() {
        let bb = BBox::from_points(&[dvec2(1.0, 2.0), dvec2(4.0, 6.0)]);
        assert!(!bb.is_empty());
        assert_eq!(bb.width(), 3.0);
        assert_eq!(bb.height(), 4.0);
        assert_eq!(bb.diagonal(), 5.0);
        assert_eq!(bb.center(), dvec2(2.5, 4.0));
    }

    #[test]
    fn bbox_new_is_empty() {
        assert!(BBox::new().is_empty());
    }

    #[test]
    fn scaler_flips_y() {
        let s = Scaler::try_new(10.0, dvec2(-1.0, 5.0)).unwrap();
        assert_eq!(s.point(dvec2(0.0, 0.0)), dvec2(10.0, 50.0));
        assert_eq!(s.len(0.5), 5.0);
        assert_eq!(Scaler::try_new(0.0, DVec2::ZERO), Err(NumericError::Zero));
    }
}
