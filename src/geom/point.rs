use crate::Vector;
use crate::geom::EPS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A position in the site-local frame [m].
///
/// Footprint vertices live on the ground (`z = 0`), check points live on the
/// measurement plane. Planar queries only look at `x` and `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates a point on the ground plane.
    pub fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: 0. }
    }

    /// Returns a copy of this point moved to height `z`.
    pub fn with_z(&self, z: f64) -> Self {
        Self { x: self.x, y: self.y, z }
    }

    /// Returns true if both points are very close to each other.
    pub fn is_close(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < EPS
            && (self.y - other.y).abs() < EPS
            && (self.z - other.z).abs() < EPS
    }

    /// Returns true if both points coincide in plan view.
    pub fn is_close_xy(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < EPS && (self.y - other.y).abs() < EPS
    }

    /// Horizontal distance to another point, ignoring `z`.
    pub fn distance_xy(&self, other: &Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2); // Default 2 decimals
        write!(
            f,
            "Point({:.prec$}, {:.prec$}, {:.prec$})",
            self.x,
            self.y,
            self.z,
            prec = prec
        )
    }
}

// Implement +
impl Add<Vector> for Point {
    type Output = Point;
    fn add(self, other: Vector) -> Self {
        Self {
            x: self.x + other.dx,
            y: self.y + other.dy,
            z: self.z + other.dz,
        }
    }
}

// Implement -
impl Sub for Point {
    type Output = Vector;
    fn sub(self, other: Self) -> Vector {
        Vector::from_points(other, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_close() {
        let pa = Point::new(5., 5., 5.);
        let pb = Point::new(5.0000000000001, 5., 5.);
        let pc = Point::new(5.0001, 5., 5.);
        assert!(pa.is_close(&pb));
        assert!(!pa.is_close(&pc));
    }

    #[test]
    fn test_distance_xy_ignores_height() {
        let p0 = Point::new(0., 0., 0.);
        let p1 = Point::new(3., 4., 100.);
        assert!((p0.distance_xy(&p1) - 5.).abs() < 1e-12);
        assert!(p0.is_close_xy(&p0.with_z(4.)));
    }

    #[test]
    fn test_add_and_sub() {
        let p0 = Point::new(1., 2., 3.);
        let p1 = p0 + Vector::new(1., 1., 1.);
        assert!(p1.is_close(&Point::new(2., 3., 4.)));
        let v = p1 - p0;
        assert!(v.is_close(&Vector::new(1., 1., 1.)));
    }

    #[test]
    fn test_display_precision() {
        let p = Point::xy(1.234, 5.678);
        assert_eq!(format!("{:.1}", p), "Point(1.2, 5.7, 0.0)");
    }
}
