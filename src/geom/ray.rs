//! Sun ray casting against vertical extrusions.
//!
//! A ray leaves a check point toward the sun. In plan view it travels along
//! the sun's azimuth; vertically it rises by `rise` meters per meter of
//! horizontal travel (`tan(altitude)`).

use crate::geom::polygon::Footprint;
use crate::{Point, Vector};

/// A ray defined by an origin point, a horizontal heading and a slope.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray
    pub origin: Point,
    /// Horizontal unit heading
    pub heading: Vector,
    /// Height gained per meter of horizontal travel
    pub rise: f64,
}

impl Ray {
    /// Creates a new ray from an origin, a horizontal direction and a slope.
    ///
    /// The direction is projected onto the ground plane and normalized.
    /// Returns `None` if it has no horizontal component or if `rise` is not
    /// strictly positive.
    pub fn new(origin: Point, direction: Vector, rise: f64) -> Option<Self> {
        if !rise.is_finite() || rise <= 0. {
            return None;
        }
        let heading = direction.horizontal().normalize()?;
        Some(Self {
            origin,
            heading,
            rise,
        })
    }

    /// Returns the point along the ray after horizontal travel `s`.
    pub fn point_at(&self, s: f64) -> Point {
        self.origin + self.heading * s + Vector::new(0., 0., self.rise * s)
    }

    /// Horizontal travel needed to reach height `z` (may be negative).
    pub fn reach_to_height(&self, z: f64) -> f64 {
        (z - self.origin.z) / self.rise
    }

    /// Checks if the ray passes through the vertical extrusion of `footprint`
    /// between heights `base` and `top`.
    ///
    /// Only the part of the ray in front of the origin counts.
    pub fn intersects_extrusion(&self, footprint: &Footprint, base: f64, top: f64) -> bool {
        if top <= base || top <= self.origin.z {
            return false;
        }
        let s_start = self.reach_to_height(base).max(0.);
        let s_end = self.reach_to_height(top);
        if s_end < s_start {
            return false;
        }
        footprint.intersects_segment(self.point_at(s_start), self.point_at(s_end))
    }
}
