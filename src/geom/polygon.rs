//! Planar footprint rings.
//!
//! A [`Footprint`] is a simple (non-self-intersecting) polygon on the ground
//! plane, stored counter-clockwise without a closing vertex. It is used both
//! for building footprints and for the optional site boundary.

pub mod containment;

use crate::Point;
use crate::error::{Result, ShadowError};
use crate::geom::EPS;
use crate::geom::bboxes::{are_bboxes_overlapping, bounding_box};
use crate::geom::segment::{
    are_adjacent_segments_overlapping, are_segments_intersecting, distance_point_to_segment,
};
use containment::is_point_inside_polygon;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct Footprint {
    pts: Vec<Point>,
    pmin: Point,
    pmax: Point,
}

impl Footprint {
    /// Creates a validated footprint from its vertices.
    ///
    /// The `z` of every vertex is dropped. Consecutive duplicates and a
    /// closing vertex equal to the first one are removed. Fails with
    /// [`ShadowError::DegenerateMassing`] if fewer than 3 distinct vertices
    /// remain, if the ring has no area, or if any two edges intersect.
    pub fn new(pts: Vec<Point>) -> Result<Self> {
        if let Some(p) = pts.iter().find(|p| !p.is_finite()) {
            return Err(ShadowError::DegenerateMassing(format!(
                "Footprint vertex is not finite: {}",
                p
            )));
        }

        let mut ring: Vec<Point> = Vec::with_capacity(pts.len());
        for p in pts {
            let p = p.with_z(0.);
            if ring.last().is_some_and(|last| last.is_close_xy(&p)) {
                continue;
            }
            ring.push(p);
        }
        while ring.len() > 1 && ring[0].is_close_xy(&ring[ring.len() - 1]) {
            ring.pop();
        }

        if ring.len() < 3 {
            return Err(ShadowError::DegenerateMassing(format!(
                "Footprint needs at least 3 distinct vertices, got {}",
                ring.len()
            )));
        }

        let area = signed_area(&ring);
        if area.abs() < EPS {
            return Err(ShadowError::DegenerateMassing(
                "Footprint has zero area".to_string(),
            ));
        }

        if let Some((i, j)) = find_self_intersection(&ring) {
            return Err(ShadowError::DegenerateMassing(format!(
                "Footprint is self-intersecting (edges {} and {})",
                i, j
            )));
        }

        // Counter-clockwise orientation
        if area < 0. {
            ring.reverse();
        }

        let (pmin, pmax) = bounding_box(&ring).ok_or_else(|| {
            ShadowError::DegenerateMassing("Footprint has no vertices".to_string())
        })?;

        Ok(Self { pts: ring, pmin, pmax })
    }

    /// Axis-aligned rectangle with its `(min x, min y)` corner at `origin`.
    pub fn rectangle(width: f64, depth: f64, origin: (f64, f64)) -> Result<Self> {
        let (x0, y0) = origin;
        Self::new(vec![
            Point::xy(x0, y0),
            Point::xy(x0 + width, y0),
            Point::xy(x0 + width, y0 + depth),
            Point::xy(x0, y0 + depth),
        ])
    }

    /// Returns the vertices (counter-clockwise, not closed).
    pub fn vertices(&self) -> &[Point] {
        &self.pts
    }

    /// Iterates over the ring edges `(start, end)`, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.pts.len();
        (0..n).map(move |i| (self.pts[i], self.pts[(i + 1) % n]))
    }

    /// Footprint area [m^2].
    pub fn area(&self) -> f64 {
        signed_area(&self.pts).abs()
    }

    /// Area centroid of the ring.
    pub fn centroid(&self) -> Point {
        let a = signed_area(&self.pts);
        let mut cx = 0.;
        let mut cy = 0.;
        for (p, q) in self.edges() {
            let cross = p.x * q.y - q.x * p.y;
            cx += (p.x + q.x) * cross;
            cy += (p.y + q.y) * cross;
        }
        Point::xy(cx / (6. * a), cy / (6. * a))
    }

    /// Planar bounding box `(min, max)`.
    pub fn bounding_box(&self) -> (Point, Point) {
        (self.pmin, self.pmax)
    }

    /// Largest horizontal distance from the centroid to any vertex.
    pub fn bounding_radius(&self) -> f64 {
        let c = self.centroid();
        self.pts
            .iter()
            .map(|p| p.distance_xy(&c))
            .fold(0., f64::max)
    }

    /// Checks if a point lies inside the footprint in plan view.
    pub fn contains_xy(&self, ptest: Point, boundary_in: bool) -> bool {
        is_point_inside_polygon(ptest, &self.pts, boundary_in)
    }

    /// Shortest planar distance from a point to the ring edges.
    pub fn distance_to_boundary(&self, ptest: Point) -> f64 {
        self.edges()
            .map(|(p1, p2)| distance_point_to_segment(ptest, p1, p2))
            .fold(f64::INFINITY, f64::min)
    }

    /// Planar distance from a point to the footprint area (0 inside or on it).
    pub fn distance_from(&self, ptest: Point) -> f64 {
        if self.contains_xy(ptest, true) {
            0.
        } else {
            self.distance_to_boundary(ptest)
        }
    }

    /// Checks if the planar segment `a -> b` touches the footprint area.
    pub fn intersects_segment(&self, a: Point, b: Point) -> bool {
        let (smin, smax) = (
            Point::xy(a.x.min(b.x), a.y.min(b.y)),
            Point::xy(a.x.max(b.x), a.y.max(b.y)),
        );
        if !are_bboxes_overlapping(smin, smax, self.pmin, self.pmax) {
            return false;
        }
        if self.contains_xy(a, true) || self.contains_xy(b, true) {
            return true;
        }
        self.edges()
            .any(|(p1, p2)| are_segments_intersecting(a, b, p1, p2))
    }
}

impl TryFrom<Vec<[f64; 2]>> for Footprint {
    type Error = ShadowError;

    fn try_from(value: Vec<[f64; 2]>) -> Result<Self> {
        Self::new(value.into_iter().map(|[x, y]| Point::xy(x, y)).collect())
    }
}

impl From<Footprint> for Vec<[f64; 2]> {
    fn from(value: Footprint) -> Self {
        value.pts.iter().map(|p| [p.x, p.y]).collect()
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2);
        write!(f, "Footprint(")?;
        for (i, p) in self.pts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({:.prec$}, {:.prec$})", p.x, p.y, prec = prec)?;
        }
        write!(f, ")")
    }
}

/// Shoelace formula; positive for counter-clockwise rings.
fn signed_area(pts: &[Point]) -> f64 {
    let n = pts.len();
    let mut sum = 0.;
    for i in 0..n {
        let p = pts[i];
        let q = pts[(i + 1) % n];
        sum += p.x * q.y - q.x * p.y;
    }
    0.5 * sum
}

/// Returns the indices of the first pair of edges that intersect illegally.
fn find_self_intersection(pts: &[Point]) -> Option<(usize, usize)> {
    let n = pts.len();
    for i in 0..n {
        let a1 = pts[i];
        let a2 = pts[(i + 1) % n];
        for j in (i + 1)..n {
            let b1 = pts[j];
            let b2 = pts[(j + 1) % n];
            if j == i + 1 {
                // Edges share a2 == b1
                if are_adjacent_segments_overlapping(a1, a2, b2) {
                    return Some((i, j));
                }
            } else if i == 0 && j == n - 1 {
                // Closing edge shares a1 == b2
                if are_adjacent_segments_overlapping(b1, a1, a2) {
                    return Some((i, j));
                }
            } else if are_segments_intersecting(a1, a2, b1, b2) {
                return Some((i, j));
            }
        }
    }
    None
}
