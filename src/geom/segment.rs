//! Planar line segment operations.
//!
//! Footprints and shadow reaches are tested in plan view, so every function
//! here ignores the `z` coordinate of its arguments.

use crate::Point;
use crate::geom::EPS;

/// Signed area of the parallelogram spanned by `a -> b` and `a -> c`.
///
/// Positive when `c` lies to the left of `a -> b` (counter-clockwise turn).
pub fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Checks if point `pt` lies on the segment `p1 -> p2` (within `EPS`).
pub fn is_point_on_segment(pt: Point, p1: Point, p2: Point) -> bool {
    distance_point_to_segment(pt, p1, p2) < EPS
}

/// Calculates the planar distance between a point and a line segment.
///
/// Returns the minimum distance from the point to any point on the segment.
pub fn distance_point_to_segment(pt: Point, p1: Point, p2: Point) -> f64 {
    let sx = p2.x - p1.x;
    let sy = p2.y - p1.y;
    let px = pt.x - p1.x;
    let py = pt.y - p1.y;

    let seg_len_sq = sx * sx + sy * sy;
    if seg_len_sq < EPS * EPS {
        // Segment is a point
        return (px * px + py * py).sqrt();
    }

    // Project pt onto the line, clamped to segment
    let t = ((px * sx + py * sy) / seg_len_sq).clamp(0.0, 1.0);
    let cx = p1.x + t * sx;
    let cy = p1.y + t * sy;

    ((pt.x - cx).powi(2) + (pt.y - cy).powi(2)).sqrt()
}

/// Checks if two planar segments share at least one point.
///
/// Touching endpoints and collinear overlaps count as intersections.
pub fn are_segments_intersecting(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let o1 = orientation(p1, p2, p3);
    let o2 = orientation(p1, p2, p4);
    let o3 = orientation(p3, p4, p1);
    let o4 = orientation(p3, p4, p2);

    // Proper crossing
    if o1 * o2 < 0. && o3 * o4 < 0. {
        return true;
    }

    // Touching or collinear cases
    is_point_on_segment(p3, p1, p2)
        || is_point_on_segment(p4, p1, p2)
        || is_point_on_segment(p1, p3, p4)
        || is_point_on_segment(p2, p3, p4)
}

/// Checks if two segments sharing the endpoint `shared` fold back onto each other.
///
/// Used for consecutive ring edges `a -> shared -> b`: they may meet at
/// `shared`, but must not overlap along a common direction.
pub fn are_adjacent_segments_overlapping(a: Point, shared: Point, b: Point) -> bool {
    if orientation(a, shared, b).abs() > EPS {
        return false;
    }
    // Collinear: overlap iff both neighbours lie on the same side of `shared`
    let dot = (a.x - shared.x) * (b.x - shared.x) + (a.y - shared.y) * (b.y - shared.y);
    dot > EPS
}
