use crate::geom::EPS;
use crate::geom::point::Point;

/// Returns the planar bounding box `(min, max)` of `pts`, or `None` if empty.
///
/// The `z` of both corners is 0.
pub fn bounding_box(pts: &[Point]) -> Option<(Point, Point)> {
    let first = pts.first()?;
    let mut pmin = Point::xy(first.x, first.y);
    let mut pmax = pmin;
    for p in pts.iter().skip(1) {
        pmin.x = pmin.x.min(p.x);
        pmin.y = pmin.y.min(p.y);
        pmax.x = pmax.x.max(p.x);
        pmax.y = pmax.y.max(p.y);
    }
    Some((pmin, pmax))
}

/// Checks whether a point is inside (or on) a planar bounding box.
pub fn is_point_inside_bbox(ptest: Point, pmin: Point, pmax: Point) -> bool {
    ptest.x >= pmin.x - EPS
        && ptest.x <= pmax.x + EPS
        && ptest.y >= pmin.y - EPS
        && ptest.y <= pmax.y + EPS
}

/// Checks whether two planar bounding boxes overlap.
///
/// Takes min and max corners of each bbox.
/// Returns true if boxes overlap (including touching).
pub fn are_bboxes_overlapping(min1: Point, max1: Point, min2: Point, max2: Point) -> bool {
    // Boxes don't overlap if separated along any axis
    if max1.x < min2.x - EPS || min1.x > max2.x + EPS {
        return false;
    }
    if max1.y < min2.y - EPS || min1.y > max2.y + EPS {
        return false;
    }
    true
}
