use crate::Point;
use crate::geom::segment::is_point_on_segment;

/// Checks if a point lies inside a planar polygon ring.
///
/// The ring is given by its vertices `pts` (not closed, any orientation).
/// If `boundary_in` is true, points on the boundary (edges or vertices) are considered inside.
/// The `z` coordinate of the test point is ignored.
///
/// Uses the even-odd crossing rule: a horizontal ray is cast from `ptest`
/// toward +x and the number of edges it crosses is counted.
pub fn is_point_inside_polygon(ptest: Point, pts: &[Point], boundary_in: bool) -> bool {
    if pts.len() < 3 {
        return false;
    }

    if is_point_on_boundary(ptest, pts) {
        return boundary_in;
    }

    let n = pts.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = pts[i];
        let pj = pts[j];
        // Half-open rule on y avoids counting a vertex twice
        if (pi.y > ptest.y) != (pj.y > ptest.y) {
            let x_cross = pi.x + (ptest.y - pi.y) * (pj.x - pi.x) / (pj.y - pi.y);
            if ptest.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Checks if a point lies on the boundary of the ring (vertices or edges).
pub fn is_point_on_boundary(ptest: Point, pts: &[Point]) -> bool {
    let n = pts.len();
    if n < 2 {
        return false;
    }

    for i in 0..n {
        let p1 = pts[i];
        let p2 = pts[(i + 1) % n];
        if is_point_on_segment(ptest, p1, p2) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_square() -> Vec<Point> {
        vec![
            Point::xy(0., 0.),
            Point::xy(1., 0.),
            Point::xy(1., 1.),
            Point::xy(0., 1.),
        ]
    }

    #[test]
    fn test_point_inside_square() {
        let pts = make_square();
        let ptest = Point::xy(0.5, 0.5);
        assert!(is_point_inside_polygon(ptest, &pts, true));
        assert!(is_point_inside_polygon(ptest, &pts, false));
        // Height is ignored
        assert!(is_point_inside_polygon(ptest.with_z(4.), &pts, false));
    }

    #[test]
    fn test_point_outside_square() {
        let pts = make_square();
        let ptest = Point::xy(1.5, 0.5);
        assert!(!is_point_inside_polygon(ptest, &pts, true));
        assert!(!is_point_inside_polygon(ptest, &pts, false));
    }

    #[test]
    fn test_point_on_vertex() {
        let pts = make_square();
        let ptest = Point::xy(0., 0.);
        assert!(is_point_inside_polygon(ptest, &pts, true));
        assert!(!is_point_inside_polygon(ptest, &pts, false));
    }

    #[test]
    fn test_point_on_edge() {
        let pts = make_square();
        let ptest = Point::xy(0.5, 0.);
        assert!(is_point_inside_polygon(ptest, &pts, true));
        assert!(!is_point_inside_polygon(ptest, &pts, false));
    }

    #[test]
    fn test_ray_through_vertex() {
        // Diamond: the +x ray from the centre's row passes exactly through a vertex
        let pts = vec![
            Point::xy(0., -1.),
            Point::xy(1., 0.),
            Point::xy(0., 1.),
            Point::xy(-1., 0.),
        ];
        assert!(is_point_inside_polygon(Point::xy(0., 0.), &pts, false));
        assert!(!is_point_inside_polygon(Point::xy(-2., 0.), &pts, false));
    }

    #[test]
    fn test_l_shaped_polygon() {
        let pts = vec![
            Point::xy(0., 0.),
            Point::xy(1., 0.),
            Point::xy(1., 1.),
            Point::xy(2., 1.),
            Point::xy(2., 2.),
            Point::xy(0., 2.),
        ];

        // Inside the L
        assert!(is_point_inside_polygon(Point::xy(0.5, 0.5), &pts, true));
        assert!(is_point_inside_polygon(Point::xy(0.5, 1.5), &pts, true));
        assert!(is_point_inside_polygon(Point::xy(1.5, 1.5), &pts, true));

        // Outside the L (in the cutout)
        assert!(!is_point_inside_polygon(Point::xy(1.5, 0.5), &pts, true));

        // Outside the L (completely outside)
        assert!(!is_point_inside_polygon(Point::xy(3.0, 1.0), &pts, true));
    }
}
