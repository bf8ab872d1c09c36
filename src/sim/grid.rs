use crate::Point;
use crate::error::{Result, ShadowError};
use crate::geom::massing::Massing;
use crate::geom::polygon::Footprint;
use serde::{Deserialize, Serialize};

/// Upper bound on generated check points.
pub const MAX_GRID_POINTS: usize = 250_000;

/// Regular check-point grid around the regulated boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    /// Distance between neighbouring check points [m].
    pub spacing: f64,
    /// Extent of the grid beyond the boundary's bounding box [m].
    pub margin: f64,
}

impl GridSpec {
    pub fn new(spacing: f64, margin: f64) -> Self {
        Self { spacing, margin }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.spacing.is_finite() || self.spacing <= 0. {
            return Err(ShadowError::InvalidGrid(format!(
                "Spacing must be positive, got {}",
                self.spacing
            )));
        }
        if !self.margin.is_finite() || self.margin < 0. {
            return Err(ShadowError::InvalidGrid(format!(
                "Margin must be >= 0, got {}",
                self.margin
            )));
        }
        Ok(())
    }

    /// Generates check points on the plane `z`.
    ///
    /// Points cover the bounding box of `boundary` grown by `margin`, in
    /// row-major order (south to north, west to east). Points inside or on a
    /// massing footprint are left out.
    pub fn generate(&self, boundary: &[Footprint], massing: &Massing, z: f64) -> Result<Vec<Point>> {
        self.validate()?;

        let mut corners = boundary.iter().map(|fp| fp.bounding_box());
        let Some((mut pmin, mut pmax)) = corners.next() else {
            return Err(ShadowError::InvalidGrid("Boundary is empty".to_string()));
        };
        for (a, b) in corners {
            pmin = Point::xy(pmin.x.min(a.x), pmin.y.min(a.y));
            pmax = Point::xy(pmax.x.max(b.x), pmax.y.max(b.y));
        }

        let x0 = pmin.x - self.margin;
        let y0 = pmin.y - self.margin;
        let nx = ((pmax.x + self.margin - x0) / self.spacing).floor() as usize + 1;
        let ny = ((pmax.y + self.margin - y0) / self.spacing).floor() as usize + 1;
        if nx.saturating_mul(ny) > MAX_GRID_POINTS {
            return Err(ShadowError::InvalidGrid(format!(
                "Grid of {} x {} points exceeds the limit of {}",
                nx, ny, MAX_GRID_POINTS
            )));
        }

        let mut points = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            let y = y0 + j as f64 * self.spacing;
            for i in 0..nx {
                let p = Point::new(x0 + i as f64 * self.spacing, y, z);
                if !massing.contains_xy(p, true) {
                    points.push(p);
                }
            }
        }

        Ok(points)
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            spacing: 5.0,
            margin: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MassingBuilder;

    fn massing() -> Massing {
        MassingBuilder::rectangle(10., 10., (0., 0.))
            .with_height(15.)
            .build()
            .unwrap()
    }

    #[test]
    fn test_generate_excludes_building() {
        let m = massing();
        let grid = GridSpec::new(5., 10.);
        let pts = grid.generate(&m.footprints(), &m, 4.).unwrap();
        // 7 x 7 lattice from -10 to 20, minus the 3 x 3 nodes on or inside the footprint
        assert_eq!(pts.len(), 49 - 9);
        assert!(pts.iter().all(|p| (p.z - 4.).abs() < 1e-12));
        assert!(pts.iter().all(|p| !m.contains_xy(*p, true)));
        // Row-major, starting at the south-west corner
        assert!(pts[0].is_close(&Point::new(-10., -10., 4.)));
        assert!(pts[1].is_close(&Point::new(-5., -10., 4.)));
    }

    #[test]
    fn test_default_spec() {
        let g = GridSpec::default();
        assert_eq!(g.spacing, 5.0);
        assert_eq!(g.margin, 100.0);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn test_invalid_spec() {
        let m = massing();
        assert!(GridSpec::new(0., 10.).generate(&m.footprints(), &m, 0.).is_err());
        assert!(GridSpec::new(1., -1.).generate(&m.footprints(), &m, 0.).is_err());
        assert!(matches!(
            GridSpec::new(0.01, 1000.).generate(&m.footprints(), &m, 0.),
            Err(ShadowError::InvalidGrid(_))
        ));
        assert!(GridSpec::default().generate(&[], &m, 0.).is_err());
    }
}
