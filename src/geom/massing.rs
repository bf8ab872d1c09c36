//! Proposed building massing.
//!
//! A massing is one or more footprints extruded vertically from the ground.
//! It is validated once at construction and never mutated afterwards.

use crate::Point;
use crate::error::{Result, ShadowError};
use crate::geom::polygon::Footprint;
use serde::{Deserialize, Serialize};

/// A footprint extruded from the ground up to `height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExtrusionSpec")]
pub struct Extrusion {
    footprint: Footprint,
    height: f64,
}

#[derive(Deserialize)]
struct ExtrusionSpec {
    footprint: Footprint,
    height: f64,
}

impl TryFrom<ExtrusionSpec> for Extrusion {
    type Error = ShadowError;

    fn try_from(value: ExtrusionSpec) -> Result<Self> {
        Self::new(value.footprint, value.height)
    }
}

impl Extrusion {
    pub fn new(footprint: Footprint, height: f64) -> Result<Self> {
        if !height.is_finite() || height <= 0. {
            return Err(ShadowError::DegenerateMassing(format!(
                "Height must be positive, got {}",
                height
            )));
        }
        Ok(Self { footprint, height })
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Validated building shape used for shadow casting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Extrusion>", into = "Vec<Extrusion>")]
pub enum Massing {
    /// A single extruded footprint.
    Prism(Extrusion),
    /// Several extruded footprints (e.g. a podium and a tower).
    Composite(Vec<Extrusion>),
}

impl TryFrom<Vec<Extrusion>> for Massing {
    type Error = ShadowError;

    fn try_from(mut value: Vec<Extrusion>) -> Result<Self> {
        match value.len() {
            0 => Err(ShadowError::DegenerateMassing(
                "Massing needs at least one volume".to_string(),
            )),
            1 => Ok(Self::Prism(value.remove(0))),
            _ => Ok(Self::Composite(value)),
        }
    }
}

impl From<Massing> for Vec<Extrusion> {
    fn from(value: Massing) -> Self {
        match value {
            Massing::Prism(e) => vec![e],
            Massing::Composite(v) => v,
        }
    }
}

impl Massing {
    /// Single prism with a validated height.
    pub fn prism(footprint: Footprint, height: f64) -> Result<Self> {
        Ok(Self::Prism(Extrusion::new(footprint, height)?))
    }

    /// Returns all volumes.
    pub fn volumes(&self) -> &[Extrusion] {
        match self {
            Self::Prism(e) => std::slice::from_ref(e),
            Self::Composite(v) => v,
        }
    }

    /// Returns all footprints.
    pub fn footprints(&self) -> Vec<Footprint> {
        self.volumes().iter().map(|e| e.footprint.clone()).collect()
    }

    /// Height of the tallest volume [m].
    pub fn max_height(&self) -> f64 {
        self.volumes().iter().map(|e| e.height).fold(0., f64::max)
    }

    /// Checks if a point lies inside any footprint in plan view.
    pub fn contains_xy(&self, ptest: Point, boundary_in: bool) -> bool {
        self.volumes()
            .iter()
            .any(|e| e.footprint.contains_xy(ptest, boundary_in))
    }

    /// Planar bounding box `(min, max)` of all footprints.
    pub fn bounding_box(&self) -> (Point, Point) {
        let mut iter = self.volumes().iter().map(|e| e.footprint.bounding_box());
        // A massing always has at least one volume
        let (mut pmin, mut pmax) = iter
            .next()
            .unwrap_or((Point::xy(0., 0.), Point::xy(0., 0.)));
        for (a, b) in iter {
            pmin = Point::xy(pmin.x.min(a.x), pmin.y.min(a.y));
            pmax = Point::xy(pmax.x.max(b.x), pmax.y.max(b.y));
        }
        (pmin, pmax)
    }

    /// Centre of the planar bounding box.
    pub fn center(&self) -> Point {
        let (pmin, pmax) = self.bounding_box();
        Point::xy(0.5 * (pmin.x + pmax.x), 0.5 * (pmin.y + pmax.y))
    }

    /// Radius of a circle around [`Self::center`] enclosing every footprint vertex.
    pub fn bounding_radius(&self) -> f64 {
        let c = self.center();
        self.volumes()
            .iter()
            .flat_map(|e| e.footprint.vertices())
            .map(|p| p.distance_xy(&c))
            .fold(0., f64::max)
    }
}

/// Builds a [`Massing`] from raw building parameters.
///
/// The height is either given directly or derived from a floor count and a
/// per-floor height. A direct height takes precedence.
#[derive(Debug, Clone, Default)]
pub struct MassingBuilder {
    footprint: Vec<Point>,
    floors: Option<u32>,
    floor_height: Option<f64>,
    total_height: Option<f64>,
    extra: Vec<Extrusion>,
}

impl MassingBuilder {
    pub fn new(footprint: Vec<Point>) -> Self {
        Self {
            footprint,
            ..Self::default()
        }
    }

    /// Axis-aligned rectangular footprint with its `(min x, min y)` corner at `origin`.
    ///
    /// `width` is the dimension along X (east), `depth` along Y (north).
    pub fn rectangle(width: f64, depth: f64, origin: (f64, f64)) -> Self {
        let (x0, y0) = origin;
        Self::new(vec![
            Point::xy(x0, y0),
            Point::xy(x0 + width, y0),
            Point::xy(x0 + width, y0 + depth),
            Point::xy(x0, y0 + depth),
        ])
    }

    /// Square footprint centred on the origin, sized from a building area [m^2].
    pub fn square_from_area(building_area: f64) -> Self {
        let side = building_area.sqrt();
        Self::rectangle(side, side, (-0.5 * side, -0.5 * side))
    }

    pub fn with_floors(mut self, count: u32, floor_height: f64) -> Self {
        self.floors = Some(count);
        self.floor_height = Some(floor_height);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.total_height = Some(height);
        self
    }

    /// Adds an already validated volume next to the main one.
    pub fn add_volume(mut self, volume: Extrusion) -> Self {
        self.extra.push(volume);
        self
    }

    /// Resolved building height, if enough parameters were given.
    pub fn height(&self) -> Option<f64> {
        match (self.total_height, self.floors, self.floor_height) {
            (Some(h), _, _) => Some(h),
            (None, Some(n), Some(fh)) => Some(n as f64 * fh),
            _ => None,
        }
    }

    /// Validates the parameters and returns the immutable massing.
    pub fn build(self) -> Result<Massing> {
        let height = self.height().ok_or_else(|| {
            ShadowError::DegenerateMassing(
                "Height not given (set a total height or floors with floor height)".to_string(),
            )
        })?;
        let footprint = Footprint::new(self.footprint)?;
        let main = Extrusion::new(footprint, height)?;

        if self.extra.is_empty() {
            Ok(Massing::Prism(main))
        } else {
            let mut volumes = vec![main];
            volumes.extend(self.extra);
            Ok(Massing::Composite(volumes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_floors() {
        let m = MassingBuilder::rectangle(10., 10., (0., 0.))
            .with_floors(5, 3.)
            .build()
            .unwrap();
        assert!(matches!(m, Massing::Prism(_)));
        assert!((m.max_height() - 15.).abs() < 1e-12);
        assert_eq!(m.volumes().len(), 1);
    }

    #[test]
    fn test_direct_height_wins() {
        let m = MassingBuilder::rectangle(10., 10., (0., 0.))
            .with_floors(5, 3.)
            .with_height(20.)
            .build()
            .unwrap();
        assert!((m.max_height() - 20.).abs() < 1e-12);
    }

    #[test]
    fn test_missing_height() {
        let res = MassingBuilder::rectangle(10., 10., (0., 0.)).build();
        assert!(matches!(res, Err(ShadowError::DegenerateMassing(_))));
    }

    #[test]
    fn test_non_positive_height() {
        for h in [0., -3., f64::INFINITY] {
            let res = MassingBuilder::rectangle(10., 10., (0., 0.))
                .with_height(h)
                .build();
            assert!(matches!(res, Err(ShadowError::DegenerateMassing(_))));
        }
        let res = MassingBuilder::rectangle(10., 10., (0., 0.))
            .with_floors(0, 3.)
            .build();
        assert!(res.is_err());
    }

    #[test]
    fn test_square_from_area() {
        let m = MassingBuilder::square_from_area(100.)
            .with_height(15.)
            .build()
            .unwrap();
        let fp = &m.footprints()[0];
        assert!((fp.area() - 100.).abs() < 1e-9);
        assert!(m.center().is_close(&Point::xy(0., 0.)));
        assert!(MassingBuilder::square_from_area(-4.).with_height(3.).build().is_err());
    }

    #[test]
    fn test_composite() {
        let tower = Extrusion::new(Footprint::rectangle(4., 4., (3., 3.)).unwrap(), 40.).unwrap();
        let m = MassingBuilder::rectangle(10., 10., (0., 0.))
            .with_height(6.)
            .add_volume(tower)
            .build()
            .unwrap();
        assert!(matches!(m, Massing::Composite(_)));
        assert!((m.max_height() - 40.).abs() < 1e-12);
        assert!(m.contains_xy(Point::xy(5., 5.), false));
        assert!(!m.contains_xy(Point::xy(11., 5.), true));
        assert!((m.bounding_radius() - 50_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_serde_validates() {
        let m = Massing::prism(Footprint::rectangle(2., 2., (0., 0.)).unwrap(), 3.).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        let back: Massing = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);

        let bad = r#"[{"footprint": [[0,0],[1,0],[1,1]], "height": -1.0}]"#;
        assert!(serde_json::from_str::<Massing>(bad).is_err());
        assert!(serde_json::from_str::<Massing>("[]").is_err());
    }
}
