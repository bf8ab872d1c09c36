//! Shadow raycaster.
//!
//! A check point on the measurement plane is in shadow when the ray from the
//! point toward the sun passes through any part of the massing that lies
//! between the measurement plane and the top of that volume.

use crate::geom::massing::Massing;
use crate::geom::ray::Ray;
use crate::sim::solar::SunPosition;
use crate::{Point, Vector};

/// Lowest solar altitude used for shadow casting [deg].
///
/// Below this angle shadows are treated as if the sun stood at this angle,
/// which bounds the horizontal shadow length at `height / tan(1°) ≈ 57 × height`.
pub const MIN_SHADOW_ALTITUDE_DEG: f64 = 1.0;

/// Horizontal length of the shadow cast by an edge `height_above_plane`
/// meters above the measurement plane [m].
pub fn shadow_length(height_above_plane: f64, altitude_deg: f64) -> f64 {
    if height_above_plane <= 0. {
        return 0.;
    }
    let alt = altitude_deg.max(MIN_SHADOW_ALTITUDE_DEG).to_radians();
    height_above_plane / alt.tan()
}

/// Returns true if `point` is shaded by `massing` for the given sun position.
///
/// The height of `point` is the measurement plane. Night always returns false.
pub fn is_in_shadow(point: Point, sun: &SunPosition, massing: &Massing) -> bool {
    if !sun.is_daylight {
        return false;
    }

    let top = massing.max_height();
    if top <= point.z {
        return false;
    }

    let altitude = sun.altitude.max(MIN_SHADOW_ALTITUDE_DEG);
    let rise = altitude.to_radians().tan();
    let Some(ray) = Ray::new(point, Vector::from_bearing(sun.azimuth), rise) else {
        return false;
    };

    // Nothing can be reached beyond the longest possible shadow
    let reach = shadow_length(top - point.z, sun.altitude);
    let center = massing.center();
    if point.distance_xy(&center) > reach + massing.bounding_radius() {
        return false;
    }

    massing
        .volumes()
        .iter()
        .any(|v| ray.intersects_extrusion(v.footprint(), 0., v.height()))
}
