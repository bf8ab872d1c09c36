//! Regulation profile and distance-band resolution.

use crate::Point;
use crate::error::{Result, ShadowError};
use crate::geom::polygon::Footprint;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Inner edge of band A: closer points are not regulated [m].
pub const BAND_A_MIN_M: f64 = 5.0;
/// Outer edge of band A (inclusive); band B starts beyond it [m].
pub const BAND_A_MAX_M: f64 = 10.0;

/// Shadow-time limits of a district, as resolved by the regulation lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationProfile {
    /// Height of the measurement plane above ground [m].
    pub measurement_height: f64,
    /// Start of the statutory window on the reference day.
    pub window_start: NaiveTime,
    /// End of the statutory window on the reference day.
    pub window_end: NaiveTime,
    /// Allowed shadow hours between 5 m and 10 m from the boundary.
    pub band_a_hours: f64,
    /// Allowed shadow hours beyond 10 m from the boundary.
    pub band_b_hours: f64,
    /// Administrative use-district the profile was resolved for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

impl RegulationProfile {
    pub fn validate(&self) -> Result<()> {
        if !self.measurement_height.is_finite() || self.measurement_height < 0. {
            return Err(ShadowError::InvalidRegulationProfile(format!(
                "Measurement height must be >= 0, got {}",
                self.measurement_height
            )));
        }
        if self.window_start >= self.window_end {
            return Err(ShadowError::InvalidRegulationProfile(format!(
                "Window start {} is not before window end {}",
                self.window_start, self.window_end
            )));
        }
        for (name, hours) in [("band A", self.band_a_hours), ("band B", self.band_b_hours)] {
            if !hours.is_finite() || hours < 0. {
                return Err(ShadowError::InvalidRegulationProfile(format!(
                    "Limit for {} must be >= 0, got {}",
                    name, hours
                )));
            }
        }
        Ok(())
    }

    /// Allowed shadow hours within a band.
    pub fn limit_for(&self, band: Band) -> f64 {
        match band {
            Band::A => self.band_a_hours,
            Band::B => self.band_b_hours,
        }
    }
}

/// Distance band around the regulated boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    A,
    B,
}

impl Band {
    /// Band of a point at `distance` meters from the boundary.
    ///
    /// Points closer than [`BAND_A_MIN_M`] are not regulated.
    pub fn for_distance(distance: f64) -> Option<Self> {
        if distance < BAND_A_MIN_M {
            None
        } else if distance <= BAND_A_MAX_M {
            Some(Self::A)
        } else {
            Some(Self::B)
        }
    }
}

/// Shortest planar distance from a point to the regulated boundary
/// (0 inside any of the rings).
pub fn distance_to_boundary(point: Point, boundary: &[Footprint]) -> f64 {
    boundary
        .iter()
        .map(|fp| fp.distance_from(point))
        .fold(f64::INFINITY, f64::min)
}

/// Allowed shadow hours at a point, or `None` if the point is not regulated.
///
/// A missing profile leaves every point unregulated.
pub fn resolve_limit(
    point: Point,
    boundary: &[Footprint],
    profile: Option<&RegulationProfile>,
) -> Option<f64> {
    let profile = profile?;
    let band = Band::for_distance(distance_to_boundary(point, boundary))?;
    Some(profile.limit_for(band))
}
