//! Engine settings and TOML scenario files.

use crate::Point;
use crate::error::{Result, ShadowError};
use crate::geom::massing::{Massing, MassingBuilder};
use crate::geom::polygon::Footprint;
use crate::sim::engine::{EvaluationRequest, PointSet};
use crate::sim::grid::GridSpec;
use crate::sim::integrator::DEFAULT_STEP_MINUTES;
use crate::sim::regulation::RegulationProfile;
use crate::sim::solar::{ClockBasis, GeoCoordinate};
use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for a compliance evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sampling interval [min].
    pub step_minutes: u32,
    /// A step longer than this share of the window raises a coarse-sampling advisory.
    pub coarse_step_fraction: f64,
    /// Split the points of each step across the rayon pool.
    pub parallel: bool,
    /// Measurement plane used when no regulation applies [m].
    pub fallback_measurement_height: f64,
    /// Observation window used when no regulation applies.
    pub fallback_window_start: NaiveTime,
    pub fallback_window_end: NaiveTime,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            step_minutes: DEFAULT_STEP_MINUTES,
            coarse_step_fraction: 0.1,
            parallel: true,
            fallback_measurement_height: 4.0,
            fallback_window_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            fallback_window_end: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.step_minutes == 0 {
            return Err(ShadowError::InvalidSampling(
                "Step must be at least one minute".to_string(),
            ));
        }
        if !self.coarse_step_fraction.is_finite() || self.coarse_step_fraction <= 0. {
            return Err(ShadowError::InvalidSampling(format!(
                "Coarse step fraction must be positive, got {}",
                self.coarse_step_fraction
            )));
        }
        if !self.fallback_measurement_height.is_finite() || self.fallback_measurement_height < 0. {
            return Err(ShadowError::InvalidSampling(format!(
                "Fallback measurement height must be >= 0, got {}",
                self.fallback_measurement_height
            )));
        }
        if self.fallback_window_start >= self.fallback_window_end {
            return Err(ShadowError::InvalidSampling(format!(
                "Fallback window start {} is not before its end {}",
                self.fallback_window_start, self.fallback_window_end
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One volume of a scenario massing.
///
/// The footprint is either a vertex list or a square sized from
/// `building_area`. The height is either `height` or `floors` x `floor_height`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSpec {
    pub footprint: Option<Vec<[f64; 2]>>,
    pub building_area: Option<f64>,
    pub height: Option<f64>,
    pub floors: Option<u32>,
    pub floor_height: Option<f64>,
}

impl VolumeSpec {
    fn builder(&self) -> Result<MassingBuilder> {
        let mut builder = match (&self.footprint, self.building_area) {
            (Some(pts), _) => {
                MassingBuilder::new(pts.iter().map(|&[x, y]| Point::xy(x, y)).collect())
            }
            (None, Some(area)) => MassingBuilder::square_from_area(area),
            (None, None) => {
                return Err(ShadowError::DegenerateMassing(
                    "Volume needs a footprint or a building area".to_string(),
                ));
            }
        };
        if let (Some(n), Some(fh)) = (self.floors, self.floor_height) {
            builder = builder.with_floors(n, fh);
        }
        if let Some(h) = self.height {
            builder = builder.with_height(h);
        }
        Ok(builder)
    }
}

/// A complete evaluation described in TOML.
///
/// ```toml
/// reference_day = "2025-12-21"
///
/// [location]
/// latitude = 35.6
/// longitude = 139.7
///
/// [[massing]]
/// footprint = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]
/// floors = 5
/// floor_height = 3.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub location: GeoCoordinate,
    pub reference_day: NaiveDate,
    #[serde(default)]
    pub clock: ClockBasis,
    pub massing: Vec<VolumeSpec>,
    #[serde(default)]
    pub site_boundary: Option<Footprint>,
    #[serde(default)]
    pub regulation: Option<RegulationProfile>,
    #[serde(default)]
    pub grid: Option<GridSpec>,
    #[serde(default)]
    pub points: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Scenario {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("Failed to parse scenario")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid scenario file: {}", path.display()))
    }

    /// Builds the validated massing from the volume list.
    pub fn build_massing(&self) -> Result<Massing> {
        let mut specs = self.massing.iter();
        let Some(first) = specs.next() else {
            return Err(ShadowError::DegenerateMassing(
                "Scenario has no volumes".to_string(),
            ));
        };
        let mut builder = first.builder()?;
        for spec in specs {
            for v in spec.builder()?.build()?.volumes() {
                builder = builder.add_volume(v.clone());
            }
        }
        builder.build()
    }

    pub fn to_request(&self) -> Result<EvaluationRequest> {
        let points = match (self.grid, &self.points) {
            (Some(_), Some(_)) => {
                return Err(ShadowError::Scenario(
                    "Give either a grid or explicit points, not both".to_string(),
                ));
            }
            (Some(grid), None) => PointSet::Grid(grid),
            (None, Some(xy)) => PointSet::Explicit(xy.clone()),
            (None, None) => PointSet::default(),
        };

        let massing = self.build_massing()?;
        let mut request = EvaluationRequest::new(self.location, self.reference_day, massing)
            .with_clock(self.clock)
            .with_points(points);
        request.site_boundary = self.site_boundary.clone();
        request.regulation = self.regulation.clone();
        Ok(request)
    }
}
