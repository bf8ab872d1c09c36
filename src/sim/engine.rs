//! Evaluation entry point.
//!
//! Every input is validated before the first time step is sampled, so a
//! rejected request never produces a partial report.

use crate::Point;
use crate::config::EngineConfig;
use crate::error::{Result, ShadowError};
use crate::geom::massing::Massing;
use crate::geom::polygon::Footprint;
use crate::sim::cache::{CacheKey, ReportCache};
use crate::sim::grid::GridSpec;
use crate::sim::integrator::{Integrator, Schedule};
use crate::sim::regulation::RegulationProfile;
use crate::sim::report::{Advisory, ComplianceReport, Completion};
use crate::sim::solar::{ClockBasis, GeoCoordinate, day_of_year};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub use crate::sim::integrator::CancellationToken;

/// Where the check points come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSet {
    /// Regular grid around the regulated boundary.
    Grid(GridSpec),
    /// Planar `[x, y]` positions; the height is the measurement plane.
    Explicit(Vec<[f64; 2]>),
}

impl Default for PointSet {
    fn default() -> Self {
        Self::Grid(GridSpec::default())
    }
}

/// Everything that defines one compliance evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub location: GeoCoordinate,
    pub reference_day: NaiveDate,
    #[serde(default)]
    pub clock: ClockBasis,
    pub massing: Massing,
    /// Regulated boundary. Defaults to the massing footprints.
    #[serde(default)]
    pub site_boundary: Option<Footprint>,
    /// Resolved regulation of the site, `None` if no regulation applies.
    #[serde(default)]
    pub regulation: Option<RegulationProfile>,
    #[serde(default)]
    pub points: PointSet,
}

impl EvaluationRequest {
    pub fn new(location: GeoCoordinate, reference_day: NaiveDate, massing: Massing) -> Self {
        Self {
            location,
            reference_day,
            clock: ClockBasis::default(),
            massing,
            site_boundary: None,
            regulation: None,
            points: PointSet::default(),
        }
    }

    pub fn with_regulation(mut self, profile: RegulationProfile) -> Self {
        self.regulation = Some(profile);
        self
    }

    pub fn with_site_boundary(mut self, boundary: Footprint) -> Self {
        self.site_boundary = Some(boundary);
        self
    }

    pub fn with_points(mut self, points: PointSet) -> Self {
        self.points = points;
        self
    }

    pub fn with_clock(mut self, clock: ClockBasis) -> Self {
        self.clock = clock;
        self
    }

    /// Rings distances are measured from.
    pub fn boundary(&self) -> Vec<Footprint> {
        match &self.site_boundary {
            Some(fp) => vec![fp.clone()],
            None => self.massing.footprints(),
        }
    }
}

/// Measurement plane and window actually sampled for a request.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Window {
    plane: f64,
    start: NaiveTime,
    end: NaiveTime,
}

/// Shadow compliance engine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs a full evaluation.
    pub fn evaluate(&self, request: &EvaluationRequest) -> Result<ComplianceReport> {
        self.evaluate_with_cancel(request, &CancellationToken::new())
    }

    /// Runs an evaluation that stops early once `cancel` is set.
    ///
    /// A cancelled run still returns a report: its completion is
    /// [`Completion::Aborted`] and its status is not evaluated.
    pub fn evaluate_with_cancel(
        &self,
        request: &EvaluationRequest,
        cancel: &CancellationToken,
    ) -> Result<ComplianceReport> {
        self.evaluate_with_progress(request, cancel, |_| {})
    }

    /// Like [`Engine::evaluate_with_cancel`], calling `on_step` with the
    /// number of completed time steps after each one.
    pub fn evaluate_with_progress<F>(
        &self,
        request: &EvaluationRequest,
        cancel: &CancellationToken,
        on_step: F,
    ) -> Result<ComplianceReport>
    where
        F: FnMut(usize),
    {
        let span = tracing::info_span!("evaluate", day = %request.reference_day);
        let _enter = span.enter();

        request.location.validate()?;
        self.config.validate()?;
        if let Some(profile) = &request.regulation {
            profile.validate()?;
        }

        let window = self.window(request.regulation.as_ref());
        let boundary = request.boundary();
        let points = self.check_points(request, &boundary, window.plane)?;

        let mut advisories = Vec::new();
        if request.regulation.is_none() {
            tracing::warn!("No regulation profile, shadow hours are observational only");
            advisories.push(Advisory::MissingRegulationProfile);
        }
        let step_secs = i64::from(self.config.step_minutes) * 60;
        let window_secs = (window.end - window.start).num_seconds();
        if step_secs as f64 > self.config.coarse_step_fraction * window_secs as f64 {
            tracing::warn!(
                "Step of {} min is coarse for a {} s window",
                self.config.step_minutes,
                window_secs
            );
            advisories.push(Advisory::SamplingTooCoarse {
                step_minutes: self.config.step_minutes,
                window_minutes: (window_secs / 60) as u32,
            });
        }

        let doy = day_of_year(request.reference_day);
        let schedule = Schedule::new(
            window.start,
            window.end,
            step_secs,
            &request.location,
            doy,
            request.clock,
        )?;
        tracing::debug!(
            "Sampling {} points over {} steps (day {})",
            points.len(),
            schedule.len(),
            doy
        );

        let accumulation = Integrator::new(&request.massing, &schedule).run_with_progress(
            &points,
            self.config.parallel,
            cancel,
            on_step,
        );

        let report = ComplianceReport::aggregate(
            &points,
            &accumulation,
            &boundary,
            request.regulation.as_ref(),
            advisories,
            self.config.step_minutes,
        );
        match report.completion {
            Completion::Complete => tracing::info!(
                "{} (rate {:.3}, {} points)",
                report.overall_status,
                report.compliance_rate,
                report.points.len()
            ),
            Completion::Aborted {
                steps_completed,
                steps_total,
                ..
            } => tracing::warn!("Aborted after {} of {} steps", steps_completed, steps_total),
        }

        Ok(report)
    }

    /// Like [`Engine::evaluate`], reusing a stored report for identical inputs.
    ///
    /// Only complete reports are stored.
    pub fn evaluate_cached(
        &self,
        request: &EvaluationRequest,
        cache: &dyn ReportCache,
    ) -> Result<ComplianceReport> {
        let key = CacheKey::for_request(request, &self.config)?;
        if let Some(report) = cache.get(&key) {
            tracing::debug!("Cache hit for {}", key);
            return Ok(report);
        }

        let report = self.evaluate(request)?;
        if report.completion == Completion::Complete {
            cache.put(key, report.clone());
        }
        Ok(report)
    }

    fn window(&self, regulation: Option<&RegulationProfile>) -> Window {
        match regulation {
            Some(p) => Window {
                plane: p.measurement_height,
                start: p.window_start,
                end: p.window_end,
            },
            None => Window {
                plane: self.config.fallback_measurement_height,
                start: self.config.fallback_window_start,
                end: self.config.fallback_window_end,
            },
        }
    }

    fn check_points(
        &self,
        request: &EvaluationRequest,
        boundary: &[Footprint],
        plane: f64,
    ) -> Result<Vec<Point>> {
        let points = match &request.points {
            PointSet::Grid(grid) => grid.generate(boundary, &request.massing, plane)?,
            PointSet::Explicit(xy) => {
                if let Some(bad) = xy.iter().find(|[x, y]| !x.is_finite() || !y.is_finite()) {
                    return Err(ShadowError::InvalidGrid(format!(
                        "Check point [{}, {}] is not finite",
                        bad[0], bad[1]
                    )));
                }
                xy.iter().map(|&[x, y]| Point::new(x, y, plane)).collect()
            }
        };
        if points.is_empty() {
            return Err(ShadowError::InvalidGrid("No check points".to_string()));
        }
        Ok(points)
    }
}
