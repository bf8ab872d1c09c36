//! Time sampling and shadow-duration accumulation.
//!
//! The statutory window is cut into steps of a fixed length. The sun position
//! is computed once per step and shared by every check point. Each shaded
//! point gains the step's duration. Durations are kept as whole seconds so
//! the totals do not depend on summation order or thread partitioning.

use crate::Point;
use crate::error::{Result, ShadowError};
use crate::geom::massing::Massing;
use crate::sim::shadow::is_in_shadow;
use crate::sim::solar::{ClockBasis, GeoCoordinate, SunPosition};
use chrono::{NaiveTime, TimeDelta, Timelike};
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default sampling interval [min].
pub const DEFAULT_STEP_MINUTES: u32 = 10;

/// Cooperative cancellation flag, checked between time steps.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// One sample of the statutory window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStep {
    /// Clock time at the start of the step.
    pub clock: NaiveTime,
    /// Local solar time at the start of the step [h].
    pub solar_hour: f64,
    /// Time represented by this sample [s]. Shorter than the step for a final partial step.
    pub duration_secs: i64,
    pub sun: SunPosition,
}

/// Sun positions for every step of the window.
#[derive(Debug, Clone)]
pub struct Schedule {
    steps: Vec<TimeStep>,
    window_secs: i64,
}

impl Schedule {
    /// Samples `[start, end)` every `step_secs` seconds.
    ///
    /// The last step is truncated so the sampled time never runs past `end`.
    pub fn new(
        start: NaiveTime,
        end: NaiveTime,
        step_secs: i64,
        location: &GeoCoordinate,
        day_of_year: u32,
        basis: ClockBasis,
    ) -> Result<Self> {
        if step_secs <= 0 {
            return Err(ShadowError::InvalidSampling(format!(
                "Step must be positive, got {} s",
                step_secs
            )));
        }
        if start >= end {
            return Err(ShadowError::InvalidSampling(format!(
                "Window start {} is not before window end {}",
                start, end
            )));
        }

        let window_secs = (end - start).num_seconds();
        let mut steps = Vec::with_capacity((window_secs / step_secs + 1) as usize);
        let mut offset = 0;
        while offset < window_secs {
            let clock = start + TimeDelta::seconds(offset);
            let clock_hour = clock.num_seconds_from_midnight() as f64 / 3600.0;
            let solar_hour = basis.to_solar_hour(clock_hour, location, day_of_year);
            steps.push(TimeStep {
                clock,
                solar_hour,
                duration_secs: step_secs.min(window_secs - offset),
                sun: SunPosition::calculate(location, day_of_year, solar_hour),
            });
            offset += step_secs;
        }

        Ok(Self { steps, window_secs })
    }

    pub fn steps(&self) -> &[TimeStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Window length [s].
    pub fn window_secs(&self) -> i64 {
        self.window_secs
    }
}

/// Per-point shadow totals after a (possibly interrupted) run.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulation {
    /// Shaded seconds per check point, in input order.
    pub shadow_secs: Vec<i64>,
    /// Steps fully processed for every point.
    pub steps_completed: usize,
    pub steps_total: usize,
    /// Window time covered by the completed steps [s].
    pub elapsed_secs: i64,
}

impl Accumulation {
    pub fn is_complete(&self) -> bool {
        self.steps_completed == self.steps_total
    }
}

/// Drives the shadow raycaster over a schedule.
pub struct Integrator<'a> {
    massing: &'a Massing,
    schedule: &'a Schedule,
}

impl<'a> Integrator<'a> {
    pub fn new(massing: &'a Massing, schedule: &'a Schedule) -> Self {
        Self { massing, schedule }
    }

    pub fn schedule(&self) -> &Schedule {
        self.schedule
    }

    /// Accumulates shaded time for every point.
    ///
    /// With `parallel` the points of each step are split across the rayon
    /// pool; the totals are identical either way. Cancellation is observed
    /// only between steps, so all points always share the same step count.
    pub fn run(&self, points: &[Point], parallel: bool, cancel: &CancellationToken) -> Accumulation {
        self.run_with_progress(points, parallel, cancel, |_| {})
    }

    /// Like [`Integrator::run`], calling `on_step` with the number of
    /// completed steps after each one.
    pub fn run_with_progress<F>(
        &self,
        points: &[Point],
        parallel: bool,
        cancel: &CancellationToken,
        mut on_step: F,
    ) -> Accumulation
    where
        F: FnMut(usize),
    {
        let mut shadow_secs = vec![0_i64; points.len()];
        let mut steps_completed = 0;
        let mut elapsed_secs = 0;

        for step in self.schedule.steps() {
            if cancel.is_cancelled() {
                tracing::debug!(
                    "Cancelled after {} of {} steps",
                    steps_completed,
                    self.schedule.len()
                );
                break;
            }

            if step.sun.is_daylight {
                let massing = self.massing;
                let sun = step.sun;
                let dt = step.duration_secs;
                if parallel {
                    shadow_secs
                        .par_iter_mut()
                        .zip(points.par_iter())
                        .for_each(|(acc, p)| {
                            if is_in_shadow(*p, &sun, massing) {
                                *acc += dt;
                            }
                        });
                } else {
                    for (acc, p) in shadow_secs.iter_mut().zip(points.iter()) {
                        if is_in_shadow(*p, &sun, massing) {
                            *acc += dt;
                        }
                    }
                }
            }

            steps_completed += 1;
            elapsed_secs += step.duration_secs;
            on_step(steps_completed);
        }

        Accumulation {
            shadow_secs,
            steps_completed,
            steps_total: self.schedule.len(),
            elapsed_secs,
        }
    }
}
