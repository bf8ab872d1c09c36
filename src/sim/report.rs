//! Per-point results and the overall compliance verdict.

use crate::Point;
use crate::geom::polygon::Footprint;
use crate::sim::integrator::Accumulation;
use crate::sim::regulation::{RegulationProfile, distance_to_boundary, resolve_limit};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Compliant,
    NonCompliant,
    NotEvaluated,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Compliant => "COMPLIANT",
            Self::NonCompliant => "NON_COMPLIANT",
            Self::NotEvaluated => "NOT_EVALUATED",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointStatus {
    Compliant,
    Violating,
    /// No limit applies (too close to the boundary, or no profile).
    Unregulated,
}

/// Result for a single check point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckPoint {
    pub position: Point,
    /// Planar distance to the regulated boundary [m].
    pub distance_to_boundary: f64,
    /// Allowed shadow hours, `None` if unregulated.
    pub limit_hours: Option<f64>,
    /// Accumulated shadow duration within the window [h].
    pub shadow_hours: f64,
    pub status: PointStatus,
}

impl CheckPoint {
    pub fn new(
        position: Point,
        distance_to_boundary: f64,
        limit_hours: Option<f64>,
        shadow_hours: f64,
    ) -> Self {
        let status = match limit_hours {
            None => PointStatus::Unregulated,
            Some(limit) if shadow_hours <= limit => PointStatus::Compliant,
            Some(_) => PointStatus::Violating,
        };
        Self {
            position,
            distance_to_boundary,
            limit_hours,
            shadow_hours,
            status,
        }
    }

    pub fn is_regulated(&self) -> bool {
        self.limit_hours.is_some()
    }

    pub fn is_compliant(&self) -> bool {
        self.status == PointStatus::Compliant
    }
}

/// Non-fatal conditions attached to a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// No regulation applies to the site; shadow hours are for observation only.
    MissingRegulationProfile,
    /// The step is long compared to the window, so totals are coarse.
    SamplingTooCoarse { step_minutes: u32, window_minutes: u32 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRegulationProfile => {
                write!(f, "no regulation profile, shadow hours are observational")
            }
            Self::SamplingTooCoarse {
                step_minutes,
                window_minutes,
            } => write!(
                f,
                "step of {} min is coarse for a {} min window",
                step_minutes, window_minutes
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Completion {
    Complete,
    /// Cancelled between steps. Shadow hours cover only the completed steps.
    Aborted {
        steps_completed: usize,
        steps_total: usize,
        /// Window time covered by the completed steps [s].
        elapsed_secs: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub overall_status: OverallStatus,
    /// Compliant share of the regulated points (1 when none are regulated).
    pub compliance_rate: f64,
    pub points: Vec<CheckPoint>,
    pub advisories: Vec<Advisory>,
    pub completion: Completion,
    /// Number of time samples in the window.
    pub samples: usize,
    pub step_minutes: u32,
}

impl ComplianceReport {
    /// Builds the report from accumulated shadow durations.
    ///
    /// `points` and `accumulation.shadow_secs` must be in the same order.
    pub fn aggregate(
        points: &[Point],
        accumulation: &Accumulation,
        boundary: &[Footprint],
        regulation: Option<&RegulationProfile>,
        advisories: Vec<Advisory>,
        step_minutes: u32,
    ) -> Self {
        let checks: Vec<CheckPoint> = points
            .iter()
            .zip(accumulation.shadow_secs.iter())
            .map(|(&p, &secs)| {
                CheckPoint::new(
                    p,
                    distance_to_boundary(p, boundary),
                    resolve_limit(p, boundary, regulation),
                    secs as f64 / 3600.0,
                )
            })
            .collect();

        let regulated = checks.iter().filter(|c| c.is_regulated()).count();
        let compliant = checks.iter().filter(|c| c.is_compliant()).count();
        let compliance_rate = if regulated == 0 {
            1.0
        } else {
            compliant as f64 / regulated as f64
        };

        let completion = if accumulation.is_complete() {
            Completion::Complete
        } else {
            Completion::Aborted {
                steps_completed: accumulation.steps_completed,
                steps_total: accumulation.steps_total,
                elapsed_secs: accumulation.elapsed_secs,
            }
        };

        let overall_status = match (regulation, completion) {
            (None, _) | (_, Completion::Aborted { .. }) => OverallStatus::NotEvaluated,
            _ if compliant == regulated => OverallStatus::Compliant,
            _ => OverallStatus::NonCompliant,
        };

        Self {
            overall_status,
            compliance_rate,
            points: checks,
            advisories,
            completion,
            samples: accumulation.steps_total,
            step_minutes,
        }
    }

    pub fn regulated_count(&self) -> usize {
        self.points.iter().filter(|c| c.is_regulated()).count()
    }

    pub fn violating(&self) -> impl Iterator<Item = &CheckPoint> {
        self.points
            .iter()
            .filter(|c| c.status == PointStatus::Violating)
    }

    pub fn max_shadow_hours(&self) -> f64 {
        self.points
            .iter()
            .map(|c| c.shadow_hours)
            .fold(0., f64::max)
    }

    pub fn has_advisory(&self, advisory: &Advisory) -> bool {
        self.advisories.contains(advisory)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ComplianceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2);
        writeln!(
            f,
            "Shadow compliance: {} (rate {:.*}%)",
            self.overall_status,
            prec,
            100. * self.compliance_rate
        )?;
        writeln!(
            f,
            "  check points: {} (regulated {}, violating {})",
            self.points.len(),
            self.regulated_count(),
            self.violating().count()
        )?;
        writeln!(
            f,
            "  samples: {} x {} min",
            self.samples, self.step_minutes
        )?;
        writeln!(f, "  max shadow: {:.*} h", prec, self.max_shadow_hours())?;
        if let Completion::Aborted {
            steps_completed,
            steps_total,
            elapsed_secs,
        } = self.completion
        {
            writeln!(
                f,
                "  aborted after {} of {} steps ({:.*} h sampled)",
                steps_completed,
                steps_total,
                prec,
                elapsed_secs as f64 / 3600.0
            )?;
        }
        for a in &self.advisories {
            writeln!(f, "  advisory: {}", a)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn profile() -> RegulationProfile {
        RegulationProfile {
            measurement_height: 4.,
            window_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            window_end: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            band_a_hours: 4.,
            band_b_hours: 2.5,
            district: None,
        }
    }

    fn site() -> Vec<Footprint> {
        vec![Footprint::rectangle(10., 10., (0., 0.)).unwrap()]
    }

    fn points() -> Vec<Point> {
        vec![
            Point::new(5., 12., 4.), // 2 m, unregulated
            Point::new(5., 18., 4.), // band A
            Point::new(5., 60., 4.), // band B
        ]
    }

    fn accumulation(shadow_secs: Vec<i64>, done: usize) -> Accumulation {
        Accumulation {
            shadow_secs,
            steps_completed: done,
            steps_total: 48,
            elapsed_secs: done as i64 * 600,
        }
    }

    #[test]
    fn test_limit_is_inclusive() {
        let at_limit = CheckPoint::new(Point::xy(0., 0.), 8., Some(4.), 4.);
        assert!(at_limit.is_compliant());
        let over = CheckPoint::new(Point::xy(0., 0.), 8., Some(4.), 4. + 1. / 3600.);
        assert_eq!(over.status, PointStatus::Violating);
        let free = CheckPoint::new(Point::xy(0., 0.), 2., None, 8.);
        assert_eq!(free.status, PointStatus::Unregulated);
    }

    #[test]
    fn test_aggregate_compliant() {
        let acc = accumulation(vec![8 * 3600, 4 * 3600, 3600], 48);
        let r = ComplianceReport::aggregate(&points(), &acc, &site(), Some(&profile()), vec![], 10);
        assert_eq!(r.overall_status, OverallStatus::Compliant);
        assert_eq!(r.compliance_rate, 1.);
        assert_eq!(r.regulated_count(), 2);
        assert_eq!(r.points[0].status, PointStatus::Unregulated);
        assert_eq!(r.completion, Completion::Complete);
        assert!((r.max_shadow_hours() - 8.).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_violation() {
        let acc = accumulation(vec![0, 5 * 3600, 3600], 48);
        let r = ComplianceReport::aggregate(&points(), &acc, &site(), Some(&profile()), vec![], 10);
        assert_eq!(r.overall_status, OverallStatus::NonCompliant);
        assert!((r.compliance_rate - 0.5).abs() < 1e-12);
        assert_eq!(r.violating().count(), 1);
    }

    #[test]
    fn test_missing_profile_not_evaluated() {
        let acc = accumulation(vec![0, 5 * 3600, 3600], 48);
        let r = ComplianceReport::aggregate(
            &points(),
            &acc,
            &site(),
            None,
            vec![Advisory::MissingRegulationProfile],
            10,
        );
        assert_eq!(r.overall_status, OverallStatus::NotEvaluated);
        assert_eq!(r.regulated_count(), 0);
        assert_eq!(r.compliance_rate, 1.);
        // Hours are still reported
        assert!((r.points[1].shadow_hours - 5.).abs() < 1e-12);
        assert!(r.has_advisory(&Advisory::MissingRegulationProfile));
    }

    #[test]
    fn test_aborted_not_evaluated() {
        let acc = accumulation(vec![0, 1200, 6000], 10);
        let r = ComplianceReport::aggregate(&points(), &acc, &site(), Some(&profile()), vec![], 10);
        assert_eq!(r.overall_status, OverallStatus::NotEvaluated);
        assert_eq!(
            r.completion,
            Completion::Aborted {
                steps_completed: 10,
                steps_total: 48,
                elapsed_secs: 6000,
            }
        );
        assert!(format!("{}", r).contains("aborted after 10 of 48 steps (1.67 h sampled)"));
    }

    #[test]
    fn test_json_status_names() -> anyhow::Result<()> {
        let acc = accumulation(vec![0, 5 * 3600, 3600], 48);
        let r = ComplianceReport::aggregate(&points(), &acc, &site(), Some(&profile()), vec![], 10);
        let json = r.to_json()?;
        assert!(json.contains("\"NON_COMPLIANT\""));
        let back: ComplianceReport = serde_json::from_str(&json)?;
        assert_eq!(back, r);
        Ok(())
    }

    #[test]
    fn test_display_summary() {
        let acc = accumulation(vec![0, 5 * 3600, 3600], 48);
        let r = ComplianceReport::aggregate(
            &points(),
            &acc,
            &site(),
            Some(&profile()),
            vec![Advisory::SamplingTooCoarse {
                step_minutes: 60,
                window_minutes: 480,
            }],
            10,
        );
        let text = format!("{}", r);
        assert!(text.contains("NON_COMPLIANT (rate 50.00%)"));
        assert!(text.contains("max shadow: 5.00 h"));
        assert!(text.contains("coarse"));
        let short = format!("{:.0}", r);
        assert!(short.contains("rate 50%"));
    }
}
