use crate::error::{Result, ShadowError};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Site location in decimal degrees (positive north, positive east).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Creates a validated coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let c = Self {
            latitude,
            longitude,
        };
        c.validate()?;
        Ok(c)
    }

    /// Checks latitude in [-90, 90] and longitude in [-180, 180].
    pub fn validate(&self) -> Result<()> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(ShadowError::InvalidLocation {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// How the clock times of the statutory window are to be read.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum ClockBasis {
    /// Clock times are local true solar time (12:00 = solar noon).
    #[default]
    LocalSolar,
    /// Clock times are standard time of a zone `utc_offset_hours` from UTC.
    Standard { utc_offset_hours: f64 },
}

impl ClockBasis {
    /// Converts a clock hour (0-24) on `day_of_year` to local solar time.
    pub fn to_solar_hour(&self, clock_hour: f64, location: &GeoCoordinate, day_of_year: u32) -> f64 {
        match self {
            Self::LocalSolar => clock_hour,
            Self::Standard { utc_offset_hours } => {
                // 4 minutes per degree away from the zone meridian
                let longitude_correction_min = 4.0 * (location.longitude - 15.0 * utc_offset_hours);
                let correction_min = longitude_correction_min + equation_of_time_minutes(day_of_year);
                clock_hour + correction_min / 60.0
            }
        }
    }
}

/// Day of the year (1-366) of a calendar date.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Day angle used by the Spencer series [rad].
fn day_angle(day_of_year: u32) -> f64 {
    2.0 * PI * (day_of_year as f64 - 1.0) / 365.0
}

/// Solar declination (Spencer approximation) [rad].
pub fn declination(day_of_year: u32) -> f64 {
    let gamma = day_angle(day_of_year);
    0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin()
}

/// Equation of time (Spencer) in minutes: apparent minus mean solar time.
pub fn equation_of_time_minutes(day_of_year: u32) -> f64 {
    let gamma = day_angle(day_of_year);
    229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin())
}

/// Solar position (azimuth and elevation angles).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunPosition {
    /// Solar altitude angle in degrees (0 = horizon, 90 = zenith, negative below).
    pub altitude: f64,
    /// Solar azimuth angle in degrees from north, clockwise (0=N, 90=E, 180=S, 270=W).
    pub azimuth: f64,
    /// True if the sun is above the horizon.
    pub is_daylight: bool,
}

impl SunPosition {
    /// Calculates the solar position.
    ///
    /// - `location`: site coordinate (longitude does not enter: `solar_hour` is already local solar time)
    /// - `day_of_year`: 1-366
    /// - `solar_hour`: local solar time in hours (0-24, 12 = solar noon)
    pub fn calculate(location: &GeoCoordinate, day_of_year: u32, solar_hour: f64) -> Self {
        let lat = location.latitude.to_radians();
        let dec = declination(day_of_year);

        // Hour angle (15 degrees per hour from solar noon)
        let hour_angle = ((solar_hour - 12.0) * 15.0).to_radians();

        // Solar altitude
        let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos();
        let altitude = sin_alt.clamp(-1.0, 1.0).asin().to_degrees();

        // Solar azimuth: measured from south (westward positive), then shifted to north-based
        let from_south = hour_angle
            .sin()
            .atan2(hour_angle.cos() * lat.sin() - dec.tan() * lat.cos());
        let azimuth = normalize_degrees(from_south.to_degrees() + 180.0);

        Self {
            altitude,
            azimuth,
            is_daylight: altitude > 0.0,
        }
    }

    /// Solar position at a local clock timestamp.
    pub fn at(location: &GeoCoordinate, when: NaiveDateTime, basis: ClockBasis) -> Self {
        let doy = day_of_year(when.date());
        let clock_hour = when.time().num_seconds_from_midnight() as f64 / 3600.0;
        Self::calculate(location, doy, basis.to_solar_hour(clock_hour, location, doy))
    }
}

/// Wraps an angle into [0, 360).
fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

/// Clock hour of local solar noon under the given clock basis.
pub fn solar_noon_hour(basis: ClockBasis, location: &GeoCoordinate, day_of_year: u32) -> f64 {
    // to_solar_hour is a constant shift, so invert it at noon
    let shift = basis.to_solar_hour(12.0, location, day_of_year) - 12.0;
    12.0 - shift
}

/// Samples the sun position every `step_minutes` over a whole day.
///
/// Returns `(clock_hour, position)` pairs from 00:00 to 24:00 inclusive.
pub fn sun_path(
    location: &GeoCoordinate,
    day_of_year: u32,
    basis: ClockBasis,
    step_minutes: u32,
) -> Vec<(f64, SunPosition)> {
    let step = step_minutes.max(1);
    (0..=(24 * 60))
        .step_by(step as usize)
        .map(|minute| {
            let clock_hour = minute as f64 / 60.0;
            let solar_hour = basis.to_solar_hour(clock_hour, location, day_of_year);
            (
                clock_hour,
                SunPosition::calculate(location, day_of_year, solar_hour),
            )
        })
        .collect()
}
