//! Sun Geometry Module
//!
//! Computes the sun's elevation and azimuth for a timestamp and location
//! using a simplified orbital-mechanics approximation: sinusoidal solar
//! declination, the three-term equation of time, and the hour angle derived
//! from true solar time. Accuracy is on the order of a degree, which is
//! sufficient for energy estimation; this is deliberately not a full solar
//! position algorithm.
//!
//! Timestamps are in the installation's local civil time with a known fixed
//! UTC offset.

use chrono::{Datelike, NaiveDateTime, Timelike};

// ===================== TYPES =====================

/// Sun position in the sky at a given time and location.
///
/// All angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    /// Elevation above the horizon. Negative when the sun is below it.
    pub elevation_deg: f64,
    /// Compass direction measured clockwise from north, in `[0, 360)`.
    pub azimuth_deg: f64,
}

impl SunPosition {
    /// Returns true if the sun is above the horizon.
    ///
    /// Callers must treat a non-positive elevation as zero production,
    /// not as an error.
    pub fn is_above_horizon(&self) -> bool {
        self.elevation_deg > 0.0
    }
}

// ===================== POSITION CALCULATION =====================

/// Calculate the sun's elevation and azimuth.
///
/// # Arguments
/// * `t` - Local civil date and time at the installation
/// * `latitude` - Observer latitude in degrees (-90 to 90)
/// * `longitude` - Observer longitude in degrees (-180 to 180)
/// * `utc_offset_hours` - Fixed UTC offset of the local clock, in hours
pub fn solar_position(
    t: NaiveDateTime,
    latitude: f64,
    longitude: f64,
    utc_offset_hours: f64,
) -> SunPosition {
    let day_of_year = t.date().ordinal() as f64;
    let phi = latitude.to_radians();

    // Solar declination (Cooper's sinusoidal approximation), degrees
    let declination_deg = 23.45 * (2.0 * std::f64::consts::PI / 365.0 * (day_of_year - 81.0)).sin();
    let delta = declination_deg.to_radians();

    // Equation of time, minutes
    let b = 2.0 * std::f64::consts::PI * (day_of_year - 81.0) / 364.0;
    let eot = 9.87 * (2.0 * b).sin() - 7.53 * b.cos() - 1.5 * b.sin();

    // Solar-time correction for longitude vs. the clock's standard meridian
    let correction_min = 4.0 * (longitude - 15.0 * utc_offset_hours) + eot;

    // True solar time in minutes; 720 is solar noon
    let clock_min = t.time().num_seconds_from_midnight() as f64 / 60.0;
    let solar_time_min = clock_min + correction_min;

    // Hour angle: 0° at solar noon, 15° per hour
    let hour_angle_deg = (solar_time_min - 720.0) * 0.25;
    let h = hour_angle_deg.to_radians();

    let elevation_rad = (delta.sin() * phi.sin() + delta.cos() * phi.cos() * h.cos()).asin();
    let elevation_deg = elevation_rad.to_degrees();

    // Clamp before acos to guard against floating-point overshoot; at the
    // zenith the ratio degenerates and the clamp pins the azimuth to south.
    let cos_az = (delta.sin() * phi.cos() - delta.cos() * phi.sin() * h.cos()) / elevation_rad.cos();
    let cos_az = if cos_az.is_nan() { 1.0 } else { cos_az.clamp(-1.0, 1.0) };
    let acos_deg = cos_az.acos().to_degrees();

    // Morning suns sit east of south, afternoon suns west of it
    let azimuth_deg = if hour_angle_deg > 0.0 { 180.0 + acos_deg } else { 180.0 - acos_deg };
    let azimuth_deg = azimuth_deg.rem_euclid(360.0);

    SunPosition { elevation_deg, azimuth_deg }
}

// ===================== TESTS =====================
