//! Solar Panel Output Calculations
//!
//! Instantaneous power for static and tracking panels: composite incidence
//! angle from the panel/sun angular deviations, linear cloud attenuation,
//! and a fixed conversion efficiency.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::panel::{Panel, PanelKind};
use crate::solar::SunPosition;

// ===================== CONSTANTS =====================

/// Fixed panel conversion efficiency (not configurable per panel)
pub const PANEL_EFFICIENCY: f64 = 0.85;

/// Fraction of irradiance lost under full overcast (kT bottoms out at 0.25)
const CLOUD_ATTENUATION: f64 = 0.75;

/// Upper bound for either tracker axis
const MAX_TRACKER_ANGLE_DEG: f64 = 90.0;

/// Energy cost, in Wh, per configured actuator step to re-home the tracker
/// at the end of each day
pub const RETURN_ENERGY_WH_PER_STEP: f64 = 0.5;

// ===================== INCIDENCE FACTORS =====================

/// Multiplicative factors applied to a panel's rated power at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncidenceFactors {
    /// Cosine of the composite incidence deviation angle
    pub cos_incidence: f64,
    /// Atmospheric transmission from cloud cover (0.25 overcast .. 1.0 clear)
    pub k_t: f64,
    /// Panel conversion efficiency
    pub efficiency: f64,
}

/// Compute the incidence factors for a panel whose orientation deviates
/// from the sun's direction by `ia_deg` (azimuth) and `iz_deg` (elevation).
///
/// The composite deviation uses the tangent-sum approximation
/// `atan(sqrt(tan²(iA) + tan²(iZ)))` rather than the spherical law of
/// cosines; the two diverge away from normal incidence.
///
/// # Arguments
/// * `ia_deg` - Absolute azimuth deviation in degrees
/// * `iz_deg` - Absolute elevation/tilt deviation in degrees
/// * `cloudiness_pct` - Cloud cover percentage (0-100)
pub fn incidence_factors(ia_deg: f64, iz_deg: f64, cloudiness_pct: f64) -> IncidenceFactors {
    let tan_ia = ia_deg.to_radians().tan();
    let tan_iz = iz_deg.to_radians().tan();
    let angle_deviation = (tan_ia * tan_ia + tan_iz * tan_iz).sqrt().atan();

    IncidenceFactors {
        cos_incidence: angle_deviation.cos(),
        k_t: 1.0 - CLOUD_ATTENUATION * (cloudiness_pct / 100.0),
        efficiency: PANEL_EFFICIENCY,
    }
}

// ===================== STATIC PANELS =====================

/// Instantaneous power in watts for a fixed panel at the given sun position.
///
/// The deviation angles are the absolute differences between the panel's
/// mounting angles and the sun's elevation/azimuth. Never negative, and 0
/// when the sun is below the horizon.
pub fn static_panel_power(
    rated_power_w: f64,
    tilt_deg: f64,
    azimuth_deg: f64,
    cloudiness_pct: f64,
    sun: &SunPosition,
) -> f64 {
    if !sun.is_above_horizon() {
        return 0.0;
    }

    let iz = (tilt_deg - sun.elevation_deg).abs();
    let ia = (azimuth_deg - sun.azimuth_deg).abs();

    let f = incidence_factors(ia, iz, cloudiness_pct);
    let power = rated_power_w * f.cos_incidence * f.k_t * f.efficiency;
    power.max(0.0)
}

// ===================== TRACKING PANELS =====================

/// Round an angle to the nearest multiple of the axis step, capped at 90°.
/// A step count of 0 pins the axis at 0°.
fn quantize_axis(angle_deg: f64, steps: u32) -> f64 {
    if steps == 0 {
        return 0.0;
    }
    let step = MAX_TRACKER_ANGLE_DEG / steps as f64;
    ((angle_deg / step).round() * step).min(MAX_TRACKER_ANGLE_DEG)
}

/// Quantized (vertical, horizontal) tracker angles at a given instant.
///
/// Both axes ramp linearly from 0° at sunrise to 90° at sunset, then snap
/// to the resolution allowed by the configured step counts.
pub fn tracker_angles(
    vertical_steps: u32,
    horizontal_steps: u32,
    t: NaiveDateTime,
    sunrise_t: NaiveDateTime,
    sunset_t: NaiveDateTime,
) -> (f64, f64) {
    let total_minutes = (sunset_t - sunrise_t).num_seconds() as f64 / 60.0;
    if total_minutes <= 0.0 {
        return (0.0, 0.0);
    }
    let since_sunrise = (t - sunrise_t).num_seconds() as f64 / 60.0;
    let ramp = (since_sunrise / total_minutes) * MAX_TRACKER_ANGLE_DEG;

    (quantize_axis(ramp, vertical_steps), quantize_axis(ramp, horizontal_steps))
}

/// Instantaneous power in watts for a tracking panel.
///
/// The tracker's quantized angles replace the fixed mounting angles of the
/// static model; everything downstream is identical. Returns 0 when the sun
/// is below the horizon.
pub fn tracking_panel_power(
    rated_power_w: f64,
    vertical_steps: u32,
    horizontal_steps: u32,
    cloudiness_pct: f64,
    sun: &SunPosition,
    t: NaiveDateTime,
    sunrise_t: NaiveDateTime,
    sunset_t: NaiveDateTime,
) -> f64 {
    if !sun.is_above_horizon() {
        return 0.0;
    }

    let (angle_vert, angle_horiz) =
        tracker_angles(vertical_steps, horizontal_steps, t, sunrise_t, sunset_t);

    let iz = (angle_vert - sun.elevation_deg).abs();
    let ia = (angle_horiz - sun.azimuth_deg).abs();

    let f = incidence_factors(ia, iz, cloudiness_pct);
    let power = rated_power_w * f.cos_incidence * f.k_t * f.efficiency;

    debug!(
        "tracker {:.0} W @ {}: V={:.1}° H={:.1}° | ΔiZ={:.1}° ΔiA={:.1}° cos(i)={:.3} kT={:.3} -> {:.2} W",
        rated_power_w,
        t.format("%H:%M"),
        angle_vert,
        angle_horiz,
        iz,
        ia,
        f.cos_incidence,
        f.k_t,
        power
    );

    power.max(0.0)
}

/// One-time end-of-day energy cost, in Wh, for re-homing a tracker with the
/// given step counts.
pub fn return_energy_wh(vertical_steps: u32, horizontal_steps: u32) -> f64 {
    RETURN_ENERGY_WH_PER_STEP * (vertical_steps + horizontal_steps) as f64
}

/// Instantaneous power for one panel of either kind.
pub fn panel_power(
    panel: &Panel,
    cloudiness_pct: f64,
    sun: &SunPosition,
    t: NaiveDateTime,
    sunrise_t: NaiveDateTime,
    sunset_t: NaiveDateTime,
) -> f64 {
    match panel.kind {
        PanelKind::Static { tilt_deg, azimuth_deg } => {
            static_panel_power(panel.rated_power_w, tilt_deg, azimuth_deg, cloudiness_pct, sun)
        }
        PanelKind::Tracking { vertical_steps, horizontal_steps } => tracking_panel_power(
            panel.rated_power_w,
            vertical_steps,
            horizontal_steps,
            cloudiness_pct,
            sun,
            t,
            sunrise_t,
            sunset_t,
        ),
    }
}

// ===================== TESTS =====================
