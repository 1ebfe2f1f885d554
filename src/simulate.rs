//! Period Simulation Engine
//!
//! Walks a date range one day at a time, steps through each daylight window
//! at a fixed interval, and accumulates production and consumption for a
//! filtered group of panels. Month/year runs use 30-minute aggregate steps;
//! week runs use hourly steps and keep a record per timestep.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{Error, Result};
use crate::panel::{Group, Panel, PanelKind};
use crate::solar::solar_position;
use crate::solar_panel::{panel_power, return_energy_wh};
use crate::tables::{SunTable, WeatherTable};

// ===================== STEP SIZES =====================

/// Timestep for month/year aggregate runs
pub const AGGREGATE_STEP_MINUTES: i64 = 30;

/// Timestep for per-record week runs
pub const WEEK_STEP_MINUTES: i64 = 60;

// ===================== RESULTS =====================

/// Production and consumption for one simulated day, in Wh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyResult {
    pub day: NaiveDate,
    pub production_wh: f64,
    pub consumption_wh: f64,
}

impl DailyResult {
    fn zero(day: NaiveDate) -> Self {
        Self { day, production_wh: 0.0, consumption_wh: 0.0 }
    }
}

/// Aggregate outcome of a period run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodTotals {
    pub production_wh: f64,
    pub consumption_wh: f64,
    pub days: Vec<DailyResult>,
}

impl PeriodTotals {
    pub fn net_wh(&self) -> f64 {
        self.production_wh - self.consumption_wh
    }
}

/// One hourly sample from a week run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestepRecord {
    pub time: NaiveDateTime,
    /// Sun elevation at the first panel's location
    pub elevation_deg: f64,
    /// Sun azimuth at the first panel's location
    pub azimuth_deg: f64,
    pub cloudiness_pct: f64,
    pub static_power_w: f64,
    pub tracking_power_w: f64,
}

/// Week-mode output: hourly records plus the usual period totals.
#[derive(Debug, Clone, Default)]
pub struct WeekRun {
    pub totals: PeriodTotals,
    pub records: Vec<TimestepRecord>,
}

// ===================== RUN CONTROL =====================

/// Optional progress reporting and cooperative cancellation for a run.
///
/// Progress fires once per completed day with `(done, total)`. Cancellation
/// is checked at each day boundary; a cancelled run returns
/// [`Error::Cancelled`] without partial results.
#[derive(Default)]
pub struct RunControl<'c> {
    pub progress: Option<&'c mut dyn FnMut(usize, usize)>,
    pub cancel: Option<&'c AtomicBool>,
}

impl<'c> RunControl<'c> {
    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|c| c.load(Ordering::Relaxed))
    }

    fn report(&mut self, done: usize, total: usize) {
        if let Some(progress) = self.progress.as_mut() {
            progress(done, total);
        }
    }
}

// ===================== SIMULATION =====================

/// A configured simulation over one comparison group of panels.
///
/// Holds only borrowed, read-only inputs; runs are independent and the
/// engine keeps no state between them.
pub struct Simulation<'a> {
    panels: Vec<&'a Panel>,
    sun: &'a SunTable,
    weather: &'a WeatherTable,
    utc_offset_hours: f64,
}

impl<'a> Simulation<'a> {
    /// Build a simulation over the panels of `group`. Panels outside the
    /// group are ignored entirely.
    pub fn new(
        panels: &'a [Panel],
        group: Group,
        sun: &'a SunTable,
        weather: &'a WeatherTable,
        utc_offset_hours: f64,
    ) -> Self {
        Self {
            panels: panels.iter().filter(|p| p.in_group(group)).collect(),
            sun,
            weather,
            utc_offset_hours,
        }
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Run over `[start, end]` inclusive with the given timestep.
    ///
    /// Days without sun-times contribute a zero [`DailyResult`]; timesteps
    /// without weather are skipped. Neither aborts the run.
    pub fn run_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        step_minutes: i64,
        ctl: &mut RunControl<'_>,
    ) -> Result<PeriodTotals> {
        if end < start {
            return Err(Error::InvalidDateRange { start, end });
        }

        let total_days = (end - start).num_days() as usize + 1;
        let mut totals = PeriodTotals::default();

        for (done, day) in start.iter_days().take_while(|d| *d <= end).enumerate() {
            if ctl.cancelled() {
                return Err(Error::Cancelled);
            }

            let result = self.run_day(day, step_minutes, None);
            totals.production_wh += result.production_wh;
            totals.consumption_wh += result.consumption_wh;
            totals.days.push(result);

            ctl.report(done + 1, total_days);
        }

        Ok(totals)
    }

    /// Run seven days from `start` at hourly resolution, keeping one record
    /// per daylight timestep.
    pub fn run_week(&self, start: NaiveDate, ctl: &mut RunControl<'_>) -> Result<WeekRun> {
        let mut run = WeekRun::default();

        for (done, day) in start.iter_days().take(7).enumerate() {
            if ctl.cancelled() {
                return Err(Error::Cancelled);
            }

            let result = self.run_day(day, WEEK_STEP_MINUTES, Some(&mut run.records));
            run.totals.production_wh += result.production_wh;
            run.totals.consumption_wh += result.consumption_wh;
            run.totals.days.push(result);

            ctl.report(done + 1, 7);
        }

        Ok(run)
    }

    /// Simulate one day. Timesteps run in chronological order; the tracker
    /// ramp depends on elapsed time since sunrise.
    fn run_day(
        &self,
        day: NaiveDate,
        step_minutes: i64,
        mut records: Option<&mut Vec<TimestepRecord>>,
    ) -> DailyResult {
        let Some(times) = self.sun.get(day) else {
            debug!("no sun times for {day}, day contributes zero");
            return DailyResult::zero(day);
        };

        let sunrise_t = day.and_time(times.sunrise);
        let sunset_t = day.and_time(times.sunset);
        let step_hours = step_minutes as f64 / 60.0;

        let mut production_wh = 0.0;
        let mut consumption_wh = 0.0;

        let mut t = sunrise_t;
        while t <= sunset_t {
            let Some(weather) = self.weather.sample_at(t) else {
                t += Duration::minutes(step_minutes);
                continue;
            };

            let mut static_power_w = 0.0;
            let mut tracking_power_w = 0.0;

            for panel in &self.panels {
                let sun = solar_position(
                    t,
                    panel.location.latitude,
                    panel.location.longitude,
                    self.utc_offset_hours,
                );
                if !sun.is_above_horizon() {
                    continue;
                }

                let power =
                    panel_power(panel, weather.cloudiness_pct, &sun, t, sunrise_t, sunset_t);
                let scaled = power * panel.count as f64;
                production_wh += scaled * step_hours;
                consumption_wh += panel.consumption_w * panel.count as f64 * step_hours;

                if panel.is_static() {
                    static_power_w += scaled;
                } else {
                    tracking_power_w += scaled;
                }
            }

            if let Some(records) = records.as_deref_mut() {
                // Record the sun position at the first panel's site
                let site = self.panels.first().map(|p| p.location);
                let sun = site.map(|loc| {
                    solar_position(t, loc.latitude, loc.longitude, self.utc_offset_hours)
                });
                records.push(TimestepRecord {
                    time: t,
                    elevation_deg: sun.map_or(0.0, |s| s.elevation_deg),
                    azimuth_deg: sun.map_or(0.0, |s| s.azimuth_deg),
                    cloudiness_pct: weather.cloudiness_pct,
                    static_power_w,
                    tracking_power_w,
                });
            }

            t += Duration::minutes(step_minutes);
        }

        // Re-homing cost for each tracker, once per simulated day
        for panel in &self.panels {
            if let PanelKind::Tracking { vertical_steps, horizontal_steps } = panel.kind {
                consumption_wh +=
                    return_energy_wh(vertical_steps, horizontal_steps) * panel.count as f64;
            }
        }

        debug!(
            "{day}: production {production_wh:.1} Wh, consumption {consumption_wh:.1} Wh"
        );
        DailyResult { day, production_wh, consumption_wh }
    }
}

// ===================== TESTS =====================
