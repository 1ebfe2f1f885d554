//! # pvsim
//!
//! Estimates the electrical energy produced by photovoltaic panels over
//! arbitrary date ranges, combining an astronomical sun-position model with
//! a cloud-attenuation weather model and panel-specific geometry and
//! consumption figures.
//!
//! Two panel kinds are modeled:
//! - **static** panels with a fixed tilt and azimuth, and
//! - **tracking** panels whose stepped actuators sweep across the daylight
//!   window and re-home at day's end (costing extra energy).
//!
//! Panels are assigned to one or two comparison *groups* so that two
//! candidate configurations can be contrasted in net energy output.
//!
//! The crate is a pure computation library: it consumes a per-day
//! sunrise/solar-noon/sunset table, a per-day or per-timestamp cloudiness
//! table, and an in-memory panel list, and produces per-day
//! production/consumption results plus period totals. The `pvsim` binary is
//! a thin shell that loads the delimited input tables and writes plain-text
//! reports.
//!
//! ## Quick start
//!
//! ```no_run
//! use pvsim::{Group, Panel, RunControl, Simulation, SunTable, WeatherTable};
//! use chrono::NaiveDate;
//!
//! # fn main() -> Result<(), pvsim::Error> {
//! let sun = SunTable::load("sun_data.csv")?;
//! let weather = WeatherTable::load_daily("yearly_weather_forecast.csv")?;
//! let panels: Vec<Panel> = vec![/* loaded elsewhere */];
//!
//! let sim = Simulation::new(&panels, Group::One, &sun, &weather, 9.0);
//! let totals = sim.run_period(
//!     NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
//!     pvsim::simulate::AGGREGATE_STEP_MINUTES,
//!     &mut RunControl::default(),
//! )?;
//! println!("{:.1} Wh produced", totals.production_wh);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod error;
pub mod panel;
pub mod report;
pub mod simulate;
pub mod solar;
pub mod solar_panel;
pub mod tables;

pub use error::Error;
pub use panel::{Group, Groups, Location, Panel, PanelKind};
pub use report::{ReportSink, TextReport};
pub use simulate::{
    DailyResult, PeriodTotals, RunControl, Simulation, TimestepRecord, WeekRun,
    AGGREGATE_STEP_MINUTES, WEEK_STEP_MINUTES,
};
pub use solar::{solar_position, SunPosition};
pub use tables::{DateKey, SunTable, SunTimes, WeatherSample, WeatherTable};
