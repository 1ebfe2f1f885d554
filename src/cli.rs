//! Command-Line Interface Module
//!
//! Argument parsing and validation for the pvsim binary.

use std::path::PathBuf;

use chrono::{Months, NaiveDate};
use clap::{Parser, ValueEnum};

// ===================== CLI =====================

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Panel list as a JSON file (array of panel records)
    #[arg(long, env = "PVSIM_PANELS")]
    pub panels: PathBuf,

    /// Per-day sunrise/noon/sunset table (';'-delimited, dd.MM dates)
    #[arg(long, default_value = "sun_data.csv", env = "PVSIM_SUN_DATA")]
    pub sun_data: PathBuf,

    /// Yearly weather forecast (','-delimited, MM-dd dates)
    #[arg(long, default_value = "yearly_weather_forecast.csv", env = "PVSIM_WEATHER")]
    pub weather: PathBuf,

    /// Optional timestamped weather samples (';'-delimited) merged over
    /// the yearly forecast
    #[arg(long)]
    pub hourly_weather: Option<PathBuf>,

    /// First simulated day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub start: NaiveDate,

    /// Last simulated day (YYYY-MM-DD); overrides --period
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Simulated period starting at --start
    #[arg(long, value_enum, default_value_t = Period::Month)]
    pub period: Period,

    /// Which comparison group(s) to simulate
    #[arg(long, value_enum, default_value_t = GroupChoice::Both)]
    pub group: GroupChoice,

    /// UTC offset of the panel sites in hours (-12 to 14)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true, value_parser = parse_utc_offset)]
    pub utc_offset: f64,

    /// Directory for the group output files
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Omit consumption columns from the reports
    #[arg(long)]
    pub production_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Period {
    /// 7 days, hourly steps, per-timestep records
    Week,
    /// Calendar month, 30-minute aggregate steps
    Month,
    /// Calendar year, 30-minute aggregate steps
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupChoice {
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
    Both,
}

impl Args {
    /// Inclusive date range of the run, derived from --end or --period.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        if let Some(end) = self.end {
            return (self.start, end);
        }
        let end = match self.period {
            Period::Week => self.start + chrono::Duration::days(6),
            Period::Month => self.start + Months::new(1) - chrono::Duration::days(1),
            Period::Year => self.start + Months::new(12) - chrono::Duration::days(1),
        };
        (self.start, end)
    }
}

// ===================== CLI VALUE PARSERS =====================

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date (expected YYYY-MM-DD): {}", s))
}

fn parse_utc_offset(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(-12.0..=14.0).contains(&v) {
        return Err(format!("UTC offset must be between -12 and 14 hours, got {}", v));
    }
    Ok(v)
}

// ===================== TESTS =====================
