//! Report Output
//!
//! Renders period results as ordered per-day text lines with a trailing
//! total, matching the group output files consumed downstream.

use std::io::Write;

use crate::error::{Error, Result};
use crate::panel::Group;
use crate::simulate::PeriodTotals;

/// Destination for finished period results.
pub trait ReportSink {
    fn write_totals(&mut self, group: Group, totals: &PeriodTotals) -> Result<()>;
}

/// Plain-text report writer.
///
/// Full mode emits `date | production Wh | consumption Wh` per day;
/// production-only mode emits `date: production Wh`.
pub struct TextReport<W: Write> {
    writer: W,
    production_only: bool,
}

impl<W: Write> TextReport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, production_only: false }
    }

    pub fn production_only(mut self, yes: bool) -> Self {
        self.production_only = yes;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Human-readable energy amount: Wh below one kWh, kWh above.
pub fn format_energy(wh: f64) -> String {
    if wh.abs() < 1000.0 {
        format!("{wh:.2} Wh")
    } else {
        format!("{:.2} kWh", wh / 1000.0)
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn write_totals(&mut self, group: Group, totals: &PeriodTotals) -> Result<()> {
        let w = &mut self.writer;
        let io = Error::report;

        writeln!(w, "Results for group {group}").map_err(io)?;
        if let (Some(first), Some(last)) = (totals.days.first(), totals.days.last()) {
            writeln!(w, "Period: {} - {}", first.day, last.day).map_err(io)?;
        }
        writeln!(w).map_err(io)?;

        for day in &totals.days {
            if self.production_only {
                writeln!(w, "{}: {:.2} Wh", day.day, day.production_wh).map_err(io)?;
            } else {
                writeln!(
                    w,
                    "{} | {:.2} Wh | {:.2} Wh",
                    day.day, day.production_wh, day.consumption_wh
                )
                .map_err(io)?;
            }
        }

        writeln!(w).map_err(io)?;
        if self.production_only {
            writeln!(w, "Total production: {}", format_energy(totals.production_wh)).map_err(io)?;
        } else {
            writeln!(
                w,
                "Total: production {}, consumption {}",
                format_energy(totals.production_wh),
                format_energy(totals.consumption_wh)
            )
            .map_err(io)?;
        }
        w.flush().map_err(io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate::DailyResult;
    use chrono::NaiveDate;

    fn sample_totals() -> PeriodTotals {
        let d1 = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        PeriodTotals {
            production_wh: 3456.789,
            consumption_wh: 54.0,
            days: vec![
                DailyResult { day: d1, production_wh: 1400.5, consumption_wh: 27.0 },
                DailyResult { day: d2, production_wh: 2056.289, consumption_wh: 27.0 },
            ],
        }
    }

    #[test]
    fn test_full_report_layout() {
        let mut report = TextReport::new(Vec::new());
        report.write_totals(Group::One, &sample_totals()).unwrap();
        let text = String::from_utf8(report.into_inner()).unwrap();

        assert!(text.starts_with("Results for group 1\n"));
        assert!(text.contains("Period: 2025-06-01 - 2025-06-02"));
        assert!(text.contains("2025-06-01 | 1400.50 Wh | 27.00 Wh"));
        assert!(text.contains("2025-06-02 | 2056.29 Wh | 27.00 Wh"));
        assert!(text.trim_end().ends_with("Total: production 3.46 kWh, consumption 54.00 Wh"));
    }

    #[test]
    fn test_production_only_layout() {
        let mut report = TextReport::new(Vec::new()).production_only(true);
        report.write_totals(Group::Two, &sample_totals()).unwrap();
        let text = String::from_utf8(report.into_inner()).unwrap();

        assert!(text.starts_with("Results for group 2\n"));
        assert!(text.contains("2025-06-01: 1400.50 Wh"));
        assert!(!text.contains('|'), "production-only mode has no column bars");
        assert!(text.trim_end().ends_with("Total production: 3.46 kWh"));
    }

    #[test]
    fn test_format_energy_units() {
        assert_eq!(format_energy(999.994), "999.99 Wh");
        assert_eq!(format_energy(1000.0), "1.00 kWh");
        assert_eq!(format_energy(-2500.0), "-2.50 kWh");
    }
}
