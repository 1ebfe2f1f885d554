//! Sun-Times and Weather Lookup Tables
//!
//! Loads the two delimited-text inputs the simulator needs: a per-day
//! sunrise/noon/sunset table keyed by `(month, day)` and a weather table
//! with per-day cloudiness, optionally refined by timestamped samples.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{info, warn};

use crate::error::{Error, Result};

// ===================== DATE KEY =====================

/// Calendar date without a year, the key for both lookup tables.
///
/// Sun-times and forecast data repeat yearly; keying on `(month, day)` lets
/// one table serve any simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateKey {
    pub month: u32,
    pub day: u32,
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self { month: date.month(), day: date.day() }
    }
}

// ===================== SUN TABLE =====================

/// Sunrise, solar noon, and sunset for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    pub sunrise: NaiveTime,
    pub noon: NaiveTime,
    pub sunset: NaiveTime,
}

/// Per-day sun-times table loaded from a `;`-delimited file with one header
/// row and `dd.MM;sunrise;noon;sunset` data rows.
#[derive(Debug, Clone, Default)]
pub struct SunTable {
    days: HashMap<DateKey, SunTimes>,
}

/// Accept both `HH:MM` and `HH:MM:SS` time-of-day fields.
fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Parse a `dd.MM` date field.
fn parse_day_month(s: &str) -> Option<DateKey> {
    let (d, m) = s.trim().split_once('.')?;
    let day: u32 = d.parse().ok()?;
    let month: u32 = m.parse().ok()?;
    // Validate against a leap year so 29.02 rows are kept
    NaiveDate::from_ymd_opt(2024, month, day)?;
    Some(DateKey { month, day })
}

impl SunTable {
    /// Load the table from `path`. Malformed rows are skipped with a
    /// warning; a file that yields no usable rows is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let table = Self::from_reader(file)?;
        if table.days.is_empty() {
            return Err(Error::empty_table(path));
        }
        info!("loaded sun times for {} days from {}", table.days.len(), path.display());
        Ok(table)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut days = HashMap::new();
        for (i, record) in csv.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    warn!("skipping unreadable sun-times row {}: {e}", i + 2);
                    continue;
                }
            };
            if record.len() < 4 {
                continue;
            }
            let parsed = parse_day_month(&record[0]).and_then(|key| {
                let sunrise = parse_time_of_day(&record[1])?;
                let noon = parse_time_of_day(&record[2])?;
                let sunset = parse_time_of_day(&record[3])?;
                Some((key, SunTimes { sunrise, noon, sunset }))
            });
            match parsed {
                Some((key, times)) if times.sunrise < times.noon && times.noon < times.sunset => {
                    days.insert(key, times);
                }
                Some((key, _)) => {
                    warn!("sun times out of order for {:02}.{:02}, row skipped", key.day, key.month);
                }
                None => {
                    warn!("skipping malformed sun-times row {}", i + 2);
                }
            }
        }
        Ok(Self { days })
    }

    pub fn get(&self, date: NaiveDate) -> Option<&SunTimes> {
        self.days.get(&DateKey::from(date))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

// ===================== WEATHER TABLE =====================

/// Cloud cover (and temperature, when the source provides it) at one point
/// or for one whole day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSample {
    pub cloudiness_pct: f64,
    pub temperature_c: Option<f64>,
}

/// Weather lookups for the simulator.
///
/// The daily map comes from a `,`-delimited yearly forecast
/// (`MM-dd,temperature,cloudiness`). An optional `;`-delimited hourly file
/// (`timestamp;cloudiness;temperature`) refines it: for timestamps on a day
/// with hourly samples, the nearest same-day sample wins.
#[derive(Debug, Clone, Default)]
pub struct WeatherTable {
    daily: HashMap<DateKey, WeatherSample>,
    samples: Vec<(NaiveDateTime, WeatherSample)>,
}

fn parse_month_day(s: &str) -> Option<DateKey> {
    let (a, b) = s.trim().split_once('-')?;
    let first: u32 = a.parse().ok()?;
    let second: u32 = b.parse().ok()?;
    // MM-dd preferred, dd-MM tolerated when unambiguous
    if NaiveDate::from_ymd_opt(2024, first, second).is_some() {
        Some(DateKey { month: first, day: second })
    } else if NaiveDate::from_ymd_opt(2024, second, first).is_some() {
        Some(DateKey { month: second, day: first })
    } else {
        None
    }
}

impl WeatherTable {
    /// Load the daily forecast from `path`. Cloudiness is clamped to
    /// 0-100%; malformed rows are skipped with a warning.
    pub fn load_daily(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let table = Self::daily_from_reader(file)?;
        if table.daily.is_empty() {
            return Err(Error::empty_table(path));
        }
        info!("loaded daily weather for {} days from {}", table.daily.len(), path.display());
        Ok(table)
    }

    pub fn daily_from_reader(reader: impl Read) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut daily = HashMap::new();
        for (i, record) in csv.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    warn!("skipping unreadable weather row {}: {e}", i + 2);
                    continue;
                }
            };
            if record.len() < 3 {
                continue;
            }
            let parsed = parse_month_day(&record[0]).and_then(|key| {
                let temperature: f64 = record[1].trim().parse().ok()?;
                let cloudiness: f64 = record[2].trim().parse().ok()?;
                Some((key, cloudiness, temperature))
            });
            match parsed {
                Some((key, cloudiness, temperature)) => {
                    daily.insert(
                        key,
                        WeatherSample {
                            cloudiness_pct: cloudiness.clamp(0.0, 100.0),
                            temperature_c: Some(temperature),
                        },
                    );
                }
                None => warn!("skipping malformed weather row {}", i + 2),
            }
        }
        Ok(Self { daily, samples: Vec::new() })
    }

    /// Merge timestamped samples (`%Y-%m-%d %H:%M:%S;cloudiness;temperature`)
    /// into this table.
    pub fn merge_hourly(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        self.merge_hourly_from_reader(file);
        info!("merged hourly weather from {}", path.display());
        Ok(())
    }

    pub fn merge_hourly_from_reader(&mut self, reader: impl Read) {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        for (i, record) in csv.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    warn!("skipping unreadable hourly weather row {}: {e}", i + 2);
                    continue;
                }
            };
            if record.len() < 3 {
                continue;
            }
            let parsed = NaiveDateTime::parse_from_str(record[0].trim(), "%Y-%m-%d %H:%M:%S")
                .ok()
                .and_then(|t| {
                    let cloudiness: f64 = record[1].trim().parse().ok()?;
                    let temperature: f64 = record[2].trim().parse().ok()?;
                    Some((t, cloudiness, temperature))
                });
            match parsed {
                Some((t, cloudiness, temperature)) => self.samples.push((
                    t,
                    WeatherSample {
                        cloudiness_pct: cloudiness.clamp(0.0, 100.0),
                        temperature_c: Some(temperature),
                    },
                )),
                None => warn!("skipping malformed hourly weather row {}", i + 2),
            }
        }
        self.samples.sort_by_key(|(t, _)| *t);
    }

    pub fn daily_for(&self, date: NaiveDate) -> Option<WeatherSample> {
        self.daily.get(&DateKey::from(date)).copied()
    }

    /// Weather at an instant: the nearest same-day timestamped sample when
    /// one exists, otherwise the daily entry for that calendar date.
    pub fn sample_at(&self, t: NaiveDateTime) -> Option<WeatherSample> {
        let idx = self.samples.partition_point(|(st, _)| *st <= t);
        let after = self.samples.get(idx).filter(|(st, _)| st.date() == t.date());
        let before = idx
            .checked_sub(1)
            .and_then(|i| self.samples.get(i))
            .filter(|(st, _)| st.date() == t.date());

        let nearest = match (before, after) {
            (Some(b), Some(a)) => {
                if (t - b.0) <= (a.0 - t) {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (Some(b), None) => Some(b),
            (None, Some(a)) => Some(a),
            (None, None) => None,
        };
        nearest.map(|(_, s)| *s).or_else(|| self.daily_for(t.date()))
    }

    pub fn daily_len(&self) -> usize {
        self.daily.len()
    }
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;

    const SUN_CSV: &str = "\
date;sunrise;noon;sunset
01.06;04:51;12:46;20:41
02.06;04:50;12:46;20:42
garbage line
15.01;09:00;12:30;08:00
";

    const WEATHER_CSV: &str = "\
date,temperature,cloudiness
06-01,18.5,40
06-02,17.0,250
bad-row,x,y
";

    const HOURLY_CSV: &str = "\
time;cloudiness;temperature
2025-06-01 06:00:00;10.0;12.0
2025-06-01 12:00:00;80.0;19.5
2025-06-02 09:00:00;55.0;16.0
";

    #[test]
    fn test_sun_table_parses_and_skips_bad_rows() {
        let table = SunTable::from_reader(SUN_CSV.as_bytes()).unwrap();
        // Two good rows; the garbage line and the out-of-order 15.01 row
        // (sunset before noon) are dropped.
        assert_eq!(table.len(), 2);

        let jun1 = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let times = table.get(jun1).expect("01.06 should be present");
        assert_eq!(times.sunrise, NaiveTime::from_hms_opt(4, 51, 0).unwrap());
        assert_eq!(times.sunset, NaiveTime::from_hms_opt(20, 41, 0).unwrap());

        let jan15 = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert!(table.get(jan15).is_none());
    }

    #[test]
    fn test_sun_table_keyed_without_year() {
        let table = SunTable::from_reader(SUN_CSV.as_bytes()).unwrap();
        let in_2025 = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let in_2030 = NaiveDate::from_ymd_opt(2030, 6, 2).unwrap();
        assert_eq!(table.get(in_2025), table.get(in_2030));
    }

    #[test]
    fn test_weather_cloudiness_clamped() {
        let table = WeatherTable::daily_from_reader(WEATHER_CSV.as_bytes()).unwrap();
        assert_eq!(table.daily_len(), 2);

        let jun2 = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let sample = table.daily_for(jun2).unwrap();
        assert_eq!(sample.cloudiness_pct, 100.0, "250% cloud must clamp to 100%");
        assert_eq!(sample.temperature_c, Some(17.0));
    }

    #[test]
    fn test_hourly_samples_override_daily() {
        let mut table = WeatherTable::daily_from_reader(WEATHER_CSV.as_bytes()).unwrap();
        table.merge_hourly_from_reader(HOURLY_CSV.as_bytes());

        // 10:00 sits between the 06:00 and 12:00 samples; 12:00 is closer
        let t = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let sample = table.sample_at(t).unwrap();
        assert_eq!(sample.cloudiness_pct, 80.0);

        // A day without hourly samples falls back to the daily entry
        let t3 = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap().and_hms_opt(10, 0, 0).unwrap();
        assert!(table.sample_at(t3).is_none());
        let t2 = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap().and_hms_opt(23, 0, 0).unwrap();
        let s2 = table.sample_at(t2).unwrap();
        assert_eq!(s2.cloudiness_pct, 55.0);
    }

    #[test]
    fn test_daily_fallback_when_no_same_day_sample() {
        let mut table = WeatherTable::daily_from_reader(WEATHER_CSV.as_bytes()).unwrap();
        table.merge_hourly_from_reader("time;cloudiness;temperature\n".as_bytes());

        let t = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let sample = table.sample_at(t).unwrap();
        assert_eq!(sample.cloudiness_pct, 40.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SunTable::load("/nonexistent/sun_data.csv").unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "got {err:?}");
    }
}
