//! # Configuration Module
//!
//! Data location and per-dashboard constants
//!
//! ## Key Components
//! - [`resolve_data_path`] - CLI flag, then environment, then default path
//! - [`DashboardConfig`] - Date bounds, block length, bucket domain and top-N

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::path::PathBuf;

use crate::datetime::{DateRange, DEFAULT_BLOCK_HOURS};
use crate::intervals::IntervalDomain;

pub const DEFAULT_DATA_FILE: &str = "./data_source.csv";
pub const DATA_ENV_VAR: &str = "VIDSTATS_DATA";
pub const DEFAULT_TOP_HASHTAGS: usize = 10;

/// Resolve the CSV location: `--data`, then `VIDSTATS_DATA`, then the default file
pub fn resolve_data_path(flag: Option<&str>) -> PathBuf {
    if let Some(path) = flag {
        return PathBuf::from(path);
    }
    match std::env::var(DATA_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_DATA_FILE),
    }
}

fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, dom).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Slider bounds, used when no range is selected
    pub date_range: DateRange,
    /// Months after this date are not fully covered by the dataset
    pub overview_cutoff: NaiveDateTime,
    pub block_hours: u32,
    pub intervals: IntervalDomain,
    pub top_hashtags: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            date_range: DateRange::new(day(2018, 11, 30), day(2023, 4, 14)),
            overview_cutoff: day(2023, 3, 30).and_time(NaiveTime::MIN),
            block_hours: DEFAULT_BLOCK_HOURS,
            intervals: IntervalDomain::default(),
            top_hashtags: DEFAULT_TOP_HASHTAGS,
        }
    }
}

impl DashboardConfig {
    /// Replace the default slider bounds with whichever ends were given
    pub fn date_range_with(&self, since: Option<NaiveDate>, until: Option<NaiveDate>) -> DateRange {
        DateRange::new(
            since.unwrap_or(self.date_range.start),
            until.unwrap_or(self.date_range.end),
        )
    }
}
