//! # Date/Time Derivation Module
//!
//! Derives calendar and time-of-day fields from the `date` column
//!
//! ## Key Components
//! - [`process_date_time`] - Split `date` into date, time and day of week
//! - [`add_time_blocks`] - Label the containing time block of each post
//! - [`set_year`] / [`set_year_month`] - Calendar keys for monthly grouping
//! - [`normalize_dates`] - Snap dates to the first of their month
//! - [`DateRange`] - Start/end pair supplied by the date slider

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use log::debug;
use std::collections::HashSet;

use crate::models::{self, Record, UNKNOWN};

pub const DAYS_OF_WEEK: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const DEFAULT_BLOCK_HOURS: u32 = 2;

/// Rows with derived fields attached, plus how many could not be derived
#[derive(Debug, Default)]
pub struct DateTimeReport {
    pub rows: Vec<Record>,
    pub malformed: usize,
}

/// Calendar days picked on the date slider.
///
/// Rows are compared on the date part of their timestamp, so both end days
/// are covered whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `start <= day <= end`
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// `start < day < end`
    pub fn strictly_contains(&self, day: NaiveDate) -> bool {
        self.start < day && day < self.end
    }

    /// Number of started weeks between the two ends, never less than one
    pub fn weeks(&self) -> i64 {
        let days = (self.end - self.start).num_days().abs();
        let week = TimeDelta::weeks(1).num_days();
        (days + week - 1).div_euclid(week).max(1)
    }
}

/// Parse a `YYYY-MM-DD[ HH:MM[:SS]]` timestamp
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Timestamp of a row's `date` column, if it parses
pub fn row_timestamp(row: &Record) -> Option<NaiveDateTime> {
    row.get_str(models::DATE).and_then(parse_timestamp)
}

/// Calendar day of a row's `date` column, if it parses
pub fn row_date(row: &Record) -> Option<NaiveDate> {
    row_timestamp(row).map(|ts| ts.date())
}

/// Parse a CLI date in YYYY-MM-DD or YYYYMMDD format
pub fn parse_date_arg(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y%m%d"))
        .with_context(|| format!("Date must be in YYYY-MM-DD format, got: {}", text))
}

/// Split `date` into `date` and `time`, and attach `dayOfWeek`.
///
/// Rows whose `date` has no time part or no valid calendar date get the
/// `unknown` sentinel in the fields that could not be derived.
pub fn process_date_time(rows: &[Record]) -> DateTimeReport {
    let mut report = DateTimeReport::default();

    for row in rows {
        let raw = row.value(models::DATE).to_string();
        let mut parts = raw.trim().splitn(2, ' ');
        let date_part = parts.next().unwrap_or_default().to_string();
        let time_part = parts.next().map(str::trim).filter(|t| !t.is_empty());

        let day_of_week = NaiveDate::parse_from_str(&date_part, "%Y-%m-%d")
            .ok()
            .map(|date| DAYS_OF_WEEK[date.weekday().num_days_from_sunday() as usize]);

        if day_of_week.is_none() || time_part.is_none() {
            report.malformed += 1;
        }

        report.rows.push(
            row.clone()
                .with(models::DATE, date_part)
                .with(models::TIME, time_part.unwrap_or(UNKNOWN))
                .with(models::DAY_OF_WEEK, day_of_week.unwrap_or(UNKNOWN)),
        );
    }

    if report.malformed > 0 {
        debug!(
            "process_date_time: {} of {} rows had an unusable date",
            report.malformed,
            rows.len()
        );
    }
    report
}

fn parse_hour_minute(time: &str) -> Option<(u32, u32)> {
    let mut parts = time.split(':');
    let hour = parts.next()?.trim().parse::<u32>().ok()?;
    let minute = parts.next()?.trim().parse::<u32>().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

fn format_block(start_minutes: u32, end_minutes: u32) -> String {
    format!(
        "{:02}:{:02} to {:02}:{:02}",
        start_minutes / 60,
        start_minutes % 60,
        end_minutes / 60,
        end_minutes % 60
    )
}

/// Attach `timeBlock`, the `HH:MM to HH:MM` block containing `time`.
///
/// Reads the `time` field written by [`process_date_time`], which must run first.
pub fn add_time_blocks(rows: &[Record], block_hours: u32) -> DateTimeReport {
    let block_minutes = block_hours.max(1) * 60;
    let mut report = DateTimeReport::default();

    for row in rows {
        let block = row
            .get_str(models::TIME)
            .and_then(parse_hour_minute)
            .map(|(hour, minute)| {
                let start = (hour * 60 + minute) / block_minutes * block_minutes;
                format_block(start, start + block_minutes)
            });

        if block.is_none() {
            report.malformed += 1;
        }
        report.rows.push(
            row.clone()
                .with(models::TIME_BLOCK, block.unwrap_or_else(|| UNKNOWN.to_string())),
        );
    }
    report
}

/// Every block label of a day, in chronological order
pub fn time_block_labels(block_hours: u32) -> Vec<String> {
    let block_minutes = block_hours.max(1) * 60;
    let count = (24 * 60u32).div_ceil(block_minutes);
    (0..count)
        .map(|i| format_block(i * block_minutes, (i + 1) * block_minutes))
        .collect()
}

/// Distinct `timeBlock` labels in order of first appearance
pub fn get_unique_time_blocks(rows: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|row| row.get_str(models::TIME_BLOCK))
        .filter(|block| seen.insert(*block))
        .map(str::to_string)
        .collect()
}

/// Attach `year`, the calendar year of `date`
pub fn set_year(rows: &[Record]) -> Vec<Record> {
    rows.iter()
        .map(|row| {
            let year = row_timestamp(row).map(|ts| ts.year());
            row.clone().with(models::YEAR, year)
        })
        .collect()
}

/// Attach `yearMonth` as `<year>><month>` with a zero-based month
pub fn set_year_month(rows: &[Record]) -> Vec<Record> {
    rows.iter()
        .map(|row| {
            let key = row_timestamp(row).map(|ts| format!("{}>{}", ts.year(), ts.month0()));
            row.clone().with(models::YEAR_MONTH, key)
        })
        .collect()
}

/// Rewrite `date` to the first day of its month. Unparseable dates are kept as is.
pub fn normalize_dates(rows: &[Record]) -> Vec<Record> {
    rows.iter()
        .map(|row| match row_timestamp(row).and_then(|ts| ts.date().with_day(1)) {
            Some(first) => row
                .clone()
                .with(models::DATE, first.format("%Y-%m-%d").to_string()),
            None => row.clone(),
        })
        .collect()
}
