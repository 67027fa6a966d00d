//! # Filtering Module
//!
//! Row predicates applied before aggregation
//!
//! ## Key Components
//! - [`DateFilterReport`] - Kept rows plus the rows dropped for an unreadable date
//! - [`remove_after`] - Keep rows strictly before a cutoff
//! - [`filter_data_by_dates`] - Keep rows inside an inclusive date range
//! - [`filter_out_rows_by_value`] - Drop rows whose cell matches a pattern
//! - [`filter_by_media`] - Narrow rows to the selected media accounts
//! - [`ORIGINAL_SOUND`] - Placeholder track names in many languages

use chrono::NaiveDateTime;
use log::debug;
use regex::Regex;

use crate::datetime::{row_date, row_timestamp, DateRange};
use crate::models::{self, Record};

lazy_static::lazy_static! {
    /// Track titles TikTok generates for uploads without a licensed song
    pub static ref ORIGINAL_SOUND: Regex = Regex::new(
        r"(?i)(original sound|original audio|son original|sonido original|som original|suono originale|originalton|originalljud|originale lyd|oryginalny dźwięk|orijinal ses|оригинальный звук|الصوت الأصلي|nhạc nền|suara asli|เสียงต้นฉบับ|オリジナル楽曲|原声|原聲|오리지널 사운드)"
    )
    .expect("original sound pattern is valid");
}

/// What an empty media selection means for a given dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptySelection {
    /// No selection shows every account
    All,
    /// No selection shows nothing
    Nothing,
}

/// Rows that passed a date filter, and how many were dropped because
/// their `date` could not be read at all
#[derive(Debug, Default)]
pub struct DateFilterReport {
    pub rows: Vec<Record>,
    pub malformed: usize,
}

fn filter_by_date<T: Copy>(
    rows: &[Record],
    parse: impl Fn(&Record) -> Option<T>,
    keep: impl Fn(T) -> bool,
) -> DateFilterReport {
    let mut report = DateFilterReport::default();
    for row in rows {
        match parse(row) {
            Some(value) if keep(value) => report.rows.push(row.clone()),
            Some(_) => {}
            None => report.malformed += 1,
        }
    }
    if report.malformed > 0 {
        debug!("{} rows dropped for an unreadable date", report.malformed);
    }
    report
}

/// Keep rows posted strictly before `cutoff`
pub fn remove_after(rows: &[Record], cutoff: NaiveDateTime) -> DateFilterReport {
    filter_by_date(rows, row_timestamp, |ts| ts < cutoff)
}

/// Keep rows posted on a day with `start <= day <= end`
pub fn filter_data_by_dates(rows: &[Record], range: &DateRange) -> DateFilterReport {
    filter_by_date(rows, row_date, |day| range.contains(day))
}

/// Keep rows posted on a day with `start < day < end`
pub fn filter_data_strictly_between(rows: &[Record], range: &DateRange) -> DateFilterReport {
    filter_by_date(rows, row_date, |day| range.strictly_contains(day))
}

/// Remove rows whose stringified `column` matches `pattern`
pub fn filter_out_rows_by_value(rows: &[Record], column: &str, pattern: &Regex) -> Vec<Record> {
    rows.iter()
        .filter(|row| !pattern.is_match(&row.value(column).to_string()))
        .cloned()
        .collect()
}

/// Keep rows whose `média` is one of `selected`
pub fn filter_by_media(rows: &[Record], selected: &[String], empty: EmptySelection) -> Vec<Record> {
    if selected.is_empty() {
        return match empty {
            EmptySelection::All => rows.to_vec(),
            EmptySelection::Nothing => Vec::new(),
        };
    }

    rows.iter()
        .filter(|row| {
            row.get_str(models::MEDIA)
                .is_some_and(|media| selected.iter().any(|s| s == media))
        })
        .cloned()
        .collect()
}
