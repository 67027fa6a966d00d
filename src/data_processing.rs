//! # Data Processing Module
//!
//! Post-processing of aggregated records: sorting, normalization and derived scalars
//!
//! ## Key Components
//! - [`sort_by_columns`] - Stable multi-key sort
//! - [`normalize_column`] - Min-max normalization into `<col>Normalized`
//! - [`compute_average_count`] - Weekly average post count
//! - [`weight_features`] - Share of each engagement metric in the grand total

use serde::Serialize;
use std::cmp::Ordering;

use crate::datetime::DateRange;
use crate::models::{self, Record, Value};

/// Sort by `columns` in priority order.
///
/// `descending` applies to every key. Ties on all keys keep their input order.
pub fn sort_by_columns(rows: &[Record], columns: &[&str], descending: bool) -> Vec<Record> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        for column in columns {
            let ordering = a.value(column).compare(b.value(column));
            let ordering = if descending { ordering.reverse() } else { ordering };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    sorted
}

/// Attach `<column>Normalized = (v - min) / (max - min)`.
///
/// When every value is equal the domain is degenerate and all rows get `0.0`.
/// Rows without a numeric value get null.
pub fn normalize_column(rows: &[Record], column: &str) -> Vec<Record> {
    let values: Vec<f64> = rows.iter().filter_map(|row| row.get_f64(column)).collect();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let target = models::normalized_column(column);

    rows.iter()
        .map(|row| {
            let normalized = match row.get_f64(column) {
                Some(_) if span == 0.0 => Value::Float(0.0),
                Some(v) => Value::Float((v - min) / span),
                None => Value::Null,
            };
            row.clone().with(&target, normalized)
        })
        .collect()
}

/// Attach `countAverage = floor(count / weeks)` for the weeks spanned by `range`
pub fn compute_average_count(rows: &[Record], range: &DateRange) -> Vec<Record> {
    let weeks = range.weeks();
    rows.iter()
        .map(|row| {
            let count = row.get_i64(models::COUNT).unwrap_or(0);
            row.clone()
                .with(models::COUNT_AVERAGE, count.div_euclid(weeks))
        })
        .collect()
}

/// Relative weight of each engagement metric across all rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FeatureWeights {
    pub likes: f64,
    pub partages: f64,
    pub commentaires: f64,
    pub vues: f64,
}

impl FeatureWeights {
    /// `[likes, shares, comments, views]`
    pub fn as_array(&self) -> [f64; 4] {
        [self.likes, self.partages, self.commentaires, self.vues]
    }
}

/// Each metric's total divided by the total of all four metrics.
///
/// All weights are zero when there is no engagement at all.
pub fn weight_features(rows: &[Record]) -> FeatureWeights {
    let total_of = |column: &str| -> f64 { rows.iter().filter_map(|r| r.get_f64(column)).sum() };

    let likes = total_of(models::LIKES);
    let partages = total_of(models::PARTAGES);
    let commentaires = total_of(models::COMMENTAIRES);
    let vues = total_of(models::VUES);
    let grand_total = likes + partages + commentaires + vues;

    if grand_total == 0.0 {
        return FeatureWeights::default();
    }

    FeatureWeights {
        likes: likes / grand_total,
        partages: partages / grand_total,
        commentaires: commentaires / grand_total,
        vues: vues / grand_total,
    }
}

/// Keep only the first `limit` rows
pub fn apply_top(mut rows: Vec<Record>, limit: Option<usize>) -> Vec<Record> {
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}
