//! # Interval Bucketing Module
//!
//! Fixed-width bucketing of video duration into labeled ranges
//!
//! ## Key Components
//! - [`IntervalDomain`] - Bucket width and number of buckets
//! - [`IntervalBucket`] - Mean engagement of one `[lower, upper)` range
//! - [`aggregate_by_interval`] - Two-level per-duration then per-bucket fold

use log::{debug, warn};
use serde::Serialize;

use crate::aggregation::{aggregate, AggregateSpec};
use crate::models::{self, Record, ENGAGEMENT_COLUMNS};

pub const DEFAULT_BUCKET_WIDTH: i64 = 25;
pub const DEFAULT_BUCKET_COUNT: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalDomain {
    pub width: i64,
    pub count: usize,
}

impl IntervalDomain {
    pub fn new(width: i64, count: usize) -> Self {
        Self {
            width: width.max(1),
            count,
        }
    }

    pub fn upper_bound(&self) -> i64 {
        self.width * self.count as i64
    }

    /// Index of the bucket whose `[lower, upper)` range holds `value`
    pub fn bucket_of(&self, value: f64) -> Option<usize> {
        if !(0.0..self.upper_bound() as f64).contains(&value) {
            return None;
        }
        Some((value / self.width as f64).floor() as usize)
    }
}

impl Default for IntervalDomain {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_WIDTH, DEFAULT_BUCKET_COUNT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalBucket {
    pub intervalle1: i64,
    pub intervalle2: i64,
    pub likes: f64,
    pub partages: f64,
    pub commentaires: f64,
    pub vues: f64,
    pub count: i64,
}

impl IntervalBucket {
    fn empty(lower: i64, upper: i64) -> Self {
        Self {
            intervalle1: lower,
            intervalle2: upper,
            likes: 0.0,
            partages: 0.0,
            commentaires: 0.0,
            vues: 0.0,
            count: 0,
        }
    }

    pub fn metric(&self, column: &str) -> Option<f64> {
        match column {
            models::VUES => Some(self.vues),
            models::LIKES => Some(self.likes),
            models::PARTAGES => Some(self.partages),
            models::COMMENTAIRES => Some(self.commentaires),
            models::COUNT => Some(self.count as f64),
            _ => None,
        }
    }

    fn metric_mut(&mut self, column: &str) -> Option<&mut f64> {
        match column {
            models::VUES => Some(&mut self.vues),
            models::LIKES => Some(&mut self.likes),
            models::PARTAGES => Some(&mut self.partages),
            models::COMMENTAIRES => Some(&mut self.commentaires),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct BucketReport {
    pub buckets: Vec<IntervalBucket>,
    /// Rows whose duration fell outside the domain or was missing
    pub dropped: usize,
}

/// Mean engagement per duration interval.
///
/// Rows are first grouped by exact duration, giving one mean per metric per
/// duration. Each duration's means and row count are then folded into the
/// bucket containing it, and each bucket's accumulated means are divided by
/// its accumulated count (plain division, not floored). Durations sharing a
/// bucket are therefore weighted by their mean, not by their rows.
pub fn aggregate_by_interval(rows: &[Record], domain: &IntervalDomain) -> BucketReport {
    let mut buckets: Vec<IntervalBucket> = (0..domain.count)
        .map(|i| {
            let lower = i as i64 * domain.width;
            IntervalBucket::empty(lower, lower + domain.width)
        })
        .collect();

    let spec = AggregateSpec::new(&ENGAGEMENT_COLUMNS, &[models::DUREE_SECONDES]);
    let per_duration = aggregate(rows, &spec);

    let mut dropped = 0usize;
    for group in &per_duration {
        let count = group.get_i64(models::COUNT).unwrap_or(0);
        let slot = group
            .get_f64(models::DUREE_SECONDES)
            .and_then(|duration| domain.bucket_of(duration));

        let Some(slot) = slot else {
            dropped += count as usize;
            continue;
        };

        let bucket = &mut buckets[slot];
        for column in ENGAGEMENT_COLUMNS {
            let mean = group.get_f64(column).unwrap_or(0.0) / count.max(1) as f64;
            if let Some(acc) = bucket.metric_mut(column) {
                *acc += mean;
            }
        }
        bucket.count += count;
    }

    for bucket in buckets.iter_mut().filter(|b| b.count != 0) {
        let count = bucket.count as f64;
        bucket.vues /= count;
        bucket.likes /= count;
        bucket.partages /= count;
        bucket.commentaires /= count;
    }

    if dropped > 0 {
        warn!(
            "{} rows outside [0, {}) seconds were left out of the length buckets",
            dropped,
            domain.upper_bound()
        );
    }
    debug!(
        "aggregate_by_interval: {} distinct durations into {} buckets",
        per_duration.len(),
        buckets.len()
    );

    BucketReport { buckets, dropped }
}
