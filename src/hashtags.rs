//! # Hashtag Module
//!
//! Hashtag extraction and per-hashtag engagement statistics
//!
//! ## Key Components
//! - [`extract_hashtags`] - `#word` tokens of a description
//! - [`explode_hashtags`] - One row per hashtag occurrence
//! - [`HashtagStats`] - Totals and means of one hashtag
//! - [`group_by_hashtag`] - Aggregate exploded rows per hashtag

use regex::Regex;
use serde::Serialize;

use crate::aggregation::{aggregate, AggregateSpec};
use crate::models::{self, Record, ENGAGEMENT_COLUMNS};

lazy_static::lazy_static! {
    // ASCII word characters only, accented letters end the tag
    static ref HASHTAG: Regex = Regex::new(r"#[A-Za-z0-9_]+").unwrap();
}

pub fn extract_hashtags(description: &str) -> Vec<&str> {
    HASHTAG.find_iter(description).map(|m| m.as_str()).collect()
}

/// Copy each row once per hashtag found in its `description`.
///
/// A tag repeated in the same description contributes once per occurrence.
pub fn explode_hashtags(rows: &[Record]) -> Vec<Record> {
    rows.iter()
        .flat_map(|row| {
            let description = row.get_str(models::DESCRIPTION).unwrap_or_default();
            extract_hashtags(description)
                .into_iter()
                .map(|tag| row.clone().with(models::HASHTAG, tag))
                .collect::<Vec<_>>()
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashtagStats {
    pub hashtag: String,
    pub likes: f64,
    pub partages: f64,
    pub commentaires: f64,
    pub vues: f64,
    pub moyenne_likes: f64,
    pub moyenne_partages: f64,
    pub moyenne_commentaires: f64,
    pub moyenne_vues: f64,
    pub count: i64,
}

impl HashtagStats {
    fn from_group(group: &Record) -> Option<Self> {
        let hashtag = group.get_str(models::HASHTAG)?.to_string();
        let count = group.get_i64(models::COUNT).unwrap_or(0);
        let total = |column: &str| group.get_f64(column).unwrap_or(0.0);
        let mean = |column: &str| total(column) / count.max(1) as f64;

        Some(Self {
            hashtag,
            likes: total(models::LIKES),
            partages: total(models::PARTAGES),
            commentaires: total(models::COMMENTAIRES),
            vues: total(models::VUES),
            moyenne_likes: mean(models::LIKES),
            moyenne_partages: mean(models::PARTAGES),
            moyenne_commentaires: mean(models::COMMENTAIRES),
            moyenne_vues: mean(models::VUES),
            count,
        })
    }

    /// Total of one engagement column
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
}

/// Engagement totals and unfloored means per hashtag, in first-seen order
pub fn group_by_hashtag(rows: &[Record]) -> Vec<HashtagStats> {
    let spec = AggregateSpec::new(&ENGAGEMENT_COLUMNS, &[models::HASHTAG]);
    aggregate(&explode_hashtags(rows), &spec)
        .iter()
        .filter_map(HashtagStats::from_group)
        .collect()
}
