//! # CSV Loader Module
//!
//! Loads the video post CSV into in-memory records
//!
//! ## Key Components
//! - [`VideoRow`] - One CSV line as published
//! - [`load_rows`] - Read and convert a whole CSV file
//! - [`get_media_list`] - Distinct media accounts in first-seen order

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::models::{self, Record, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct VideoRow {
    pub date: String,
    #[serde(rename = "média", default)]
    pub media: Option<String>,
    #[serde(default)]
    pub vues: Option<i64>,
    #[serde(default)]
    pub likes: Option<i64>,
    #[serde(default)]
    pub partages: Option<i64>,
    #[serde(default)]
    pub commentaires: Option<i64>,
    #[serde(rename = "duréeSecondes", default)]
    pub duree_secondes: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "musiqueTitre", default)]
    pub musique_titre: Option<String>,
    #[serde(rename = "musiqueArtiste", default)]
    pub musique_artiste: Option<String>,
}

impl VideoRow {
    pub fn into_record(self) -> Record {
        Record::new()
            .with(models::DATE, self.date.trim())
            .with(models::MEDIA, self.media)
            .with(models::VUES, self.vues)
            .with(models::LIKES, self.likes)
            .with(models::PARTAGES, self.partages)
            .with(models::COMMENTAIRES, self.commentaires)
            .with(models::DUREE_SECONDES, self.duree_secondes)
            .with(models::DESCRIPTION, self.description)
            .with(models::MUSIQUE_TITRE, self.musique_titre)
            .with(models::MUSIQUE_ARTISTE, self.musique_artiste)
    }
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub rows: Vec<Record>,
    /// CSV lines that could not be deserialized
    pub skipped: usize,
}

/// Load every row of the CSV file at `path`
pub fn load_rows(path: &Path) -> Result<LoadReport> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open data file {}", path.display()))?;
    let report = load_rows_from_reader(file)
        .with_context(|| format!("Failed to read data file {}", path.display()))?;

    debug!(
        "Loaded {} rows from {} ({} skipped)",
        report.rows.len(),
        path.display(),
        report.skipped
    );
    Ok(report)
}

pub fn load_rows_from_reader<R: Read>(reader: R) -> Result<LoadReport> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    // Fail early on a missing header rather than yielding zero rows
    csv_reader.headers().context("Failed to read CSV header")?;

    let mut report = LoadReport::default();
    for (index, result) in csv_reader.deserialize::<VideoRow>().enumerate() {
        match result {
            Ok(row) => report.rows.push(row.into_record()),
            Err(e) => {
                // Skip malformed lines, the rest of the file is still usable
                warn!("Skipping CSV record {}: {}", index + 1, e);
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}

/// Distinct `média` values in order of first appearance
pub fn get_media_list(rows: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|row| match row.value(models::MEDIA) {
            Value::Null => None,
            value => Some(value.to_string()),
        })
        .filter(|media| seen.insert(media.clone()))
        .collect()
}
