//! # Grid Completion Module
//!
//! Pads a day × time-block aggregation into a dense heatmap grid
//!
//! ## Key Components
//! - [`GridDomain`] - The fixed set of days and time blocks
//! - [`fill`] - Insert zero-valued cells for absent combinations

use log::debug;
use std::collections::HashSet;

use crate::datetime::{time_block_labels, DAYS_OF_WEEK, DEFAULT_BLOCK_HOURS};
use crate::models::{self, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridDomain {
    pub days: Vec<String>,
    pub time_blocks: Vec<String>,
}

impl GridDomain {
    /// Seven days, Sunday first, by blocks of `block_hours`
    pub fn week(block_hours: u32) -> Self {
        Self {
            days: DAYS_OF_WEEK.iter().map(|d| d.to_string()).collect(),
            time_blocks: time_block_labels(block_hours),
        }
    }

    pub fn cell_count(&self) -> usize {
        self.days.len() * self.time_blocks.len()
    }

    /// Cells in day-major, block-minor order
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        self.days.iter().flat_map(move |day| {
            self.time_blocks
                .iter()
                .map(move |block| (day.as_str(), block.as_str()))
        })
    }
}

impl Default for GridDomain {
    fn default() -> Self {
        Self::week(DEFAULT_BLOCK_HOURS)
    }
}

/// Append a copy of `filler` for every cell of `domain` missing from `rows`.
///
/// Existing rows are kept unchanged and in place; inserted cells follow them
/// in the domain's day-major order.
pub fn fill(rows: &[Record], domain: &GridDomain, filler: &Record) -> Vec<Record> {
    let present: HashSet<(&str, &str)> = rows
        .iter()
        .filter_map(|row| {
            Some((
                row.get_str(models::DAY_OF_WEEK)?,
                row.get_str(models::TIME_BLOCK)?,
            ))
        })
        .collect();

    let mut filled = rows.to_vec();
    for (day, block) in domain.cells() {
        if present.contains(&(day, block)) {
            continue;
        }
        filled.push(
            filler
                .clone()
                .with(models::DAY_OF_WEEK, day)
                .with(models::TIME_BLOCK, block),
        );
    }

    debug!(
        "fill: {} aggregated cells padded to {} of {}",
        rows.len(),
        filled.len(),
        domain.cell_count()
    );
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::AggregateSpec;

    fn create_test_cell(day: &str, block: &str, vues: i64) -> Record {
        Record::new()
            .with(models::DAY_OF_WEEK, day)
            .with(models::TIME_BLOCK, block)
            .with(models::VUES, vues)
            .with("vuesAverage", vues)
            .with(models::COUNT, 1i64)
    }

    fn filler() -> Record {
        AggregateSpec::new(&[models::VUES], &[models::DAY_OF_WEEK, models::TIME_BLOCK]).zero_record()
    }

    #[test]
    fn test_fill_completes_the_grid() {
        let domain = GridDomain::default();
        let rows = vec![
            create_test_cell("Monday", "10:00 to 12:00", 30),
            create_test_cell("Sunday", "22:00 to 24:00", 5),
        ];
        let filled = fill(&rows, &domain, &filler());
        assert_eq!(filled.len(), 7 * 12);

        let unique: HashSet<_> = filled
            .iter()
            .map(|r| {
                (
                    r.get_str(models::DAY_OF_WEEK).unwrap().to_string(),
                    r.get_str(models::TIME_BLOCK).unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(unique.len(), 84);
    }

    #[test]
    fn test_fill_keeps_existing_rows_untouched() {
        let rows = vec![create_test_cell("Monday", "10:00 to 12:00", 30)];
        let filled = fill(&rows, &GridDomain::default(), &filler());
        assert_eq!(filled[0], rows[0]);

        let inserted = filled
            .iter()
            .find(|r| r.get_str(models::DAY_OF_WEEK) == Some("Monday")
                && r.get_str(models::TIME_BLOCK) == Some("00:00 to 02:00"))
            .unwrap();
        assert_eq!(inserted.get_i64(models::VUES), Some(0));
        assert_eq!(inserted.get_i64("vuesAverage"), Some(0));
        assert_eq!(inserted.get_i64(models::COUNT), Some(0));
    }

    #[test]
    fn test_fill_order_is_day_major() {
        let filled = fill(&[], &GridDomain::default(), &filler());
        assert_eq!(filled[0].get_str(models::DAY_OF_WEEK), Some("Sunday"));
        assert_eq!(filled[0].get_str(models::TIME_BLOCK), Some("00:00 to 02:00"));
        assert_eq!(filled[1].get_str(models::TIME_BLOCK), Some("02:00 to 04:00"));
        assert_eq!(filled[12].get_str(models::DAY_OF_WEEK), Some("Monday"));
        assert_eq!(filled[83].get_str(models::DAY_OF_WEEK), Some("Saturday"));
    }

    #[test]
    fn test_fill_is_deterministic() {
        let rows = vec![create_test_cell("Friday", "14:00 to 16:00", 3)];
        let domain = GridDomain::week(3);
        assert_eq!(domain.cell_count(), 56);
        assert_eq!(fill(&rows, &domain, &filler()), fill(&rows, &domain, &filler()));
    }
}
