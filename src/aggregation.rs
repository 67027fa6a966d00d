//! # Aggregation Module
//!
//! Composite-key group-by with sum, floored average, count and distinct lists
//!
//! ## Key Components
//! - [`trim`] - Project rows onto a set of columns
//! - [`AggregateSpec`] - Sum, group-by and list columns of one aggregation
//! - [`aggregate`] - Fold rows into one record per distinct key

use log::debug;
use std::collections::{HashMap, HashSet};

use crate::models::{self, Record, Value};

/// Project one row onto `columns`. Missing columns come out as null.
pub fn trim_row(row: &Record, columns: &[&str]) -> Record {
    columns
        .iter()
        .map(|column| (*column, row.value(column).clone()))
        .collect()
}

/// Project every row onto `columns`
pub fn trim(rows: &[Record], columns: &[&str]) -> Vec<Record> {
    rows.iter().map(|row| trim_row(row, columns)).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateSpec {
    pub sum_columns: Vec<String>,
    pub group_by: Vec<String>,
    pub list_columns: Vec<String>,
}

impl AggregateSpec {
    pub fn new(sum_columns: &[&str], group_by: &[&str]) -> Self {
        Self {
            sum_columns: sum_columns.iter().map(|c| c.to_string()).collect(),
            group_by: group_by.iter().map(|c| c.to_string()).collect(),
            list_columns: Vec::new(),
        }
    }

    pub fn with_lists(mut self, list_columns: &[&str]) -> Self {
        self.list_columns = list_columns.iter().map(|c| c.to_string()).collect();
        self
    }

    fn projected_columns(&self) -> Vec<&str> {
        self.sum_columns
            .iter()
            .chain(&self.group_by)
            .chain(&self.list_columns)
            .map(String::as_str)
            .collect()
    }

    /// An all-zero group carrying every numeric output column, used to pad grids
    pub fn zero_record(&self) -> Record {
        let mut record = Record::new().with(models::COUNT, 0i64);
        for column in &self.sum_columns {
            record.set(column, 0i64);
            record.set(&models::average_column(column), 0i64);
        }
        record
    }
}

/// Running sum that stays integral until a float shows up
#[derive(Debug, Clone, Copy, Default)]
struct NumericSum {
    int: i64,
    float: f64,
    has_float: bool,
}

impl NumericSum {
    fn add(&mut self, value: &Value) {
        match value {
            Value::Int(i) => self.int += i,
            Value::Float(f) if !f.is_nan() => {
                self.float += f;
                self.has_float = true;
            }
            // Missing and non-numeric cells count as nothing
            _ => {}
        }
    }

    fn total(&self) -> Value {
        if self.has_float {
            Value::Float(self.int as f64 + self.float)
        } else {
            Value::Int(self.int)
        }
    }

    /// `floor(total / count)`
    fn floored_average(&self, count: usize) -> Value {
        let count = count.max(1);
        if self.has_float {
            Value::Int(((self.int as f64 + self.float) / count as f64).floor() as i64)
        } else {
            Value::Int(self.int.div_euclid(count as i64))
        }
    }
}

#[derive(Debug)]
struct Group {
    key: Vec<Value>,
    first: Record,
    count: usize,
    sums: Vec<NumericSum>,
    lists: Vec<Vec<Value>>,
    seen: Vec<HashSet<Value>>,
}

impl Group {
    fn new(key: Vec<Value>, first: Record, spec: &AggregateSpec) -> Self {
        Self {
            key,
            first,
            count: 0,
            sums: vec![NumericSum::default(); spec.sum_columns.len()],
            lists: vec![Vec::new(); spec.list_columns.len()],
            seen: vec![HashSet::new(); spec.list_columns.len()],
        }
    }

    fn add(&mut self, row: &Record, spec: &AggregateSpec) {
        self.count += 1;
        for (sum, column) in self.sums.iter_mut().zip(&spec.sum_columns) {
            sum.add(row.value(column));
        }
        for (i, column) in spec.list_columns.iter().enumerate() {
            let value = row.value(column);
            if self.seen[i].insert(value.clone()) {
                self.lists[i].push(value.clone());
            }
        }
    }

    fn into_record(self, spec: &AggregateSpec) -> Record {
        let mut record = self.first;
        record.set(models::COUNT, self.count);
        for (sum, column) in self.sums.iter().zip(&spec.sum_columns) {
            record.set(column, sum.total());
            record.set(&models::average_column(column), sum.floored_average(self.count));
        }
        for (list, column) in self.lists.into_iter().zip(&spec.list_columns) {
            record.set(&models::list_column(column), Value::List(list));
        }
        for (value, column) in self.key.into_iter().zip(&spec.group_by) {
            record.set(column, value);
        }
        record
    }
}

/// Group `rows` by the tuple of `spec.group_by` values and fold each group.
///
/// Each output record carries the projected first row of its group, then:
/// `count`, and for every sum column `<col>` (sum) and `<col>Average`
/// (`floor(sum / count)`), and for every list column `<col>List` (distinct
/// values in order of first appearance). Groups come out in the order their
/// key was first seen.
pub fn aggregate(rows: &[Record], spec: &AggregateSpec) -> Vec<Record> {
    let columns = spec.projected_columns();
    let mut index: HashMap<Vec<Value>, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for row in rows {
        let key: Vec<Value> = spec
            .group_by
            .iter()
            .map(|column| row.value(column).clone())
            .collect();

        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                groups.push(Group::new(key.clone(), trim_row(row, &columns), spec));
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].add(row, spec);
    }

    debug!(
        "aggregate: {} rows into {} groups by {:?}",
        rows.len(),
        groups.len(),
        spec.group_by
    );

    groups
        .into_iter()
        .map(|group| group.into_record(spec))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_row(day: &str, block: &str, vues: i64, likes: i64) -> Record {
        Record::new()
            .with(models::DAY_OF_WEEK, day)
            .with(models::TIME_BLOCK, block)
            .with(models::VUES, vues)
            .with(models::LIKES, likes)
            .with(models::MEDIA, "lemonde")
    }

    fn engagement_spec() -> AggregateSpec {
        AggregateSpec::new(
            &[models::VUES, models::LIKES],
            &[models::DAY_OF_WEEK, models::TIME_BLOCK],
        )
    }

    #[test]
    fn test_trim_keeps_exactly_requested_columns() {
        let row = create_test_row("Monday", "10:00 to 12:00", 5, 1);
        let trimmed = trim_row(&row, &[models::VUES, models::HASHTAG]);
        assert_eq!(trimmed.len(), 2);
        assert_eq!(trimmed.get_i64(models::VUES), Some(5));
        assert!(trimmed.value(models::HASHTAG).is_null());
        assert!(!trimmed.contains(models::MEDIA));
    }

    #[test]
    fn test_aggregate_sums_counts_and_floors() {
        let rows = vec![
            create_test_row("Monday", "10:00 to 12:00", 10, 1),
            create_test_row("Monday", "10:00 to 12:00", 5, 2),
            create_test_row("Tuesday", "10:00 to 12:00", 7, 0),
        ];
        let groups = aggregate(&rows, &engagement_spec());
        assert_eq!(groups.len(), 2);

        let monday = &groups[0];
        assert_eq!(monday.get_str(models::DAY_OF_WEEK), Some("Monday"));
        assert_eq!(monday.get_i64(models::COUNT), Some(2));
        assert_eq!(monday.get_i64(models::VUES), Some(15));
        assert_eq!(monday.get_i64("vuesAverage"), Some(7));
        assert_eq!(monday.get_i64("likesAverage"), Some(1));
        // Projection drops columns the aggregation does not name
        assert!(!monday.contains(models::MEDIA));
    }

    #[test]
    fn test_aggregate_count_invariant() {
        let days = ["Monday", "Tuesday", "Sunday"];
        let rows: Vec<Record> = (0..50)
            .map(|i| create_test_row(days[i % 3], "00:00 to 02:00", i as i64, 1))
            .collect();
        let groups = aggregate(&rows, &engagement_spec());
        let total: i64 = groups.iter().filter_map(|g| g.get_i64(models::COUNT)).sum();
        assert_eq!(total, rows.len() as i64);

        for group in &groups {
            let sum = group.get_i64(models::VUES).unwrap();
            let count = group.get_i64(models::COUNT).unwrap();
            assert_eq!(group.get_i64("vuesAverage"), Some(sum / count));
        }
    }

    #[test]
    fn test_aggregate_keeps_first_seen_order() {
        let rows = vec![
            create_test_row("Sunday", "a", 1, 1),
            create_test_row("Monday", "a", 1, 1),
            create_test_row("Sunday", "a", 1, 1),
        ];
        let groups = aggregate(&rows, &engagement_spec());
        let days: Vec<_> = groups.iter().filter_map(|g| g.get_str(models::DAY_OF_WEEK)).collect();
        assert_eq!(days, vec!["Sunday", "Monday"]);
    }

    #[test]
    fn test_aggregate_separator_in_key_does_not_collide() {
        let spec = AggregateSpec::new(&[models::VUES], &[models::MEDIA, models::YEAR_MONTH]);
        let rows = vec![
            Record::new()
                .with(models::MEDIA, "a-b")
                .with(models::YEAR_MONTH, "c")
                .with(models::VUES, 1i64),
            Record::new()
                .with(models::MEDIA, "a")
                .with(models::YEAR_MONTH, "b-c")
                .with(models::VUES, 2i64),
        ];
        let groups = aggregate(&rows, &spec);
        assert_eq!(groups.len(), 2);

        // Each group's key fields match a contributing row exactly
        for (group, row) in groups.iter().zip(&rows) {
            assert_eq!(group.value(models::MEDIA), row.value(models::MEDIA));
            assert_eq!(group.value(models::YEAR_MONTH), row.value(models::YEAR_MONTH));
        }
    }

    #[test]
    fn test_aggregate_list_columns() {
        let spec = AggregateSpec::new(&[models::VUES], &[models::MUSIQUE_TITRE])
            .with_lists(&[models::MEDIA]);
        let rows = vec![
            Record::new()
                .with(models::MUSIQUE_TITRE, "song")
                .with(models::MEDIA, "brut")
                .with(models::VUES, 1i64),
            Record::new()
                .with(models::MUSIQUE_TITRE, "song")
                .with(models::MEDIA, "lemonde")
                .with(models::VUES, 1i64),
            Record::new()
                .with(models::MUSIQUE_TITRE, "song")
                .with(models::MEDIA, "brut")
                .with(models::VUES, 1i64),
        ];
        let groups = aggregate(&rows, &spec);
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].value("médiaList"),
            &Value::List(vec![Value::from("brut"), Value::from("lemonde")])
        );
        // The first row's list cell is carried through
        assert_eq!(groups[0].get_str(models::MEDIA), Some("brut"));
    }

    #[test]
    fn test_aggregate_skips_missing_numbers() {
        let spec = AggregateSpec::new(&[models::VUES], &[models::MEDIA]);
        let rows = vec![
            Record::new().with(models::MEDIA, "a").with(models::VUES, 4i64),
            Record::new().with(models::MEDIA, "a"),
            Record::new().with(models::MEDIA, "a").with(models::VUES, 1.5),
        ];
        let groups = aggregate(&rows, &spec);
        assert_eq!(groups[0].get_i64(models::COUNT), Some(3));
        assert_eq!(groups[0].value(models::VUES), &Value::Float(5.5));
        assert_eq!(groups[0].get_i64("vuesAverage"), Some(1));
    }

    #[test]
    fn test_zero_record_schema() {
        let zero = engagement_spec().zero_record();
        assert_eq!(zero.get_i64(models::COUNT), Some(0));
        assert_eq!(zero.get_i64("vuesAverage"), Some(0));
        assert_eq!(zero.get_i64(models::LIKES), Some(0));
        assert_eq!(zero.len(), 5);
    }
}
