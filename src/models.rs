//! # Row Model Module
//!
//! Dynamic record model shared by every pipeline stage
//!
//! ## Key Components
//! - [`Value`] - A single cell: number, text, list or missing
//! - [`Record`] - A flat row of named cells
//! - Column name constants for the source CSV and derived fields

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

// Source columns
pub const DATE: &str = "date";
pub const MEDIA: &str = "média";
pub const VUES: &str = "vues";
pub const LIKES: &str = "likes";
pub const PARTAGES: &str = "partages";
pub const COMMENTAIRES: &str = "commentaires";
pub const DUREE_SECONDES: &str = "duréeSecondes";
pub const DESCRIPTION: &str = "description";
pub const MUSIQUE_TITRE: &str = "musiqueTitre";
pub const MUSIQUE_ARTISTE: &str = "musiqueArtiste";

// Derived columns
pub const YEAR: &str = "year";
pub const YEAR_MONTH: &str = "yearMonth";
pub const TIME: &str = "time";
pub const DAY_OF_WEEK: &str = "dayOfWeek";
pub const TIME_BLOCK: &str = "timeBlock";
pub const HASHTAG: &str = "hashtag";

// Aggregation columns
pub const COUNT: &str = "count";
pub const COUNT_AVERAGE: &str = "countAverage";

/// The four engagement metrics, in the order the dashboards list them
pub const ENGAGEMENT_COLUMNS: [&str; 4] = [VUES, LIKES, PARTAGES, COMMENTAIRES];

/// Sentinel written into derived fields that could not be computed
pub const UNKNOWN: &str = "unknown";

pub fn average_column(column: &str) -> String {
    format!("{column}Average")
}

pub fn list_column(column: &str) -> String {
    format!("{column}List")
}

pub fn normalized_column(column: &str) -> String {
    format!("{column}Normalized")
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Loose three-way comparison used by sorting.
    ///
    /// Numbers compare numerically (ints and floats mix), text compares
    /// lexicographically. Any other pairing, missing cells included, is a tie.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
        }
    }
}

// Floats are keyed by bit pattern so values can serve as group keys
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::List(items) => items.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{}", *x as i64),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A flat row of named cells.
///
/// Source rows, aggregation groups, filled grid cells and normalized rows
/// all share this shape so that every stage can address fields by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        self.fields.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Cell value, treating an absent column as [`Value::Null`]
    pub fn value(&self, column: &str) -> &Value {
        const NULL: &Value = &Value::Null;
        self.fields.get(column).unwrap_or(NULL)
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Value::as_i64)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

}

#[cfg(test)]
impl Record {
    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
