//! Data models for the report pipeline.
//!
//! This module contains the loaded table with its per-column type tags and
//! the derived records (summary statistics, group summary, time series)
//! that the aggregator produces and the reporter consumes.

use crate::error::{ReportError, Result};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a column, inferred once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Date,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Text => write!(f, "text"),
            ColumnType::Number => write!(f, "number"),
            ColumnType::Date => write!(f, "date"),
        }
    }
}

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    /// Empty cell, or content that could not be coerced to the column type.
    Missing,
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Number(v) => write!(f, "{}", v),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Missing => Ok(()),
        }
    }
}

/// Name and type of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

/// Ordered column definitions of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Position and type of a column, or `ColumnNotFound`.
    pub fn lookup(&self, name: &str) -> Result<(usize, ColumnType)> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .map(|idx| (idx, self.columns[idx].column_type))
            .ok_or_else(|| ReportError::ColumnNotFound {
                column: name.to_string(),
                available: self.names(),
            })
    }

    /// Like [`Schema::lookup`] but also requires the given type.
    pub fn expect(&self, name: &str, expected: ColumnType) -> Result<usize> {
        let (idx, found) = self.lookup(name)?;
        if found != expected {
            return Err(ReportError::TypeMismatch {
                column: name.to_string(),
                expected,
                found,
            });
        }
        Ok(idx)
    }
}

/// The loaded dataset. Every row holds one value per schema column.
#[derive(Debug, Clone)]
pub struct Table {
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table. Rows must have exactly one value per schema column.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == schema.len()));
        Self { schema, rows }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Cells of the column at `idx`, top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Descriptive statistics of one numeric column.
///
/// Everything but `count` is `None` when the column has no values; `std`
/// (sample definition) additionally needs at least two values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub median: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    /// Metric label/value pairs in display order.
    pub fn metrics(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("count", Some(self.count as f64)),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.p25),
            ("50% (median)", self.median),
            ("75%", self.p75),
            ("max", self.max),
        ]
    }
}

/// Statistics for every numeric column, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub columns: Vec<(String, ColumnStats)>,
}

impl SummaryRecord {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Reducers and buckets
// ---------------------------------------------------------------------------

/// Aggregation applied to the values of a group or bucket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    #[default]
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

impl Reducer {
    /// Reduce a non-empty slice. Returns `None` for an empty one.
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let reduced = match self {
            Reducer::Sum => values.iter().sum(),
            Reducer::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Reducer::Count => values.len() as f64,
            Reducer::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Reducer::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };
        Some(reduced)
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reducer::Sum => write!(f, "sum"),
            Reducer::Mean => write!(f, "mean"),
            Reducer::Count => write!(f, "count"),
            Reducer::Min => write!(f, "min"),
            Reducer::Max => write!(f, "max"),
        }
    }
}

/// Width of a time bucket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    #[default]
    #[serde(alias = "D")]
    #[value(alias = "D")]
    Day,
    /// ISO weeks, starting on Monday.
    #[serde(alias = "W")]
    #[value(alias = "W")]
    Week,
    #[serde(alias = "M")]
    #[value(alias = "M")]
    Month,
}

impl Bucket {
    /// First day of the bucket containing `date`, or `None` when that day
    /// is before the earliest representable date.
    pub fn truncate(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Bucket::Day => Some(date),
            Bucket::Week => date.checked_sub_days(Days::new(u64::from(
                date.weekday().num_days_from_monday(),
            ))),
            Bucket::Month => date.with_day(1),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Day => write!(f, "day"),
            Bucket::Week => write!(f, "week"),
            Bucket::Month => write!(f, "month"),
        }
    }
}

// ---------------------------------------------------------------------------
// Group summary and time series
// ---------------------------------------------------------------------------

/// One group of a [`GroupSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupEntry {
    pub key: String,
    pub value: f64,
    /// Rows that contributed a value.
    pub rows: usize,
}

/// Aggregate of a value column per distinct category.
///
/// Entries are ordered by descending value, ties by ascending key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group_col: String,
    pub value_col: String,
    pub reducer: Reducer,
    pub entries: Vec<GroupEntry>,
}

impl GroupSummary {
    /// The first `n` groups.
    pub fn top(&self, n: usize) -> &[GroupEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One bucket of a [`TimeSeries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Start of the bucket.
    pub bucket: NaiveDate,
    pub value: f64,
    pub rows: usize,
}

/// Aggregate of a value column per time bucket, ascending and sparse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub date_col: String,
    pub value_col: String,
    pub bucket: Bucket,
    pub reducer: Reducer,
    pub points: Vec<SeriesPoint>,
    /// Rows left out because their date was missing.
    pub skipped: usize,
}
