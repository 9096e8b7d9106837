//! Summary statistics, category grouping and time bucketing.
//!
//! All functions borrow the table and return owned records. Hash-based
//! grouping is followed by an explicit sort so output order never depends
//! on map iteration order.

use crate::error::Result;
use crate::models::{
    Bucket, ColumnStats, ColumnType, GroupEntry, GroupSummary, Reducer, SeriesPoint,
    SummaryRecord, Table, TimeSeries,
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Compute statistics for every numeric column of the table.
pub fn summary_stats(table: &Table) -> SummaryRecord {
    let columns = table
        .schema()
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, col)| col.column_type == ColumnType::Number)
        .map(|(idx, col)| {
            let values: Vec<f64> = table.column_values(idx).filter_map(|v| v.as_f64()).collect();
            (col.name.clone(), column_stats(&values))
        })
        .collect();

    SummaryRecord { columns }
}

/// Statistics of a list of values.
pub fn column_stats(values: &[f64]) -> ColumnStats {
    if values.is_empty() {
        return ColumnStats::default();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.len() >= 2).then(|| {
        let sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (sq / (n - 1.0)).sqrt()
    });

    ColumnStats {
        count: values.len(),
        mean: Some(mean),
        std,
        min: sorted.first().copied(),
        p25: Some(quantile(&sorted, 0.25)),
        median: Some(quantile(&sorted, 0.5)),
        p75: Some(quantile(&sorted, 0.75)),
        max: sorted.last().copied(),
    }
}

/// Linear interpolation between closest ranks of a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Reduce `value_col` per distinct value of `group_col`.
///
/// Rows without a group key or without a value do not contribute; groups
/// left with no contributing row are omitted. Entries are ordered by
/// descending value, ties by ascending key.
pub fn group_summary(
    table: &Table,
    group_col: &str,
    value_col: &str,
    reducer: Reducer,
) -> Result<GroupSummary> {
    let schema = table.schema();
    let (group_idx, _) = schema.lookup(group_col)?;
    let value_idx = schema.expect(value_col, ColumnType::Number)?;

    let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
    for row in table.rows() {
        let key = &row[group_idx];
        if key.is_missing() {
            continue;
        }
        if let Some(value) = row[value_idx].as_f64() {
            groups.entry(key.to_string()).or_default().push(value);
        }
    }

    let mut entries: Vec<GroupEntry> = groups
        .into_iter()
        .filter_map(|(key, values)| {
            reducer.apply(&values).map(|value| GroupEntry {
                key,
                value,
                rows: values.len(),
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.key.cmp(&b.key))
    });

    debug!(
        "Grouped '{}' by '{}' ({}): {} groups",
        value_col,
        group_col,
        reducer,
        entries.len()
    );

    Ok(GroupSummary {
        group_col: group_col.to_string(),
        value_col: value_col.to_string(),
        reducer,
        entries,
    })
}

/// Reduce `value_col` per time bucket of `date_col`.
///
/// Rows with a missing date, or one whose bucket would start before the
/// earliest representable date, are counted in `skipped`; rows with a
/// missing value are left out silently. Empty buckets are not emitted.
pub fn timeseries_aggregate(
    table: &Table,
    date_col: &str,
    value_col: &str,
    bucket: Bucket,
    reducer: Reducer,
) -> Result<TimeSeries> {
    let schema = table.schema();
    let date_idx = schema.expect(date_col, ColumnType::Date)?;
    let value_idx = schema.expect(value_col, ColumnType::Number)?;

    let mut buckets: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    let mut skipped = 0;
    for row in table.rows() {
        let Some(start) = row[date_idx].as_date().and_then(|d| bucket.truncate(d)) else {
            skipped += 1;
            continue;
        };
        if let Some(value) = row[value_idx].as_f64() {
            buckets.entry(start).or_default().push(value);
        }
    }

    let points: Vec<SeriesPoint> = buckets
        .into_iter()
        .filter_map(|(start, values)| {
            reducer.apply(&values).map(|value| SeriesPoint {
                bucket: start,
                value,
                rows: values.len(),
            })
        })
        .collect();

    debug!(
        "Aggregated '{}' per {} of '{}': {} buckets, {} rows skipped",
        value_col,
        bucket,
        date_col,
        points.len(),
        skipped
    );

    Ok(TimeSeries {
        date_col: date_col.to_string(),
        value_col: value_col.to_string(),
        bucket,
        reducer,
        points,
        skipped,
    })
}
