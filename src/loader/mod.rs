//! CSV loader with per-column type inference.
//!
//! Reads a delimited file with a header row into a [`Table`]. Every column
//! gets a type tag once, here; cells that do not coerce to their column's
//! type become [`Value::Missing`] instead of failing the load.

use crate::error::{ReportError, Result};
use crate::models::{Column, ColumnType, Schema, Table, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::path::Path;
use tracing::{debug, info, warn};

/// Tokens treated like an empty cell.
const NA_TOKENS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Options for reading a delimited file.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field separator byte.
    pub delimiter: u8,
    /// Columns parsed as dates regardless of their content.
    pub date_columns: Vec<String>,
    /// Columns parsed as numbers regardless of their content.
    pub numeric_columns: Vec<String>,
    /// Column parsed as dates when it is in the header and at least one of
    /// its cells is a date. Unlike `date_columns`, absence is not an error.
    pub date_hint: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            date_columns: Vec::new(),
            numeric_columns: Vec::new(),
            date_hint: None,
        }
    }
}

impl From<&crate::config::InputConfig> for LoadOptions {
    fn from(config: &crate::config::InputConfig) -> Self {
        Self {
            delimiter: config.delimiter_byte(),
            date_columns: config.date_columns.clone(),
            numeric_columns: config.numeric_columns.clone(),
            date_hint: None,
        }
    }
}

/// Read a delimited file into a table.
///
/// Fails with `DataLoad` when the file is missing or malformed, has no data
/// rows, names a declared column that is not in the header, or when a
/// declared date column holds no parseable date at all.
pub fn read_data(path: &Path, options: &LoadOptions) -> Result<Table> {
    if !path.is_file() {
        return Err(ReportError::data_load(path, "file does not exist"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| ReportError::data_load(path, e.to_string()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReportError::data_load(path, format!("reading header: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    for declared in options.date_columns.iter().chain(&options.numeric_columns) {
        if !headers.contains(declared) {
            return Err(ReportError::data_load(
                path,
                format!("declared column '{}' is not in the header", declared),
            ));
        }
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| ReportError::data_load(path, format!("row {}: {}", row_no + 1, e)))?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(ReportError::data_load(path, "file contains no data rows"));
    }

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| Column {
            name: name.clone(),
            column_type: infer_type(name, idx, &records, options),
        })
        .collect();

    let rows: Vec<Vec<Value>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .enumerate()
                .map(|(idx, col)| coerce(record.get(idx).unwrap_or(""), col.column_type))
                .collect()
        })
        .collect();

    for (idx, col) in columns.iter().enumerate() {
        if !options.date_columns.contains(&col.name) {
            continue;
        }
        let parsed = rows.iter().filter(|row| !row[idx].is_missing()).count();
        if parsed == 0 {
            return Err(ReportError::data_load(
                path,
                format!("date column '{}' contains no parseable dates", col.name),
            ));
        }
        if parsed < rows.len() {
            warn!(
                "{} of {} values in date column '{}' could not be parsed",
                rows.len() - parsed,
                rows.len(),
                col.name
            );
        }
    }

    info!("Loaded {} rows from {}", rows.len(), path.display());
    for col in &columns {
        debug!("  column '{}': {}", col.name, col.column_type);
    }

    Ok(Table::new(Schema::new(columns), rows))
}

/// Decide the type of the column at `idx`.
fn infer_type(
    name: &str,
    idx: usize,
    records: &[csv::StringRecord],
    options: &LoadOptions,
) -> ColumnType {
    if options.date_columns.iter().any(|c| c == name) {
        return ColumnType::Date;
    }
    if options.numeric_columns.iter().any(|c| c == name) {
        return ColumnType::Number;
    }

    let cells: Vec<&str> = records
        .iter()
        .map(|r| r.get(idx).unwrap_or(""))
        .filter(|cell| !is_na(cell))
        .collect();

    if cells.is_empty() {
        return ColumnType::Text;
    }
    if options.date_hint.as_deref() == Some(name) {
        if cells.iter().any(|cell| parse_date(cell).is_some()) {
            return ColumnType::Date;
        }
        warn!("Column '{}' holds no dates, inferring its type instead", name);
    }
    if cells.iter().all(|cell| parse_number(cell).is_some()) {
        return ColumnType::Number;
    }
    if cells.iter().all(|cell| parse_date(cell).is_some()) {
        return ColumnType::Date;
    }
    ColumnType::Text
}

/// Convert a raw cell to a value of the given column type.
fn coerce(raw: &str, column_type: ColumnType) -> Value {
    if is_na(raw) {
        return Value::Missing;
    }
    match column_type {
        ColumnType::Text => Value::Text(raw.to_string()),
        ColumnType::Number => parse_number(raw).map_or(Value::Missing, Value::Number),
        ColumnType::Date => parse_date(raw).map_or(Value::Missing, Value::Date),
    }
}

fn is_na(cell: &str) -> bool {
    cell.is_empty() || NA_TOKENS.contains(&cell)
}

/// Parse a finite float.
pub fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a calendar date; datetimes are truncated to their date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/sample_data.csv")
    }

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_sample() {
        let table = read_data(&sample_path(), &LoadOptions::default()).unwrap();

        assert_eq!(table.len(), 5);
        let schema = table.schema();
        assert_eq!(schema.names(), vec!["date", "category", "value", "region"]);
        assert_eq!(schema.lookup("date").unwrap().1, ColumnType::Date);
        assert_eq!(schema.lookup("category").unwrap().1, ColumnType::Text);
        assert_eq!(schema.lookup("value").unwrap().1, ColumnType::Number);
        assert_eq!(table.rows()[0][2], Value::Number(100.0));
    }

    #[test]
    fn test_row_count_matches_data_lines() {
        let content = std::fs::read_to_string(sample_path()).unwrap();
        let data_lines = content.lines().skip(1).filter(|l| !l.is_empty()).count();

        let table = read_data(&sample_path(), &LoadOptions::default()).unwrap();
        assert_eq!(table.len(), data_lines);
    }

    #[test]
    fn test_bad_cells_become_missing() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "data.csv",
            "date,value\n2025-01-01,1.5\nnot-a-date,oops\n2025-01-03,\n",
        );
        let options = LoadOptions {
            date_columns: vec!["date".to_string()],
            numeric_columns: vec!["value".to_string()],
            ..LoadOptions::default()
        };

        let table = read_data(&path, &options).unwrap();

        assert_eq!(table.len(), 3);
        assert!(table.rows()[1][0].is_missing());
        assert!(table.rows()[1][1].is_missing());
        assert!(table.rows()[2][1].is_missing());
        assert_eq!(table.rows()[0][1], Value::Number(1.5));
    }

    #[test]
    fn test_mixed_column_is_text() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "data.csv", "code,n\n12,1\nX7,NA\n");

        let table = read_data(&path, &LoadOptions::default()).unwrap();

        assert_eq!(table.schema().lookup("code").unwrap().1, ColumnType::Text);
        assert_eq!(table.schema().lookup("n").unwrap().1, ColumnType::Number);
        assert!(table.rows()[1][1].is_missing());
    }

    #[test]
    fn test_date_hint_coerces_bad_cells() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "data.csv", "date,value\n2025-01-01,1\nunknown,2\n");
        let options = LoadOptions {
            date_hint: Some("date".to_string()),
            ..LoadOptions::default()
        };

        let table = read_data(&path, &options).unwrap();
        assert_eq!(table.schema().lookup("date").unwrap().1, ColumnType::Date);
        assert!(table.rows()[1][0].is_missing());

        // Without the hint the mixed column stays text.
        let table = read_data(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.schema().lookup("date").unwrap().1, ColumnType::Text);

        // A hint naming an absent column is ignored.
        let options = LoadOptions {
            date_hint: Some("when".to_string()),
            ..LoadOptions::default()
        };
        assert!(read_data(&path, &options).is_ok());
    }

    #[test]
    fn test_custom_delimiter() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "data.tsv", "a;b\nx;1\ny;2\n");
        let options = LoadOptions {
            delimiter: b';',
            ..LoadOptions::default()
        };

        let table = read_data(&path, &options).unwrap();
        assert_eq!(table.schema().names(), vec!["a", "b"]);
        assert_eq!(table.schema().lookup("b").unwrap().1, ColumnType::Number);
    }

    #[test]
    fn test_missing_file() {
        let err = read_data(Path::new("/nonexistent/data.csv"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, ReportError::DataLoad { .. }));
    }

    #[test]
    fn test_header_only_file() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "empty.csv", "date,value\n");
        let err = read_data(&path, &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no data rows"));

        let path = write_csv(&dir, "blank.csv", "");
        assert!(matches!(
            read_data(&path, &LoadOptions::default()),
            Err(ReportError::DataLoad { .. })
        ));
    }

    #[test]
    fn test_date_column_without_dates() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "data.csv", "date,value\nsoon,1\nlater,2\n");
        let options = LoadOptions {
            date_columns: vec!["date".to_string()],
            ..LoadOptions::default()
        };

        let err = read_data(&path, &options).unwrap_err();
        assert!(err.to_string().contains("no parseable dates"));
    }

    #[test]
    fn test_declared_columns_must_be_in_header() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "data.csv", "date,value\n2025-01-01,1\n");

        let declared_date = LoadOptions {
            date_columns: vec!["when".to_string()],
            ..LoadOptions::default()
        };
        let err = read_data(&path, &declared_date).unwrap_err();
        assert!(matches!(err, ReportError::DataLoad { .. }));
        assert!(err.to_string().contains("'when'"));

        let declared_number = LoadOptions {
            numeric_columns: vec!["amount".to_string()],
            ..LoadOptions::default()
        };
        let err = read_data(&path, &declared_number).unwrap_err();
        assert!(matches!(err, ReportError::DataLoad { .. }));
        assert!(err.to_string().contains("'amount'"));
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "data.csv", "a,b\n1,2\n3\n");
        assert!(matches!(
            read_data(&path, &LoadOptions::default()),
            Err(ReportError::DataLoad { .. })
        ));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(parse_date("2025-03-09"), Some(expected));
        assert_eq!(parse_date("2025/03/09"), Some(expected));
        assert_eq!(parse_date("2025-03-09 14:30:00"), Some(expected));
        assert_eq!(parse_date("2025-03-09T14:30:00.250"), Some(expected));
        assert_eq!(parse_date("2025-03-09T14:30:00+02:00"), Some(expected));
        assert_eq!(parse_date("09.03.2025"), None);
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        assert_eq!(parse_number("2.5"), Some(2.5));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("abc"), None);
    }
}
