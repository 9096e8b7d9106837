//! Report assembly and output.
//!
//! This module turns the loaded table and its derived records into a PDF
//! document (title page, statistics tables, charts) and optionally a JSON
//! export of the aggregates. Files are written through a temporary file in
//! the target directory and renamed into place, so a failed run never
//! leaves a partial report behind.

use super::chart::{self, Align, Chart};
use super::pdf::{Block, Document, TableBlock};
use crate::error::{ReportError, Result};
use crate::models::{GroupSummary, Schema, SummaryRecord, Table, TimeSeries};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Numeric columns per summary table before it is split.
const STATS_COLUMNS_PER_TABLE: usize = 4;

/// Presentation settings for one report.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub title: String,
    pub subtitle: String,
    /// Input path as shown in the document.
    pub source: String,
    pub generated_on: NaiveDateTime,
    /// Groups listed in the table and the bar chart.
    pub top_n: usize,
    pub chart_width: u32,
    pub chart_height: u32,
    /// Save the chart PNGs next to the report.
    pub keep_charts: bool,
}

/// Everything the report is built from.
#[derive(Debug, Clone, Copy)]
pub struct ReportData<'a> {
    pub table: &'a Table,
    pub summary: &'a SummaryRecord,
    pub groups: &'a GroupSummary,
    pub series: &'a TimeSeries,
}

/// Files produced by [`write_report`].
#[derive(Debug, Clone)]
pub struct WrittenReport {
    pub path: PathBuf,
    pub size: usize,
    pub charts: Vec<PathBuf>,
    pub json: Option<PathBuf>,
}

/// Render charts and the document, then write it to `path`.
///
/// The PDF, the optional chart PNGs and the optional JSON export are all
/// staged in temporary files first and only moved into place once every one
/// of them was written, so a failed run leaves none of them behind.
pub fn write_report(
    path: &Path,
    ctx: &ReportContext,
    data: ReportData<'_>,
    json_path: Option<&Path>,
) -> Result<WrittenReport> {
    let series_chart = chart::line_chart(
        data.series,
        &format!(
            "Timeseries ({}, {} per {})",
            data.series.value_col, data.series.reducer, data.series.bucket
        ),
        ctx.chart_width,
        ctx.chart_height,
    )
    .map_err(|e| ReportError::report_write(path, format!("rendering time series chart: {}", e)))?;

    let groups_chart = chart::bar_chart(
        data.groups.top(ctx.top_n),
        &format!("Top groups by {}", data.groups.reducer),
        ctx.chart_width,
        ctx.chart_height,
    )
    .map_err(|e| ReportError::report_write(path, format!("rendering group chart: {}", e)))?;

    let document = build_document(ctx, data, &[series_chart.clone(), groups_chart.clone()]);
    let bytes = document
        .render()
        .map_err(|e| ReportError::report_write(path, e))?;
    let size = bytes.len();

    let mut outputs = vec![(path.to_path_buf(), bytes)];
    let mut charts = Vec::new();
    if ctx.keep_charts {
        for (suffix, chart) in [("timeseries", series_chart), ("groups", groups_chart)] {
            let chart_path = sibling_path(path, suffix, "png");
            charts.push(chart_path.clone());
            outputs.push((chart_path, chart.png));
        }
    }
    if let Some(json_path) = json_path {
        let content = generate_json_report(ctx, data)?;
        outputs.push((json_path.to_path_buf(), content.into_bytes()));
    }

    commit(outputs)?;
    info!("Wrote report ({} bytes) to {}", size, path.display());
    for chart in &charts {
        debug!("Saved chart to {}", chart.display());
    }
    if let Some(json_path) = json_path {
        info!("Wrote aggregates to {}", json_path.display());
    }

    Ok(WrittenReport {
        path: path.to_path_buf(),
        size,
        charts,
        json: json_path.map(Path::to_path_buf),
    })
}

/// Assemble the document blocks; `charts` are appended in order.
pub fn build_document(ctx: &ReportContext, data: ReportData<'_>, charts: &[Chart]) -> Document {
    let mut doc = Document::new(&ctx.title, ctx.generated_on);

    // Title page
    doc.push(Block::Title(ctx.title.clone()));
    doc.push(Block::Subtitle(ctx.subtitle.clone()));
    doc.push(Block::Spacer(12.0));
    doc.push(Block::Paragraph(format!(
        "Generated on: {}",
        ctx.generated_on.format("%Y-%m-%d %H:%M:%S")
    )));
    doc.push(Block::Paragraph(format!("Source: {}", ctx.source)));
    doc.push(Block::Paragraph(format!(
        "{} rows, {} columns ({})",
        data.table.len(),
        data.table.schema().len(),
        describe_schema(data.table.schema())
    )));
    doc.push(Block::Spacer(18.0));

    // Summary statistics
    doc.push(Block::Heading("Summary statistics".to_string()));
    if data.summary.is_empty() {
        doc.push(Block::Paragraph("No numeric summary available.".to_string()));
    } else {
        for table in summary_tables(data.summary) {
            doc.push(Block::Table(table));
        }
    }

    // Group summary
    doc.push(Block::Heading("Group summary (top groups)".to_string()));
    if data.groups.is_empty() {
        doc.push(Block::Paragraph("No grouping data available.".to_string()));
    } else {
        doc.push(Block::Table(group_table(data.groups, ctx.top_n)));
        if data.groups.entries.len() > ctx.top_n {
            doc.push(Block::Paragraph(format!(
                "Showing the top {} of {} groups.",
                ctx.top_n,
                data.groups.entries.len()
            )));
        }
    }

    if data.series.skipped > 0 {
        doc.push(Block::Paragraph(format!(
            "{} rows without a valid '{}' date were left out of the time series.",
            data.series.skipped, data.series.date_col
        )));
    }

    // Figures
    for chart in charts {
        doc.push(Block::Heading(chart.title.clone()));
        doc.push(Block::Chart(chart.clone()));
    }

    doc
}

fn describe_schema(schema: &Schema) -> String {
    schema
        .columns()
        .iter()
        .map(|c| format!("{}: {}", c.name, c.column_type))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Metric rows by numeric-column columns, split into tables of at most
/// [`STATS_COLUMNS_PER_TABLE`] value columns.
fn summary_tables(summary: &SummaryRecord) -> Vec<TableBlock> {
    summary
        .columns
        .chunks(STATS_COLUMNS_PER_TABLE)
        .map(|chunk| {
            let mut header = vec!["Metric".to_string()];
            header.extend(chunk.iter().map(|(name, _)| name.clone()));

            let metric_names: Vec<&str> = chunk[0].1.metrics().iter().map(|(m, _)| *m).collect();
            let rows = metric_names
                .iter()
                .enumerate()
                .map(|(m, metric)| {
                    let mut row = vec![metric.to_string()];
                    for (_, stats) in chunk {
                        let value = stats.metrics()[m].1;
                        row.push(if m == 0 {
                            stats.count.to_string()
                        } else {
                            format_stat(value)
                        });
                    }
                    row
                })
                .collect();

            let mut widths = vec![120.0];
            widths.extend(std::iter::repeat(100.0).take(chunk.len()));
            let mut align = vec![Align::Left];
            align.extend(std::iter::repeat(Align::Right).take(chunk.len()));

            TableBlock {
                header,
                rows,
                widths,
                align,
            }
        })
        .collect()
}

fn group_table(groups: &GroupSummary, top_n: usize) -> TableBlock {
    TableBlock {
        header: vec![
            groups.group_col.clone(),
            "rows".to_string(),
            format!("{} of {}", groups.reducer, groups.value_col),
        ],
        rows: groups
            .top(top_n)
            .iter()
            .map(|e| vec![e.key.clone(), e.rows.to_string(), format!("{:.2}", e.value)])
            .collect(),
        widths: vec![200.0, 80.0, 140.0],
        align: vec![Align::Left, Align::Right, Align::Right],
    }
}

fn format_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

/// `<dir>/<stem>_<suffix>.<ext>` next to `path`.
fn sibling_path(path: &Path, suffix: &str, ext: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "report".to_string());
    path.with_file_name(format!("{}_{}.{}", stem, suffix, ext))
}

/// Serializable view of the derived records.
#[derive(Debug, Serialize)]
struct AggregateExport<'a> {
    generated_on: NaiveDateTime,
    source: &'a str,
    rows: usize,
    schema: &'a Schema,
    summary: &'a SummaryRecord,
    groups: &'a GroupSummary,
    timeseries: &'a TimeSeries,
}

/// Generate a JSON export of the aggregates.
pub fn generate_json_report(ctx: &ReportContext, data: ReportData<'_>) -> Result<String> {
    let export = AggregateExport {
        generated_on: ctx.generated_on,
        source: &ctx.source,
        rows: data.table.len(),
        schema: data.table.schema(),
        summary: data.summary,
        groups: data.groups,
        timeseries: data.series,
    };
    serde_json::to_string_pretty(&export)
        .map_err(|e| ReportError::report_write(Path::new(&ctx.source), e))
}

/// Stage every output in a temporary file next to its target, then persist
/// them all. Targets persisted before a failing one are removed again.
fn commit(outputs: Vec<(PathBuf, Vec<u8>)>) -> Result<()> {
    let mut staged = Vec::with_capacity(outputs.len());
    for (path, bytes) in outputs {
        let file = stage(&path, &bytes)?;
        staged.push((path, file));
    }

    let mut persisted: Vec<PathBuf> = Vec::new();
    for (path, file) in staged {
        if let Err(e) = file.persist(&path) {
            for done in &persisted {
                if let Err(remove_err) = std::fs::remove_file(done) {
                    warn!("Failed to remove {}: {}", done.display(), remove_err);
                }
            }
            return Err(ReportError::report_write(&path, e.error));
        }
        persisted.push(path);
    }
    Ok(())
}

/// Write `bytes` to a temporary file in the directory of `path`.
fn stage(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| ReportError::report_write(path, e))?;

    let mut file = NamedTempFile::new_in(&dir).map_err(|e| ReportError::report_write(path, e))?;
    file.write_all(bytes)
        .map_err(|e| ReportError::report_write(path, e))?;
    file.flush()
        .map_err(|e| ReportError::report_write(path, e))?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{group_summary, summary_stats, timeseries_aggregate};
    use crate::loader::{read_data, LoadOptions};
    use crate::models::{Bucket, Reducer};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    struct Fixture {
        table: Table,
        summary: SummaryRecord,
        groups: GroupSummary,
        series: TimeSeries,
    }

    impl Fixture {
        fn sample() -> Self {
            let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/sample_data.csv");
            let table = read_data(&path, &LoadOptions::default()).unwrap();
            let summary = summary_stats(&table);
            let groups = group_summary(&table, "category", "value", Reducer::Sum).unwrap();
            let series =
                timeseries_aggregate(&table, "date", "value", Bucket::Day, Reducer::Sum).unwrap();
            Self {
                table,
                summary,
                groups,
                series,
            }
        }

        fn data(&self) -> ReportData<'_> {
            ReportData {
                table: &self.table,
                summary: &self.summary,
                groups: &self.groups,
                series: &self.series,
            }
        }
    }

    fn context() -> ReportContext {
        ReportContext {
            title: "Automated Data Report".to_string(),
            subtitle: "Source: sample_data.csv".to_string(),
            source: "fixtures/sample_data.csv".to_string(),
            generated_on: NaiveDate::from_ymd_opt(2025, 1, 6)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            top_n: 10,
            chart_width: 600,
            chart_height: 260,
            keep_charts: false,
        }
    }

    #[test]
    fn test_write_report() {
        let fixture = Fixture::sample();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("sample_report.pdf");

        let written = write_report(&path, &context(), fixture.data(), None).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(written.size, bytes.len());
        assert!(bytes.starts_with(b"%PDF-1.4"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(Automated Data Report) Tj"));
        assert!(text.contains("(Summary statistics) Tj"));
        assert!(text.contains("(280.00) Tj"));
        assert!(text.contains("/Im2 Do"));
        assert!(written.charts.is_empty());
    }

    #[test]
    fn test_keep_charts() {
        let fixture = Fixture::sample();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        let mut ctx = context();
        ctx.keep_charts = true;

        let written = write_report(&path, &ctx, fixture.data(), None).unwrap();

        assert_eq!(
            written.charts,
            vec![
                dir.path().join("report_timeseries.png"),
                dir.path().join("report_groups.png"),
            ]
        );
        for chart in &written.charts {
            assert!(std::fs::read(chart).unwrap().starts_with(&[137, 80, 78, 71]));
        }
    }

    #[test]
    fn test_unwritable_output() {
        let fixture = Fixture::sample();
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("report.pdf");

        let err = write_report(&path, &context(), fixture.data(), None).unwrap_err();

        assert!(matches!(err, ReportError::ReportWrite { .. }));
        assert!(err.to_string().contains("report.pdf"));
        assert!(!path.exists());
    }

    #[test]
    fn test_document_sections() {
        let fixture = Fixture::sample();
        let mut ctx = context();
        ctx.top_n = 2;

        let doc = build_document(&ctx, fixture.data(), &[]);
        let text = String::from_utf8_lossy(&doc.render().unwrap()).to_string();

        assert!(text.contains("(Group summary \\(top groups\\)) Tj"));
        assert!(text.contains("(Showing the top 2 of 3 groups.) Tj"));
        assert!(text.contains("(sum of value) Tj"));
        assert!(text.contains("(50% \\(median\\)) Tj"));
        assert!(!text.contains("(C) Tj"));
    }

    #[test]
    fn test_summary_table_layout() {
        let fixture = Fixture::sample();
        let tables = summary_tables(&fixture.summary);

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].header, vec!["Metric", "value"]);
        assert_eq!(tables[0].rows[0], vec!["count", "5"]);
        assert_eq!(tables[0].rows[1], vec!["mean", "118.00"]);
    }

    #[test]
    fn test_json_export() {
        let fixture = Fixture::sample();
        let dir = TempDir::new().unwrap();
        let report = dir.path().join("report.pdf");
        let path = dir.path().join("aggregates.json");

        let written = write_report(&report, &context(), fixture.data(), Some(&path)).unwrap();

        assert_eq!(written.json.as_deref(), Some(path.as_path()));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["rows"], 5);
        assert_eq!(json["groups"]["entries"][0]["key"], "B");
        assert_eq!(json["groups"]["entries"][0]["value"], 280.0);
        assert_eq!(json["timeseries"]["points"][4]["bucket"], "2025-01-05");
        assert_eq!(json["timeseries"]["bucket"], "day");
    }

    #[test]
    fn test_failed_export_keeps_nothing() {
        let fixture = Fixture::sample();
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let path = dir.path().join("report.pdf");
        let mut ctx = context();
        ctx.keep_charts = true;

        let err = write_report(&path, &ctx, fixture.data(), Some(&blocker.join("agg.json")))
            .unwrap_err();

        assert!(matches!(err, ReportError::ReportWrite { .. }));
        assert!(err.to_string().contains("agg.json"));
        assert!(!path.exists());
        assert!(!dir.path().join("report_timeseries.png").exists());
        assert!(!dir.path().join("report_groups.png").exists());
    }

    #[test]
    fn test_commit_rolls_back_persisted_files() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.txt");
        // A directory in the way makes the rename onto it fail.
        let second = dir.path().join("second");
        std::fs::create_dir(&second).unwrap();
        std::fs::write(second.join("keep"), "x").unwrap();

        let err = commit(vec![
            (first.clone(), b"one".to_vec()),
            (second.clone(), b"two".to_vec()),
        ])
        .unwrap_err();

        assert!(matches!(err, ReportError::ReportWrite { .. }));
        assert!(!first.exists());
        assert!(second.join("keep").exists());
    }

    #[test]
    fn test_sibling_path() {
        assert_eq!(
            sibling_path(Path::new("out/report.pdf"), "groups", "png"),
            PathBuf::from("out/report_groups.png")
        );
    }
}
