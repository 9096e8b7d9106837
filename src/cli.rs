//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values. Column and aggregation flags
//! are optional so that values from `.datareport.toml` survive unless
//! overridden.

use crate::models::{Bucket, Reducer};
use clap::Parser;
use std::path::{Path, PathBuf};

/// DataReport - static PDF reports from CSV data
///
/// Reads a delimited file, computes summary statistics, a category
/// grouping and a time series, and writes a PDF with tables and charts.
///
/// Examples:
///   datareport --input sample_data.csv --output sample_report.pdf
///   datareport --input sales.csv --group-col region --value-col amount --freq week
///   datareport --input sales.csv --reducer mean --json aggregates.json
///   datareport --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Input CSV file path
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output PDF file path
    #[arg(short, long, default_value = "report.pdf", value_name = "FILE")]
    pub output: PathBuf,

    /// Date column for the time series [default: date]
    #[arg(long, value_name = "NAME")]
    pub date_col: Option<String>,

    /// Group / category column name [default: category]
    #[arg(long, value_name = "NAME")]
    pub group_col: Option<String>,

    /// Numeric value column name [default: value]
    #[arg(long, value_name = "NAME")]
    pub value_col: Option<String>,

    /// Time series bucket width [default: day]
    #[arg(long, value_name = "BUCKET")]
    pub freq: Option<Bucket>,

    /// Reduction applied per group and per bucket [default: sum]
    #[arg(long, value_name = "REDUCER")]
    pub reducer: Option<Reducer>,

    /// Number of top groups to show [default: 10]
    #[arg(long, value_name = "COUNT")]
    pub top_n: Option<usize>,

    /// Field delimiter of the input file [default: ,]
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Report title
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Also write the computed aggregates as JSON to this path
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Keep the rendered chart PNGs next to the report
    #[arg(long)]
    pub keep_charts: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .datareport.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .datareport.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The input path (empty if not set; validated first).
    pub fn input_path(&self) -> &Path {
        self.input.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(top_n) = self.top_n {
            if top_n == 0 {
                return Err("--top-n must be at least 1".to_string());
            }
        }

        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() {
                return Err(format!(
                    "Delimiter must be a single-byte character, got '{}'",
                    delimiter
                ));
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.input.as_deref() == Some(self.output.as_path()) {
            return Err("Output path must differ from the input path".to_string());
        }

        if let Some(ref json) = self.json {
            if json == &self.output {
                return Err("--json path must differ from the report output path".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
