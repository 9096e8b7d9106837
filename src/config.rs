//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.datareport.toml` files.

use crate::models::{Bucket, Reducer};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".datareport.toml";

const MIN_CHART_WIDTH: u32 = 200;
const MIN_CHART_HEIGHT: u32 = 120;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input file settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Column selection and aggregation settings.
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Report document settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// How the input file is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Field separator (a single character).
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Columns to parse as dates.
    #[serde(default)]
    pub date_columns: Vec<String>,

    /// Columns to parse as numbers.
    #[serde(default)]
    pub numeric_columns: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            date_columns: Vec::new(),
            numeric_columns: Vec::new(),
        }
    }
}

impl InputConfig {
    /// The delimiter as a byte; falls back to a comma when unset.
    /// [`Config::validate`] rejects anything but a single ASCII character.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}

/// Which columns are aggregated, and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Date column for the time series.
    #[serde(default = "default_date_col")]
    pub date_col: String,

    /// Category column for the group summary.
    #[serde(default = "default_group_col")]
    pub group_col: String,

    /// Numeric column that gets reduced.
    #[serde(default = "default_value_col")]
    pub value_col: String,

    /// Time bucket width.
    #[serde(default)]
    pub bucket: Bucket,

    /// Reduction applied per group and per bucket.
    #[serde(default)]
    pub reducer: Reducer,

    /// Number of groups shown in the report.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            date_col: default_date_col(),
            group_col: default_group_col(),
            value_col: default_value_col(),
            bucket: Bucket::default(),
            reducer: Reducer::default(),
            top_n: default_top_n(),
        }
    }
}

fn default_date_col() -> String {
    "date".to_string()
}

fn default_group_col() -> String {
    "category".to_string()
}

fn default_value_col() -> String {
    "value".to_string()
}

fn default_top_n() -> usize {
    10
}

/// Report document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Document title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Save the chart PNGs next to the report.
    #[serde(default)]
    pub keep_charts: bool,

    /// Chart raster width in pixels.
    #[serde(default = "default_chart_width")]
    pub chart_width: u32,

    /// Chart raster height in pixels.
    #[serde(default = "default_chart_height")]
    pub chart_height: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            keep_charts: false,
            chart_width: default_chart_width(),
            chart_height: default_chart_height(),
        }
    }
}

fn default_title() -> String {
    "Automated Data Report".to_string()
}

fn default_chart_width() -> u32 {
    900
}

fn default_chart_height() -> u32 {
    360
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(delimiter) = args.delimiter {
            self.input.delimiter = delimiter.to_string();
        }

        if let Some(ref date_col) = args.date_col {
            self.aggregation.date_col = date_col.clone();
        }
        if let Some(ref group_col) = args.group_col {
            self.aggregation.group_col = group_col.clone();
        }
        if let Some(ref value_col) = args.value_col {
            self.aggregation.value_col = value_col.clone();
        }
        if let Some(freq) = args.freq {
            self.aggregation.bucket = freq;
        }
        if let Some(reducer) = args.reducer {
            self.aggregation.reducer = reducer;
        }
        if let Some(top_n) = args.top_n {
            self.aggregation.top_n = top_n;
        }

        if let Some(ref title) = args.title {
            self.report.title = title.clone();
        }

        // Flags always override
        if args.keep_charts {
            self.report.keep_charts = true;
        }
    }

    /// Check merged values that the command line alone cannot guard,
    /// since they may come from the config file.
    pub fn validate(&self) -> Result<()> {
        let mut chars = self.input.delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => {}
            _ => bail!(
                "Delimiter must be a single ASCII character, got '{}'",
                self.input.delimiter
            ),
        }

        if self.aggregation.top_n < 1 {
            bail!("top_n must be at least 1");
        }

        if self.report.chart_width < MIN_CHART_WIDTH || self.report.chart_height < MIN_CHART_HEIGHT {
            bail!(
                "Charts must be at least {}x{} pixels, got {}x{}",
                MIN_CHART_WIDTH,
                MIN_CHART_HEIGHT,
                self.report.chart_width,
                self.report.chart_height
            );
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.delimiter_byte(), b',');
        assert_eq!(config.aggregation.group_col, "category");
        assert_eq!(config.aggregation.reducer, Reducer::Sum);
        assert_eq!(config.aggregation.bucket, Bucket::Day);
        assert_eq!(config.aggregation.top_n, 10);
        assert_eq!(config.report.title, "Automated Data Report");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[input]
delimiter = ";"
date_columns = ["when"]

[aggregation]
date_col = "when"
value_col = "amount"
bucket = "month"
reducer = "mean"

[report]
title = "Monthly sales"
keep_charts = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.delimiter_byte(), b';');
        assert_eq!(config.input.date_columns, vec!["when"]);
        assert_eq!(config.aggregation.date_col, "when");
        assert_eq!(config.aggregation.group_col, "category");
        assert_eq!(config.aggregation.value_col, "amount");
        assert_eq!(config.aggregation.bucket, Bucket::Month);
        assert_eq!(config.aggregation.reducer, Reducer::Mean);
        assert_eq!(config.report.title, "Monthly sales");
        assert!(config.report.keep_charts);
        assert_eq!(config.report.chart_width, 900);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config: Config = toml::from_str("[aggregation]\ngroup_col = \"region\"\n").unwrap();
        let args = Args::parse_from([
            "datareport",
            "--input",
            "data.csv",
            "--value-col",
            "amount",
            "--freq",
            "W",
            "--top-n",
            "3",
        ]);

        config.merge_with_args(&args);

        // Not given on the command line: file value survives.
        assert_eq!(config.aggregation.group_col, "region");
        assert_eq!(config.aggregation.value_col, "amount");
        assert_eq!(config.aggregation.bucket, Bucket::Week);
        assert_eq!(config.aggregation.top_n, 3);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[input]"));
        assert!(toml_str.contains("[aggregation]"));
        assert!(toml_str.contains("[report]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.aggregation.value_col, "value");
    }

    #[test]
    fn test_validate_rejects_bad_delimiter() {
        assert!(Config::default().validate().is_ok());

        for delimiter in ["ab", "\u{a7}", ""] {
            let mut config = Config::default();
            config.input.delimiter = delimiter.to_string();
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("Delimiter"), "{}", err);
        }

        let config: Config = toml::from_str("[input]\ndelimiter = \"\\t\"\n").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.input.delimiter_byte(), b'\t');
    }

    #[test]
    fn test_validate_rejects_zero_top_n() {
        let config: Config = toml::from_str("[aggregation]\ntop_n = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("top_n"));

        let mut config = config;
        let args = Args::parse_from(["datareport", "--input", "data.csv", "--top-n", "2"]);
        config.merge_with_args(&args);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_tiny_charts() {
        let mut config = Config::default();
        config.report.chart_height = 10;
        assert!(config.validate().is_err());
    }
}
