//! DataReport - static PDF reports from CSV data
//!
//! A CLI tool that loads a delimited file, computes summary statistics,
//! a category grouping and a time series, and writes a paginated PDF with
//! tables and charts.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any failure (bad input, unknown or mistyped column, unwritable output)

mod analysis;
mod cli;
mod config;
mod error;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Local;
use cli::Args;
use config::{Config, CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use loader::LoadOptions;
use report::{ReportContext, ReportData};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("DataReport v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_report(&args) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .datareport.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set columns, bucket width, reducer and report title.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Stage progress on stderr; hidden in quiet mode.
fn stage_progress(quiet: bool, stages: u64) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(stages);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:20.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Run the load → aggregate → report pipeline.
fn run_report(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(args)?;
    config.merge_with_args(args);
    config.validate()?;
    let agg = &config.aggregation;

    let input = args.input_path();
    let progress = stage_progress(args.quiet, 4);

    // Step 1: Load the table
    progress.set_message(format!("Reading {}", input.display()));
    let mut options = LoadOptions::from(&config.input);
    options.date_hint = Some(agg.date_col.clone());
    let table = loader::read_data(input, &options)?;
    progress.inc(1);

    // Step 2: Summary statistics
    progress.set_message("Calculating summary statistics");
    let summary = analysis::summary_stats(&table);
    progress.inc(1);

    // Step 3: Grouping and time series
    progress.set_message(format!(
        "Grouping '{}' by '{}' and per {} of '{}'",
        agg.value_col, agg.group_col, agg.bucket, agg.date_col
    ));
    let groups = analysis::group_summary(&table, &agg.group_col, &agg.value_col, agg.reducer)?;
    let series = analysis::timeseries_aggregate(
        &table,
        &agg.date_col,
        &agg.value_col,
        agg.bucket,
        agg.reducer,
    )?;
    if series.skipped > 0 {
        warn!(
            "{} rows without a valid '{}' date left out of the time series",
            series.skipped, agg.date_col
        );
    }
    progress.inc(1);

    // Step 4: Charts and document
    progress.set_message(format!("Building PDF {}", args.output.display()));
    let source_name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| input.display().to_string());
    let ctx = ReportContext {
        title: config.report.title.clone(),
        subtitle: format!("Source: {}", source_name),
        source: input.display().to_string(),
        generated_on: Local::now().naive_local(),
        top_n: agg.top_n,
        chart_width: config.report.chart_width,
        chart_height: config.report.chart_height,
        keep_charts: config.report.keep_charts,
    };
    let data = ReportData {
        table: &table,
        summary: &summary,
        groups: &groups,
        series: &series,
    };

    let written = report::write_report(&args.output, &ctx, data, args.json.as_deref())?;
    progress.inc(1);
    progress.finish_and_clear();

    if !args.quiet {
        println!("\n📊 Report Summary:");
        println!("   Rows: {}", table.len());
        println!("   Numeric columns: {}", summary.columns.len());
        println!("   Groups: {} (showing top {})", groups.entries.len(), agg.top_n);
        println!("   Time buckets: {} ({})", series.points.len(), agg.bucket);
        for chart in &written.charts {
            println!("   Chart: {}", chart.display());
        }
        if let Some(ref json_path) = written.json {
            println!("   Aggregates: {}", json_path.display());
        }
        println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
        println!(
            "\n✅ Report saved to: {} ({} bytes)",
            written.path.display(),
            written.size
        );
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
