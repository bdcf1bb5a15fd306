//! CLI entry point for the mobility insights dashboard.
//!
//! Loads raw traffic records from a CSV file, a URL or the built-in sample,
//! enriches them once and answers filter queries with a text report, a CSV
//! export or the list of available filter values.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use mobility_insights::{
    config::{LogConfig, SelectionConfig},
    dashboard::Dashboard,
    loader::load_source,
    output::{append_summary, print_json, print_pretty, render_report, write_records},
    query::{FilterSelection, PeakFilter},
    record::RawRecord,
    sample,
};
use std::collections::BTreeSet;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "mobility_insights")]
#[command(about = "City mobility & pollution insights over traffic camera records", long_about = None)]
struct Cli {
    /// CSV file or URL with raw records (defaults to the built-in sample)
    #[arg(short, long, global = true, value_name = "FILE_OR_URL")]
    source: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dashboard report for a filter selection
    Report {
        #[command(flatten)]
        filters: FilterArgs,

        /// Also log the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// CSV file to append the summary row to
        #[arg(long, value_name = "FILE")]
        summary_csv: Option<String>,
    },
    /// List the filter values observed in the dataset
    Options,
    /// Export the filtered, enriched records as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// CSV file to write
        #[arg(short, long, default_value = "filtered.csv")]
        output: String,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// City to include (repeatable; all cities when omitted)
    #[arg(long = "city", value_name = "CITY")]
    cities: Vec<String>,

    /// Vehicle type to include (repeatable; all types when omitted)
    #[arg(long = "vehicle", value_name = "TYPE")]
    vehicle_types: Vec<String>,

    /// Weather condition to include (repeatable; all conditions when omitted)
    #[arg(long = "weather", value_name = "CONDITION")]
    weather_conditions: Vec<String>,

    /// Hour type: all, peak or off-peak
    #[arg(long)]
    peak: Option<PeakFilter>,

    /// JSON selection file; flags given on the command line take precedence
    #[arg(long, value_name = "FILE")]
    selection: Option<String>,
}

impl FilterArgs {
    fn resolve(self, dashboard: &Dashboard) -> Result<FilterSelection> {
        let base = match &self.selection {
            Some(path) => SelectionConfig::load(path)?,
            None => SelectionConfig::default(),
        };
        let flags = SelectionConfig {
            cities: non_empty(self.cities),
            vehicle_types: non_empty(self.vehicle_types),
            weather_conditions: non_empty(self.weather_conditions),
            peak: self.peak,
        };

        Ok(base.merge(flags).resolve(dashboard.options()))
    }
}

fn non_empty(values: Vec<String>) -> Option<BTreeSet<String>> {
    (!values.is_empty()).then(|| values.into_iter().collect())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_config = LogConfig::from_env();
    let file_appender =
        tracing_appender::rolling::daily(&log_config.directory, &log_config.file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let raw = load_raw(cli.source.as_deref())?;
    let dashboard = Dashboard::new(&raw);

    if !dashboard.issues().is_empty() {
        warn!(
            issues = dashboard.issues().len(),
            "Dataset contains malformed fields; affected values are null"
        );
    }

    match cli.command {
        Commands::Report {
            filters,
            json,
            summary_csv,
        } => {
            let selection = filters.resolve(&dashboard)?;
            let result = dashboard.query(&selection);
            let summary = result.summary();

            render_report(&result, &mut std::io::stdout().lock())?;
            print_pretty(&summary);

            if json {
                print_json(&summary)?;
            }
            if let Some(path) = summary_csv {
                append_summary(&path, &summary)?;
                info!(path = %path, "Summary appended");
            }
        }
        Commands::Options => {
            let options = dashboard.options();
            info!(
                cities = ?options.cities,
                vehicle_types = ?options.vehicle_types,
                weather_conditions = ?options.weather_conditions,
                "Filter options"
            );
            println!("{}", serde_json::to_string_pretty(options)?);
        }
        Commands::Export { filters, output } => {
            let selection = filters.resolve(&dashboard)?;
            let result = dashboard.query(&selection);

            let rows = write_records(&output, &result.filtered_records)?;
            info!(rows, path = %output, "Filtered records exported");
        }
    }

    Ok(())
}

/// Loads raw records from `source`, or the built-in sample when absent.
#[tracing::instrument]
fn load_raw(source: Option<&str>) -> Result<Vec<RawRecord>> {
    match source {
        Some(source) => load_source(source),
        None => {
            info!("No source given, using the built-in sample dataset");
            Ok(sample::records())
        }
    }
}
