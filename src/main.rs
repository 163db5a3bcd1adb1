//! CLI entry point for the courier workload tool.
//!
//! Provides subcommands for summarizing the routes in view, ZIP and zone
//! workload totals, filtered dataset export, rebalancing of overloaded
//! routes, and heatmap layer generation.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use courier_workload::config::DashboardConfig;
use courier_workload::geodata::{ZipGazetteer, build_heatmap};
use courier_workload::loader::load_routes;
use courier_workload::output::{print_json, print_pretty, write_csv, write_json};
use courier_workload::workload::{
    aggregate::{top_zips, zip_totals, zone_shares, zone_totals},
    explode::explode_routes,
    filter::{route_options, selected_zip_codes, zones_present},
    rebalance::{RebalanceOutcome, rebalance},
    summary::{extremes, route_bars, summarize_view},
    types::Zone,
    zone::ZoneMatching,
};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "courier_workload")]
#[command(about = "Explore and rebalance courier route workload", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Route dataset CSV (may be gzip-compressed)
    #[arg(short, long, global = true, default_value = "final_courier_routes_dataset.csv")]
    input: String,

    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Routes with more daily stops than this are overloaded
    #[arg(short, long, global = true)]
    threshold: Option<u32>,

    /// Only include routes in this zone
    #[arg(short, long, global = true, value_enum)]
    zone: Option<Zone>,

    /// Only include these route codes (repeatable)
    #[arg(short, long = "route", global = true)]
    routes: Vec<String>,

    /// How zone patterns are matched against ZIP codes
    #[arg(long, global = true, value_enum)]
    zone_matching: Option<ZoneMatching>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the routes in view
    Summary,
    /// Total daily stops per ZIP code across the whole dataset
    Zips {
        /// Number of ZIP codes to show (0 = all)
        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,

        /// Optional CSV file to write the totals to
        #[arg(short, long)]
        output: Option<String>,

        /// Gzip compress the CSV output
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Total daily stops per zone across the whole dataset
    Zones,
    /// Export the routes in view as CSV
    Export {
        /// CSV file to write
        #[arg(short, long, default_value = "filtered_routes.csv")]
        output: String,

        /// Gzip compress the exported CSV
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Spread overloaded routes' stops evenly across their ZIP codes (routes in view)
    Rebalance {
        /// CSV file for the rebalanced route/ZIP table
        #[arg(short, long, default_value = "rebalanced_routes.csv")]
        output: String,

        /// Optional CSV file for the before/after comparison
        #[arg(long)]
        comparison: Option<String>,

        /// Optional JSON file for the rebalancing report
        #[arg(long)]
        report: Option<String>,

        /// Number of top ZIP codes by rebalanced stops to show (0 = all)
        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,

        /// Gzip compress the CSV outputs
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Build heatmap layer data from whole-dataset ZIP totals
    Heatmap {
        /// GeoNames postal-code dump (tab-separated)
        #[arg(short, long)]
        gazetteer: String,

        /// JSON file to write
        #[arg(short, long, default_value = "zip_heatmap.json")]
        output: String,
    },
}

/// JSON report for a rebalancing run.
#[derive(Serialize)]
struct RebalanceReport<'a> {
    generated_at: DateTime<Utc>,
    source: &'a str,
    #[serde(flatten)]
    outcome: &'a RebalanceOutcome,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/courier_workload.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("courier_workload.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
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
    let config = resolve_config(&cli.global)?;
    let rules = config.zone_rules();
    let threshold = config.overload_threshold;

    let routes = load_routes(&cli.global.input)?;
    let filter = config.route_filter();
    let view = filter.select(&routes, &rules);

    info!(
        threshold,
        zone = ?config.zone_filter,
        selected_routes = filter.routes.len(),
        in_view = view.len(),
        "View selected"
    );

    match cli.command {
        Commands::Summary => {
            let summary = summarize_view(&view, threshold);
            info!(
                total_stops = summary.total_stops,
                avg_stops = ?summary.avg_stops,
                routes_in_view = summary.routes_in_view,
                overloaded = summary.overloaded_in_view,
                "Summary of routes in view"
            );

            if let Some(extremes) = extremes(&routes) {
                info!(
                    route_code = %extremes.most_loaded.route_code,
                    stops = extremes.most_loaded.estimated_stops_per_day,
                    "Most loaded route"
                );
                info!(
                    route_code = %extremes.least_loaded.route_code,
                    stops = extremes.least_loaded.estimated_stops_per_day,
                    "Least loaded route"
                );
            }

            if !filter.routes.is_empty() {
                for (route_code, zip_codes) in selected_zip_codes(&routes, &filter) {
                    info!(
                        route_code = %route_code,
                        zip_codes = %zip_codes,
                        "ZIP codes for selected route"
                    );
                }
            }

            let zones: Vec<String> = zones_present(&routes, &rules)
                .iter()
                .map(ToString::to_string)
                .collect();
            info!(zones = ?zones, "Zones in dataset");
            info!(
                routes = ?route_options(&routes, config.zone_filter, &rules),
                "Route options"
            );

            for bar in route_bars(&view, threshold) {
                info!(
                    route_code = %bar.route_code,
                    stops = bar.estimated_stops_per_day,
                    overloaded = bar.overloaded,
                    "Route"
                );
            }
        }
        Commands::Zips { top, output, gzip } => {
            let explosion = explode_routes(&routes);
            let totals = zip_totals(&explosion.records);

            info!(
                zips = totals.len(),
                zip_records = explosion.records.len(),
                dropped_tokens = explosion.dropped_count(),
                "ZIP workload computed"
            );
            print_pretty(&explosion.dropped);

            let rows = top_zips(&totals, top);
            for row in &rows {
                info!(zip_code = %row.zip_code, stops = row.estimated_stops, "ZIP");
            }

            if let Some(path) = output {
                write_csv(&path, &top_zips(&totals, 0), gzip)?;
            }
        }
        Commands::Zones => {
            for share in zone_shares(&zone_totals(&routes, &rules)) {
                info!(
                    zone = %share.zone,
                    stops = share.estimated_stops,
                    percent = %format!("{:.1}%", share.percent),
                    "Zone"
                );
            }
        }
        Commands::Export { output, gzip } => {
            if view.is_empty() {
                warn!("No routes in view, exporting header only");
            }
            write_csv(&output, &view, gzip)?;
        }
        Commands::Rebalance {
            output,
            comparison,
            report,
            top,
            gzip,
        } => {
            let outcome = rebalance(&view, threshold);

            for skipped in &outcome.skipped {
                warn!(
                    route_code = %skipped.route_code,
                    reason = %skipped.reason,
                    "Unrebalanceable route"
                );
            }

            for row in outcome.rebalanced.iter().take(10) {
                info!(
                    route_code = %row.route_code,
                    zip_code = %row.zip_code,
                    rebalanced_stops = row.rebalanced_stops,
                    "Rebalanced"
                );
            }

            info!(
                std_before = ?outcome.stddev_before,
                std_after = ?outcome.stddev_after,
                "Per-route dispersion"
            );

            for zip in outcome.top_zips(top) {
                info!(
                    zip_code = %zip.zip_code,
                    stops = zip.estimated_stops,
                    "Top ZIP by rebalanced stops"
                );
            }

            write_csv(&output, &outcome.rebalanced, gzip)?;

            if let Some(path) = comparison {
                write_csv(&path, &outcome.comparison, gzip)?;
            }

            let report_body = RebalanceReport {
                generated_at: Utc::now(),
                source: &cli.global.input,
                outcome: &outcome,
            };
            match report {
                Some(path) => write_json(&path, &report_body)?,
                None => print_json(&report_body)?,
            }
        }
        Commands::Heatmap { gazetteer, output } => {
            let gazetteer = ZipGazetteer::load(&gazetteer)?;
            let explosion = explode_routes(&routes);
            let layer = build_heatmap(&zip_totals(&explosion.records), &gazetteer);

            info!(
                points = layer.points.len(),
                missing = layer.missing.len(),
                "Heatmap layer built"
            );
            write_json(&output, &layer)?;
        }
    }

    Ok(())
}

/// Merges defaults, the optional config file, environment overrides and CLI
/// flags, in that order of precedence.
fn resolve_config(args: &GlobalArgs) -> Result<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    config.apply_overrides(args.threshold, args.zone, &args.routes, args.zone_matching);

    Ok(config)
}
