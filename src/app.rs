//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - loads and relabels the datasets
//! - prints pages, ad-hoc aggregations and plots
//! - writes exports

use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::analysis::{GroupSpec, Labeler, aggregate};
use crate::cli::{AggregateArgs, Command, DataArgs, ExportArgs, PlotArgs, ReportArgs, TuiArgs};
use crate::domain::DashboardConfig;
use crate::error::AppError;
use crate::io::ingest::load_dataset;
use crate::io::views::{ViewsFile, read_views_json, write_views_json};

pub mod pipeline;

/// Entry point for the `bikes` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `bikes` and `bikes --page ...` behave like `bikes tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Report(args) => {
            init_stderr_logging();
            handle_report(args)
        }
        Command::Aggregate(args) => {
            init_stderr_logging();
            handle_aggregate(args)
        }
        Command::Export(args) => {
            init_stderr_logging();
            handle_export(args)
        }
        Command::Plot(args) => {
            init_stderr_logging();
            handle_plot(args)
        }
        Command::Pages => {
            print!("{}", crate::report::format_page_list());
            Ok(())
        }
    }
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let _guard = match &args.log_file {
        Some(path) => Some(init_file_logging(path)?),
        None => None,
    };
    let config = dashboard_config_from_args(&args.data);
    crate::tui::run(&config, args.page)
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args.data);
    let run = pipeline::run_dashboard(&config)?;

    println!("{}", crate::report::format_ingest_summary(&run.data.reports));
    for view in run.pages.iter().filter(|v| args.page.is_none_or(|p| p == v.page)) {
        println!("{}", crate::report::format_page(view, config.chart_width));
    }
    Ok(())
}

fn handle_aggregate(args: AggregateArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args.data);
    let path = match args.dataset {
        crate::domain::Granularity::Hourly => &config.hour_csv,
        crate::domain::Granularity::Daily => &config.day_csv,
    };

    let labeler = Labeler::new(config.unmapped);
    let (dataset, report) = load_dataset(path, args.dataset, &labeler)?;
    let spec = GroupSpec {
        fields: args.by.clone(),
        bin_by: args.bin_by,
        bin_count: config.bin_count,
        rush_hours_only: args.rush_hours,
        statistic: args.stat,
    };
    let result = aggregate(&dataset, &spec)?;

    println!("{}", crate::report::format_ingest_summary(std::slice::from_ref(&report)));
    println!("{}", crate::report::format_table(&result));
    if !args.no_plot {
        println!("{}", crate::plot::render_bar_chart(&result, config.chart_width));
    }
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    if args.csv.is_none() && args.json.is_none() {
        return Err(AppError::input("Nothing to export: pass --csv <DIR> and/or --json <FILE>."));
    }

    let config = dashboard_config_from_args(&args.data);
    let run = pipeline::run_dashboard(&config)?;

    if let Some(dir) = &args.csv {
        let files = crate::io::export::write_pages_csv(dir, &run.pages)?;
        println!("Wrote {} CSV files to {}", files.len(), dir.display());
    }
    if let Some(path) = &args.json {
        write_views_json(path, &ViewsFile::new(run.pages, config.bin_count))?;
        println!("Wrote views to {}", path.display());
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let views = read_views_json(&args.views)?;
    info!(pages = views.pages.len(), generated_at = %views.generated_at, "Views loaded");

    let mut shown = 0;
    for view in views.pages.iter().filter(|v| args.page.is_none_or(|p| p == v.page)) {
        println!("{}", crate::report::format_page(view, args.width));
        shown += 1;
    }
    if shown == 0 {
        return Err(AppError::input(format!(
            "'{}' holds no matching page.",
            args.views.display()
        )));
    }
    Ok(())
}

/// Resolve shared data options into a run configuration.
pub fn dashboard_config_from_args(args: &DataArgs) -> DashboardConfig {
    DashboardConfig {
        hour_csv: args
            .hour_csv
            .clone()
            .unwrap_or_else(|| args.data_dir.join("hour.csv")),
        day_csv: args
            .day_csv
            .clone()
            .unwrap_or_else(|| args.data_dir.join("day.csv")),
        bin_count: args.bins,
        unmapped: args.unmapped,
        chart_width: args.width,
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Plain-text commands log to stderr so stdout stays clean for tables.
fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn"))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// The TUI owns the terminal, so logs go to a file. Keep the guard alive until exit.
fn init_file_logging(path: &Path) -> Result<WorkerGuard, AppError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| AppError::input(format!("Log file path '{}' has no file name.", path.display())))?;
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::input(format!("Failed to create log directory '{}': {e}", dir.display())))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Ok(guard)
}

/// Rewrite argv so `bikes` defaults to `bikes tui`.
///
/// Rules:
/// - `bikes`                          -> `bikes tui`
/// - `bikes --page season-totals ...` -> `bikes tui --page season-totals ...`
/// - `bikes --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "tui" | "report" | "aggregate" | "export" | "plot" | "pages"
    );
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}
