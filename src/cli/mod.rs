//! Command-line parsing for the bike-sharing dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::dashboard::Page;
use crate::domain::{Attribute, DEFAULT_BIN_COUNT, Granularity, KeyField, Statistic, UnmappedPolicy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bikes", version, about = "Bike Sharing Dashboard (hourly/daily rental analysis)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard.
    ///
    /// Pages are listed in a sidebar; charts are rendered with Plotters into Ratatui.
    Tui(TuiArgs),
    /// Print pages as tables and ASCII charts.
    Report(ReportArgs),
    /// Run a single ad-hoc aggregation.
    Aggregate(AggregateArgs),
    /// Export every page to per-chart CSV files and/or a views JSON file.
    Export(ExportArgs),
    /// Render a previously exported views JSON file.
    Plot(PlotArgs),
    /// List the dashboard pages.
    Pages,
}

/// Input and aggregation options shared by every data-reading command.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Directory holding `hour.csv` and `day.csv`.
    #[arg(long, env = "BIKES_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Hourly dataset (defaults to `<data-dir>/hour.csv`).
    #[arg(long, env = "BIKES_HOUR_CSV")]
    pub hour_csv: Option<PathBuf>,

    /// Daily dataset (defaults to `<data-dir>/day.csv`).
    #[arg(long, env = "BIKES_DAY_CSV")]
    pub day_csv: Option<PathBuf>,

    /// Number of equal-width bins for continuous attributes.
    #[arg(long, env = "BIKES_BINS", default_value_t = DEFAULT_BIN_COUNT)]
    pub bins: usize,

    /// How to treat category codes without a label.
    #[arg(long, value_enum, default_value_t = UnmappedPolicy::Error)]
    pub unmapped: UnmappedPolicy,

    /// ASCII chart width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Page to open first.
    #[arg(short, long, value_enum)]
    pub page: Option<Page>,

    /// Write logs to this file (the terminal is owned by the UI).
    #[arg(long, env = "BIKES_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Only print this page.
    #[arg(short, long, value_enum)]
    pub page: Option<Page>,
}

#[derive(Debug, Args, Clone)]
pub struct AggregateArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Dataset to aggregate.
    #[arg(short, long, value_enum, default_value_t = Granularity::Hourly)]
    pub dataset: Granularity,

    /// Group by these fields, in order (repeat or comma-separate).
    #[arg(long, value_enum, value_delimiter = ',')]
    pub by: Vec<KeyField>,

    /// Group by equal-width bins of this attribute (after `--by` fields).
    #[arg(long, value_enum)]
    pub bin_by: Option<Attribute>,

    /// Statistic of `cnt` per group.
    #[arg(short, long, value_enum, default_value_t = Statistic::Mean)]
    pub stat: Statistic,

    /// Keep only rush-hour rows (7-9 and 16-19) before grouping.
    #[arg(long)]
    pub rush_hours: bool,

    /// Skip the ASCII chart.
    #[arg(long)]
    pub no_plot: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Directory for per-chart CSV files.
    #[arg(long, value_name = "DIR")]
    pub csv: Option<PathBuf>,

    /// Views JSON file (replay with `bikes plot --views`).
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

/// Options for plotting a saved views file.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Views JSON file produced by `bikes export --json`.
    #[arg(long, value_name = "JSON")]
    pub views: PathBuf,

    /// Only plot this page.
    #[arg(short, long, value_enum)]
    pub page: Option<Page>,

    /// Chart width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_accepts_comma_separated_keys() {
        let cli = Cli::try_parse_from([
            "bikes", "aggregate", "--by", "hour,season", "--stat", "sum", "--rush-hours",
        ])
        .unwrap();
        let Command::Aggregate(args) = cli.command else {
            panic!("expected aggregate");
        };
        assert_eq!(args.by, vec![KeyField::Hour, KeyField::Season]);
        assert_eq!(args.stat, Statistic::Sum);
        assert!(args.rush_hours);
        assert_eq!(args.data.bins, DEFAULT_BIN_COUNT);
    }

    #[test]
    fn report_page_names_are_kebab_case() {
        let cli = Cli::try_parse_from(["bikes", "report", "--page", "season-totals"]).unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.page, Some(Page::SeasonTotals));
    }
}
