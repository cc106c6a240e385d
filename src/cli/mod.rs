//! Command-line parsing for the EIA-based Brent forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the cleaning/modeling code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::Granularity;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "brent", version, about = "Brent Spot Price Dashboard & Forecaster (EIA-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, clean, train, and print the 90-day forecast (plus optional exports).
    Forecast(ForecastArgs),
    /// Fetch and clean only: per-year statistics and a price chart, no model.
    History(HistoryArgs),
    /// Plot a previously exported forecast JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `brent forecast`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(ForecastArgs),
}

/// Common options for fetching and forecasting.
#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    /// Series granularity (daily, monthly, annual).
    #[arg(short = 'g', long, value_enum, default_value_t = Granularity::Daily)]
    pub granularity: Granularity,

    /// Window start (YYYY-MM-DD). Defaults to 2020-01-01.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Window end (YYYY-MM-DD). Defaults to yesterday.
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Lag depth: how many previous prices feed each prediction.
    #[arg(long, default_value_t = 5)]
    pub lag: usize,

    /// Forecast horizon in days.
    #[arg(long, default_value_t = 90)]
    pub horizon: usize,

    /// Boosting rounds (tree count).
    #[arg(long, default_value_t = 150)]
    pub trees: usize,

    /// Maximum tree depth.
    #[arg(long, default_value_t = 5)]
    pub depth: usize,

    /// Learning rate (shrinkage per boosting round).
    #[arg(long, default_value_t = 0.1)]
    pub eta: f64,

    /// Minimum samples per leaf.
    #[arg(long, default_value_t = 2)]
    pub min_leaf: usize,

    /// Chronological train fraction for the holdout split.
    #[arg(long, default_value_t = 0.8)]
    pub train_frac: f64,

    /// Skip the network and synthesize a sample series instead.
    #[arg(long)]
    pub offline: bool,

    /// Random seed for the offline sample series.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export history/holdout/forecast rows to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the full forecast (params + grids) to JSON.
    #[arg(long = "export-forecast")]
    pub export_forecast: Option<PathBuf>,

    /// Write a markdown debug bundle (data quality + diagnostics).
    #[arg(long)]
    pub debug: bool,
}

/// Options for the history-only view.
#[derive(Debug, Parser, Clone)]
pub struct HistoryArgs {
    /// Series granularity (daily, monthly, annual).
    #[arg(short = 'g', long, value_enum, default_value_t = Granularity::Daily)]
    pub granularity: Granularity,

    /// Window start (YYYY-MM-DD). Defaults to 2020-01-01.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Window end (YYYY-MM-DD). Defaults to yesterday.
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Restrict the chart to one calendar year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Skip the network and synthesize a sample series instead.
    #[arg(long)]
    pub offline: bool,

    /// Random seed for the offline sample series.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for plotting a saved forecast.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Forecast JSON file produced by `brent forecast --export-forecast`.
    #[arg(long, value_name = "JSON")]
    pub forecast: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
