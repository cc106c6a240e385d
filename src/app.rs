//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - fetches and cleans the EIA series (or synthesizes one offline)
//! - trains the boosted regressor and walks the forecast forward
//! - prints reports/plots
//! - writes optional exports

use chrono::{Duration, Local, NaiveDate};
use clap::Parser;

use crate::cli::{Command, ForecastArgs, HistoryArgs, PlotArgs};
use crate::domain::{ForecastConfig, GbmParams};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `brent` binary.
pub fn run() -> Result<(), AppError> {
    // We want `brent` and `brent --offline` to behave like `brent tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::History(args) => handle_history(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args);
    let run = pipeline::run_forecast(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.clean, &run.forecast, &config)
    );
    println!(
        "{}",
        crate::report::format_year_stats(&crate::report::compute_year_stats(&run.clean.series))
    );
    println!("{}", crate::report::format_holdout_tail(&run.forecast.holdout, 5));
    println!("{}", crate::report::format_forecast_table(&run.forecast.future, 10));

    if config.plot {
        let plot = crate::plot::render_price_plot(
            run.clean.series.points(),
            &run.forecast.holdout,
            &run.forecast.future,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::write_results_csv(path, &run.clean, &run.forecast)?;
    }
    if let Some(path) = &config.export_forecast {
        crate::io::write_forecast_json(path, &run.clean, &run.forecast, &config)?;
    }
    if config.debug_bundle {
        let path = crate::debug::write_debug_bundle(&run.clean, Some(&run.forecast), &config)?;
        println!("Wrote debug bundle: {}", path.display());
    }

    Ok(())
}

fn handle_history(args: HistoryArgs) -> Result<(), AppError> {
    let config = history_config_from_args(&args);

    // A failed fetch degrades to a "no data" rendering; each run is
    // independent and a bad window should not look like a crash.
    let clean = match pipeline::fetch_clean_series(&config) {
        Ok(clean) => clean,
        Err(err) => {
            eprintln!("{err}");
            println!("No data for requested window.");
            return Ok(());
        }
    };

    println!("{}", crate::report::format_history_summary(&clean));
    println!(
        "{}",
        crate::report::format_year_stats(&crate::report::compute_year_stats(&clean.series))
    );

    let window = match args.year {
        Some(year) => clean.series.year_window(year),
        None => clean.series.points().to_vec(),
    };
    if window.is_empty() {
        println!("No data for requested window.");
        return Ok(());
    }

    let plot = crate::plot::render_price_plot(&window, &[], &[], args.width, args.height);
    println!("{plot}");

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_forecast_json(&args.forecast)?;
    let plot = crate::plot::render_forecast_file(&file, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn handle_tui(args: ForecastArgs) -> Result<(), AppError> {
    crate::tui::run(forecast_config_from_args(&args))
}

pub fn forecast_config_from_args(args: &ForecastArgs) -> ForecastConfig {
    ForecastConfig {
        granularity: args.granularity,
        start: args.start.unwrap_or_else(default_start),
        end: args.end.unwrap_or_else(default_end),
        lag_depth: args.lag,
        horizon: args.horizon,
        train_frac: args.train_frac,
        params: GbmParams {
            n_estimators: args.trees,
            max_depth: args.depth,
            learning_rate: args.eta,
            min_samples_leaf: args.min_leaf,
        },
        offline: args.offline,
        sample_seed: args.seed,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_forecast: args.export_forecast.clone(),
        debug_bundle: args.debug,
    }
}

fn history_config_from_args(args: &HistoryArgs) -> ForecastConfig {
    ForecastConfig {
        granularity: args.granularity,
        start: args.start.unwrap_or_else(default_start),
        end: args.end.unwrap_or_else(default_end),
        lag_depth: 5,
        horizon: 90,
        train_frac: 0.8,
        params: GbmParams::default(),
        offline: args.offline,
        sample_seed: args.seed,
        plot: true,
        plot_width: args.width,
        plot_height: args.height,
        export_results: None,
        export_forecast: None,
        debug_bundle: false,
    }
}

/// Default window start: where the dashboard's historical cut begins.
fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid constant date")
}

/// Default window end: yesterday, since the API publishes with a day's delay.
fn default_end() -> NaiveDate {
    Local::now().date_naive() - Duration::days(1)
}

/// Rewrite argv so `brent` defaults to `brent tui`.
///
/// Rules:
/// - `brent`                   -> `brent tui`
/// - `brent --offline ...`     -> `brent tui --offline ...`
/// - `brent --help/--version`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "forecast" | "history" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("brent")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&[])), argv(&["tui"]));
        assert_eq!(rewrite_args(argv(&["--offline"])), argv(&["tui", "--offline"]));
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(argv(&["forecast"])), argv(&["forecast"]));
        assert_eq!(rewrite_args(argv(&["--help"])), argv(&["--help"]));
        assert_eq!(rewrite_args(argv(&["help"])), argv(&["help"]));
    }
}
