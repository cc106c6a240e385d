//! Shared "forecast pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> clean -> lag features -> train -> recursive forecast
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! Every view goes through this module, so no surface re-issues its own fetch
//! or re-derives its own cleaning.

use crate::clean::clean_records;
use crate::data::{EiaClient, generate_series};
use crate::domain::{CleanOutcome, ForecastConfig};
use crate::error::AppError;
use crate::forecast::ForecastOutput;

/// All computed outputs of a single forecast run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub clean: CleanOutcome,
    pub forecast: ForecastOutput,
}

/// Fetch (or synthesize) and clean the configured series.
pub fn fetch_clean_series(config: &ForecastConfig) -> Result<CleanOutcome, AppError> {
    if config.offline {
        let days = (config.end - config.start).num_days().max(1) as usize;
        let series = generate_series(config.sample_seed, config.start, days)?;
        return Ok(CleanOutcome::from_series(series));
    }

    let client = EiaClient::from_env()?;
    let records = client.fetch_series(config.granularity, config.start, config.end)?;
    Ok(clean_records(&records))
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_forecast(config: &ForecastConfig) -> Result<RunOutput, AppError> {
    let clean = fetch_clean_series(config)?;
    run_forecast_with_series(config, clean)
}

/// Execute the pipeline with an already-cleaned series.
///
/// This is useful for the TUI where we want to refit without re-fetching.
pub fn run_forecast_with_series(
    config: &ForecastConfig,
    clean: CleanOutcome,
) -> Result<RunOutput, AppError> {
    let forecast = crate::forecast::run_forecast(&clean.series, config)?;
    Ok(RunOutput { clean, forecast })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GbmParams, Granularity};
    use chrono::NaiveDate;

    fn offline_config() -> ForecastConfig {
        ForecastConfig {
            granularity: Granularity::Daily,
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            lag_depth: 5,
            horizon: 90,
            train_frac: 0.8,
            params: GbmParams { n_estimators: 25, ..GbmParams::default() },
            offline: true,
            sample_seed: 42,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_results: None,
            export_forecast: None,
            debug_bundle: false,
        }
    }

    #[test]
    fn offline_pipeline_runs_end_to_end() {
        let run = run_forecast(&offline_config()).unwrap();

        assert!(!run.clean.series.is_empty());
        assert_eq!(run.clean.dropped(), 0);
        assert_eq!(run.forecast.future.len(), 90);

        let last = run.clean.series.last().unwrap().date;
        assert_eq!(
            run.forecast.future[0].date,
            last + chrono::Duration::days(1)
        );
    }

    #[test]
    fn refit_reuses_the_cleaned_series() {
        let config = offline_config();
        let clean = fetch_clean_series(&config).unwrap();

        let mut refit_config = config.clone();
        refit_config.params.n_estimators = 10;
        let run = run_forecast_with_series(&refit_config, clean.clone()).unwrap();

        assert_eq!(run.clean.series, clean.series);
        assert_eq!(run.forecast.params.n_estimators, 10);
    }
}
