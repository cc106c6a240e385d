//! Read/write forecast JSON files.
//!
//! Forecast JSON is the "portable" representation of a completed run:
//! - window + granularity + lag/horizon + hyperparameters
//! - holdout diagnostics and the full future grid
//! - the cleaned history, for overlay plotting
//!
//! The schema is defined by `domain::ForecastFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CleanOutcome, ForecastConfig, ForecastFile};
use crate::error::AppError;
use crate::forecast::ForecastOutput;

/// Write a forecast JSON file.
pub fn write_forecast_json(
    path: &Path,
    clean: &CleanOutcome,
    out: &ForecastOutput,
    config: &ForecastConfig,
) -> Result<(), AppError> {
    let last_observation = clean
        .series
        .last()
        .map(|p| p.date)
        .ok_or_else(|| AppError::new(3, "Cannot export a forecast for an empty series."))?;

    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create forecast JSON '{}': {e}", path.display()))
    })?;

    let payload = ForecastFile {
        tool: "brent".to_string(),
        granularity: config.granularity,
        start: config.start,
        end: config.end,
        last_observation,
        lag_depth: out.lag_depth,
        horizon: out.horizon,
        params: out.params,
        metrics: out.metrics,
        baseline_metrics: out.baseline_metrics,
        history: clean.series.clone(),
        holdout: out.holdout.clone(),
        future: out.future.clone(),
    };

    serde_json::to_writer_pretty(file, &payload)
        .map_err(|e| AppError::new(2, format!("Failed to write forecast JSON: {e}")))?;

    Ok(())
}

/// Read a forecast JSON file.
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open forecast JSON '{}': {e}", path.display()))
    })?;
    let payload: ForecastFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid forecast JSON: {e}")))?;
    Ok(payload)
}
