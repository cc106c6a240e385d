//! Export run results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one row per observation, with a `segment` column separating
//! history, holdout, and forecast rows.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::CleanOutcome;
use crate::error::AppError;
use crate::forecast::ForecastOutput;

/// Write history + holdout + forecast rows to a CSV file.
pub fn write_results_csv(
    path: &Path,
    clean: &CleanOutcome,
    out: &ForecastOutput,
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "date,segment,price,predicted")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for p in clean.series.points() {
        writeln!(file, "{},history,{:.4},", p.date, p.price)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    for h in &out.holdout {
        writeln!(file, "{},holdout,{:.4},{:.4}", h.date, h.actual, h.predicted)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    for f in &out.future {
        writeln!(file, "{},forecast,,{:.4}", f.date, f.price)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
