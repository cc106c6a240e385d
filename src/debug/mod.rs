//! Debug bundle writer for inspecting fetch inputs and forecast diagnostics.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::domain::{CleanOutcome, ForecastConfig};
use crate::error::AppError;
use crate::forecast::ForecastOutput;

pub fn write_debug_bundle(
    clean: &CleanOutcome,
    forecast: Option<&ForecastOutput>,
    config: &ForecastConfig,
) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("brent_debug_{}_{ts}.md", config.end.format("%Y%m%d")));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;

    let mut body = String::new();
    body.push_str("# brent debug bundle\n");
    body.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    body.push_str(&format!(
        "- window: {} .. {} ({})\n",
        config.start,
        config.end,
        config.granularity.display_name()
    ));
    body.push_str(&format!("- offline: {}", config.offline));
    if config.offline {
        body.push_str(&format!(" (seed {})", config.sample_seed));
    }
    body.push('\n');

    body.push_str("\n## Data quality\n");
    body.push_str(&format!("- rows kept: {}\n", clean.series.len()));
    body.push_str(&format!("- rows rejected: {}\n", clean.rejected.len()));
    body.push_str(&format!("- duplicate periods dropped: {}\n", clean.duplicates_dropped));
    for rejected in clean.rejected.iter().take(20) {
        body.push_str(&format!(
            "  - {}: period='{}' value='{}'\n",
            rejected.reason.display_name(),
            rejected.period,
            rejected.value
        ));
    }
    if clean.rejected.len() > 20 {
        body.push_str(&format!("  - ... and {} more\n", clean.rejected.len() - 20));
    }

    if let Some(out) = forecast {
        body.push_str("\n## Model\n");
        body.push_str(&format!(
            "- lags: {} | trees: {} | depth: {} | eta: {:.3} | min_leaf: {}\n",
            out.lag_depth,
            out.params.n_estimators,
            out.params.max_depth,
            out.params.learning_rate,
            out.params.min_samples_leaf
        ));
        body.push_str(&format!("- split: {} train / {} test\n", out.n_train, out.n_test));
        body.push_str(&format!(
            "- holdout: rmse={:.4} mae={:.4} (n={})\n",
            out.metrics.rmse, out.metrics.mae, out.metrics.n
        ));
        if let Some(baseline) = &out.baseline_metrics {
            body.push_str(&format!(
                "- linear AR baseline: rmse={:.4} mae={:.4}\n",
                baseline.rmse, baseline.mae
            ));
        }

        body.push_str("\n## Forecast head\n");
        for f in out.future.iter().take(10) {
            body.push_str(&format!("- {}: {:.2}\n", f.date, f.price));
        }
    }

    file.write_all(body.as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write debug file: {e}")))?;

    Ok(path)
}
