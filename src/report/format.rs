use crate::domain::{CleanOutcome, ForecastConfig, FutureForecastPoint, HoldoutPoint};
use crate::forecast::ForecastOutput;
use crate::report::YearStats;

/// Format the full run summary (window + data quality + fit diagnostics).
pub fn format_run_summary(
    clean: &CleanOutcome,
    out: &ForecastOutput,
    config: &ForecastConfig,
) -> String {
    let mut s = String::new();

    s.push_str("=== brent - Brent Spot Forecast (EIA-based) ===\n");
    s.push_str(&format!(
        "Window: {} .. {} ({})\n",
        config.start,
        config.end,
        config.granularity.display_name()
    ));
    s.push_str(&format_data_quality(clean));

    if let (Some(first), Some(last)) = (clean.series.first(), clean.series.last()) {
        s.push_str(&format!(
            "Observed: {} .. {} | price=[{:.2}, {:.2}] USD/bbl\n",
            first.date,
            last.date,
            clean.series.points().iter().map(|p| p.price).fold(f64::INFINITY, f64::min),
            clean.series.points().iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max),
        ));
    }

    s.push_str("\nModel:\n");
    s.push_str(&format!(
        "  lags={} | trees={} | depth={} | eta={:.3} | split={}train/{}test\n",
        out.lag_depth,
        out.params.n_estimators,
        out.params.max_depth,
        out.params.learning_rate,
        out.n_train,
        out.n_test,
    ));
    s.push_str(&format!(
        "  holdout rmse={:.4} mae={:.4} (n={})\n",
        out.metrics.rmse, out.metrics.mae, out.metrics.n
    ));
    if let Some(baseline) = &out.baseline_metrics {
        s.push_str(&format!(
            "  linear AR baseline rmse={:.4} mae={:.4}\n",
            baseline.rmse, baseline.mae
        ));
    }
    s.push_str(&format!(
        "\nForecast: {} days, {} .. {}\n",
        out.future.len(),
        out.future.first().map(|f| f.date.to_string()).unwrap_or_else(|| "-".into()),
        out.future.last().map(|f| f.date.to_string()).unwrap_or_else(|| "-".into()),
    ));

    s
}

/// Format the history-only summary (no model).
pub fn format_history_summary(clean: &CleanOutcome) -> String {
    let mut s = String::new();

    s.push_str("=== brent - Brent Spot History (EIA-based) ===\n");
    s.push_str(&format_data_quality(clean));
    if let (Some(first), Some(last)) = (clean.series.first(), clean.series.last()) {
        s.push_str(&format!("Observed: {} .. {}\n", first.date, last.date));
    }

    s
}

fn format_data_quality(clean: &CleanOutcome) -> String {
    let mut s = format!(
        "Rows: kept={} rejected={} duplicates={}\n",
        clean.series.len(),
        clean.rejected.len(),
        clean.duplicates_dropped
    );
    // Surface a handful of reject reasons so bad upstream data is visible
    // without the debug bundle.
    for rejected in clean.rejected.iter().take(3) {
        s.push_str(&format!(
            "  rejected ({}): period='{}' value='{}'\n",
            rejected.reason.display_name(),
            rejected.period,
            rejected.value
        ));
    }
    if clean.rejected.len() > 3 {
        s.push_str(&format!("  ... and {} more\n", clean.rejected.len() - 3));
    }
    s
}

/// Format the per-year statistics table.
pub fn format_year_stats(stats: &[YearStats]) -> String {
    if stats.is_empty() {
        return "No observations in the requested window.\n".to_string();
    }

    let mut s = String::new();
    s.push_str("Year    n     min      max      mean    change\n");
    for y in stats {
        s.push_str(&format!(
            "{:<6}{:>4}{:>9.2}{:>9.2}{:>9.2}{:>+9.1}%\n",
            y.year,
            y.n,
            y.min,
            y.max,
            y.mean,
            y.change_pct()
        ));
    }
    s
}

/// Format the head and tail of the forecast table.
pub fn format_forecast_table(future: &[FutureForecastPoint], head: usize) -> String {
    let mut s = String::new();
    s.push_str("Forecast (USD/bbl):\n");

    for f in future.iter().take(head) {
        s.push_str(&format!("  {}  {:>8.2}\n", f.date, f.price));
    }
    if future.len() > head + 1 {
        s.push_str(&format!("  ... {} more days ...\n", future.len() - head - 1));
    }
    if future.len() > head {
        if let Some(last) = future.last() {
            s.push_str(&format!("  {}  {:>8.2}\n", last.date, last.price));
        }
    }

    s
}

/// Format the last few holdout rows (actual vs predicted).
pub fn format_holdout_tail(holdout: &[HoldoutPoint], n: usize) -> String {
    let mut s = String::new();
    s.push_str("Holdout tail (actual / predicted):\n");
    let skip = holdout.len().saturating_sub(n);
    for h in holdout.iter().skip(skip) {
        s.push_str(&format!(
            "  {}  {:>8.2} / {:>8.2}\n",
            h.date, h.actual, h.predicted
        ));
    }
    if holdout.is_empty() {
        s.push_str("  (empty)\n");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::compute_year_stats;
    use crate::domain::{PricePoint, PriceSeries};
    use chrono::NaiveDate;

    #[test]
    fn year_table_lists_each_year_once() {
        let series = PriceSeries::from_points(vec![
            PricePoint { date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), price: 40.0 },
            PricePoint { date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(), price: 60.0 },
        ]);
        let table = format_year_stats(&compute_year_stats(&series));
        assert!(table.contains("2020"));
        assert!(table.contains("2021"));
        assert_eq!(table.lines().count(), 3);
    }

    #[test]
    fn forecast_table_shows_head_and_final_row() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let future: Vec<FutureForecastPoint> = (0..90)
            .map(|i| FutureForecastPoint {
                date: start + chrono::Duration::days(i),
                price: 80.0 + i as f64 * 0.1,
            })
            .collect();

        let table = format_forecast_table(&future, 5);
        assert!(table.contains("2025-01-01"));
        assert!(table.contains("2025-03-31"));
        assert!(table.contains("84 more days"));
    }
}
