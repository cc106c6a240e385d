//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during cleaning and training
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Sampling frequency of the upstream EIA series.
///
/// The frequency also dictates how `start`/`end` must be formatted in the
/// query string (`YYYY-MM-DD`, `YYYY-MM`, or `YYYY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Monthly,
    Annual,
}

impl Granularity {
    /// The literal `frequency` query parameter the API expects.
    pub fn as_api_str(self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Monthly => "monthly",
            Granularity::Annual => "annual",
        }
    }

    /// Format a date as a period bound for this frequency.
    pub fn format_period(self, date: NaiveDate) -> String {
        match self {
            Granularity::Daily => date.format("%Y-%m-%d").to_string(),
            Granularity::Monthly => date.format("%Y-%m").to_string(),
            Granularity::Annual => date.format("%Y").to_string(),
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        self.as_api_str()
    }

    pub fn next(self) -> Self {
        match self {
            Granularity::Daily => Granularity::Monthly,
            Granularity::Monthly => Granularity::Annual,
            Granularity::Annual => Granularity::Daily,
        }
    }
}

/// One observation exactly as returned by the API: a period label and a
/// value string that may carry locale noise. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub period: String,
    pub value: String,
}

/// A cleaned observation: calendar date and USD/bbl price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// An ordered price series: strictly increasing by date, no duplicates.
///
/// Built once per fetch by the cleaner (or the offline sample generator)
/// and immutable thereafter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Wrap already-sorted, already-deduplicated points.
    ///
    /// Callers (cleaner, sample generator) are responsible for the ordering
    /// invariant; this constructor does not re-sort.
    pub fn from_points(points: Vec<PricePoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// The most recent `n` prices, most recent first.
    ///
    /// This matches the lag-feature ordering (`lags[0]` = nearest predecessor),
    /// so the result can seed the recursive forecast walk directly.
    pub fn recent_prices(&self, n: usize) -> Vec<f64> {
        self.points.iter().rev().take(n).map(|p| p.price).collect()
    }

    /// Calendar years present in the series, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.points.iter().map(|p| p.date.year()).collect();
        years.dedup();
        years
    }

    /// Points restricted to one calendar year.
    pub fn year_window(&self, year: i32) -> Vec<PricePoint> {
        self.points
            .iter()
            .filter(|p| p.date.year() == year)
            .copied()
            .collect()
    }
}

/// Why a raw record was rejected during cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The period label did not normalize to a valid date.
    BadPeriod,
    /// The value string did not parse to a finite number.
    BadValue,
}

impl RejectReason {
    pub fn display_name(self) -> &'static str {
        match self {
            RejectReason::BadPeriod => "bad period",
            RejectReason::BadValue => "bad value",
        }
    }
}

/// A raw record the cleaner dropped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub period: String,
    pub value: String,
    pub reason: RejectReason,
}

/// The cleaner's full result: the series plus data-quality accounting.
///
/// Rows never disappear silently; every dropped record is either listed in
/// `rejected` or counted in `duplicates_dropped`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanOutcome {
    pub series: PriceSeries,
    pub rejected: Vec<RejectedRecord>,
    pub duplicates_dropped: usize,
}

impl CleanOutcome {
    /// Wrap an already-clean series (offline/sample inputs).
    pub fn from_series(series: PriceSeries) -> Self {
        Self {
            series,
            rejected: Vec::new(),
            duplicates_dropped: 0,
        }
    }

    pub fn dropped(&self) -> usize {
        self.rejected.len() + self.duplicates_dropped
    }
}

/// One supervised-learning row: the current price as label and the `L`
/// previous prices as features, `lags[0]` nearest.
#[derive(Debug, Clone, PartialEq)]
pub struct LaggedRow {
    pub date: NaiveDate,
    pub label: f64,
    pub lags: Vec<f64>,
}

/// Lag-feature table derived from one series.
#[derive(Debug, Clone, PartialEq)]
pub struct LagTable {
    pub lag_depth: usize,
    pub rows: Vec<LaggedRow>,
}

/// Chronological train/test partition of a lag table (no shuffling).
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub lag_depth: usize,
    pub train: Vec<LaggedRow>,
    pub test: Vec<LaggedRow>,
}

/// Boosted-tree hyperparameters. Fixed constants by default; no tuning in scope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GbmParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub min_samples_leaf: usize,
}

impl Default for GbmParams {
    fn default() -> Self {
        Self {
            n_estimators: 150,
            max_depth: 5,
            learning_rate: 0.1,
            min_samples_leaf: 2,
        }
    }
}

/// Holdout diagnostics for one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub n: usize,
}

/// One held-out observation with its in-sample-era prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldoutPoint {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

/// A predicted price for a date strictly after the last known observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FutureForecastPoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub granularity: Granularity,
    pub start: NaiveDate,
    pub end: NaiveDate,

    pub lag_depth: usize,
    pub horizon: usize,
    pub train_frac: f64,
    pub params: GbmParams,

    /// Skip the network and synthesize a series instead.
    pub offline: bool,
    pub sample_seed: u64,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_forecast: Option<PathBuf>,
    pub debug_bundle: bool,
}

/// A saved forecast file (JSON).
///
/// The portable representation of a completed run: enough to re-plot or
/// compare without re-fetching or re-training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub granularity: Granularity,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub last_observation: NaiveDate,
    pub lag_depth: usize,
    pub horizon: usize,
    pub params: GbmParams,
    pub metrics: EvalMetrics,
    pub baseline_metrics: Option<EvalMetrics>,
    pub history: PriceSeries,
    pub holdout: Vec<HoldoutPoint>,
    pub future: Vec<FutureForecastPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn period_formatting_follows_granularity() {
        let date = d(2020, 3, 7);
        assert_eq!(Granularity::Daily.format_period(date), "2020-03-07");
        assert_eq!(Granularity::Monthly.format_period(date), "2020-03");
        assert_eq!(Granularity::Annual.format_period(date), "2020");
    }

    #[test]
    fn recent_prices_are_most_recent_first() {
        let series = PriceSeries::from_points(vec![
            PricePoint { date: d(2024, 1, 1), price: 10.0 },
            PricePoint { date: d(2024, 1, 2), price: 20.0 },
            PricePoint { date: d(2024, 1, 3), price: 30.0 },
        ]);
        assert_eq!(series.recent_prices(2), vec![30.0, 20.0]);
        assert_eq!(series.recent_prices(5), vec![30.0, 20.0, 10.0]);
    }

    #[test]
    fn year_window_filters_by_calendar_year() {
        let series = PriceSeries::from_points(vec![
            PricePoint { date: d(2023, 12, 30), price: 1.0 },
            PricePoint { date: d(2024, 1, 2), price: 2.0 },
            PricePoint { date: d(2024, 6, 2), price: 3.0 },
        ]);
        assert_eq!(series.years(), vec![2023, 2024]);
        assert_eq!(series.year_window(2024).len(), 2);
        assert!(series.year_window(2022).is_empty());
    }
}
