//! Synthetic Brent-like series for offline runs.
//!
//! A seeded geometric random walk with mild mean reversion toward a long-run
//! anchor price. Good enough to exercise the full clean → lag → forecast
//! pipeline (and the TUI) without network access or an API key; not a market
//! model.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{PricePoint, PriceSeries};
use crate::error::AppError;

/// Long-run anchor the walk reverts toward (USD/bbl).
const ANCHOR_PRICE: f64 = 80.0;
/// Daily log-return volatility.
const DAILY_VOL: f64 = 0.02;
/// Mean-reversion strength per day.
const REVERSION: f64 = 0.02;
/// Walk start level.
const START_PRICE: f64 = 75.0;

/// Generate `days` consecutive daily prices starting at `start`.
///
/// Deterministic per seed: the same seed always yields the same series.
pub fn generate_series(seed: u64, start: NaiveDate, days: usize) -> Result<PriceSeries, AppError> {
    if days == 0 {
        return Err(AppError::new(2, "Sample length must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut points = Vec::with_capacity(days);
    let mut price = START_PRICE;

    for i in 0..days {
        let drift = (ANCHOR_PRICE / price).ln() * REVERSION;
        let shock = DAILY_VOL * normal.sample(&mut rng);
        price = (price * (drift + shock).exp()).max(1.0);

        points.push(PricePoint {
            date: start + Duration::days(i as i64),
            price,
        });
    }

    Ok(PriceSeries::from_points(points))
}
