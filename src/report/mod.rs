//! Reporting utilities: per-year statistics and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the cleaning/forecast code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use chrono::Datelike;

use crate::domain::PriceSeries;

pub mod format;

pub use format::*;

/// Summary statistics for one calendar year of the series.
#[derive(Debug, Clone, PartialEq)]
pub struct YearStats {
    pub year: i32,
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub first: f64,
    pub last: f64,
}

impl YearStats {
    /// Percent change from the year's first to last observation.
    pub fn change_pct(&self) -> f64 {
        if self.first == 0.0 {
            0.0
        } else {
            (self.last - self.first) / self.first * 100.0
        }
    }
}

/// Per-year statistics over the whole series, ascending by year.
pub fn compute_year_stats(series: &PriceSeries) -> Vec<YearStats> {
    let mut out: Vec<YearStats> = Vec::new();

    for point in series.points() {
        let year = point.date.year();
        match out.last_mut() {
            Some(stats) if stats.year == year => {
                stats.n += 1;
                stats.min = stats.min.min(point.price);
                stats.max = stats.max.max(point.price);
                stats.mean += point.price;
                stats.last = point.price;
            }
            _ => out.push(YearStats {
                year,
                n: 1,
                min: point.price,
                max: point.price,
                mean: point.price,
                first: point.price,
                last: point.price,
            }),
        }
    }

    for stats in &mut out {
        stats.mean /= stats.n as f64;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;
    use chrono::NaiveDate;

    fn p(y: i32, m: u32, d: u32, price: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            price,
        }
    }

    #[test]
    fn year_stats_aggregate_per_calendar_year() {
        let series = PriceSeries::from_points(vec![
            p(2020, 1, 1, 40.0),
            p(2020, 4, 1, 9.12),
            p(2020, 12, 1, 50.0),
            p(2022, 3, 1, 133.18),
            p(2022, 9, 1, 90.0),
        ]);

        let stats = compute_year_stats(&series);
        assert_eq!(stats.len(), 2);

        assert_eq!(stats[0].year, 2020);
        assert_eq!(stats[0].n, 3);
        assert_eq!(stats[0].min, 9.12);
        assert_eq!(stats[0].max, 50.0);
        assert!((stats[0].mean - (40.0 + 9.12 + 50.0) / 3.0).abs() < 1e-12);
        assert_eq!(stats[0].first, 40.0);
        assert_eq!(stats[0].last, 50.0);
        assert!(stats[0].change_pct() > 0.0);

        assert_eq!(stats[1].year, 2022);
        assert_eq!(stats[1].max, 133.18);
    }

    #[test]
    fn empty_series_has_no_stats() {
        assert!(compute_year_stats(&PriceSeries::default()).is_empty());
    }
}
