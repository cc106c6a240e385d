//! Raw payload cleaning: noisy API records in, typed price series out.
//!
//! The upstream API reports periods at three granularities (`YYYY`,
//! `YYYY-MM`, `YYYY-MM-DD`) and values as strings that may carry currency
//! symbols, whitespace, and decimal commas. Cleaning is:
//!
//! 1. period label -> full calendar date (bare years/months get default parts)
//! 2. value string -> finite f64 (strip noise, comma becomes decimal point)
//! 3. stable ascending sort by date
//! 4. duplicate dates resolved keep-first, with a count
//!
//! Unparseable rows are dropped but never silently: each one is returned in
//! `CleanOutcome::rejected` with a reason.

use chrono::NaiveDate;

use crate::domain::{
    CleanOutcome, PricePoint, PriceSeries, RawRecord, RejectReason, RejectedRecord,
};

/// Normalize a period label to a full date.
///
/// Bare years are pinned to January 1st and bare months to the 1st, matching
/// how the annual/monthly series index their periods.
pub fn normalize_period(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    let full = match label.len() {
        4 => format!("{label}-01-01"),
        7 => format!("{label}-01"),
        _ => label.to_string(),
    };
    NaiveDate::parse_from_str(&full, "%Y-%m-%d").ok()
}

/// Normalize a value string to a finite price.
///
/// Strips every character that is not a digit, comma, period, or minus sign,
/// then reinterprets the comma as the decimal point (the source locale writes
/// `83,48` for 83.48).
///
/// Caveat: a value that already uses `.` as its decimal point *and* carries a
/// stray `,` thousands marker will mis-parse. The upstream format has not been
/// observed doing this, so the behavior is kept rather than guessed at.
pub fn sanitize_value(raw: &str) -> Option<f64> {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    if stripped.is_empty() {
        return None;
    }
    let normalized = stripped.replace(',', ".");
    let value = normalized.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Clean a batch of raw records into a chronologically sorted series.
///
/// Empty input, or input where every row fails cleaning, yields an empty
/// series; callers treat that as "no data", not as an error.
pub fn clean_records(records: &[RawRecord]) -> CleanOutcome {
    let mut points = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for record in records {
        let Some(date) = normalize_period(&record.period) else {
            rejected.push(reject(record, RejectReason::BadPeriod));
            continue;
        };
        let Some(price) = sanitize_value(&record.value) else {
            rejected.push(reject(record, RejectReason::BadValue));
            continue;
        };
        points.push(PricePoint { date, price });
    }

    // Stable sort preserves payload order within a date, so dedup keeps the
    // record the API listed first for that period.
    points.sort_by_key(|p| p.date);
    let before = points.len();
    points.dedup_by_key(|p| p.date);
    let duplicates_dropped = before - points.len();

    CleanOutcome {
        series: PriceSeries::from_points(points),
        rejected,
        duplicates_dropped,
    }
}

fn reject(record: &RawRecord, reason: RejectReason) -> RejectedRecord {
    RejectedRecord {
        period: record.period.clone(),
        value: record.value.clone(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(period: &str, value: &str) -> RawRecord {
        RawRecord {
            period: period.to_string(),
            value: value.to_string(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn period_labels_normalize_per_shape() {
        assert_eq!(normalize_period("2020"), Some(d(2020, 1, 1)));
        assert_eq!(normalize_period("2020-03"), Some(d(2020, 3, 1)));
        assert_eq!(normalize_period("2020-03-15"), Some(d(2020, 3, 15)));
        assert_eq!(normalize_period("not-a-date"), None);
        assert_eq!(normalize_period("2020-13"), None);
    }

    #[test]
    fn malformed_values_are_sanitized_or_dropped() {
        assert_eq!(sanitize_value("83,48"), Some(83.48));
        assert_eq!(sanitize_value("$ 61.57"), Some(61.57));
        assert_eq!(sanitize_value("N/A"), None);
        assert_eq!(sanitize_value(""), None);
        assert_eq!(sanitize_value("-12.5"), Some(-12.5));
    }

    #[test]
    fn monthly_scenario_sorts_chronologically() {
        let records = vec![
            rec("2020-01", "40.12"),
            rec("2020-02", "9.12"),
            rec("2020-03", "35.00"),
        ];
        let outcome = clean_records(&records);
        assert!(outcome.rejected.is_empty());
        let points = outcome.series.points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], PricePoint { date: d(2020, 1, 1), price: 40.12 });
        assert_eq!(points[1], PricePoint { date: d(2020, 2, 1), price: 9.12 });
        assert_eq!(points[2], PricePoint { date: d(2020, 3, 1), price: 35.00 });
    }

    #[test]
    fn descending_payload_is_sorted_ascending() {
        let records = vec![
            rec("2024-01-03", "82.0"),
            rec("2024-01-02", "81.0"),
            rec("2024-01-01", "80.0"),
        ];
        let outcome = clean_records(&records);
        let dates: Vec<NaiveDate> = outcome.series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn cleaning_clean_input_is_a_noop() {
        let records = vec![rec("2024-01-01", "80.00"), rec("2024-01-02", "81.25")];
        let first = clean_records(&records);

        // Re-encode the cleaned series and clean it again.
        let reencoded: Vec<RawRecord> = first
            .series
            .points()
            .iter()
            .map(|p| rec(&p.date.format("%Y-%m-%d").to_string(), &format!("{}", p.price)))
            .collect();
        let second = clean_records(&reencoded);

        assert_eq!(first.series, second.series);
        assert!(second.rejected.is_empty());
        assert_eq!(second.duplicates_dropped, 0);
    }

    #[test]
    fn bad_rows_are_counted_with_reasons() {
        let records = vec![
            rec("2024-01-01", "80.0"),
            rec("2024-01-02", "N/A"),
            rec("garbage", "81.0"),
        ];
        let outcome = clean_records(&records);
        assert_eq!(outcome.series.len(), 1);
        assert_eq!(outcome.rejected.len(), 2);
        assert_eq!(outcome.rejected[0].reason, RejectReason::BadValue);
        assert_eq!(outcome.rejected[1].reason, RejectReason::BadPeriod);
    }

    #[test]
    fn duplicate_periods_keep_first_in_payload_order() {
        let records = vec![
            rec("2024-01-01", "80.0"),
            rec("2024-01-01", "99.0"),
            rec("2024-01-02", "81.0"),
        ];
        let outcome = clean_records(&records);
        assert_eq!(outcome.series.len(), 2);
        assert_eq!(outcome.duplicates_dropped, 1);
        assert_eq!(outcome.series.points()[0].price, 80.0);
    }

    #[test]
    fn empty_input_yields_empty_series() {
        let outcome = clean_records(&[]);
        assert!(outcome.series.is_empty());
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.dropped(), 0);
    }
}
