//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed history: `-` line
//! - holdout predictions: `x`
//! - future forecast: `+` line

use chrono::{Datelike, NaiveDate};

use crate::domain::{ForecastFile, FutureForecastPoint, HoldoutPoint, PricePoint};

/// Render history plus optional holdout/forecast overlays.
pub fn render_price_plot(
    history: &[PricePoint],
    holdout: &[HoldoutPoint],
    future: &[FutureForecastPoint],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let history_xy: Vec<(f64, f64)> = history.iter().map(|p| (day_x(p.date), p.price)).collect();
    let holdout_xy: Vec<(f64, f64)> = holdout
        .iter()
        .map(|h| (day_x(h.date), h.predicted))
        .collect();
    let future_xy: Vec<(f64, f64)> = future.iter().map(|f| (day_x(f.date), f.price)).collect();

    let Some((x_min, x_max)) = x_range(&[&history_xy, &holdout_xy, &future_xy]) else {
        return "No data to plot.\n".to_string();
    };
    let (y_min, y_max) =
        y_range(&[&history_xy, &holdout_xy, &future_xy]).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // History first, then overlays (so forecast marks win collisions).
    draw_series(&mut grid, &history_xy, '-', true, x_min, x_max, y_min, y_max);
    draw_series(&mut grid, &holdout_xy, 'x', false, x_min, x_max, y_min, y_max);
    draw_series(&mut grid, &future_xy, '+', true, x_min, x_max, y_min, y_max);

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} .. {} | price=[{y_min:.2}, {y_max:.2}] USD/bbl\n",
        date_from_x(x_min),
        date_from_x(x_max),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// Render a plot from a saved forecast JSON file.
pub fn render_forecast_file(file: &ForecastFile, width: usize, height: usize) -> String {
    render_price_plot(file.history.points(), &file.holdout, &file.future, width, height)
}

fn day_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn date_from_x(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn x_range(series: &[&[(f64, f64)]]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for s in series {
        for &(x, _) in *s {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
        }
    }
    (min_x.is_finite() && max_x.is_finite() && max_x > min_x).then_some((min_x, max_x))
}

fn y_range(series: &[&[(f64, f64)]]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for s in series {
        for &(_, y) in *s {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }
    (min_y.is_finite() && max_y.is_finite() && max_y >= min_y).then_some((min_y, max_y))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

#[allow(clippy::too_many_arguments)]
fn draw_series(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    ch: char,
    connect: bool,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev: Option<(usize, usize)> = None;
    for &(x, y) in points {
        let gx = map_x(x, x_min, x_max, width);
        let gy = map_y(y, y_min, y_max, height);
        match prev {
            Some((px, py)) if connect => draw_line(grid, px, py, gx, gy, ch),
            _ => grid[gy][gx] = ch,
        }
        prev = Some((gx, gy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        // Flat history on the left, one forecast mark on the right,
        // everything on the middle row of a 10x5 grid.
        let history = vec![
            PricePoint { date: d(2024, 1, 1), price: 1.0 },
            PricePoint { date: d(2024, 1, 5), price: 1.0 },
        ];
        let future = vec![FutureForecastPoint { date: d(2024, 1, 10), price: 1.0 }];

        let txt = render_price_plot(&history, &[], &future, 10, 5);
        let expected = concat!(
            "Plot: 2024-01-01 .. 2024-01-10 | price=[1.00, 1.00] USD/bbl\n",
            "          \n",
            "          \n",
            "-----    +\n",
            "          \n",
            "          \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_inputs_render_a_notice() {
        let txt = render_price_plot(&[], &[], &[], 40, 10);
        assert_eq!(txt, "No data to plot.\n");
    }
}
