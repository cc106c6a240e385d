//! Ratatui-based terminal dashboard.
//!
//! The TUI renders the cleaned price series with the holdout and forecast
//! overlays, a per-year statistics panel, and keys for cycling the year
//! window, switching granularity, refetching, and refitting.

use std::io;
use std::time::Duration;

use chrono::Datelike;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{self, RunOutput};
use crate::domain::{CleanOutcome, ForecastConfig, PricePoint};
use crate::error::AppError;
use crate::report::{YearStats, compute_year_stats};

mod plotters_chart;

use plotters_chart::PricePlottersChart;

/// Start the TUI.
pub fn run(config: ForecastConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: ForecastConfig,
    clean: Option<CleanOutcome>,
    run: Option<RunOutput>,
    year_stats: Vec<YearStats>,
    /// `None` shows the full window; `Some(year)` restricts the chart.
    year_filter: Option<i32>,
    status: String,
}

impl App {
    fn new(config: ForecastConfig) -> Self {
        let mut app = Self {
            config,
            clean: None,
            run: None,
            year_stats: Vec::new(),
            year_filter: None,
            status: "Fetching EIA data...".to_string(),
        };
        // A failed fetch degrades to an empty dashboard with the error in the
        // status line; the user can retry with 'r' or switch to offline mode.
        app.refresh_series();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Left => self.cycle_year(-1),
            KeyCode::Right => self.cycle_year(1),
            KeyCode::Char('r') => {
                self.status = if self.config.offline {
                    "Resampling offline series...".to_string()
                } else {
                    "Fetching EIA data...".to_string()
                };
                self.refresh_series();
            }
            KeyCode::Char('f') => self.refit(),
            KeyCode::Char('g') => {
                self.config.granularity = self.config.granularity.next();
                self.status = format!("granularity: {}", self.config.granularity.display_name());
                self.refresh_series();
            }
            KeyCode::Char('o') => {
                self.config.offline = !self.config.offline;
                self.status = if self.config.offline {
                    format!("offline sample (seed {})", self.config.sample_seed)
                } else {
                    "live EIA data".to_string()
                };
                self.refresh_series();
            }
            KeyCode::Char('s') => {
                if self.config.offline {
                    self.config.sample_seed = self.config.sample_seed.wrapping_add(1);
                    self.status = format!("offline sample (seed {})", self.config.sample_seed);
                    self.refresh_series();
                } else {
                    self.status = "Seed only applies to offline mode (press 'o').".to_string();
                }
            }
            KeyCode::Char('d') => {
                if let Some(clean) = &self.clean {
                    let forecast = self.run.as_ref().map(|r| &r.forecast);
                    match crate::debug::write_debug_bundle(clean, forecast, &self.config) {
                        Ok(path) => self.status = format!("Wrote debug bundle: {}", path.display()),
                        Err(err) => self.status = format!("Debug write failed: {err}"),
                    }
                } else {
                    self.status = "No data loaded.".to_string();
                }
            }
            _ => {}
        }

        false
    }

    fn cycle_year(&mut self, delta: i32) {
        let Some(clean) = &self.clean else { return };
        let years = clean.series.years();
        if years.is_empty() {
            return;
        }

        // Cycle through: all -> first year -> ... -> last year -> all.
        let positions: Vec<Option<i32>> = std::iter::once(None)
            .chain(years.iter().copied().map(Some))
            .collect();
        let current = positions
            .iter()
            .position(|p| *p == self.year_filter)
            .unwrap_or(0);
        let next = (current as i32 + delta).rem_euclid(positions.len() as i32) as usize;
        self.year_filter = positions[next];

        self.status = match self.year_filter {
            Some(year) => format!("year: {year}"),
            None => "year: all".to_string(),
        };
    }

    fn refresh_series(&mut self) {
        match pipeline::fetch_clean_series(&self.config) {
            Ok(clean) => {
                self.year_stats = compute_year_stats(&clean.series);
                self.year_filter = None;
                self.clean = Some(clean);
                self.status = "Loaded.".to_string();
                self.refit();
            }
            Err(err) => {
                self.clean = None;
                self.run = None;
                self.year_stats.clear();
                self.status = format!("{err} (no data for requested window)");
            }
        }
    }

    fn refit(&mut self) {
        let Some(clean) = self.clean.clone() else {
            self.status = "No data loaded.".to_string();
            return;
        };

        match pipeline::run_forecast_with_series(&self.config, clean) {
            Ok(run) => {
                self.status = format!(
                    "Fit: rmse={:.3} over {} holdout rows.",
                    run.forecast.metrics.rmse, run.forecast.metrics.n
                );
                self.run = Some(run);
            }
            Err(err) => {
                self.run = None;
                self.status = format!("Fit failed: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("brent", Style::default().fg(Color::Cyan)),
            Span::raw(" — Brent spot prices & 90-day forecast (EIA)"),
        ]));

        let source = if self.config.offline {
            format!("offline seed {}", self.config.sample_seed)
        } else {
            "live".to_string()
        };
        let n = self.clean.as_ref().map(|c| c.series.len()).unwrap_or(0);
        let dropped = self.clean.as_ref().map(|c| c.dropped()).unwrap_or(0);
        let year = match self.year_filter {
            Some(year) => year.to_string(),
            None => "all".to_string(),
        };

        lines.push(Line::from(Span::styled(
            format!(
                "window: {} .. {} ({}) | source: {source} | n={n} dropped={dropped} | year: {year}",
                self.config.start,
                self.config.end,
                self.config.granularity.display_name(),
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(run) = &self.run {
            let baseline = run
                .forecast
                .baseline_metrics
                .map(|m| format!(" | baseline rmse={:.3}", m.rmse))
                .unwrap_or_default();
            lines.push(Line::from(Span::styled(
                format!(
                    "lags={} trees={} eta={:.2} | holdout rmse={:.3} mae={:.3}{baseline}",
                    run.forecast.lag_depth,
                    run.forecast.params.n_estimators,
                    run.forecast.params.learning_rate,
                    run.forecast.metrics.rmse,
                    run.forecast.metrics.mae,
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_side_panel(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.year_filter {
            Some(year) => format!("Prices {year}"),
            None => "Prices & Forecast".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(clean) = &self.clean else {
            let msg = Paragraph::new("No data. 'r' retries the fetch, 'o' switches to offline mode.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let Some(series) = chart_series(clean, self.run.as_ref(), self.year_filter) else {
            let msg = Paragraph::new("Nothing to chart for this window.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = PricePlottersChart {
            history: &series.history,
            holdout: &series.holdout,
            future: &series.future,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "date",
            y_label: "USD/bbl".to_string(),
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_price,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, series.x_bounds, series.y_bounds);
        }
    }

    fn draw_side_panel(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(9)])
            .split(area);

        self.draw_year_stats(frame, chunks[0]);
        self.draw_forecast_head(frame, chunks[1]);
    }

    fn draw_year_stats(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = Vec::new();
        items.push(ListItem::new("year    min     max    mean"));
        for y in &self.year_stats {
            let selected = self.year_filter == Some(y.year);
            let style = if selected {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default()
            };
            items.push(
                ListItem::new(format!(
                    "{:<6}{:>6.2}{:>8.2}{:>8.2}",
                    y.year, y.min, y.max, y.mean
                ))
                .style(style),
            );
        }
        if self.year_stats.is_empty() {
            items.push(ListItem::new("(no data)"));
        }

        let list =
            List::new(items).block(Block::default().title("Yearly").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_forecast_head(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = Vec::new();
        if let Some(run) = &self.run {
            for f in run.forecast.future.iter().take(5) {
                items.push(ListItem::new(format!("{}  {:>8.2}", f.date, f.price)));
            }
            if let Some(last) = run.forecast.future.last() {
                items.push(ListItem::new(format!("{}  {:>8.2} (end)", last.date, last.price)));
            }
        } else {
            items.push(ListItem::new("(no forecast)"));
        }

        let list =
            List::new(items).block(Block::default().title("Forecast").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ year  r refresh  f refit  g granularity  o offline  s seed  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

struct ChartSeries {
    history: Vec<(f64, f64)>,
    holdout: Vec<(f64, f64)>,
    future: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series for Plotters.
///
/// With a year filter, the chart shows only that calendar year of history;
/// the forecast overlays are included only in the unfiltered view, where they
/// extend the x-range past the last observation.
fn chart_series(
    clean: &CleanOutcome,
    run: Option<&RunOutput>,
    year_filter: Option<i32>,
) -> Option<ChartSeries> {
    let day_x = |date: chrono::NaiveDate| date.num_days_from_ce() as f64;

    let window: Vec<PricePoint> = match year_filter {
        Some(year) => clean.series.year_window(year),
        None => clean.series.points().to_vec(),
    };
    let history: Vec<(f64, f64)> = window.iter().map(|p| (day_x(p.date), p.price)).collect();

    let (holdout, future) = match (run, year_filter) {
        (Some(run), None) => (
            run.forecast
                .holdout
                .iter()
                .map(|h| (day_x(h.date), h.predicted))
                .collect(),
            run.forecast
                .future
                .iter()
                .map(|f| (day_x(f.date), f.price))
                .collect(),
        ),
        (Some(run), Some(year)) => (
            run.forecast
                .holdout
                .iter()
                .filter(|h| h.date.year() == year)
                .map(|h| (day_x(h.date), h.predicted))
                .collect(),
            Vec::new(),
        ),
        (None, _) => (Vec::new(), Vec::new()),
    };

    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for &(x, y) in history.iter().chain(&holdout).chain(&future) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !(x_min.is_finite() && x_max.is_finite() && x_max > x_min) {
        return None;
    }
    if !(y_min.is_finite() && y_max.is_finite()) {
        return None;
    }
    if y_max <= y_min {
        y_min -= 0.5;
        y_max += 0.5;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    Some(ChartSeries {
        history,
        holdout,
        future,
        x_bounds: [x_min, x_max],
        y_bounds: [y_min - pad, y_max + pad],
    })
}

fn fmt_axis_date(v: f64) -> String {
    chrono::NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn fmt_axis_price(v: f64) -> String {
    format!("{v:.0}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_date(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_price(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("date")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("USD/bbl")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
