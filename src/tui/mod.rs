//! Ratatui-based terminal dashboard.
//!
//! A sidebar lists the pages; the body shows the selected page's charts one at
//! a time (tabs), drawn with Plotters. Data is loaded once before the terminal
//! is taken over, so load errors print like any other command's.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use tracing::{info, warn};

use crate::app::pipeline::{self, RunOutput};
use crate::dashboard::{ChartData, ChartView, Page};
use crate::domain::DashboardConfig;
use crate::error::AppError;
use crate::io::views::{ViewsFile, write_views_json};

mod plotters_chart;

use plotters_chart::{BarLayout, BarsChart, BoxesChart, series_color};

/// Where `e` writes the current views.
const VIEWS_EXPORT_PATH: &str = "bikes-views.json";

/// Start the TUI.
pub fn run(config: &DashboardConfig, start_page: Option<Page>) -> Result<(), AppError> {
    let run = pipeline::run_dashboard(config)?;
    info!(pages = run.pages.len(), "Dashboard ready");

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config.clone(), run, start_page);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
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
    config: DashboardConfig,
    run: RunOutput,
    page: usize,
    chart: usize,
    status: String,
}

impl App {
    fn new(config: DashboardConfig, run: RunOutput, start_page: Option<Page>) -> Self {
        let rows: usize = run.data.reports.iter().map(|r| r.rows_used).sum();
        Self {
            config,
            run,
            page: start_page.map(Page::index).unwrap_or(0),
            chart: 0,
            status: format!("{rows} rows loaded"),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
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

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let pages = self.run.pages.len();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_page(step(self.page, pages, -1));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_page(step(self.page, pages, 1));
            }
            KeyCode::Char(c @ '1'..='9') => {
                let i = c as usize - '1' as usize;
                if i < pages {
                    self.select_page(i);
                }
            }
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => {
                self.chart = step(self.chart, self.chart_count(), -1);
            }
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => {
                self.chart = step(self.chart, self.chart_count(), 1);
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('e') => self.export_views(PathBuf::from(VIEWS_EXPORT_PATH)),
            _ => {}
        }
        false
    }

    fn select_page(&mut self, page: usize) {
        if page != self.page {
            self.page = page;
            self.chart = 0;
        }
    }

    fn chart_count(&self) -> usize {
        self.run.pages.get(self.page).map(|p| p.charts.len()).unwrap_or(0)
    }

    fn current_chart(&self) -> Option<&ChartView> {
        self.run.pages.get(self.page)?.charts.get(self.chart)
    }

    fn reload(&mut self) {
        match pipeline::run_dashboard(&self.config) {
            Ok(run) => {
                self.run = run;
                self.chart = self.chart.min(self.chart_count().saturating_sub(1));
                self.status = "Reloaded datasets.".to_string();
            }
            Err(err) => {
                warn!(error = %err, "Reload failed");
                self.status = format!("Reload failed: {err}");
            }
        }
    }

    fn export_views(&mut self, path: PathBuf) {
        let views = ViewsFile::new(self.run.pages.clone(), self.config.bin_count);
        self.status = match write_views_json(&path, &views) {
            Ok(()) => format!("Wrote views: {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(0)])
            .split(rows[1]);

        self.draw_header(frame, rows[0]);
        self.draw_sidebar(frame, cols[0]);
        self.draw_body(frame, cols[1]);
        self.draw_footer(frame, rows[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines = vec![Line::from(vec![
            Span::styled("bikes", Style::default().fg(Color::Cyan)),
            Span::raw(" - Bike Sharing Dashboard"),
        ])];
        let sources: Vec<String> = self
            .run
            .data
            .reports
            .iter()
            .map(|r| {
                format!(
                    "{}: {} rows ({} skipped)",
                    r.granularity.display_name(),
                    r.rows_used,
                    r.row_errors.len()
                )
            })
            .collect();
        lines.push(Line::from(Span::styled(
            format!("{} | bins: {}", sources.join(" | "), self.config.bin_count),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_sidebar(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .run
            .pages
            .iter()
            .enumerate()
            .map(|(i, p)| ListItem::new(format!("{} {}", i + 1, p.title)))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Pages").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.page));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(page) = self.run.pages.get(self.page) else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let question = Paragraph::new(page.question.as_str())
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: true });
        frame.render_widget(question, chunks[0]);

        let titles: Vec<Line> = page.charts.iter().map(|c| Line::from(c.id.as_str())).collect();
        let tabs = Tabs::new(titles)
            .select(self.chart)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, chunks[1]);

        let Some(chart) = self.current_chart() else {
            return;
        };
        self.draw_chart(frame, chunks[2], chunks[3], chart);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, legend_area: Rect, chart: &ChartView) {
        let block = Block::default().title(chart.title.as_str()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if chart.data.is_empty() {
            let msg = Paragraph::new("No rows for this chart.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        match &chart.data {
            ChartData::Bars(result) => {
                let layout = BarLayout::from_result(result);
                frame.render_widget(Paragraph::new(legend(&layout.series)), legend_area);
                let widget = BarsChart {
                    layout: &layout,
                    x_label: &chart.x_label,
                    y_label: &chart.y_label,
                };
                frame.render_widget(widget, inner);
            }
            ChartData::Boxes(boxes) => {
                let labels: Vec<String> = boxes.iter().map(|b| b.key.to_string()).collect();
                frame.render_widget(Paragraph::new(legend(&labels)), legend_area);
                let widget = BoxesChart {
                    boxes,
                    x_label: &chart.x_label,
                    y_label: &chart.y_label,
                };
                frame.render_widget(widget, inner);
            }
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ page  ←/→ chart  1-4 jump  r reload  e export views  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(self.status.as_str(), Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Coloured legend entries matching the chart's series palette.
fn legend(labels: &[String]) -> Line<'static> {
    let mut spans = Vec::with_capacity(labels.len() * 2);
    for (i, label) in labels.iter().enumerate() {
        let (r, g, b) = series_color(i);
        spans.push(Span::styled("■ ", Style::default().fg(Color::Rgb(r, g, b))));
        spans.push(Span::raw(format!("{label}  ")));
    }
    Line::from(spans)
}

/// Move `cur` by `delta` within `0..len`, wrapping at both ends.
fn step(cur: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    (cur as isize + delta).rem_euclid(len as isize) as usize
}
