//! Top-level UI layout: sidebar of inputs, heading, table above chart,
//! status bar.

pub mod chart_panel;
pub mod sidebar;
pub mod status_bar;
pub mod table_panel;
pub mod widgets;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

const SIDEBAR_WIDTH: u16 = 36;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(rows[0]);

    sidebar::render(f, columns[0], app);
    draw_main(f, columns[1], app);
    status_bar::render(f, rows[1], app);
}

fn draw_main(f: &mut Frame, area: Rect, app: &AppState) {
    let notices = notice_lines(app);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(notices.len() as u16),
            Constraint::Percentage(40),
            Constraint::Min(8),
        ])
        .split(area);

    f.render_widget(Paragraph::new(notices).wrap(Wrap { trim: true }), chunks[0]);
    table_panel::render(f, chunks[1], app);
    chart_panel::render(f, chunks[2], app);
}

/// Heading, per-symbol warnings, and the blocking error, one line each.
pub fn notice_lines(app: &AppState) -> Vec<Line<'static>> {
    let Some(output) = &app.output else {
        let text = if app.is_rendering() {
            "Fetching prices..."
        } else {
            "Press Enter in Tickers to load prices."
        };
        return vec![Line::from(Span::styled(text, theme::muted()))];
    };

    let mut lines = Vec::new();
    if let Some(heading) = &output.heading {
        lines.push(Line::from(Span::styled(
            format!("Stock prices: {heading}"),
            theme::heading(),
        )));
    }
    for warning in &output.warnings {
        lines.push(Line::from(Span::styled(warning.to_string(), theme::warning())));
    }
    if let Some(err) = &output.error {
        lines.push(Line::from(Span::styled(err.to_string(), theme::negative())));
    }
    lines
}
