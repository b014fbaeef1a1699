//! Sidebar: range inputs, ticker text, company multi-select, y-range slider,
//! change toggle. The focused widget gets the accent border.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, Focus, RangeMode};
use crate::theme;
use crate::ui::widgets::{Handle, RangeSliderView};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut constraints: Vec<Constraint> = match app.range_mode {
        RangeMode::Dates => vec![Constraint::Length(3), Constraint::Length(3)],
        RangeMode::Lookback => vec![Constraint::Length(3)],
    };
    constraints.extend([
        Constraint::Length(3), // tickers
        Constraint::Min(4),    // companies
        Constraint::Length(4), // y range
        Constraint::Length(3), // changes
    ]);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut next = 0;
    match app.range_mode {
        RangeMode::Dates => {
            render_text(f, chunks[0], app, Focus::StartDate, &app.start.text, date_style(app.start.date().is_none()));
            render_text(f, chunks[1], app, Focus::EndDate, &app.end.text, date_style(app.end.date().is_none()));
            next += 2;
        }
        RangeMode::Lookback => {
            render_lookback(f, chunks[0], app);
            next += 1;
        }
    }
    // uncommitted edits stand out until Enter
    let tickers_style = if app.tickers_pending() { theme::warning() } else { theme::text() };
    render_text(f, chunks[next], app, Focus::Tickers, &app.tickers_text, tickers_style);
    render_companies(f, chunks[next + 1], app);
    render_y_range(f, chunks[next + 2], app);
    render_changes(f, chunks[next + 3], app);
}

fn block(app: &AppState, focus: Focus, hint: &str) -> Block<'static> {
    let focused = app.focus == focus;
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(focused))
        .title(format!(" {} ", focus.label()))
        .title_style(theme::panel_title(focused));
    if focused && !hint.is_empty() {
        block = block.title_bottom(Line::from(Span::styled(format!(" {hint} "), theme::muted())));
    }
    block
}

fn date_style(invalid: bool) -> Style {
    if invalid {
        theme::negative()
    } else {
        theme::text()
    }
}

fn render_text(f: &mut Frame, area: Rect, app: &AppState, focus: Focus, text: &str, style: Style) {
    let hint = match focus {
        Focus::Tickers => "Enter: load",
        _ => "↑/↓: ±1 day",
    };
    let cursor = if app.focus == focus { "▏" } else { "" };
    let para = Paragraph::new(Line::from(vec![
        Span::styled(text.to_string(), style),
        Span::styled(cursor, theme::accent()),
    ]))
    .block(block(app, focus, hint));
    f.render_widget(para, area);
}

fn render_lookback(f: &mut Frame, area: Rect, app: &AppState) {
    let para = Paragraph::new(Line::from(vec![
        Span::styled(format!("{}", app.lookback_days), theme::accent()),
        Span::styled(" days back from today", theme::muted()),
    ]))
    .block(block(app, Focus::Lookback, "←/→: ±1"));
    f.render_widget(para, area);
}

fn render_companies(f: &mut Frame, area: Rect, app: &AppState) {
    if app.available().is_empty() {
        let para = Paragraph::new(Span::styled("no data loaded", theme::muted()))
            .block(block(app, Focus::Companies, ""));
        f.render_widget(para, area);
        return;
    }

    let selected = app.selected_names();
    let items: Vec<ListItem> = app
        .available()
        .iter()
        .map(|name| {
            let (mark, style) = if selected.iter().any(|s| s == name) {
                ("[x] ", theme::text())
            } else {
                ("[ ] ", theme::muted())
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, theme::accent()),
                Span::styled(name.clone(), style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block(app, Focus::Companies, "Space: toggle  a: all"))
        .highlight_style(theme::panel_title(true));

    let mut state = ListState::default();
    if app.focus == Focus::Companies {
        state.select(Some(app.company_cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn render_y_range(f: &mut Frame, area: Rect, app: &AppState) {
    let outer = block(app, Focus::YRange, "←/→: move  Space: handle");
    let inner = outer.inner(area);
    f.render_widget(outer, area);
    if inner.height == 0 {
        return;
    }

    let slider = &app.y_range;
    let marker = |handle: Handle| if slider.active == handle { theme::accent() } else { theme::text() };
    let label = Line::from(vec![
        Span::styled(format!("{:.0}", slider.low()), marker(Handle::Low)),
        Span::styled(" to ", theme::muted()),
        Span::styled(format!("{:.0}", slider.high()), marker(Handle::High)),
        Span::styled(format!("  of {:.0}", slider.max()), theme::muted()),
    ]);
    f.render_widget(Paragraph::new(label), Rect { height: 1, ..inner });

    if inner.height > 1 {
        let track = Rect {
            y: inner.y + 1,
            height: 1,
            ..inner
        };
        let view = RangeSliderView::new(slider)
            .track_style(theme::muted())
            .span_style(theme::accent())
            .handle_style(theme::text())
            .active_handle_style(theme::warning());
        f.render_widget(view, track);
    }
}

fn render_changes(f: &mut Frame, area: Rect, app: &AppState) {
    let (mark, text) = if app.show_changes {
        ("[x] ", "showing day-over-day change")
    } else {
        ("[ ] ", "show day-over-day change")
    };
    let para = Paragraph::new(Line::from(vec![
        Span::styled(mark, theme::accent()),
        Span::styled(text, theme::text()),
    ]))
    .block(block(app, Focus::Changes, "Space: toggle"));
    f.render_widget(para, area);
}
