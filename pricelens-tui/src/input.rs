//! Keyboard input dispatch: global keys → focused widget.
//!
//! Every key that changes a dashboard input ends in `request_render`; keys
//! that only move a cursor or scroll do not.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Focus};

/// Larger jump for PageUp/PageDown on sliders and the table.
const PAGE: i32 = 10;

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Global keys (always available).
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Char('q') if !app.focus.is_text() => {
            app.running = false;
            return;
        }
        KeyCode::Tab => {
            app.focus_next();
            return;
        }
        KeyCode::BackTab => {
            app.focus_prev();
            return;
        }
        KeyCode::F(2) => {
            app.toggle_range_mode();
            app.request_render();
            return;
        }
        KeyCode::F(5) => {
            app.refetch();
            return;
        }
        _ => {}
    }

    // 2. Focused widget.
    match app.focus {
        Focus::StartDate | Focus::EndDate => handle_date_key(app, key),
        Focus::Lookback => handle_lookback_key(app, key),
        Focus::Tickers => handle_tickers_key(app, key),
        Focus::Companies => handle_companies_key(app, key),
        Focus::YRange => handle_y_range_key(app, key),
        Focus::Changes => handle_changes_key(app, key),
        Focus::Table => handle_table_key(app, key),
    }
}

fn handle_date_key(app: &mut AppState, key: KeyEvent) {
    let field = if app.focus == Focus::StartDate {
        &mut app.start
    } else {
        &mut app.end
    };

    let changed = match key.code {
        KeyCode::Up => field.shift(1),
        KeyCode::Down => field.shift(-1),
        KeyCode::PageUp => field.shift(i64::from(PAGE)),
        KeyCode::PageDown => field.shift(-i64::from(PAGE)),
        KeyCode::Backspace => field.text.pop().is_some(),
        KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
            field.text.push(c);
            true
        }
        KeyCode::Enter => {
            // Explicit commit: complain if the text does not parse.
            app.request_render();
            return;
        }
        _ => false,
    };

    // Half-typed dates stay quiet until they parse.
    if changed && field.date().is_some() {
        app.request_render();
    }
}

fn handle_lookback_key(app: &mut AppState, key: KeyEvent) {
    let delta = match key.code {
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Up | KeyCode::Char('k') => 1,
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Down | KeyCode::Char('j') => -1,
        KeyCode::PageUp => PAGE,
        KeyCode::PageDown => -PAGE,
        _ => return,
    };
    let before = app.lookback_days;
    app.adjust_lookback(delta);
    if app.lookback_days != before {
        app.request_render();
    }
}

fn handle_tickers_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.commit_tickers(),
        KeyCode::Backspace => {
            app.tickers_text.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.tickers_text.clear();
        }
        KeyCode::Char(c) => {
            app.tickers_text.push(c);
        }
        _ => {}
    }
}

fn handle_companies_key(app: &mut AppState, key: KeyEvent) {
    let count = app.available().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.company_cursor + 1 < count {
                app.company_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.company_cursor = app.company_cursor.saturating_sub(1);
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            if count > 0 {
                app.toggle_company();
                app.request_render();
            }
        }
        KeyCode::Char('a') => {
            app.selection = None;
            app.request_render();
        }
        _ => {}
    }
}

fn handle_y_range_key(app: &mut AppState, key: KeyEvent) {
    let steps = match key.code {
        KeyCode::Right | KeyCode::Char('l') => 1,
        KeyCode::Left | KeyCode::Char('h') => -1,
        KeyCode::PageUp => PAGE,
        KeyCode::PageDown => -PAGE,
        KeyCode::Char(' ') | KeyCode::Enter => {
            app.y_range.toggle_handle();
            return;
        }
        _ => return,
    };
    let before = app.y_range.domain();
    app.y_range.nudge(steps);
    if app.y_range.domain() != before {
        app.request_render();
    }
}

fn handle_changes_key(app: &mut AppState, key: KeyEvent) {
    if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
        app.show_changes = !app.show_changes;
        app.request_render();
    }
}

fn handle_table_key(app: &mut AppState, key: KeyEvent) {
    let last = app.table_rows().saturating_sub(1);
    app.table_scroll = match key.code {
        KeyCode::Char('j') | KeyCode::Down => (app.table_scroll + 1).min(last),
        KeyCode::Char('k') | KeyCode::Up => app.table_scroll.saturating_sub(1),
        KeyCode::PageDown => (app.table_scroll + PAGE as usize).min(last),
        KeyCode::PageUp => app.table_scroll.saturating_sub(PAGE as usize),
        KeyCode::Home | KeyCode::Char('g') => 0,
        KeyCode::End | KeyCode::Char('G') => last,
        _ => return,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{self, Receiver, Sender};

    use pricelens_core::config::DashboardConfig;
    use pricelens_core::dashboard::DashboardInput;
    use pricelens_core::range::RangeInput;

    use crate::test_helpers::{d, output_with};
    use crate::worker::{WorkerCommand, WorkerResponse};

    fn app() -> (AppState, Receiver<WorkerCommand>, Sender<WorkerResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let app = AppState::new(&DashboardConfig::default(), d("2024-04-01"), cmd_tx, resp_rx);
        (app, cmd_rx, resp_tx)
    }

    fn press(app: &mut AppState, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn renders(rx: &Receiver<WorkerCommand>) -> Vec<DashboardInput> {
        rx.try_iter()
            .filter_map(|c| match c {
                WorkerCommand::Render { input, .. } => Some(input),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn typing_tickers_renders_only_on_enter() {
        let (mut app, rx, _tx) = app();
        app.focus = Focus::Tickers;
        app.tickers_text.clear();
        for c in "tm, aapl".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert!(renders(&rx).is_empty());

        press(&mut app, KeyCode::Enter);
        let sent = renders(&rx);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].tickers_text, "tm, aapl");
    }

    #[test]
    fn q_types_in_text_fields_but_quits_elsewhere() {
        let (mut app, _rx, _tx) = app();
        app.focus = Focus::Tickers;
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        assert!(app.tickers_text.ends_with('q'));

        app.focus = Focus::Changes;
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn date_arrows_shift_and_render() {
        let (mut app, rx, _tx) = app();
        app.focus = Focus::EndDate;
        press(&mut app, KeyCode::Down);
        let sent = renders(&rx);
        assert_eq!(
            sent[0].range,
            RangeInput::Dates {
                start: d("2024-03-02"),
                end: d("2024-03-31")
            }
        );
    }

    #[test]
    fn half_typed_date_waits() {
        let (mut app, rx, _tx) = app();
        app.focus = Focus::StartDate;
        for _ in 0..10 {
            press(&mut app, KeyCode::Backspace);
        }
        for c in "2024-03".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert!(renders(&rx).is_empty());
        for c in "-05".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        let sent = renders(&rx);
        assert_eq!(sent.len(), 1);
    }

    #[test]
    fn f2_switches_to_lookback() {
        let (mut app, rx, _tx) = app();
        press(&mut app, KeyCode::F(2));
        app.focus = Focus::Lookback;
        press(&mut app, KeyCode::Left);
        let sent = renders(&rx);
        assert_eq!(sent.last().unwrap().range, RangeInput::LookbackDays(29));
    }

    #[test]
    fn y_range_arrows_move_active_handle() {
        let (mut app, rx, _tx) = app();
        app.focus = Focus::YRange;
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::PageUp);
        let sent = renders(&rx);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].y_domain.max(), 600.0);
    }

    #[test]
    fn space_toggles_changes_and_companies() {
        let (mut app, rx, _tx) = app();
        app.output = Some(output_with(&["Apple", "Microsoft"]));

        app.focus = Focus::Changes;
        press(&mut app, KeyCode::Char(' '));
        app.focus = Focus::Companies;
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));

        let sent = renders(&rx);
        assert!(sent[0].show_changes);
        assert_eq!(sent[1].selection, Some(vec!["Apple".to_string()]));
    }

    #[test]
    fn uncommitted_tickers_stay_out_of_other_renders() {
        let (mut app, rx, _tx) = app();
        app.output = Some(output_with(&["Apple", "Microsoft"]));

        // explicit selection, then half-typed tickers that share no names
        app.focus = Focus::Companies;
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        app.focus = Focus::Tickers;
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        for c in "TSLA".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert!(app.tickers_pending());

        app.focus = Focus::Changes;
        press(&mut app, KeyCode::Char(' '));

        let sent = renders(&rx);
        assert_eq!(sent.len(), 2);
        let last = &sent[1];
        assert_eq!(last.tickers_text, "AAPL, MSFT, GOOGL");
        assert_eq!(last.selection, Some(vec!["Apple".to_string()]));
        assert!(last.show_changes);

        app.focus = Focus::Tickers;
        press(&mut app, KeyCode::Enter);
        let sent = renders(&rx);
        assert_eq!(sent[0].tickers_text, "TSLA");
        assert_eq!(sent[0].selection, None);
        assert!(!app.tickers_pending());
    }

    #[test]
    fn table_scroll_is_bounded() {
        let (mut app, _rx, _tx) = app();
        app.output = Some(output_with(&["Apple"]));
        app.focus = Focus::Table;
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.table_scroll, 2);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.table_scroll, 0);
    }
}
