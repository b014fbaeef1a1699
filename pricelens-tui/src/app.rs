//! Application state: single-owner, main-thread only.
//!
//! All widget state lives here. Each change that affects the dashboard calls
//! `request_render`, which snapshots the widgets into a `DashboardInput` and
//! hands it to the worker.

use std::sync::mpsc::{Receiver, Sender};

use chrono::{Duration, NaiveDate};

use pricelens_core::config::DashboardConfig;
use pricelens_core::dashboard::{DashboardInput, DashboardOutput};
use pricelens_core::range::{RangeInput, MAX_LOOKBACK_DAYS, MIN_LOOKBACK_DAYS};

use crate::ui::widgets::RangeSlider;
use crate::worker::{WorkerCommand, WorkerResponse};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which sidebar widget (or the table) receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    StartDate,
    EndDate,
    Lookback,
    Tickers,
    Companies,
    YRange,
    Changes,
    Table,
}

impl Focus {
    pub fn label(self) -> &'static str {
        match self {
            Focus::StartDate => "Start date",
            Focus::EndDate => "End date",
            Focus::Lookback => "Days",
            Focus::Tickers => "Tickers",
            Focus::Companies => "Companies",
            Focus::YRange => "Price range",
            Focus::Changes => "Changes",
            Focus::Table => "Table",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, Focus::StartDate | Focus::EndDate | Focus::Tickers)
    }
}

/// Whether the range comes from two dates or a day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMode {
    Dates,
    Lookback,
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Editable `YYYY-MM-DD` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateField {
    pub text: String,
}

impl DateField {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            text: date.format(DATE_FORMAT).to_string(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.text.trim(), DATE_FORMAT).ok()
    }

    /// Shift a parseable date by `days`. Unparseable text is left alone.
    pub fn shift(&mut self, days: i64) -> bool {
        match self.date() {
            Some(date) => {
                *self = Self::new(date + Duration::days(days));
                true
            }
            None => false,
        }
    }
}

pub struct AppState {
    pub running: bool,
    pub focus: Focus,
    pub range_mode: RangeMode,
    pub start: DateField,
    pub end: DateField,
    pub lookback_days: u32,
    /// Ticker field as typed.
    pub tickers_text: String,
    /// Ticker text as of the last Enter; the only text renders see.
    committed_tickers: String,
    /// `None` until the user toggles a company; then the explicit choice.
    pub selection: Option<Vec<String>>,
    pub company_cursor: usize,
    pub y_range: RangeSlider,
    pub show_changes: bool,
    pub table_scroll: usize,

    /// Latest answered render, if any.
    pub output: Option<DashboardOutput>,
    pub status_message: Option<(String, StatusLevel)>,

    generation: u64,
    answered: u64,
    worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
}

impl AppState {
    pub fn new(
        config: &DashboardConfig,
        today: NaiveDate,
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
    ) -> Self {
        let initial = DashboardInput::from_config(config, today);
        let (start, end) = match initial.range {
            RangeInput::Dates { start, end } => (start, end),
            RangeInput::LookbackDays(days) => (today - Duration::days(i64::from(days)), today),
        };
        Self {
            running: true,
            focus: Focus::Tickers,
            range_mode: RangeMode::Dates,
            start: DateField::new(start),
            end: DateField::new(end),
            lookback_days: config.lookback_days,
            committed_tickers: initial.tickers_text.clone(),
            tickers_text: initial.tickers_text,
            selection: None,
            company_cursor: 0,
            y_range: RangeSlider::new(config.slider_max, initial.y_domain),
            show_changes: false,
            table_scroll: 0,
            output: None,
            status_message: None,
            generation: 0,
            answered: 0,
            worker_tx,
            worker_rx,
        }
    }

    /// Sidebar focus order for the current range mode.
    pub fn focus_order(&self) -> Vec<Focus> {
        let mut order = match self.range_mode {
            RangeMode::Dates => vec![Focus::StartDate, Focus::EndDate],
            RangeMode::Lookback => vec![Focus::Lookback],
        };
        order.extend([
            Focus::Tickers,
            Focus::Companies,
            Focus::YRange,
            Focus::Changes,
            Focus::Table,
        ]);
        order
    }

    pub fn focus_next(&mut self) {
        self.cycle_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.cycle_focus(-1);
    }

    fn cycle_focus(&mut self, step: isize) {
        let order = self.focus_order();
        let len = order.len() as isize;
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        self.focus = order[(current + step).rem_euclid(len) as usize];
    }

    pub fn toggle_range_mode(&mut self) {
        self.range_mode = match self.range_mode {
            RangeMode::Dates => RangeMode::Lookback,
            RangeMode::Lookback => RangeMode::Dates,
        };
        if !self.focus_order().contains(&self.focus) {
            self.focus = self.focus_order()[0];
        }
    }

    pub fn adjust_lookback(&mut self, delta: i32) {
        let days = i64::from(self.lookback_days) + i64::from(delta);
        self.lookback_days =
            days.clamp(i64::from(MIN_LOOKBACK_DAYS), i64::from(MAX_LOOKBACK_DAYS)) as u32;
    }

    /// Names the company list shows: what the last render fetched.
    pub fn available(&self) -> &[String] {
        self.output.as_ref().map(|o| o.available.as_slice()).unwrap_or(&[])
    }

    /// Names currently ticked in the company list.
    pub fn selected_names(&self) -> Vec<String> {
        match &self.selection {
            Some(chosen) => chosen.clone(),
            None => self
                .output
                .as_ref()
                .map(|o| o.selected.clone())
                .unwrap_or_default(),
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected_names().iter().any(|n| n == name)
    }

    /// Tick or untick the company under the cursor, keeping the list order.
    pub fn toggle_company(&mut self) {
        let Some(name) = self.available().get(self.company_cursor).cloned() else {
            return;
        };
        let mut chosen = self.selected_names();
        if let Some(pos) = chosen.iter().position(|n| *n == name) {
            chosen.remove(pos);
        } else {
            chosen.push(name);
            let available = self.available().to_vec();
            chosen.sort_by_key(|n| available.iter().position(|a| a == n));
        }
        self.selection = Some(chosen);
    }

    /// New tickers start over with the default selection.
    pub fn reset_selection(&mut self) {
        self.selection = None;
        self.company_cursor = 0;
    }

    /// Apply the typed ticker text: reset the selection and render.
    pub fn commit_tickers(&mut self) {
        self.committed_tickers = self.tickers_text.clone();
        self.reset_selection();
        self.request_render();
    }

    /// The ticker field holds edits not yet applied with Enter.
    pub fn tickers_pending(&self) -> bool {
        self.tickers_text != self.committed_tickers
    }

    /// Snapshot the widgets. Fails only when a date field does not parse.
    pub fn dashboard_input(&self) -> Result<DashboardInput, String> {
        let range = match self.range_mode {
            RangeMode::Dates => {
                let start = self
                    .start
                    .date()
                    .ok_or_else(|| format!("start date '{}' is not YYYY-MM-DD", self.start.text))?;
                let end = self
                    .end
                    .date()
                    .ok_or_else(|| format!("end date '{}' is not YYYY-MM-DD", self.end.text))?;
                RangeInput::Dates { start, end }
            }
            RangeMode::Lookback => RangeInput::LookbackDays(self.lookback_days),
        };
        Ok(DashboardInput {
            range,
            tickers_text: self.committed_tickers.clone(),
            selection: self.selection.clone(),
            show_changes: self.show_changes,
            y_domain: self.y_range.domain(),
        })
    }

    /// Send the current input to the worker.
    pub fn request_render(&mut self) {
        match self.dashboard_input() {
            Ok(input) => {
                self.generation += 1;
                let cmd = WorkerCommand::Render {
                    generation: self.generation,
                    input,
                };
                if self.worker_tx.send(cmd).is_err() {
                    self.set_error("worker stopped; restart the dashboard");
                }
            }
            Err(msg) => self.set_warning(msg),
        }
    }

    /// Drop every memoized fetch and render again.
    pub fn refetch(&mut self) {
        if self.worker_tx.send(WorkerCommand::ClearCache).is_ok() {
            self.request_render();
        }
    }

    pub fn is_rendering(&self) -> bool {
        self.answered < self.generation
    }

    pub fn handle_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::Rendered { generation, output } => {
                if generation < self.answered {
                    return;
                }
                self.answered = generation;
                let output = *output;
                if let Some(err) = &output.error {
                    self.set_error(err.to_string());
                } else if !output.warnings.is_empty() {
                    self.set_warning(format!("{} symbol(s) failed to fetch", output.warnings.len()));
                } else {
                    self.status_message = None;
                }
                self.output = Some(output);
                let rows = self.table_rows();
                self.table_scroll = self.table_scroll.min(rows.saturating_sub(1));
                self.company_cursor = self
                    .company_cursor
                    .min(self.available().len().saturating_sub(1));
            }
            WorkerResponse::CacheCleared => self.set_status("cache cleared, refetching"),
        }
    }

    pub fn table_rows(&self) -> usize {
        self.output
            .as_ref()
            .and_then(|o| o.table.as_ref())
            .map(|t| t.dates.len())
            .unwrap_or(0)
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use crate::test_helpers::{d, output_with};

    fn app() -> (AppState, Receiver<WorkerCommand>, Sender<WorkerResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let app = AppState::new(&DashboardConfig::default(), d("2024-04-01"), cmd_tx, resp_rx);
        (app, cmd_rx, resp_tx)
    }

    #[test]
    fn initial_input_uses_config() {
        let (app, _rx, _tx) = app();
        let input = app.dashboard_input().unwrap();
        assert_eq!(
            input.range,
            RangeInput::Dates {
                start: d("2024-03-02"),
                end: d("2024-04-01")
            }
        );
        assert_eq!(input.tickers_text, "AAPL, MSFT, GOOGL");
        assert_eq!(input.y_domain.max(), 500.0);
    }

    #[test]
    fn typed_tickers_apply_only_when_committed() {
        let (mut app, rx, _tx) = app();
        app.tickers_text = "TM".into();
        assert!(app.tickers_pending());
        assert_eq!(app.dashboard_input().unwrap().tickers_text, "AAPL, MSFT, GOOGL");

        app.selection = Some(vec!["Apple".into()]);
        app.commit_tickers();
        assert!(!app.tickers_pending());
        assert_eq!(app.selection, None);
        match rx.try_recv().unwrap() {
            WorkerCommand::Render { input, .. } => assert_eq!(input.tickers_text, "TM"),
            other => panic!("expected render, got {other:?}"),
        }
    }

    #[test]
    fn bad_date_text_is_not_sent() {
        let (mut app, rx, _tx) = app();
        app.start.text = "2024-13-01".into();
        app.request_render();
        assert!(rx.try_recv().is_err());
        assert!(matches!(app.status_message, Some((_, StatusLevel::Warning))));
    }

    #[test]
    fn every_request_bumps_generation() {
        let (mut app, rx, _tx) = app();
        app.request_render();
        app.request_render();
        let gens: Vec<u64> = rx
            .try_iter()
            .filter_map(|c| match c {
                WorkerCommand::Render { generation, .. } => Some(generation),
                _ => None,
            })
            .collect();
        assert_eq!(gens, vec![1, 2]);
        assert!(app.is_rendering());
    }

    #[test]
    fn stale_responses_are_dropped() {
        let (mut app, _rx, _tx) = app();
        app.request_render();
        app.request_render();
        app.handle_response(WorkerResponse::Rendered {
            generation: 2,
            output: Box::new(output_with(&["Apple"])),
        });
        app.handle_response(WorkerResponse::Rendered {
            generation: 1,
            output: Box::new(output_with(&["Stale"])),
        });
        assert_eq!(app.available(), &["Apple".to_string()]);
        assert!(!app.is_rendering());
    }

    #[test]
    fn toggling_companies_keeps_list_order() {
        let (mut app, _rx, _tx) = app();
        app.output = Some(output_with(&["Apple", "Microsoft", "Google"]));

        app.company_cursor = 0;
        app.toggle_company();
        assert_eq!(app.selected_names(), vec!["Microsoft", "Google"]);

        app.toggle_company();
        assert_eq!(app.selected_names(), vec!["Apple", "Microsoft", "Google"]);
    }

    #[test]
    fn lookback_is_clamped() {
        let (mut app, _rx, _tx) = app();
        app.adjust_lookback(100);
        assert_eq!(app.lookback_days, 50);
        app.adjust_lookback(-100);
        assert_eq!(app.lookback_days, 1);
    }

    #[test]
    fn range_mode_changes_focus_order() {
        let (mut app, _rx, _tx) = app();
        app.focus = Focus::StartDate;
        app.toggle_range_mode();
        assert_eq!(app.focus, Focus::Lookback);
        assert!(!app.focus_order().contains(&Focus::EndDate));
        assert_eq!(
            app.dashboard_input().unwrap().range,
            RangeInput::LookbackDays(30)
        );
    }

    #[test]
    fn focus_wraps_around() {
        let (mut app, _rx, _tx) = app();
        app.focus = Focus::Table;
        app.focus_next();
        assert_eq!(app.focus, Focus::StartDate);
        app.focus_prev();
        assert_eq!(app.focus, Focus::Table);
    }

    #[test]
    fn date_field_shifts_by_days() {
        let mut field = DateField::new(d("2024-02-28"));
        assert!(field.shift(2));
        assert_eq!(field.text, "2024-03-01");
        field.text = "garbage".into();
        assert!(!field.shift(1));
    }
}
