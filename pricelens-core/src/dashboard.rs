//! The dashboard as a pure function of its inputs.
//!
//! Both front ends build a `DashboardInput` from their widgets or flags and
//! call [`render`] on every change. The only state carried between calls is
//! the fetch cache inside `RenderContext`.

use crate::chart::{render_chart, ChartSpec, YDomain};
use crate::config::DashboardConfig;
use crate::data::fetch::FetchWarning;
use crate::data::memo::FetchCache;
use crate::data::merge::MergedTable;
use crate::data::provider::DataProvider;
use crate::range::{RangeError, RangeInput};
use crate::shape::{project, Selection, SelectionError, WideTable};
use crate::ticker::NameTable;
use anyhow::{ensure, Context};
use chrono::{Duration, NaiveDate};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, error};

/// Y-axis title of the price chart.
pub const PRICE_AXIS_TITLE: &str = "Stock Prices (USD)";

/// Blocking conditions shown to the user in place of the table and chart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("{0}")]
    InvalidRange(#[from] RangeError),

    #[error("enter at least one ticker symbol")]
    NoTickers,

    #[error("no data could be fetched for the given tickers and dates")]
    NoData,

    #[error("{0}")]
    EmptySelection(#[from] SelectionError),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        UserError::Unexpected(format!("{err:#}"))
    }
}

/// Everything the user can change.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardInput {
    pub range: RangeInput,
    pub tickers_text: String,
    /// `None` selects every resolved name that was fetched.
    pub selection: Option<Vec<String>>,
    pub show_changes: bool,
    pub y_domain: YDomain,
}

impl DashboardInput {
    /// Initial input: the configured tickers over the configured look-back
    /// window ending `today`, as an explicit date range.
    pub fn from_config(config: &DashboardConfig, today: NaiveDate) -> Self {
        Self {
            range: RangeInput::Dates {
                start: today - Duration::days(i64::from(config.lookback_days)),
                end: today,
            },
            tickers_text: config.default_tickers.clone(),
            selection: None,
            show_changes: false,
            y_domain: config.y_domain(),
        }
    }
}

/// Collaborators of a render call.
pub struct RenderContext<'a> {
    pub provider: &'a dyn DataProvider,
    pub cache: &'a mut FetchCache,
    pub names: &'a NameTable,
    pub today: NaiveDate,
}

/// What the front end shows. `error` set means table and chart are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardOutput {
    /// "Past N days", absent when the range is invalid.
    pub heading: Option<String>,
    pub warnings: Vec<FetchWarning>,
    /// Display names present in the merged table.
    pub available: Vec<String>,
    pub selected: Vec<String>,
    pub table: Option<WideTable>,
    pub chart: Option<ChartSpec>,
    pub error: Option<UserError>,
}

/// Run the whole pipeline for one input.
///
/// Never panics and never fails: every problem ends up in
/// `DashboardOutput::error`, with whatever was computed before it (heading,
/// warnings, available names) still filled in.
pub fn render(input: &DashboardInput, ctx: &mut RenderContext<'_>) -> DashboardOutput {
    let mut output = DashboardOutput::default();
    let result = panic::catch_unwind(AssertUnwindSafe(|| run(input, ctx, &mut output)));

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            debug!(error = %e, "render blocked");
            output.table = None;
            output.chart = None;
            output.error = Some(e);
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "render panicked".to_string());
            error!(%message, "render panicked");
            output.table = None;
            output.chart = None;
            output.error = Some(UserError::Unexpected(message));
        }
    }
    output
}

fn run(
    input: &DashboardInput,
    ctx: &mut RenderContext<'_>,
    output: &mut DashboardOutput,
) -> Result<(), UserError> {
    let range = input.range.resolve(ctx.today)?;
    output.heading = Some(format!("Past {} days", range.days()));

    let tickers = ctx.names.resolve_input(&input.tickers_text);
    if tickers.is_empty() {
        return Err(UserError::NoTickers);
    }

    let fetched = ctx.cache.get_or_fetch(ctx.provider, range, &tickers);
    output.warnings = fetched.warnings.clone();
    if fetched.table.is_empty() {
        return Err(UserError::NoData);
    }
    output.available = fetched.table.column_names();

    let selection = match &input.selection {
        Some(chosen) => Selection::new(chosen, &output.available)?,
        // every fetched column, including disambiguated duplicates
        None => Selection::new(&output.available, &output.available)?,
    };
    output.selected = selection.names().to_vec();

    let (table, chart) = shape_view(&fetched.table, &selection, input)?;
    output.table = Some(table);
    output.chart = Some(chart);
    Ok(())
}

fn shape_view(
    merged: &MergedTable,
    selection: &Selection,
    input: &DashboardInput,
) -> anyhow::Result<(WideTable, ChartSpec)> {
    let mut wide = project(merged, selection);
    ensure!(
        wide.columns.len() == selection.names().len(),
        "projection lost columns: selected {:?}, got {:?}",
        selection.names(),
        wide.column_names()
    );
    if input.show_changes {
        wide = wide.with_changes();
    }
    let wide = wide.forward_filled();

    let tidy = wide.melt();
    let chart = render_chart(&tidy, input.y_domain, PRICE_AXIS_TITLE);
    chart.date_bounds().context("chart has no dates")?;
    Ok((wide, chart))
}
