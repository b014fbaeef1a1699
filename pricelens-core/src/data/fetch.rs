//! Multi-symbol close-price fetch with per-symbol failure isolation.

use super::provider::{DataError, DataProvider, RawBar};
use crate::range::DateRange;
use crate::ticker::{Ticker, TickerMap};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Daily closing prices for one symbol, sorted by date, one point per date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub name: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl PriceSeries {
    /// Keep each bar's close, dropping NaN closes. When a date repeats, the
    /// later bar wins.
    pub fn from_bars(ticker: &Ticker, mut bars: Vec<RawBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        let mut points: Vec<(NaiveDate, f64)> = Vec::with_capacity(bars.len());
        for bar in bars.into_iter().filter(|b| b.close.is_finite()) {
            match points.last_mut() {
                Some(last) if last.0 == bar.date => last.1 = bar.close,
                _ => points.push((bar.date, bar.close)),
            }
        }
        Self {
            symbol: ticker.symbol.clone(),
            name: ticker.name.clone(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Outcome of fetching one symbol.
#[derive(Debug)]
pub enum SymbolFetch {
    Fetched(PriceSeries),
    Failed {
        symbol: String,
        name: String,
        reason: DataError,
    },
}

/// Non-fatal warning shown to the user for a symbol that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchWarning {
    pub symbol: String,
    pub name: String,
    pub message: String,
}

impl fmt::Display for FetchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error while fetching {}: {}", self.name, self.message)
    }
}

/// Successfully fetched series plus the subset of the ticker map they cover.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub series: Vec<PriceSeries>,
    pub succeeded: TickerMap,
    pub warnings: Vec<FetchWarning>,
}

/// Fetch one symbol. Every provider error becomes `SymbolFetch::Failed`;
/// a panicking provider is left to `dashboard::render` to contain.
pub fn fetch_symbol(provider: &dyn DataProvider, range: DateRange, ticker: &Ticker) -> SymbolFetch {
    let failed = |reason| SymbolFetch::Failed {
        symbol: ticker.symbol.clone(),
        name: ticker.name.clone(),
        reason,
    };

    match provider.fetch(&ticker.symbol, range.start(), range.end()) {
        Ok(result) => {
            let series = PriceSeries::from_bars(ticker, result.bars);
            if series.is_empty() {
                failed(DataError::EmptyHistory {
                    symbol: ticker.symbol.clone(),
                })
            } else {
                SymbolFetch::Fetched(series)
            }
        }
        Err(e) => failed(e),
    }
}

/// Fetch every ticker independently over `range`.
///
/// Symbols are fetched in parallel; results keep the input order. A failed
/// symbol is logged, reported as a warning, and left out of the outcome; it
/// never affects its siblings.
pub fn fetch_closes(
    provider: &dyn DataProvider,
    range: DateRange,
    tickers: &TickerMap,
) -> FetchOutcome {
    let tickers: Vec<&Ticker> = tickers.iter().collect();
    let results: Vec<SymbolFetch> = tickers
        .into_par_iter()
        .map(|ticker| fetch_symbol(provider, range, ticker))
        .collect();

    let mut outcome = FetchOutcome::default();
    for result in results {
        match result {
            SymbolFetch::Fetched(series) => {
                info!(
                    symbol = %series.symbol,
                    points = series.points.len(),
                    provider = provider.name(),
                    "fetched closes"
                );
                outcome.succeeded.push(series.symbol.clone(), series.name.clone());
                outcome.series.push(series);
            }
            SymbolFetch::Failed {
                symbol,
                name,
                reason,
            } => {
                warn!(%symbol, %name, error = %reason, "fetch failed, skipping symbol");
                outcome.warnings.push(FetchWarning {
                    symbol,
                    name,
                    message: reason.to_string(),
                });
            }
        }
    }
    outcome
}
