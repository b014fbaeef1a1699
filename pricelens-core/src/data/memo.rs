//! Session-scoped memo of fetch results.
//!
//! Keyed on the date range and the full resolved ticker map, so changing
//! either triggers a new fetch while repeated renders with the same inputs
//! (selection, y-range, change toggle) are served from memory.

use super::fetch::{fetch_closes, FetchWarning};
use super::merge::{merge_series, MergedTable};
use super::provider::DataProvider;
use crate::range::DateRange;
use crate::ticker::TickerMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub range: DateRange,
    pub tickers: TickerMap,
}

/// Everything a fetch produced: the merged table, the tickers that made it
/// in, and the warnings for those that did not.
#[derive(Debug, Default)]
pub struct FetchedTable {
    pub table: MergedTable,
    pub succeeded: TickerMap,
    pub warnings: Vec<FetchWarning>,
}

/// Read-through cache in front of `fetch_closes`. Unbounded; lives as long
/// as the session that owns it.
#[derive(Debug, Default)]
pub struct FetchCache {
    entries: HashMap<FetchKey, Arc<FetchedTable>>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored result for `(range, tickers)`, fetching and merging
    /// on a miss. Warnings from the original fetch are kept with the entry.
    pub fn get_or_fetch(
        &mut self,
        provider: &dyn DataProvider,
        range: DateRange,
        tickers: &TickerMap,
    ) -> Arc<FetchedTable> {
        let key = FetchKey {
            range,
            tickers: tickers.clone(),
        };
        if let Some(hit) = self.entries.get(&key) {
            debug!(%range, symbols = tickers.len(), "fetch cache hit");
            return Arc::clone(hit);
        }

        debug!(%range, symbols = tickers.len(), provider = provider.name(), "fetch cache miss");
        let outcome = fetch_closes(provider, range, tickers);
        let fetched = Arc::new(FetchedTable {
            table: merge_series(&outcome.series),
            succeeded: outcome.succeeded,
            warnings: outcome.warnings,
        });
        self.entries.insert(key, Arc::clone(&fetched));
        fetched
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
