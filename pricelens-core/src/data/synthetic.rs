//! Offline provider: a deterministic random walk per symbol.
//!
//! Used by `--offline` runs and by tests. The walk is seeded from the
//! BLAKE3 hash of the symbol, so the same symbol always yields the same
//! prices for the same dates. Weekends are skipped.

use super::provider::{DataError, DataProvider, FetchResult, RawBar};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Deterministic random-walk provider.
#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    unknown: HashSet<String>,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `symbol` fail with `SymbolNotFound`, like a delisted ticker.
    pub fn with_unknown(mut self, symbol: impl Into<String>) -> Self {
        self.unknown.insert(symbol.into());
        self
    }

    fn walk(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<RawBar> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        // Walk from a fixed epoch so overlapping ranges agree on prices.
        let epoch = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or(start);
        let mut price = rng.gen_range(50.0..400.0_f64);
        let mut bars = Vec::new();

        for current in epoch.iter_days().take_while(|d| *d < end) {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }

            let daily_return: f64 = rng.gen_range(-0.02..0.02);
            price = (price * (1.0 + daily_return)).max(1.0);

            if current >= start {
                bars.push(RawBar {
                    date: current,
                    close: price,
                });
            }
        }

        bars
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        if symbol.is_empty() || self.unknown.contains(symbol) {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let bars = Self::walk(symbol, start, end);
        if bars.is_empty() {
            return Err(DataError::EmptyHistory {
                symbol: symbol.to_string(),
            });
        }

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
        })
    }
}
