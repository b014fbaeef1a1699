//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over market-data sources (Yahoo Finance,
//! the offline synthetic walk) so the fetcher can be driven by a mock in tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One daily close as returned by a provider, dated on the exchange's
/// calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub close: f64,
}

/// Structured error types for provider calls.
///
/// Displayed verbatim in per-symbol warnings, so messages stay short.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no price history for {symbol} in the requested range")]
    EmptyHistory { symbol: String },

    #[error("data provider has blocked requests for another {retry_in_secs}s (circuit breaker tripped)")]
    CircuitBreakerTripped { retry_in_secs: u64 },

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful provider call for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<RawBar>,
}

/// Trait for market-data providers.
///
/// The date range is half-open: bars dated `start..end` are returned and a
/// bar dated exactly `end` is not. Implementations never panic on bad
/// symbols; they return `DataError` instead.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider, used in logs.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over `[start, end)`.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;
}
