//! Market data: providers, the multi-symbol fetcher, its session cache, and
//! the outer-join merge into a wide table.

pub mod circuit_breaker;
pub mod fetch;
pub mod memo;
pub mod merge;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use fetch::{fetch_closes, FetchOutcome, FetchWarning, PriceSeries, SymbolFetch};
pub use memo::{FetchCache, FetchKey, FetchedTable};
pub use merge::{merge_series, MergedTable, PriceColumn, DATE_COLUMN};
pub use provider::{DataError, DataProvider, FetchResult, RawBar};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
