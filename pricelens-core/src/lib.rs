//! PriceLens Core: ticker resolution, market-data fetch, table shaping and
//! chart declaration for the stock price dashboard.
//!
//! The front ends (`pricelens-tui`, `pricelens-cli`) only collect input and
//! draw output; everything between is [`dashboard::render`]:
//! - Ticker text → ordered symbol/display-name map
//! - Per-symbol close fetch with isolated failures, memoized per session
//! - Outer join on date, selection, optional day-over-day change, forward-fill
//! - Wide → long reshape and the overlaid line chart declaration

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod range;
pub mod shape;
pub mod ticker;

pub use chart::{ChartSpec, YDomain};
pub use config::DashboardConfig;
pub use dashboard::{render, DashboardInput, DashboardOutput, RenderContext, UserError};
pub use range::{DateRange, RangeInput};
pub use ticker::{NameTable, TickerMap};
