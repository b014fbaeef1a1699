//! PriceLens TUI: terminal dashboard over `pricelens-core`.
//!
//! Layout: sidebar of inputs on the left; heading, data table and overlaid
//! line chart on the right; status bar at the bottom. A worker thread runs
//! the dashboard render function so the UI never blocks on the network.

pub mod app;
pub mod input;
pub mod terminal;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::AppState;

#[cfg(test)]
mod test_helpers;
