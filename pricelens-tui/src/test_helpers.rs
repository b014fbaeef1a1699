//! Test helpers for building dashboard outputs without a worker.

use chrono::NaiveDate;

use pricelens_core::chart::{render_chart, YDomain};
use pricelens_core::dashboard::{DashboardOutput, PRICE_AXIS_TITLE};
use pricelens_core::data::PriceColumn;
use pricelens_core::shape::WideTable;

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A rendered output over three days with one column per name, all selected.
/// The first row of every column is a gap.
pub fn output_with(names: &[&str]) -> DashboardOutput {
    let table = WideTable {
        dates: vec![d("2024-03-01"), d("2024-03-04"), d("2024-03-05")],
        columns: names
            .iter()
            .enumerate()
            .map(|(i, name)| PriceColumn {
                name: name.to_string(),
                values: vec![None, Some(100.0 + i as f64), Some(600.0)],
            })
            .collect(),
    };
    let chart = render_chart(&table.melt(), YDomain::default(), PRICE_AXIS_TITLE);
    DashboardOutput {
        heading: Some("Past 30 days".to_string()),
        warnings: Vec::new(),
        available: names.iter().map(|n| n.to_string()).collect(),
        selected: names.iter().map(|n| n.to_string()).collect(),
        table: Some(table),
        chart: Some(chart),
        error: None,
    }
}
