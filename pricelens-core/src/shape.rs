//! Selection and shaping of the wide table for display and charting.
//!
//! Pipeline: `project` → optional `with_changes` → `forward_filled` → `melt`.
//! Gaps stay `Option<f64>` throughout; the "non-trading" marker exists only
//! in `format_cell`.

use crate::data::merge::{MergedTable, PriceColumn};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Label shown for cells that have no value even after forward-fill.
pub const NON_TRADING: &str = "non-trading";

/// Suffix of the day-over-day change column derived from a series.
pub const CHANGE_SUFFIX: &str = " change";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("select at least one series to display")]
    Empty,
}

/// Non-empty, ordered subset of the available columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    names: Vec<String>,
}

impl Selection {
    /// Keep the chosen names that are available, in the order chosen.
    /// Unavailable names are ignored; nothing left is an error.
    pub fn new<S: AsRef<str>>(chosen: &[S], available: &[String]) -> Result<Self, SelectionError> {
        let mut names: Vec<String> = Vec::new();
        for name in chosen {
            let name = name.as_ref();
            if available.iter().any(|a| a == name) && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        if names.is_empty() {
            return Err(SelectionError::Empty);
        }
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Date-keyed table of the selected columns, ascending by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<PriceColumn>,
}

/// Project `table` to the selected columns, sorted by date ascending.
pub fn project(table: &MergedTable, selection: &Selection) -> WideTable {
    let mut order: Vec<usize> = (0..table.height()).collect();
    order.sort_by_key(|&i| table.dates()[i]);

    let columns = selection
        .names()
        .iter()
        .filter_map(|name| table.column(name))
        .map(|column| PriceColumn {
            name: column.name.clone(),
            values: order.iter().map(|&i| column.values[i]).collect(),
        })
        .collect();

    WideTable {
        dates: order.iter().map(|&i| table.dates()[i]).collect(),
        columns,
    }
}

/// Replace each gap with the most recent prior value. Leading gaps stay
/// `None`.
pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last
        })
        .collect()
}

/// Simple first difference against the previous row. `None` for the first
/// row and wherever either side is missing.
pub fn first_difference(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    out.extend(values.first().map(|_| None));
    out.extend(values.windows(2).map(|w| match (w[0], w[1]) {
        (Some(prev), Some(cur)) => Some(cur - prev),
        _ => None,
    }));
    out
}

/// Display a cell: two decimals, or the non-trading marker.
pub fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => NON_TRADING.to_string(),
    }
}

impl WideTable {
    pub fn column(&self, name: &str) -> Option<&PriceColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Insert a `"{name} change"` column after every column. Changes are
    /// taken on the unfilled values, so a gap yields no change.
    pub fn with_changes(self) -> Self {
        let mut columns = Vec::with_capacity(self.columns.len() * 2);
        for column in self.columns {
            let change = PriceColumn {
                name: format!("{}{CHANGE_SUFFIX}", column.name),
                values: first_difference(&column.values),
            };
            columns.push(column);
            columns.push(change);
        }
        Self {
            dates: self.dates,
            columns,
        }
    }

    /// Forward-fill every column.
    pub fn forward_filled(self) -> Self {
        Self {
            dates: self.dates,
            columns: self
                .columns
                .into_iter()
                .map(|c| PriceColumn {
                    values: forward_fill(&c.values),
                    name: c.name,
                })
                .collect(),
        }
    }

    /// Row-major display cells: date first, then one formatted cell per column.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.dates
            .iter()
            .enumerate()
            .map(|(i, date)| {
                std::iter::once(date.to_string())
                    .chain(self.columns.iter().map(|c| format_cell(c.values[i])))
                    .collect()
            })
            .collect()
    }

    /// Wide → long: one row per (date, series, value), series-major.
    pub fn melt(&self) -> TidyTable {
        let rows = self
            .columns
            .iter()
            .flat_map(|column| {
                self.dates.iter().zip(&column.values).map(move |(date, value)| TidyRow {
                    date: *date,
                    series: column.name.clone(),
                    value: *value,
                })
            })
            .collect();
        TidyTable { rows }
    }
}

/// One observation of the long table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRow {
    pub date: NaiveDate,
    pub series: String,
    pub value: Option<f64>,
}

/// Long / tidy table, the renderer's input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TidyTable {
    pub rows: Vec<TidyRow>,
}

impl TidyTable {
    /// Series names in first-appearance order.
    pub fn series_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !names.contains(&row.series.as_str()) {
                names.push(&row.series);
            }
        }
        names
    }

    /// Long → wide (date × series → value), dates ascending, series in
    /// first-appearance order.
    pub fn pivot(&self) -> WideTable {
        let dates: Vec<NaiveDate> = self
            .rows
            .iter()
            .map(|r| r.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index: HashMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let columns = self
            .series_names()
            .into_iter()
            .map(|name| {
                let mut values = vec![None; dates.len()];
                for row in self.rows.iter().filter(|r| r.series == name) {
                    values[index[&row.date]] = row.value;
                }
                PriceColumn {
                    name: name.to_string(),
                    values,
                }
            })
            .collect();

        WideTable { dates, columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fetch::PriceSeries;
    use crate::data::merge::merge_series;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn merged() -> MergedTable {
        let apple = PriceSeries {
            symbol: "AAPL".into(),
            name: "Apple".into(),
            points: vec![(d("2024-01-02"), 185.0), (d("2024-01-04"), 181.0)],
        };
        let toyota = PriceSeries {
            symbol: "TM".into(),
            name: "TOYOTA".into(),
            points: vec![(d("2024-01-03"), 180.0), (d("2024-01-04"), 182.0)],
        };
        merge_series(&[apple, toyota])
    }

    fn available() -> Vec<String> {
        vec!["Apple".into(), "TOYOTA".into()]
    }

    #[test]
    fn empty_selection_is_rejected() {
        let none: [&str; 0] = [];
        assert_eq!(Selection::new(&none, &available()), Err(SelectionError::Empty));
        assert_eq!(Selection::new(&["Google"], &available()), Err(SelectionError::Empty));
    }

    #[test]
    fn selection_keeps_chosen_order_and_drops_unknown() {
        let sel = Selection::new(&["TOYOTA", "Google", "Apple", "TOYOTA"], &available()).unwrap();
        assert_eq!(sel.names(), &["TOYOTA".to_string(), "Apple".to_string()]);
    }

    #[test]
    fn project_keeps_selected_columns_only() {
        let sel = Selection::new(&["TOYOTA"], &available()).unwrap();
        let wide = project(&merged(), &sel);
        assert_eq!(wide.column_names(), vec!["TOYOTA"]);
        assert_eq!(wide.dates.len(), 3);
        assert_eq!(wide.columns[0].values, vec![None, Some(180.0), Some(182.0)]);
    }

    #[test]
    fn forward_fill_leaves_leading_gap() {
        let filled = forward_fill(&[None, Some(1.0), None, None, Some(2.0), None]);
        assert_eq!(filled, vec![None, Some(1.0), Some(1.0), Some(1.0), Some(2.0), Some(2.0)]);
    }

    #[test]
    fn first_difference_is_undefined_across_gaps() {
        let diff = first_difference(&[Some(10.0), Some(12.5), None, Some(11.0), Some(10.0)]);
        assert_eq!(diff, vec![None, Some(2.5), None, None, Some(-1.0)]);
        assert!(first_difference(&[]).is_empty());
    }

    #[test]
    fn change_columns_follow_their_series() {
        let sel = Selection::new(&["Apple", "TOYOTA"], &available()).unwrap();
        let wide = project(&merged(), &sel).with_changes();
        assert_eq!(
            wide.column_names(),
            vec!["Apple", "Apple change", "TOYOTA", "TOYOTA change"]
        );
        assert_eq!(wide.column("TOYOTA change").unwrap().values, vec![None, None, Some(2.0)]);
    }

    #[test]
    fn leading_gap_displays_as_non_trading() {
        let sel = Selection::new(&["TOYOTA"], &available()).unwrap();
        let wide = project(&merged(), &sel).forward_filled();
        let rows = wide.display_rows();
        assert_eq!(rows[0], vec!["2024-01-02".to_string(), NON_TRADING.to_string()]);
        assert_eq!(rows[2], vec!["2024-01-04".to_string(), "182.00".to_string()]);
    }

    #[test]
    fn melt_is_series_major() {
        let sel = Selection::new(&["Apple", "TOYOTA"], &available()).unwrap();
        let tidy = project(&merged(), &sel).forward_filled().melt();
        assert_eq!(tidy.rows.len(), 6);
        assert_eq!(tidy.rows[0].series, "Apple");
        assert_eq!(tidy.rows[3].series, "TOYOTA");
        assert_eq!(tidy.rows[1].value, Some(185.0));
        assert_eq!(tidy.series_names(), vec!["Apple", "TOYOTA"]);
    }

    #[test]
    fn pivot_reverses_melt() {
        let sel = Selection::new(&["Apple", "TOYOTA"], &available()).unwrap();
        let wide = project(&merged(), &sel).with_changes().forward_filled();
        assert_eq!(wide.melt().pivot(), wide);
    }
}
