//! Wide close-price table: per-symbol series outer-joined on date.
//!
//! Missing cells are `None` (market closed or provider gap for that
//! symbol); they are never filled here.

use super::fetch::PriceSeries;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// Name of the date key column in tabular views.
pub const DATE_COLUMN: &str = "Date";

/// One display-name column of the wide table, aligned with `MergedTable::dates`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Rows keyed by the union of all fetched dates, one column per series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedTable {
    dates: Vec<NaiveDate>,
    columns: Vec<PriceColumn>,
}

impl MergedTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[PriceColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&PriceColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Display names of the data columns, in join order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// No data columns: every symbol failed.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn height(&self) -> usize {
        self.dates.len()
    }

    /// Outer-join `series` onto the table on date.
    ///
    /// The first series seeds the table. Dates new to the table are inserted
    /// in order and existing columns get `None` there. A display name that
    /// is already taken gets the symbol appended.
    pub fn outer_join(&mut self, series: &PriceSeries) {
        let all_dates: BTreeSet<NaiveDate> = self
            .dates
            .iter()
            .copied()
            .chain(series.points.iter().map(|(date, _)| *date))
            .collect();
        let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

        if dates.len() != self.dates.len() {
            let old_index: HashMap<NaiveDate, usize> = self
                .dates
                .iter()
                .enumerate()
                .map(|(i, d)| (*d, i))
                .collect();
            for column in &mut self.columns {
                column.values = dates
                    .iter()
                    .map(|d| old_index.get(d).and_then(|&i| column.values[i]))
                    .collect();
            }
            self.dates = dates;
        }

        let by_date: HashMap<NaiveDate, f64> = series.points.iter().copied().collect();
        let name = if self.column(&series.name).is_some() {
            format!("{} ({})", series.name, series.symbol)
        } else {
            series.name.clone()
        };

        self.columns.push(PriceColumn {
            name,
            values: self.dates.iter().map(|d| by_date.get(d).copied()).collect(),
        });
    }

    /// Polars view of the table: a `Date` column plus one `Float64` column
    /// per series, nulls where the symbol has no close.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
        let days: Vec<i32> = self
            .dates
            .iter()
            .map(|d| (*d - epoch).num_days() as i32)
            .collect();

        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?);
        for column in &self.columns {
            columns.push(Column::new(column.name.as_str().into(), column.values.clone()));
        }
        DataFrame::new(columns)
    }
}

/// Fold every series into one table, in order.
pub fn merge_series<'a>(series: impl IntoIterator<Item = &'a PriceSeries>) -> MergedTable {
    let mut table = MergedTable::empty();
    for s in series {
        table.outer_join(s);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(symbol: &str, name: &str, points: &[(&str, f64)]) -> PriceSeries {
        PriceSeries {
            symbol: symbol.into(),
            name: name.into(),
            points: points.iter().map(|(date, v)| (d(date), *v)).collect(),
        }
    }

    #[test]
    fn first_series_seeds_table() {
        let table = merge_series(&[series("AAPL", "Apple", &[("2024-01-02", 1.0), ("2024-01-03", 2.0)])]);
        assert_eq!(table.dates(), &[d("2024-01-02"), d("2024-01-03")]);
        assert_eq!(table.column_names(), vec!["Apple"]);
        assert_eq!(table.columns()[0].values, vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn outer_join_keeps_union_of_dates() {
        let table = merge_series(&[
            series("SPY", "SPY", &[("2024-01-02", 100.0), ("2024-01-03", 101.0), ("2024-01-05", 103.0)]),
            // QQQ missing 01-03, has 01-04 which SPY lacks
            series("QQQ", "QQQ", &[("2024-01-02", 200.0), ("2024-01-04", 202.0)]),
        ]);

        assert_eq!(table.height(), 4);
        assert_eq!(
            table.column("SPY").unwrap().values,
            vec![Some(100.0), Some(101.0), None, Some(103.0)]
        );
        assert_eq!(
            table.column("QQQ").unwrap().values,
            vec![Some(200.0), None, Some(202.0), None]
        );
    }

    #[test]
    fn no_series_is_empty() {
        let table = merge_series(std::iter::empty());
        assert!(table.is_empty());
        assert_eq!(table.height(), 0);
    }

    #[test]
    fn duplicate_display_name_gets_symbol_suffix() {
        let table = merge_series(&[
            series("GOOGL", "Alphabet", &[("2024-01-02", 1.0)]),
            series("GOOG", "Alphabet", &[("2024-01-02", 2.0)]),
        ]);
        assert_eq!(table.column_names(), vec!["Alphabet", "Alphabet (GOOG)"]);
    }

    #[test]
    fn dataframe_view_has_date_and_nulls() {
        let table = merge_series(&[
            series("AAPL", "Apple", &[("2024-01-02", 1.0), ("2024-01-03", 2.0)]),
            series("MSFT", "Microsoft", &[("2024-01-03", 3.0)]),
        ]);
        let df = table.to_dataframe().unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column(DATE_COLUMN).unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column("Microsoft").unwrap().null_count(), 1);
    }
}
