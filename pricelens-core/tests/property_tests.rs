//! Property tests for the shaping invariants.
//!
//! Uses proptest to verify:
//! 1. Forward-fill is idempotent and never invents leading values
//! 2. Melt then pivot reproduces the wide table
//! 3. The merged table has one row per distinct observed date

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use std::collections::BTreeSet;

use pricelens_core::data::merge::{merge_series, PriceColumn};
use pricelens_core::data::PriceSeries;
use pricelens_core::shape::{first_difference, forward_fill, WideTable};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_cell() -> impl Strategy<Value = Option<f64>> {
    prop::option::of((1.0..4000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0))
}

fn arb_column() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(arb_cell(), 0..60)
}

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// A wide table of `width` columns over `height` consecutive days.
fn arb_wide() -> impl Strategy<Value = WideTable> {
    (1usize..6, 1usize..40).prop_flat_map(|(width, height)| {
        prop::collection::vec(prop::collection::vec(arb_cell(), height), width).prop_map(
            move |columns| WideTable {
                dates: (0..height).map(|i| base() + Duration::days(i as i64)).collect(),
                columns: columns
                    .into_iter()
                    .enumerate()
                    .map(|(i, values)| PriceColumn {
                        name: format!("Series {i}"),
                        values,
                    })
                    .collect(),
            },
        )
    })
}

/// Sorted, distinct day offsets with a close for each.
fn arb_points() -> impl Strategy<Value = Vec<(i64, f64)>> {
    prop::collection::btree_map(0i64..90, 1.0..500.0_f64, 1..30)
        .prop_map(|m| m.into_iter().collect())
}

// ── 1. Forward-fill ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn forward_fill_is_idempotent(column in arb_column()) {
        let once = forward_fill(&column);
        let twice = forward_fill(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn forward_fill_keeps_known_values_and_leading_gaps(column in arb_column()) {
        let filled = forward_fill(&column);
        prop_assert_eq!(filled.len(), column.len());
        let first_known = column.iter().position(Option::is_some).unwrap_or(column.len());
        for (i, (before, after)) in column.iter().zip(&filled).enumerate() {
            if before.is_some() {
                prop_assert_eq!(before, after);
            }
            prop_assert_eq!(after.is_none(), i < first_known);
        }
    }

    #[test]
    fn first_difference_is_none_on_first_row(column in arb_column()) {
        let diff = first_difference(&column);
        prop_assert_eq!(diff.len(), column.len());
        if let Some(first) = diff.first() {
            prop_assert!(first.is_none());
        }
    }
}

// ── 2. Melt / pivot round trip ───────────────────────────────────────

proptest! {
    #[test]
    fn pivot_reverses_melt(wide in arb_wide()) {
        let tidy = wide.melt();
        prop_assert_eq!(tidy.rows.len(), wide.dates.len() * wide.columns.len());
        prop_assert_eq!(tidy.pivot(), wide);
    }
}

// ── 3. Merge covers every date ───────────────────────────────────────

proptest! {
    #[test]
    fn merged_rows_are_the_union_of_dates(
        a in arb_points(),
        b in arb_points(),
    ) {
        let to_series = |symbol: &str, points: &[(i64, f64)]| PriceSeries {
            symbol: symbol.into(),
            name: symbol.into(),
            points: points.iter().map(|(o, v)| (base() + Duration::days(*o), *v)).collect(),
        };
        let series = [to_series("AAA", &a), to_series("BBB", &b)];
        let table = merge_series(&series);

        let expected: BTreeSet<NaiveDate> = series
            .iter()
            .flat_map(|s| s.points.iter().map(|(date, _)| *date))
            .collect();
        prop_assert_eq!(table.dates().to_vec(), expected.into_iter().collect::<Vec<_>>());
        prop_assert_eq!(table.column_names(), vec!["AAA".to_string(), "BBB".to_string()]);

        for s in &series {
            let column = table.column(&s.name).unwrap();
            let present = column.values.iter().filter(|v| v.is_some()).count();
            prop_assert_eq!(present, s.points.len());
        }
    }
}
