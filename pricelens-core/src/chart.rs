//! Declarative overlaid line chart over the tidy table.
//!
//! `ChartSpec` is a description, not pixels: the TUI draws it with ratatui
//! and the CLI serializes it to Vega-Lite. Values outside the y domain stay
//! in the data; only the scale clips them.

use crate::data::merge::DATE_COLUMN;
use crate::shape::TidyTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Field names used by the encodings.
pub const VALUE_FIELD: &str = "value";
pub const SERIES_FIELD: &str = "variable";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("y-axis minimum {min} must be below the maximum {max}")]
    InvertedDomain { min: f64, max: f64 },
}

/// Y-axis domain `[min, max]`, `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YDomain {
    min: f64,
    max: f64,
}

impl Default for YDomain {
    fn default() -> Self {
        Self { min: 0.0, max: 500.0 }
    }
}

impl YDomain {
    pub fn new(min: f64, max: f64) -> Result<Self, ChartError> {
        if !(min < max) {
            return Err(ChartError::InvertedDomain { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Where a value is drawn: pinned to the nearest domain bound.
    pub fn clip(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Encoding type of a channel, as in Vega-Lite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Temporal,
    Quantitative,
    Nominal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encoding {
    pub field: String,
    pub field_type: FieldType,
    pub title: String,
}

/// One drawable line: the points of a single series, date ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Declaration of the overlaid line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub opacity: f64,
    pub clip: bool,
    pub x: Encoding,
    pub y: Encoding,
    pub color: Encoding,
    pub y_domain: YDomain,
    pub data: TidyTable,
}

/// Declare the chart: date on x (temporal), value on y (quantitative, scale
/// domain = `domain`), series name on color (nominal).
pub fn render_chart(tidy: &TidyTable, domain: YDomain, y_title: &str) -> ChartSpec {
    ChartSpec {
        title: y_title.to_string(),
        opacity: 0.8,
        clip: true,
        x: Encoding {
            field: DATE_COLUMN.to_string(),
            field_type: FieldType::Temporal,
            title: "Date".to_string(),
        },
        y: Encoding {
            field: VALUE_FIELD.to_string(),
            field_type: FieldType::Quantitative,
            title: y_title.to_string(),
        },
        color: Encoding {
            field: SERIES_FIELD.to_string(),
            field_type: FieldType::Nominal,
            title: "Series".to_string(),
        },
        y_domain: domain,
        data: tidy.clone(),
    }
}

impl ChartSpec {
    /// Group the data into one line per series, first-appearance order.
    /// Rows without a value are skipped, leaving a break in the line.
    pub fn series(&self) -> Vec<ChartSeries> {
        self.data
            .series_names()
            .into_iter()
            .map(|name| {
                let mut points: Vec<(NaiveDate, f64)> = self
                    .data
                    .rows
                    .iter()
                    .filter(|r| r.series == name)
                    .filter_map(|r| r.value.map(|v| (r.date, v)))
                    .collect();
                points.sort_by_key(|(date, _)| *date);
                ChartSeries {
                    name: name.to_string(),
                    points,
                }
            })
            .collect()
    }

    /// Earliest and latest date in the data.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.data.rows.iter().map(|r| r.date).min()?;
        let last = self.data.rows.iter().map(|r| r.date).max()?;
        Some((first, last))
    }

    /// Vega-Lite v5 document with inline data.
    pub fn to_vega_lite(&self) -> Value {
        let values: Vec<Value> = self
            .data
            .rows
            .iter()
            .map(|r| {
                json!({
                    (self.x.field.as_str()): r.date.to_string(),
                    (self.color.field.as_str()): r.series,
                    (self.y.field.as_str()): r.value,
                })
            })
            .collect();

        json!({
            "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
            "title": self.title,
            "width": "container",
            "data": { "values": values },
            "mark": { "type": "line", "opacity": self.opacity, "clip": self.clip },
            "encoding": {
                "x": { "field": self.x.field, "type": self.x.field_type, "title": self.x.title },
                "y": {
                    "field": self.y.field,
                    "type": self.y.field_type,
                    "title": self.y.title,
                    "stack": null,
                    "scale": { "domain": [self.y_domain.min(), self.y_domain.max()] }
                },
                "color": { "field": self.color.field, "type": self.color.field_type, "title": self.color.title }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::TidyRow;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn tidy() -> TidyTable {
        let row = |date: &str, series: &str, value: Option<f64>| TidyRow {
            date: d(date),
            series: series.into(),
            value,
        };
        TidyTable {
            rows: vec![
                row("2024-01-03", "Apple", Some(600.0)),
                row("2024-01-02", "Apple", Some(185.0)),
                row("2024-01-02", "TOYOTA", None),
                row("2024-01-03", "TOYOTA", Some(180.0)),
            ],
        }
    }

    #[test]
    fn domain_must_be_increasing() {
        assert!(YDomain::new(0.0, 500.0).is_ok());
        assert_eq!(
            YDomain::new(500.0, 500.0),
            Err(ChartError::InvertedDomain { min: 500.0, max: 500.0 })
        );
        assert!(YDomain::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn clip_pins_to_bounds() {
        let domain = YDomain::new(0.0, 500.0).unwrap();
        assert_eq!(domain.clip(600.0), 500.0);
        assert_eq!(domain.clip(-3.0), 0.0);
        assert_eq!(domain.clip(250.0), 250.0);
    }

    #[test]
    fn encodings_match_line_chart() {
        let spec = render_chart(&tidy(), YDomain::default(), "Close (USD)");
        assert_eq!(spec.x.field_type, FieldType::Temporal);
        assert_eq!(spec.y.field_type, FieldType::Quantitative);
        assert_eq!(spec.color.field_type, FieldType::Nominal);
        assert!(spec.clip);
    }

    #[test]
    fn series_groups_sorts_and_skips_gaps() {
        let spec = render_chart(&tidy(), YDomain::default(), "Close (USD)");
        let series = spec.series();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "Apple");
        assert_eq!(series[0].points, vec![(d("2024-01-02"), 185.0), (d("2024-01-03"), 600.0)]);
        assert_eq!(series[1].points, vec![(d("2024-01-03"), 180.0)]);
        assert_eq!(spec.date_bounds(), Some((d("2024-01-02"), d("2024-01-03"))));
    }

    #[test]
    fn vega_lite_keeps_out_of_domain_values() {
        let spec = render_chart(&tidy(), YDomain::new(0.0, 500.0).unwrap(), "Close (USD)");
        let doc = spec.to_vega_lite();

        assert_eq!(doc["mark"]["type"], "line");
        assert_eq!(doc["mark"]["clip"], true);
        assert_eq!(doc["encoding"]["x"]["type"], "temporal");
        assert_eq!(doc["encoding"]["color"]["field"], SERIES_FIELD);
        assert_eq!(doc["encoding"]["y"]["scale"]["domain"][1], 500.0);
        assert_eq!(doc["data"]["values"][0][VALUE_FIELD], 600.0);
        assert!(doc["data"]["values"][2][VALUE_FIELD].is_null());
    }
}
