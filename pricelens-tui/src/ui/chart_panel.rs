//! Overlaid close-price line chart, one colored dataset per series.
//!
//! X is days since the first date; y bounds are the slider's domain. Points
//! outside the domain are drawn pinned to its edge, the table keeps the real
//! value.

use chrono::NaiveDate;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph};
use ratatui::Frame;

use pricelens_core::chart::ChartSpec;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(" Chart ")
        .title_style(theme::panel_title(false));

    match app.output.as_ref().and_then(|o| o.chart.as_ref()) {
        Some(spec) if spec.date_bounds().is_some() => render_chart(f, area, spec, block),
        _ => render_empty(f, area, block),
    }
}

fn render_empty(f: &mut Frame, area: Rect, block: Block<'static>) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Select at least one company to draw the chart.",
            theme::muted(),
        )),
    ];
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Chart coordinates for every series: `(days since first, clipped close)`.
pub fn plot_points(spec: &ChartSpec, first: NaiveDate) -> Vec<(String, Vec<(f64, f64)>)> {
    spec.series()
        .into_iter()
        .map(|s| {
            let points = s
                .points
                .iter()
                .map(|(date, value)| {
                    (
                        (*date - first).num_days() as f64,
                        spec.y_domain.clip(*value),
                    )
                })
                .collect();
            (s.name, points)
        })
        .collect()
}

fn render_chart(f: &mut Frame, area: Rect, spec: &ChartSpec, block: Block<'static>) {
    let Some((first, last)) = spec.date_bounds() else {
        return;
    };
    let span = ((last - first).num_days() as f64).max(1.0);
    let series = plot_points(spec, first);

    let datasets: Vec<Dataset> = series
        .iter()
        .enumerate()
        .map(|(i, (name, points))| {
            Dataset::default()
                .name(name.clone())
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(theme::series_color(i)))
                .graph_type(GraphType::Line)
                .data(points)
        })
        .collect();

    let (y_min, y_max) = (spec.y_domain.min(), spec.y_domain.max());
    let mid = first + chrono::Duration::days((span / 2.0) as i64);

    let chart = Chart::new(datasets)
        .block(block)
        .legend_position(Some(LegendPosition::TopLeft))
        .x_axis(
            Axis::default()
                .title(Span::styled(spec.x.title.clone(), theme::muted()))
                .style(theme::muted())
                .bounds([0.0, span])
                .labels(vec![
                    Span::styled(first.to_string(), theme::muted()),
                    Span::styled(mid.to_string(), theme::muted()),
                    Span::styled(last.to_string(), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(spec.y.title.clone(), theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.0}"), theme::muted()),
                    Span::styled(format!("{:.0}", (y_min + y_max) / 2.0), theme::muted()),
                    Span::styled(format!("{y_max:.0}"), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}
