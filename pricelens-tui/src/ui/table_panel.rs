//! Data table: the forward-filled wide view, dates ascending.

use ratatui::layout::{Constraint, Rect};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use pricelens_core::data::DATE_COLUMN;
use pricelens_core::shape::{WideTable, CHANGE_SUFFIX};

use crate::app::{AppState, Focus};
use crate::theme;

const DATE_WIDTH: u16 = 10;
const CELL_WIDTH: u16 = 12;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let focused = app.focus == Focus::Table;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(focused))
        .title(" Stock prices (USD) ")
        .title_style(theme::panel_title(focused));

    let Some(table) = app.output.as_ref().and_then(|o| o.table.as_ref()) else {
        f.render_widget(
            Paragraph::new(Span::styled("no table to show", theme::muted())).block(block),
            area,
        );
        return;
    };

    let widget = build_table(table).block(block);
    let mut state = TableState::default().with_offset(app.table_scroll);
    if focused {
        state.select(Some(app.table_scroll));
    }
    f.render_stateful_widget(widget, area, &mut state);
}

fn build_table(table: &WideTable) -> Table<'static> {
    let header = Row::new(
        std::iter::once(DATE_COLUMN.to_string())
            .chain(table.columns.iter().map(|c| c.name.clone()))
            .map(|name| Cell::from(name).style(theme::header_row())),
    );

    let is_change: Vec<bool> = table
        .columns
        .iter()
        .map(|c| c.name.ends_with(CHANGE_SUFFIX))
        .collect();

    let rows: Vec<Row> = table
        .display_rows()
        .into_iter()
        .map(|cells| {
            let mut cells = cells.into_iter();
            let date = cells.next().unwrap_or_default();
            Row::new(
                std::iter::once(Cell::from(date).style(theme::muted())).chain(
                    cells.zip(&is_change).map(|(text, change)| {
                        let style = theme::cell(&text, *change);
                        Cell::from(text).style(style)
                    }),
                ),
            )
        })
        .collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(DATE_WIDTH))
        .chain(table.columns.iter().map(|_| Constraint::Min(CELL_WIDTH)))
        .collect();

    Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .row_highlight_style(theme::panel_title(true))
}
