use oiv_core::{Column, SortDirection, TableController};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::app::{App, TableInput, Views};
use crate::ui::screens::chrome::{render_chrome, render_empty_state};
use crate::ui::widgets::tables::{header_row, scroll_offset, selected_row_style};

const SHORTCUTS: [(&str, &str); 10] = [
    ("←/→", "Column"),
    ("↑/↓", "Row"),
    ("PgUp/PgDn", "Page"),
    ("/", "Search"),
    ("k", "Column filter"),
    ("s/S", "Sort/add sort"),
    ("x", "Clear"),
    ("o", "Columns"),
    ("Enter", "Show in graph"),
    ("f", "Filters"),
];

const TEXT_INPUT_SHORTCUTS: [(&str, &str); 2] = [("Enter", "Keep"), ("Esc", "Clear")];

pub fn render_table(app: &App, f: &mut Frame<'_>, views: &Views) {
    let shortcuts: &[(&str, &str)] = if app.table_input == TableInput::Normal {
        &SHORTCUTS
    } else {
        &TEXT_INPUT_SHORTCUTS
    };
    let content = render_chrome(app, f, shortcuts);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Query line
            Constraint::Min(3),    // Rows
            Constraint::Length(1), // Pager
        ])
        .split(content);

    let table = views.table.borrow();
    f.render_widget(Paragraph::new(query_line(app, &table)), layout[0]);

    if table.total_rows() == 0 {
        let message = app.load_error.as_ref().map_or_else(
            || "No connections for the current filters. Press f to pick some.".to_string(),
            |error| format!("Dataset unavailable: {error}"),
        );
        render_empty_state(f, layout[1], " Connections ", &message);
    } else if table.matching_rows() == 0 {
        render_empty_state(
            f,
            layout[1],
            " Connections ",
            "No connections match the search. Press x to clear it.",
        );
    } else {
        render_rows(app, f, layout[1], &table);
    }

    f.render_widget(
        Paragraph::new(pager_line(&table)).style(Style::default().fg(Color::Gray)),
        layout[2],
    );
}

fn render_rows(app: &App, f: &mut Frame<'_>, area: Rect, table: &TableController) {
    let columns = table.layout().visible_columns();
    let focused = app.column_cursor.min(columns.len().saturating_sub(1));

    let header = header_row(
        columns
            .iter()
            .enumerate()
            .map(|(index, column)| header_title(table, *column, index == focused)),
    );

    let page_rows = table.page_rows();
    let max_visible_rows = usize::from(area.height.saturating_sub(3));
    let offset = scroll_offset(page_rows.len(), max_visible_rows, app.row_cursor);

    let rows: Vec<Row<'_>> = page_rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(index, row)| {
            let cells: Vec<Cell<'_>> = columns
                .iter()
                .map(|column| Cell::from(row.cell(*column).to_string()))
                .collect();
            let style = if index == app.row_cursor {
                selected_row_style()
            } else {
                Style::default()
            };
            Row::new(cells).style(style)
        })
        .collect();

    let widths: Vec<Constraint> = columns
        .iter()
        .map(|column| match column {
            Column::Label => Constraint::Fill(2),
            _ => Constraint::Fill(1),
        })
        .collect();

    let block = Block::default()
        .title(" Connections ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let widget = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1);

    f.render_widget(widget, area);
}

/// Column title with its sort arrow, priority and filter marker
fn header_title(table: &TableController, column: Column, focused: bool) -> TextLine<'static> {
    let mut title = column.label().to_string();

    let keys = table.sort_keys();
    if let Some(position) = keys.iter().position(|key| key.column == column) {
        let arrow = match keys[position].direction {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        };
        title.push_str(&format!(" {arrow}"));
        if keys.len() > 1 {
            title.push_str(&(position + 1).to_string());
        }
    }
    if !table.column_query(column).is_empty() {
        title.push_str(" *");
    }

    if focused {
        TextLine::from(Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        TextLine::from(title)
    }
}

fn query_line(app: &App, table: &TableController) -> TextLine<'static> {
    let label = Style::default().fg(Color::Yellow);
    let editing = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    match app.table_input {
        TableInput::Search => TextLine::from(vec![
            Span::styled("Search: ", label),
            Span::styled(format!("{}_", app.table_input_buffer), editing),
        ]),
        TableInput::ColumnSearch(column) => TextLine::from(vec![
            Span::styled(format!("{} contains: ", column.label()), label),
            Span::styled(format!("{}_", app.table_input_buffer), editing),
        ]),
        TableInput::Normal => {
            let mut spans = Vec::new();
            if !table.query().is_empty() {
                spans.push(Span::styled("Search: ", label));
                spans.push(Span::raw(format!("\"{}\"  ", table.query())));
            }
            for (column, query) in table.column_queries() {
                spans.push(Span::styled(format!("{}: ", column.label()), label));
                spans.push(Span::raw(format!("\"{query}\"  ")));
            }
            if spans.is_empty() {
                spans.push(Span::styled(
                    "Press / to search all columns, k to filter the focused column",
                    Style::default().fg(Color::DarkGray),
                ));
            }
            TextLine::from(spans)
        }
    }
}

fn pager_line(table: &TableController) -> String {
    let matching = table.matching_rows();
    let total = table.total_rows();
    let mut line = format!(
        "Page {}/{}  ·  {matching} connection(s)",
        table.page() + 1,
        table.page_count().max(1)
    );
    if matching != total {
        line.push_str(&format!(" of {total}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use oiv_core::{apply_filters, Catalogs, DataFile, Dataset, FilterCategory, FilterSelection};

    fn table() -> TableController {
        let data = DataFile::from_json(
            r#"{
                "oiv": [{"id": "A", "complex": "c1"}, {"id": "B", "complex": "c1"}, {"id": "C", "complex": "c1"}],
                "edges": [
                    {"source": "A", "target": "B", "theme": "Roads"},
                    {"source": "B", "target": "C", "theme": "Rail"},
                    {"source": "C", "target": "A", "theme": "Roads"}
                ]
            }"#,
        )
        .unwrap();
        let dataset = Dataset::from_parts(data, Catalogs::default());
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::Complex, ["c1"]);

        let mut table = TableController::new(2);
        table.set_rows(&apply_filters(&dataset, &selection));
        table
    }

    #[test]
    fn pager_reports_search_narrowing() {
        let mut table = table();
        assert_eq!(pager_line(&table), "Page 1/2  ·  3 connection(s)");

        table.set_query("roads");
        assert_eq!(pager_line(&table), "Page 1/1  ·  2 connection(s) of 3");
    }

    #[test]
    fn header_shows_sort_priority() {
        let mut table = table();
        table.sort_by(Column::Theme, false);
        table.sort_by(Column::Source, true);

        let title = |column| -> String {
            header_title(&table, column, false)
                .spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect()
        };
        assert_eq!(title(Column::Theme), "Theme ↑1");
        assert_eq!(title(Column::Source), "Source ↑2");
        assert_eq!(title(Column::Target), "Target");
    }
}
