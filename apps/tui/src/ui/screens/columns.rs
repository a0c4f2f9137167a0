use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::app::App;
use crate::ui::screens::chrome::shortcuts_line;
use crate::ui::widgets::popup::{centered_rect, popup_block, ClearWidget};
use crate::ui::widgets::tables::selected_row_style;

const SHORTCUTS: [(&str, &str); 4] = [
    ("Space", "Show/hide"),
    ("[/]", "Move"),
    ("Enter", "Save"),
    ("Esc", "Cancel"),
];

pub fn render_columns_popup(app: &App, f: &mut Frame<'_>) {
    let Some(views) = &app.views else {
        return;
    };
    let table = views.table.borrow();
    let layout = table.layout();

    let popup_area = centered_rect(50, 50, f.area());
    f.render_widget(ClearWidget, popup_area);

    let block = popup_block("== Columns ==", Color::Yellow);
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let rows: Vec<Row<'_>> = layout
        .order()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let visible = layout.is_visible(*column);
            let style = if index == app.columns_cursor {
                selected_row_style()
            } else if visible {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Row::new(vec![
                Cell::from(if visible { "[x]" } else { "[ ]" }),
                Cell::from(column.label()),
            ])
            .style(style)
        })
        .collect();

    f.render_widget(
        Table::new(rows, [Constraint::Length(3), Constraint::Fill(1)]).column_spacing(1),
        sections[0],
    );
    f.render_widget(Paragraph::new(shortcuts_line(&SHORTCUTS)), sections[1]);
}
