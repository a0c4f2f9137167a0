use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use crate::app::state::{App, AppScreen, TableInput};
use crossterm::event::KeyCode;

pub fn handle_table_input(app: &mut App, key: KeyCode) {
    let Some(views) = &app.views else {
        return;
    };
    let mut table = views.table.borrow_mut();
    let visible_columns = table.layout().visible_columns().len();
    let page_rows = table.page_rows().len();

    match key {
        KeyCode::Left => {
            app.column_cursor = wrap_decrement(app.column_cursor, visible_columns);
        }
        KeyCode::Right => {
            app.column_cursor = wrap_increment(app.column_cursor, visible_columns);
        }
        KeyCode::Up => {
            app.row_cursor = app.row_cursor.saturating_sub(1);
        }
        KeyCode::Down => {
            if app.row_cursor + 1 < page_rows {
                app.row_cursor += 1;
            }
        }
        KeyCode::PageDown => {
            if table.next_page() {
                app.row_cursor = 0;
            }
        }
        KeyCode::PageUp => {
            if table.prev_page() {
                app.row_cursor = 0;
            }
        }
        KeyCode::Home => {
            table.set_page(0);
            app.row_cursor = 0;
        }
        KeyCode::End => {
            table.last_page();
            app.row_cursor = 0;
        }
        KeyCode::Char('/') => {
            app.table_input_buffer = table.query().to_string();
            app.table_input = TableInput::Search;
        }
        KeyCode::Char('k') => {
            drop(table);
            if let Some(column) = app.focused_column() {
                let views = app.views.as_ref();
                app.table_input_buffer = views
                    .map(|views| views.table.borrow().column_query(column).to_string())
                    .unwrap_or_default();
                app.table_input = TableInput::ColumnSearch(column);
            }
            return;
        }
        KeyCode::Char(ch @ ('s' | 'S')) => {
            drop(table);
            if let Some(column) = app.focused_column() {
                if let Some(views) = &app.views {
                    views.table.borrow_mut().sort_by(column, ch == 'S');
                }
                app.status_message = sort_status(app);
            }
            app.row_cursor = 0;
            return;
        }
        KeyCode::Char('x') => {
            table.clear_filters();
            table.clear_sort();
            app.row_cursor = 0;
            app.status_message = "Table filters and sort cleared".to_string();
        }
        KeyCode::Char('o') => {
            drop(table);
            app.open_columns();
            return;
        }
        KeyCode::Enter => {
            let source = table
                .page_rows()
                .get(app.row_cursor)
                .map(|row| row.source_id.clone());
            drop(table);
            if let Some(source) = source {
                let focused = app
                    .views
                    .as_ref()
                    .is_some_and(|views| views.info.borrow_mut().focus(&source));
                if focused {
                    app.show_screen(AppScreen::Graph);
                }
            }
            return;
        }
        KeyCode::Esc => {
            drop(table);
            app.show_screen(AppScreen::Graph);
            return;
        }
        _ => {}
    }
}

/// Typing into the table's global or per-column query
pub fn handle_table_text_input(app: &mut App, key: KeyCode) {
    let target = app.table_input;
    match key {
        KeyCode::Char(ch) => app.table_input_buffer.push(ch),
        KeyCode::Backspace => {
            app.table_input_buffer.pop();
        }
        KeyCode::Enter => {
            app.table_input = TableInput::Normal;
            return;
        }
        KeyCode::Esc => {
            app.table_input_buffer.clear();
            app.table_input = TableInput::Normal;
        }
        _ => return,
    }

    if let Some(views) = &app.views {
        let mut table = views.table.borrow_mut();
        match target {
            TableInput::Search => table.set_query(&app.table_input_buffer),
            TableInput::ColumnSearch(column) => {
                table.set_column_query(column, &app.table_input_buffer);
            }
            TableInput::Normal => {}
        }
    }
    app.row_cursor = 0;
}

fn sort_status(app: &App) -> String {
    let Some(views) = &app.views else {
        return String::new();
    };
    let table = views.table.borrow();
    let keys: Vec<String> = table
        .sort_keys()
        .iter()
        .map(|key| {
            let arrow = match key.direction {
                oiv_core::SortDirection::Ascending => "↑",
                oiv_core::SortDirection::Descending => "↓",
            };
            format!("{}{arrow}", key.column.label())
        })
        .collect();
    if keys.is_empty() {
        "Sort cleared".to_string()
    } else {
        format!("Sorted by {}", keys.join(", "))
    }
}
