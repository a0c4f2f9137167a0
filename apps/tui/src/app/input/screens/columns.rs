use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use crate::app::state::App;
use crossterm::event::KeyCode;

pub async fn handle_columns_input(app: &mut App, key: KeyCode) {
    let Some(views) = &app.views else {
        return;
    };
    let order = views.table.borrow().layout().order().to_vec();
    let Some(column) = order.get(app.columns_cursor).copied() else {
        app.columns_cursor = 0;
        return;
    };

    match key {
        KeyCode::Up => app.columns_cursor = wrap_decrement(app.columns_cursor, order.len()),
        KeyCode::Down => app.columns_cursor = wrap_increment(app.columns_cursor, order.len()),
        KeyCode::Char(' ') => {
            if !views.table.borrow_mut().toggle_column(column) {
                app.status_message = "At least one column must stay visible".to_string();
            }
        }
        KeyCode::Char('[') => {
            if views.table.borrow_mut().shift_column(column, false) {
                app.columns_cursor -= 1;
            }
        }
        KeyCode::Char(']') => {
            if views.table.borrow_mut().shift_column(column, true) {
                app.columns_cursor += 1;
            }
        }
        KeyCode::Enter => app.save_columns().await,
        KeyCode::Esc => app.revert_columns(),
        _ => {}
    }
    app.clamp_table_cursors();
}
