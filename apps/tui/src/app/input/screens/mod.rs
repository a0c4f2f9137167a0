use crate::app::state::{App, AppScreen, TableInput};
use crossterm::event::KeyCode;

mod columns;
mod dashboard;
mod filters;
mod global;
mod graph;
mod help;
mod table;

pub async fn dispatch_input(app: &mut App, key: KeyCode) {
    if help::handle_help_toggle(app, key) {
        return;
    }

    match app.screen {
        AppScreen::Loading => {
            if matches!(key, KeyCode::Char('q') | KeyCode::Esc) {
                app.running = false;
            }
        }
        AppScreen::Filters => filters::handle_filters_input(app, key),
        AppScreen::Columns => columns::handle_columns_input(app, key).await,
        AppScreen::Table if app.table_input != TableInput::Normal => {
            table::handle_table_text_input(app, key);
        }
        AppScreen::Graph | AppScreen::Table | AppScreen::Dashboard => {
            if global::handle_global_input(app, key) {
                return;
            }
            match app.screen {
                AppScreen::Graph => graph::handle_graph_input(app, key).await,
                AppScreen::Table => table::handle_table_input(app, key),
                AppScreen::Dashboard => dashboard::handle_dashboard_input(app, key).await,
                _ => {}
            }
        }
    }
}
