use crate::app::state::{App, AppScreen};
use crossterm::event::KeyCode;

/// Keys shared by the graph, table and dashboard screens
pub fn handle_global_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('1') => app.show_screen(AppScreen::Graph),
        KeyCode::Char('2') => app.show_screen(AppScreen::Table),
        KeyCode::Char('3') => app.show_screen(AppScreen::Dashboard),
        KeyCode::Tab => app.next_screen(),
        KeyCode::Char('f') => app.open_filters(),
        KeyCode::Char('r') => app.reset_filters(),
        KeyCode::Char('c') => app.toggle_connections_only(),
        _ => return false,
    }
    app.clamp_table_cursors();
    true
}
