use crate::app::state::App;
use crossterm::event::KeyCode;

pub async fn handle_graph_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Down | KeyCode::Char('j') => {
            if let Some(views) = &app.views {
                views.info.borrow_mut().focus_next();
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if let Some(views) = &app.views {
                views.info.borrow_mut().focus_prev();
            }
        }
        KeyCode::Enter | KeyCode::Char('d') => app.open_detail().await,
        KeyCode::Esc => {
            if let Some(views) = &app.views {
                views.info.borrow_mut().clear_focus();
            }
        }
        _ => {}
    }
}
