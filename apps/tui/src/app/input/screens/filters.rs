use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_filters_input(app: &mut App, key: KeyCode) {
    if app.views.is_none() || app.filter_draft.is_none() {
        app.close_modal();
        return;
    }
    let (Some(views), Some(draft)) = (&app.views, &mut app.filter_draft) else {
        return;
    };
    let dataset = views.dataset();

    if draft.searching {
        match key {
            KeyCode::Char(ch) => draft.push_query(ch),
            KeyCode::Backspace => draft.pop_query(),
            KeyCode::Enter | KeyCode::Esc | KeyCode::Down => draft.searching = false,
            _ => {}
        }
        return;
    }

    match key {
        KeyCode::Left => draft.prev_category(dataset),
        KeyCode::Right | KeyCode::Tab => draft.next_category(dataset),
        KeyCode::Up => draft.cursor_up(),
        KeyCode::Down => draft.cursor_down(),
        KeyCode::Char(' ') => {
            draft.toggle_current();
        }
        KeyCode::Char('/') => draft.searching = true,
        KeyCode::Char('c') => draft.clear_category(),
        KeyCode::Char('r') => draft.clear_all(),
        KeyCode::Char('t') => {
            draft.selection.connections_only = !draft.selection.connections_only;
        }
        KeyCode::Enter => app.apply_filter_draft(),
        KeyCode::Esc => app.close_modal(),
        _ => {}
    }
}
