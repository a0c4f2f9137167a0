use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use crate::app::state::App;
use crossterm::event::KeyCode;

/// Theme bars, source bars and the summary cross-tab
pub const CHART_TABS: usize = 3;

pub async fn handle_dashboard_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Left => {
            app.chart_tab_index = wrap_decrement(app.chart_tab_index, CHART_TABS);
            app.dashboard_scroll = 0;
        }
        KeyCode::Right => {
            app.chart_tab_index = wrap_increment(app.chart_tab_index, CHART_TABS);
            app.dashboard_scroll = 0;
        }
        KeyCode::Up => app.dashboard_scroll = app.dashboard_scroll.saturating_sub(1),
        KeyCode::Down => app.dashboard_scroll += 1,
        KeyCode::Char('x') => app.export_requested = true,
        KeyCode::Char('l') => app.follow_live_filters().await,
        _ => {}
    }
}
