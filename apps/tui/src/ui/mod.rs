pub mod screens;
pub mod widgets;

use ratatui::Frame;

use crate::app::{App, AppScreen};

pub fn ui(app: &App, f: &mut Frame<'_>) {
    let base = if app.screen.is_modal() {
        app.return_screen
    } else {
        app.screen
    };

    match (&app.views, base) {
        (Some(views), AppScreen::Graph) => screens::graph::render_graph(app, f, views),
        (Some(views), AppScreen::Table) => screens::table::render_table(app, f, views),
        (Some(views), AppScreen::Dashboard) => {
            screens::dashboard::render_dashboard(app, f, views);
        }
        _ => screens::loading::render_loading(app, f),
    }

    match app.screen {
        AppScreen::Filters => screens::filters::render_filters_popup(app, f),
        AppScreen::Columns => screens::columns::render_columns_popup(app, f),
        _ => {}
    }

    if app.show_help {
        screens::help::render_help_popup(app, f);
    }
}
