use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, WhichUse, BRAILLE_SIX};

use crate::app::App;
use crate::ui::screens::chrome::render_chrome;

pub fn render_loading(app: &App, f: &mut Frame<'_>) {
    let content = render_chrome(app, f, &[("F1", "Help"), ("q", "Quit")]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(content);
    f.render_widget(block, content);

    let label = format!("Loading dataset from {}", app.config.data_dir.display());
    let width = u16::try_from(label.chars().count() + 2).unwrap_or(u16::MAX);
    let line = centered_line(inner, width);

    let throbber = Throbber::default()
        .label(label)
        .style(Style::default().fg(Color::Gray))
        .throbber_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .throbber_set(BRAILLE_SIX)
        .use_type(WhichUse::Spin);

    // The widget advances nothing itself; `App::update` steps the shared state.
    let mut state = app.throbber_state.clone();
    f.render_stateful_widget(throbber, line, &mut state);
}

fn centered_line(area: Rect, width: u16) -> Rect {
    let row = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(area)[1];
    let width = width.min(row.width);
    Rect {
        x: row.x + (row.width - width) / 2,
        width,
        ..row
    }
}
