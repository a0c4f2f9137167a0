use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use crate::app::state::filter_status;
use crate::app::{App, AppScreen};

/// Title, status and shortcut rows around a screen; returns the content area
pub fn render_chrome(app: &App, f: &mut Frame<'_>, shortcuts: &[(&str, &str)]) -> Rect {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Title area
            Constraint::Min(5),    // Content area
            Constraint::Length(3), // Status area
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(f.area().inner(Margin::new(2, 1)));

    render_title_section(app, f, layout[0]);
    render_status_section(app, f, layout[2]);
    render_shortcuts(f, layout[3], shortcuts);

    layout[1]
}

fn render_title_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let title_block = Block::default()
        .title("== OIV Dashboard ==")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = title_block.inner(area);
    f.render_widget(title_block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let current = if app.screen.is_modal() {
        app.return_screen
    } else {
        app.screen
    };
    let titles = AppScreen::MAIN
        .iter()
        .enumerate()
        .map(|(index, screen)| TextLine::from(format!("{} {}", index + 1, screen.title())))
        .collect::<Vec<_>>();
    let mut tabs = Tabs::new(titles)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Rgb(0, 0, 238))
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));
    if let Some(index) = AppScreen::MAIN.iter().position(|screen| *screen == current) {
        tabs = tabs.select(index);
    }
    f.render_widget(tabs, rows[0]);

    f.render_widget(
        Paragraph::new(Text::from(summary_lines(app))).wrap(Wrap { trim: true }),
        rows[1],
    );
}

fn summary_lines(app: &App) -> Vec<TextLine<'static>> {
    let Some(views) = &app.views else {
        return vec![TextLine::from(Span::styled(
            format!("Reading {}", app.config.data_dir.display()),
            Style::default().fg(Color::Gray),
        ))];
    };

    let totals = views.totals;
    let selection = views.store.selection();
    let mut filter_line = vec![Span::styled(
        filter_status(selection),
        Style::default().fg(Color::Green),
    )];
    if selection.connections_only {
        filter_line.push(Span::styled(
            "  [connections only]",
            Style::default().fg(Color::Magenta),
        ));
    }

    vec![
        TextLine::from(filter_line),
        TextLine::from(Span::styled(
            format!(
                "Dataset: {} complexes, {} units, {} connections, {} themes",
                totals.complexes, totals.units, totals.edges, totals.themes
            ),
            Style::default().fg(Color::Gray),
        )),
    ]
}

fn render_status_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let status_block = Block::default()
        .title(" Status ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let style = if app.status_message.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };

    let status_paragraph = Paragraph::new(Text::from(Span::styled(&app.status_message, style)))
        .block(status_block)
        .wrap(Wrap { trim: true });
    f.render_widget(status_paragraph, area);
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect, shortcuts: &[(&str, &str)]) {
    let shortcuts_paragraph =
        Paragraph::new(shortcuts_line(shortcuts)).alignment(Alignment::Center);
    f.render_widget(shortcuts_paragraph, area);
}

pub fn shortcuts_line<'a>(shortcuts: &[(&'a str, &'a str)]) -> TextLine<'a> {
    let mut spans = Vec::with_capacity(shortcuts.len() * 2);
    for (index, (key, description)) in shortcuts.iter().enumerate() {
        spans.push(Span::styled(
            *key,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        let separator = if index + 1 == shortcuts.len() { "" } else { " | " };
        spans.push(Span::styled(
            format!(": {description}{separator}"),
            Style::default().fg(Color::Gray),
        ));
    }
    TextLine::from(spans)
}

/// Centered message inside a bordered block
pub fn render_empty_state(f: &mut Frame<'_>, area: Rect, title: &str, message: &str) {
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let vertical_pad = inner.height.saturating_sub(1) / 2;
    let text_area = Rect {
        y: inner.y + vertical_pad,
        height: inner.height.saturating_sub(vertical_pad),
        ..inner
    };
    f.render_widget(
        Paragraph::new(Text::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Gray),
        )))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true }),
        text_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcut_line_separates_entries() {
        let line = shortcuts_line(&[("q", "Quit"), ("?", "Help")]);
        let text: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(text, "q: Quit | ?: Help");
    }
}
