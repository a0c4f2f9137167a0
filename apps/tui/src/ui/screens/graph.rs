use oiv_core::UnitDetails;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, Views};
use crate::ui::screens::chrome::{render_chrome, render_empty_state};
use crate::ui::widgets::graph::render_scene;

const SHORTCUTS: [(&str, &str); 8] = [
    ("↑/↓", "Focus unit"),
    ("Enter", "Detail"),
    ("Esc", "Clear focus"),
    ("f", "Filters"),
    ("c", "Connections only"),
    ("r", "Reset"),
    ("Tab", "Next view"),
    ("q", "Quit"),
];

pub fn render_graph(app: &App, f: &mut Frame<'_>, views: &Views) {
    let content = render_chrome(app, f, &SHORTCUTS);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(38)])
        .split(content);

    let scene = views.graph.borrow();
    if scene.is_empty() {
        let message = app.load_error.as_ref().map_or_else(
            || "No OIV match the current filters. Press f to pick some.".to_string(),
            |error| format!("Dataset unavailable: {error}"),
        );
        render_empty_state(f, columns[0], " Relationship graph ", &message);
    } else {
        let info = views.info.borrow();
        render_scene(f, columns[0], &scene, info.focused());
    }
    drop(scene);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(4)])
        .split(columns[1]);

    render_stats(views, f, sidebar[0]);
    render_info(views, f, sidebar[1]);
}

fn render_stats(views: &Views, f: &mut Frame<'_>, area: Rect) {
    let sidebar = *views.sidebar.borrow();
    let stats = sidebar.stats;
    let label = Style::default().fg(Color::Gray);
    let value = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let row = |name: &'static str, count: usize| {
        TextLine::from(vec![
            Span::styled(format!("{name:<13}"), label),
            Span::styled(count.to_string(), value),
        ])
    };

    let mut lines = vec![
        row("Complexes", stats.complexes),
        row("OIV", stats.units),
        row("Themes", stats.themes),
        row("Connections", stats.edges),
        row("Strategies", stats.strategies),
        row("Programs", stats.programs),
    ];
    if sidebar.linked_units > 0 {
        lines.push(TextLine::from(Span::styled(
            format!("+{} linked OIV outside the filter", sidebar.linked_units),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let title = sidebar
        .category
        .map_or_else(|| " Selection ".to_string(), |category| format!(" {} ", category.label()));
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn render_info(views: &Views, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" OIV ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines = views
        .info
        .borrow()
        .details()
        .map_or_else(
            || {
                vec![TextLine::from(Span::styled(
                    "Use ↑/↓ to focus a unit",
                    Style::default().fg(Color::Gray),
                ))]
            },
            |details| detail_lines(&details),
        );

    f.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn detail_lines(details: &UnitDetails) -> Vec<TextLine<'static>> {
    let heading = Style::default().add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(Color::Gray);

    let mut lines = vec![
        TextLine::from(Span::styled(
            details.name.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        TextLine::from(Span::styled(details.id.clone(), muted)),
    ];
    if let Some(complex) = &details.complex {
        lines.push(TextLine::from(format!("Complex: {complex}")));
    }
    if details.linked_only {
        lines.push(TextLine::from(Span::styled(
            "Shown as a connection endpoint only",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for (title, names) in [
        ("Strategies", &details.strategies),
        ("Programs", &details.programs),
        ("Projects", &details.projects),
    ] {
        if !names.is_empty() {
            lines.push(TextLine::from(vec![
                Span::styled(format!("{title}: "), heading),
                Span::raw(names.join(", ")),
            ]));
        }
    }

    for (title, arrow, connections) in [
        ("Outgoing", "→", &details.outgoing),
        ("Incoming", "←", &details.incoming),
    ] {
        lines.push(TextLine::from(""));
        lines.push(TextLine::from(Span::styled(
            format!("{title} ({})", connections.len()),
            heading,
        )));
        for connection in connections {
            let mut text = format!("{arrow} {}", connection.other);
            if !connection.theme.is_empty() {
                text.push_str(&format!(" · {}", connection.theme));
            }
            lines.push(TextLine::from(text));
            if !connection.label.is_empty() {
                lines.push(TextLine::from(Span::styled(
                    format!("  {}", connection.label),
                    muted,
                )));
            }
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use oiv_core::info::ConnectionSummary;

    #[test]
    fn detail_lines_list_both_directions() {
        let details = UnitDetails {
            id: "A".to_string(),
            name: "Alpha".to_string(),
            complex: Some("Economy".to_string()),
            linked_only: false,
            strategies: vec!["Growth".to_string()],
            programs: Vec::new(),
            projects: Vec::new(),
            outgoing: vec![ConnectionSummary {
                edge_id: "e1".to_string(),
                other: "Gamma".to_string(),
                theme: "Roads".to_string(),
                label: String::new(),
            }],
            incoming: Vec::new(),
        };

        let text: Vec<String> = detail_lines(&details)
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
            .collect();
        assert!(text.contains(&"Complex: Economy".to_string()));
        assert!(text.contains(&"Strategies: Growth".to_string()));
        assert!(text.contains(&"→ Gamma · Roads".to_string()));
        assert!(text.contains(&"Incoming (0)".to_string()));
        assert!(!text.iter().any(|line| line.starts_with("Programs")));
    }
}
