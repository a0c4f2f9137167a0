use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::cli::CliArgs;
use crate::ui::widgets::popup::{centered_rect, popup_block, ClearWidget};

const SECTIONS: [(&str, &[(&str, &str)]); 5] = [
    (
        "Anywhere",
        &[
            ("1 2 3 / Tab", "Graph, connections table, dashboard"),
            ("f", "Open the filter picker"),
            ("r", "Clear every filter"),
            ("c", "Toggle connections only"),
            ("? / F1", "Toggle this help"),
            ("q", "Quit"),
        ],
    ),
    (
        "Graph",
        &[
            ("↑/↓ j/k", "Focus the next or previous unit"),
            ("Enter / d", "Open the dashboard for the focused unit"),
            ("Esc", "Clear the focus"),
        ],
    ),
    (
        "Connections table",
        &[
            ("←/→ ↑/↓", "Move the column and row cursor"),
            ("PgUp/PgDn Home/End", "Change page"),
            ("/", "Search all columns"),
            ("k", "Filter the focused column"),
            ("s / S", "Sort by the focused column / add it as the next sort key"),
            ("x", "Clear table search and sort"),
            ("o", "Choose and reorder columns"),
            ("Enter", "Focus the row's source unit in the graph"),
        ],
    ),
    (
        "Dashboard",
        &[
            ("←/→", "Switch chart"),
            ("↑/↓", "Scroll"),
            ("x", "Export the workbook as JSON"),
            ("l", "Drop the pinned detail selection"),
        ],
    ),
    (
        "Filter picker",
        &[
            ("←/→ Tab", "Switch category"),
            ("Space", "Select or unselect"),
            ("/", "Fuzzy search the list"),
            ("c / r", "Clear the category / everything"),
            ("t", "Toggle connections only"),
            ("Enter / Esc", "Apply / discard"),
        ],
    ),
];

pub fn render_help_popup(_app: &App, f: &mut Frame<'_>) {
    let popup_area = centered_rect(80, 80, f.area());
    f.render_widget(ClearWidget, popup_area);

    let help_paragraph = Paragraph::new(Text::from(build_help_lines()))
        .block(popup_block("== Help & Keyboard Shortcuts ==", Color::Yellow))
        .wrap(Wrap { trim: false });
    f.render_widget(help_paragraph, popup_area);

    let hint = Paragraph::new(Text::from(TextLine::from(vec![Span::styled(
        "Press ? or Esc to close",
        Style::default().fg(Color::Gray),
    )])))
    .alignment(Alignment::Center);

    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(2),
        width: popup_area.width,
        height: 1,
    };
    f.render_widget(hint, hint_area);
}

fn build_help_lines() -> Vec<TextLine<'static>> {
    let mut lines = vec![
        TextLine::from(vec![Span::styled(
            "OIV Dashboard",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]),
        TextLine::from(""),
        TextLine::from(
            "Explore how executive bodies (OIV) connect. Only the highest-priority filter category with a selection applies: Source OIV, Target OIV, Themes, Complexes, Strategies, Programs, Connections.",
        ),
    ];

    for (title, keys) in SECTIONS {
        lines.push(TextLine::from(""));
        lines.push(TextLine::from(vec![Span::styled(
            format!("{title}:"),
            Style::default().add_modifier(Modifier::BOLD),
        )]));
        for (key, description) in keys {
            lines.push(TextLine::from(vec![
                Span::styled(
                    format!("  {key}"),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" - {description}")),
            ]));
        }
    }

    lines.push(TextLine::from(""));
    lines.push(TextLine::from(vec![Span::styled(
        "Command line:",
        Style::default().add_modifier(Modifier::BOLD),
    )]));
    lines.extend(
        CliArgs::help_text()
            .lines()
            .map(|line| TextLine::from(Span::styled(line.to_string(), Style::default().fg(Color::Gray)))),
    );

    lines
}
