use oiv_core::FilterCategory;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, Tabs};
use ratatui::Frame;

use crate::app::filters::FilterDraft;
use crate::app::App;
use crate::ui::screens::chrome::shortcuts_line;
use crate::ui::widgets::popup::{centered_rect, popup_block, ClearWidget};
use crate::ui::widgets::tables::{scroll_offset, selected_row_style};

const SHORTCUTS: [(&str, &str); 8] = [
    ("←/→", "Category"),
    ("Space", "Toggle"),
    ("/", "Search"),
    ("c", "Clear category"),
    ("r", "Clear all"),
    ("t", "Connections only"),
    ("Enter", "Apply"),
    ("Esc", "Cancel"),
];

pub fn render_filters_popup(app: &App, f: &mut Frame<'_>) {
    let Some(draft) = &app.filter_draft else {
        return;
    };

    let popup_area = centered_rect(76, 76, f.area());
    f.render_widget(ClearWidget, popup_area);

    let block = popup_block("== Filters ==", Color::Yellow);
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Categories
            Constraint::Length(1), // Search
            Constraint::Length(1), // Priority note
            Constraint::Min(3),    // Entries
            Constraint::Length(1), // Shortcuts
        ])
        .split(inner);

    render_categories(draft, f, layout[0]);
    f.render_widget(Paragraph::new(search_line(draft)), layout[1]);
    f.render_widget(Paragraph::new(priority_line(draft)), layout[2]);
    render_entries(draft, f, layout[3]);
    f.render_widget(Paragraph::new(shortcuts_line(&SHORTCUTS)), layout[4]);
}

fn render_categories(draft: &FilterDraft, f: &mut Frame<'_>, area: Rect) {
    let titles = FilterCategory::PRIORITY
        .iter()
        .map(|category| {
            let count = draft.selection.ids(*category).len();
            if count == 0 {
                TextLine::from(category.label())
            } else {
                TextLine::from(format!("{} ({count})", category.label()))
            }
        })
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .select(draft.category.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Rgb(0, 0, 238))
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));
    f.render_widget(tabs, area);
}

fn search_line(draft: &FilterDraft) -> TextLine<'static> {
    let label = Span::styled("Search: ", Style::default().fg(Color::Yellow));
    if draft.searching {
        TextLine::from(vec![
            label,
            Span::styled(
                format!("{}_", draft.query),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    } else if draft.query.is_empty() {
        TextLine::from(vec![
            label,
            Span::styled("press / to type", Style::default().fg(Color::DarkGray)),
        ])
    } else {
        TextLine::from(vec![label, Span::raw(draft.query.clone())])
    }
}

/// Which category will drive the result once applied
fn priority_line(draft: &FilterDraft) -> TextLine<'static> {
    let selection = &draft.selection;
    let mut spans = match selection.active_category() {
        None => vec![Span::styled(
            "Nothing selected: the views stay empty",
            Style::default().fg(Color::DarkGray),
        )],
        Some(active) => {
            let mut spans = vec![Span::styled(
                format!("Applies: {}", active.label()),
                Style::default().fg(Color::Green),
            )];
            let shadowed = selection.shadowed_categories();
            if !shadowed.is_empty() {
                let names: Vec<&str> = shadowed.iter().map(|category| category.label()).collect();
                spans.push(Span::styled(
                    format!("  ignored: {}", names.join(", ")),
                    Style::default().fg(Color::Red),
                ));
            }
            spans
        }
    };
    if selection.connections_only {
        spans.push(Span::styled(
            "  [connections only]",
            Style::default().fg(Color::Magenta),
        ));
    }
    TextLine::from(spans)
}

fn render_entries(draft: &FilterDraft, f: &mut Frame<'_>, area: Rect) {
    let entries = draft.visible();
    if entries.is_empty() {
        let message = if draft.query.is_empty() {
            format!("No {} in the dataset.", draft.category.label().to_lowercase())
        } else {
            format!("Nothing matches \"{}\".", draft.query)
        };
        f.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(Color::Gray))),
            area,
        );
        return;
    }

    let max_visible_rows = usize::from(area.height);
    let offset = scroll_offset(entries.len(), max_visible_rows, draft.cursor);

    let rows: Vec<Row<'_>> = entries
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(index, entry)| {
            let mark = if draft.is_selected(entry) { "[x]" } else { "[ ]" };
            let id = if entry.id == entry.label {
                String::new()
            } else {
                entry.id.clone()
            };
            let style = if index == draft.cursor {
                selected_row_style()
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(mark),
                Cell::from(entry.label.clone()),
                Cell::from(Span::styled(id, Style::default().fg(Color::DarkGray))),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Fill(3),
            Constraint::Fill(1),
        ],
    )
    .column_spacing(1);
    f.render_widget(table, area);
}
