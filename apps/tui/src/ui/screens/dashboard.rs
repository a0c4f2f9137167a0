use oiv_core::Sheet;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::app::{App, Views};
use crate::ui::screens::chrome::{render_chrome, render_empty_state};
use crate::ui::widgets::charts::{render_bar_chart, render_chart_tabs};
use crate::ui::widgets::tables::{header_row, header_style, truncate};

const SHORTCUTS: [(&str, &str); 7] = [
    ("←/→", "Chart"),
    ("↑/↓", "Scroll"),
    ("x", "Export"),
    ("l", "Follow filters"),
    ("f", "Filters"),
    ("Tab", "Next view"),
    ("q", "Quit"),
];

pub fn render_dashboard(app: &App, f: &mut Frame<'_>, views: &Views) {
    let content = render_chrome(app, f, &SHORTCUTS);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Chart tabs
            Constraint::Length(1), // Source of the data
            Constraint::Min(3),    // Chart
        ])
        .split(content);

    render_chart_tabs(app, f, layout[0]);

    let dashboard = views.dashboard.borrow();
    let source = if dashboard.is_pinned() {
        TextLine::from(vec![
            Span::styled(
                "Pinned to the detail selection",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  (l to follow the filters)", Style::default().fg(Color::Gray)),
        ])
    } else {
        TextLine::from(Span::styled(
            "Following the current filters",
            Style::default().fg(Color::Gray),
        ))
    };
    f.render_widget(Paragraph::new(source), layout[1]);

    let summary = dashboard.summary();
    if summary.is_empty() {
        render_empty_state(
            f,
            layout[2],
            " Dashboard ",
            "No connections to chart. Press f to pick filters.",
        );
        return;
    }

    match app.chart_tab_index {
        0 => render_bar_chart(
            f,
            layout[2],
            &format!(" Connections by theme ({} total) ", summary.total_edges),
            &summary.by_theme,
            app.dashboard_scroll,
        ),
        1 => render_bar_chart(
            f,
            layout[2],
            &format!(" Connections by source ({} total) ", summary.total_edges),
            &summary.by_source,
            app.dashboard_scroll,
        ),
        _ => render_cross_tab(f, layout[2], dashboard.cross_tab(), app.dashboard_scroll),
    }
}

fn render_cross_tab(f: &mut Frame<'_>, area: Rect, sheet: &Sheet, scroll: usize) {
    let visible = usize::from(area.height.saturating_sub(3));
    let body = sheet.rows.len().saturating_sub(1);
    let start = scroll.min(body.saturating_sub(visible.saturating_sub(1)));

    let header = header_row(
        sheet
            .header
            .iter()
            .map(|title| TextLine::from(truncate(title, 14))),
    );

    // Keep the totals row pinned under the scrolled body
    let mut rows: Vec<Row<'_>> = sheet.rows[..body]
        .iter()
        .skip(start)
        .take(visible.saturating_sub(1))
        .map(|row| Row::new(row.iter().map(|value| Cell::from(value.as_str())).collect::<Vec<_>>()))
        .collect();
    if let Some(totals) = sheet.rows.last() {
        rows.push(
            Row::new(totals.iter().map(|value| Cell::from(value.as_str())).collect::<Vec<_>>())
                .style(header_style()),
        );
    }

    let mut widths = vec![Constraint::Length(24)];
    widths.extend(sheet.header.iter().skip(1).map(|_| Constraint::Length(8)));

    let title = if body > visible.saturating_sub(1) {
        format!(" Source × theme [{}-{} of {body}] ", start + 1, (start + visible.saturating_sub(1)).min(body))
    } else {
        " Source × theme ".to_string()
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .column_spacing(1);

    f.render_widget(table, area);
}
