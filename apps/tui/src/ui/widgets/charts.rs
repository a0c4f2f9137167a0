use oiv_core::ChartBar;
use ratatui::layout::{Direction, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Tabs};
use ratatui::Frame;

use crate::app::App;

pub const CHART_TITLES: [&str; 3] = ["By theme", "By source", "Summary"];

const BAR_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::LightBlue,
    Color::LightRed,
];

pub fn render_chart_tabs(app: &App, f: &mut Frame<'_>, area: Rect) {
    let titles = CHART_TITLES
        .iter()
        .map(|title| TextLine::from(*title))
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .select(app.chart_tab_index)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Rgb(0, 0, 238))
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));

    f.render_widget(tabs, area);
}

/// Horizontal bars, one line each, starting at `scroll`
pub fn render_bar_chart(f: &mut Frame<'_>, area: Rect, title: &str, bars: &[ChartBar], scroll: usize) {
    let rows = usize::from(area.height.saturating_sub(2));
    let start = scroll.min(bars.len().saturating_sub(rows.max(1)));
    let label_width = usize::from(area.width / 3).max(8);

    let shown: Vec<Bar<'_>> = bars
        .iter()
        .enumerate()
        .skip(start)
        .take(rows)
        .map(|(index, bar)| {
            Bar::default()
                .value(bar.count as u64)
                .label(TextLine::from(super::tables::truncate(&bar.label, label_width)))
                .style(Style::default().fg(BAR_COLORS[index % BAR_COLORS.len()]))
                .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        })
        .collect();

    let max_value = bars.iter().map(|bar| bar.count).max().unwrap_or(0).max(1);

    let title = if bars.len() > rows {
        format!("{title} [{}-{} of {}]", start + 1, start + shown.len(), bars.len())
    } else {
        title.to_string()
    };

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&shown))
        .max(max_value as u64)
        .bar_gap(0)
        .bar_width(1);

    f.render_widget(chart, area);
}
