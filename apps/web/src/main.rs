use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::Arc;

use oiv_core::storage::{
    encode_selection, layout_or_default, selection_or_empty, COLUMN_ORDER_KEY,
    DASHBOARD_FILTERS_KEY, SELECTED_COLUMNS_KEY,
};
use oiv_core::{
    parse_catalog_value, Catalogs, ChartBar, CatalogEntry, DashboardSummary, DataFile, Dataset,
    SelectionStats, SelectionStore, TableController,
};
use ratzilla::ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line as TextLine, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap},
    Terminal,
};
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Request, RequestInit, RequestMode, Response, Storage};

const DATA_URL: &str = "/data/data.json";
const STRATEGIES_URL: &str = "/data/strategies.json";
const PROGRAMS_URL: &str = "/data/programs.json";

const TAB_TITLES: [&str; 3] = ["Themes", "Sources", "Connections"];
const TABLE_PAGE_SIZE: usize = 50;

/// Everything the page shows once the dataset is in
struct Loaded {
    store: SelectionStore,
    table: Rc<RefCell<TableController>>,
}

impl Loaded {
    fn new(dataset: Dataset, storage: Option<&Storage>) -> Self {
        let selection = selection_or_empty(read_item(storage, DASHBOARD_FILTERS_KEY).as_deref());
        let layout = layout_or_default(
            read_item(storage, SELECTED_COLUMNS_KEY).as_deref(),
            read_item(storage, COLUMN_ORDER_KEY).as_deref(),
        );

        let mut store = SelectionStore::with_selection(Arc::new(dataset), selection);
        let mut table = TableController::new(TABLE_PAGE_SIZE);
        table.set_layout(layout);
        let table = Rc::new(RefCell::new(table));
        store.register(&table);

        Self { store, table }
    }

    /// Lines the active tab can scroll through
    fn scroll_len(&self, tab_index: usize) -> usize {
        match tab_index {
            0 => DashboardSummary::build(self.store.filtered()).by_theme.len(),
            1 => DashboardSummary::build(self.store.filtered()).by_source.len(),
            _ => self.table.borrow().page_rows().len(),
        }
    }

    fn persist_selection(&self, storage: Option<&Storage>) {
        let Some(storage) = storage else {
            return;
        };
        let result = if self.store.selection().is_empty() {
            storage.remove_item(DASHBOARD_FILTERS_KEY)
        } else {
            match encode_selection(self.store.selection()) {
                Ok(raw) => storage.set_item(DASHBOARD_FILTERS_KEY, &raw),
                Err(error) => {
                    log_error(&format!("Failed to encode dashboard filters: {error}"));
                    return;
                }
            }
        };
        if result.is_err() {
            log_error("Failed to write dashboard filters to localStorage");
        }
    }
}

enum LoadState {
    Loading,
    Failed(String),
    Ready(Box<Loaded>),
}

fn main() -> io::Result<()> {
    let state = Rc::new(RefCell::new(LoadState::Loading));
    let tab_index = Rc::new(RefCell::new(0_usize));
    let row_offset = Rc::new(RefCell::new(0_usize));

    spawn_local(load(state.clone()));

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let state = state.clone();
        let tab_index = tab_index.clone();
        let row_offset = row_offset.clone();
        move |event| match event.code {
            ratzilla::event::KeyCode::Left => {
                let mut index = tab_index.borrow_mut();
                *index = if *index == 0 { TAB_TITLES.len() - 1 } else { *index - 1 };
                *row_offset.borrow_mut() = 0;
            }
            ratzilla::event::KeyCode::Right => {
                let mut index = tab_index.borrow_mut();
                *index = (*index + 1) % TAB_TITLES.len();
                *row_offset.borrow_mut() = 0;
            }
            ratzilla::event::KeyCode::Up => {
                let mut offset = row_offset.borrow_mut();
                *offset = offset.saturating_sub(1);
            }
            ratzilla::event::KeyCode::Down => {
                if let LoadState::Ready(loaded) = &*state.borrow() {
                    let len = loaded.scroll_len(*tab_index.borrow());
                    let mut offset = row_offset.borrow_mut();
                    *offset = scroll_down(*offset, len);
                }
            }
            ratzilla::event::KeyCode::Char('n') => {
                if let LoadState::Ready(loaded) = &*state.borrow() {
                    if loaded.table.borrow_mut().next_page() {
                        *row_offset.borrow_mut() = 0;
                    }
                }
            }
            ratzilla::event::KeyCode::Char('p') => {
                if let LoadState::Ready(loaded) = &*state.borrow() {
                    if loaded.table.borrow_mut().prev_page() {
                        *row_offset.borrow_mut() = 0;
                    }
                }
            }
            ratzilla::event::KeyCode::Char('c') => {
                if let LoadState::Ready(loaded) = &mut *state.borrow_mut() {
                    let enabled = !loaded.store.selection().connections_only;
                    loaded.store.set_connections_only(enabled);
                    loaded.persist_selection(local_storage().as_ref());
                }
            }
            ratzilla::event::KeyCode::Char('r') => {
                if let LoadState::Ready(loaded) = &mut *state.borrow_mut() {
                    loaded.store.reset();
                    loaded.persist_selection(local_storage().as_ref());
                    *row_offset.borrow_mut() = 0;
                }
            }
            ratzilla::event::KeyCode::Char(digit @ '1'..='3') => {
                *tab_index.borrow_mut() = usize::from(digit as u8 - b'1');
                *row_offset.borrow_mut() = 0;
            }
            _ => {}
        }
    });

    terminal.draw_web(move |f| {
        let area = f.area();
        let block = Block::default()
            .title("OIV Dashboard")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));
        let inner = block.inner(area).inner(Margin::new(1, 1));
        f.render_widget(block, area);

        match &*state.borrow() {
            LoadState::Ready(loaded) => {
                let index = *tab_index.borrow();
                let row_offset = *row_offset.borrow();
                render_dashboard(loaded, index, row_offset, f, inner);
            }
            LoadState::Failed(error) => render_message(f, inner, &format!("Dataset unavailable: {error}")),
            LoadState::Loading => render_message(f, inner, "Loading /data/data.json..."),
        }
    });

    Ok(())
}

/// Next offset, stopping on the last line
const fn scroll_down(offset: usize, len: usize) -> usize {
    let last = len.saturating_sub(1);
    if offset < last {
        offset + 1
    } else {
        last
    }
}

fn render_message(f: &mut ratzilla::ratatui::Frame<'_>, area: Rect, message: &str) {
    let paragraph = Paragraph::new(Text::from(TextLine::from(message.to_string())))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_dashboard(
    loaded: &Loaded,
    tab_index: usize,
    row_offset: usize,
    f: &mut ratzilla::ratatui::Frame<'_>,
    area: Rect,
) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);

    let filtered = loaded.store.filtered();
    let stats = SelectionStats::from_filtered(filtered);
    let summary = DashboardSummary::build(filtered);

    render_header(loaded, &stats, f, main_layout[0]);
    render_tabs(tab_index, f, main_layout[1]);

    if summary.is_empty() {
        render_empty(f, main_layout[2]);
    } else {
        match tab_index {
            0 => render_text_bars(
                &format!("Connections by theme ({})", summary.total_edges),
                &summary.by_theme,
                row_offset,
                f,
                main_layout[2],
            ),
            1 => render_text_bars(
                &format!("Connections by source ({})", summary.total_edges),
                &summary.by_source,
                row_offset,
                f,
                main_layout[2],
            ),
            _ => render_connections(&loaded.table.borrow(), row_offset, f, main_layout[2]),
        }
    }

    let hint = Paragraph::new(TextLine::from(Span::styled(
        "←/→ tabs  ↑/↓ scroll  n/p page  c connections only  r reset filters",
        Style::default().fg(Color::Gray),
    )))
    .alignment(Alignment::Center);
    f.render_widget(hint, main_layout[3]);
}

fn render_header(
    loaded: &Loaded,
    stats: &SelectionStats,
    f: &mut ratzilla::ratatui::Frame<'_>,
    area: Rect,
) {
    let selection = loaded.store.selection();
    let filter = selection.active_category().map_or_else(
        || "No filters stored: pick some in the graph view".to_string(),
        |category| {
            format!(
                "Filtering by {} ({}){}",
                category.label(),
                selection.ids(category).len(),
                if selection.connections_only {
                    ", connections only"
                } else {
                    ""
                }
            )
        },
    );

    let lines = vec![
        TextLine::from(Span::styled(filter, Style::default().fg(Color::Green))),
        TextLine::from(Span::styled(
            format!(
                "Complexes: {}  OIV: {}  Themes: {}  Connections: {}  Strategies: {}  Programs: {}",
                stats.complexes,
                stats.units,
                stats.themes,
                stats.edges,
                stats.strategies,
                stats.programs
            ),
            Style::default().fg(Color::White),
        )),
    ];

    let block = Block::default()
        .title("Overview")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn render_tabs(tab_index: usize, f: &mut ratzilla::ratatui::Frame<'_>, area: Rect) {
    let tabs = Tabs::new(TAB_TITLES.iter().map(|title| TextLine::from(*title)).collect::<Vec<_>>())
        .select(tab_index)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Rgb(0, 0, 238))
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));
    f.render_widget(tabs, area);
}

fn render_empty(f: &mut ratzilla::ratatui::Frame<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let paragraph = Paragraph::new(Text::from(vec![
        TextLine::from(""),
        TextLine::from(Span::styled(
            "No data for the selected filters",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        TextLine::from(Span::styled(
            "Choose OIV or themes in the graph view and open the dashboard again.",
            Style::default().fg(Color::Gray),
        )),
    ]))
    .block(block)
    .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

/// One `█░` bar per line, scaled to the largest count
fn render_text_bars(
    title: &str,
    bars: &[ChartBar],
    row_offset: usize,
    f: &mut ratzilla::ratatui::Frame<'_>,
    area: Rect,
) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let colors = [Color::Cyan, Color::Yellow, Color::Magenta, Color::Green];
    let label_width = bars
        .iter()
        .map(|bar| bar.label.chars().count())
        .max()
        .unwrap_or(0)
        .min(usize::from(inner.width / 3));
    let bar_width = usize::from(inner.width).saturating_sub(label_width + 8).max(1);
    let max_value = bars.iter().map(|bar| bar.count).max().unwrap_or(1).max(1);
    let start = row_offset.min(bars.len().saturating_sub(1));

    let lines: Vec<TextLine<'_>> = bars
        .iter()
        .enumerate()
        .skip(start)
        .take(usize::from(inner.height))
        .map(|(index, bar)| {
            let fill = (bar.count * bar_width / max_value).clamp(1, bar_width);
            let color = colors[index % colors.len()];
            let label: String = bar.label.chars().take(label_width).collect();
            TextLine::from(vec![
                Span::styled(format!("{label:<label_width$} "), Style::default().fg(color)),
                Span::styled(
                    format!("{}{}", "█".repeat(fill), "░".repeat(bar_width - fill)),
                    Style::default().fg(color),
                ),
                Span::raw(format!("  {}", bar.count)),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn render_connections(
    table: &TableController,
    row_offset: usize,
    f: &mut ratzilla::ratatui::Frame<'_>,
    area: Rect,
) {
    let columns = table.layout().visible_columns();
    let header = Row::new(
        columns
            .iter()
            .map(|column| Cell::from(column.label()))
            .collect::<Vec<_>>(),
    )
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let page_rows = table.page_rows();
    let rows: Vec<Row<'_>> = page_rows
        .iter()
        .skip(row_offset.min(page_rows.len().saturating_sub(1)))
        .map(|row| {
            Row::new(
                columns
                    .iter()
                    .map(|column| Cell::from(row.cell(*column).to_string()))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let widths: Vec<Constraint> = columns.iter().map(|_| Constraint::Fill(1)).collect();
    let title = format!(
        "Connections, page {}/{} ({} rows)",
        table.page() + 1,
        table.page_count(),
        table.matching_rows()
    );

    let widget = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Gray)),
        )
        .column_spacing(1);
    f.render_widget(widget, area);
}

fn log_error(message: &str) {
    web_sys::console::error_1(&message.into());
}

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn read_item(storage: Option<&Storage>, key: &str) -> Option<String> {
    storage?.get_item(key).ok().flatten()
}

async fn fetch_json(window: &web_sys::Window, url: &str) -> Result<JsValue, String> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::SameOrigin);

    let request =
        Request::new_with_str_and_init(url, &opts).map_err(|_| format!("Bad request for {url}"))?;
    let response_value = wasm_bindgen_futures::JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|_| format!("Failed to fetch {url}"))?;
    let response = response_value
        .dyn_into::<Response>()
        .map_err(|_| format!("Failed to read response for {url}"))?;
    if !response.ok() {
        return Err(format!("{url} returned {}", response.status()));
    }
    let body = response
        .json()
        .map_err(|_| format!("Failed to read {url} body"))?;
    wasm_bindgen_futures::JsFuture::from(body)
        .await
        .map_err(|_| format!("Failed to read {url} body"))
}

/// Missing or malformed catalogs only cost their entries
async fn fetch_catalog(window: &web_sys::Window, url: &str) -> Vec<CatalogEntry> {
    let parsed = match fetch_json(window, url).await {
        Ok(json) => serde_wasm_bindgen::from_value::<serde_json::Value>(json)
            .map_err(|error| error.to_string())
            .and_then(|value| parse_catalog_value(value, url).map_err(|error| error.to_string())),
        Err(error) => Err(error),
    };
    parsed.unwrap_or_else(|error| {
        web_sys::console::warn_1(&format!("Catalog skipped: {error}").into());
        Vec::new()
    })
}

async fn load(state: Rc<RefCell<LoadState>>) {
    let Some(window) = web_sys::window() else {
        return;
    };

    let data = match fetch_json(&window, DATA_URL).await {
        Ok(json) => serde_wasm_bindgen::from_value::<DataFile>(json)
            .map_err(|error| format!("Failed to parse data.json: {error}")),
        Err(error) => Err(error),
    };
    let data = match data {
        Ok(data) => data,
        Err(error) => {
            log_error(&error);
            *state.borrow_mut() = LoadState::Failed(error);
            return;
        }
    };

    let catalogs = Catalogs {
        strategies: fetch_catalog(&window, STRATEGIES_URL).await,
        programs: fetch_catalog(&window, PROGRAMS_URL).await,
        projects: Vec::new(),
    };

    let storage = local_storage();
    let loaded = Loaded::new(Dataset::from_parts(data, catalogs), storage.as_ref());
    *state.borrow_mut() = LoadState::Ready(Box::new(loaded));
}

#[cfg(test)]
mod tests {
    use super::*;
    use oiv_core::{Catalogs, DataFile, FilterCategory};

    #[test]
    fn scrolling_stops_at_last_line() {
        assert_eq!(scroll_down(0, 3), 1);
        assert_eq!(scroll_down(2, 3), 2);
        assert_eq!(scroll_down(9, 3), 2);
        assert_eq!(scroll_down(0, 0), 0);
    }

    #[test]
    fn scroll_length_follows_active_tab() {
        let data = DataFile::from_json(
            r#"{
                "oiv": [{"id": "A", "complex": "c1"}, {"id": "B", "complex": "c1"}],
                "edges": [
                    {"source": "A", "target": "B", "theme": "Roads"},
                    {"source": "B", "target": "A", "theme": "Budget"},
                    {"source": "A", "target": "B", "theme": "Budget", "label": "again"}
                ]
            }"#,
        )
        .unwrap();
        let mut loaded = Loaded::new(Dataset::from_parts(data, Catalogs::default()), None);
        assert_eq!(loaded.scroll_len(2), 0);

        loaded.store.set_category(FilterCategory::Complex, ["c1"]);
        assert_eq!(loaded.scroll_len(0), 2);
        assert_eq!(loaded.scroll_len(1), 2);
        assert_eq!(loaded.scroll_len(2), 3);
    }
}
