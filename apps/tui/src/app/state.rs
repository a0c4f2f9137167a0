use oiv_core::{Column, ColumnLayout, FilterSelection};
use std::time::Instant;
use throbber_widgets_tui::ThrobberState;
use tokio::task::JoinHandle;

use crate::app::filters::FilterDraft;
use crate::app::views::Views;
use crate::config::AppConfig;
use crate::db::KeyValueStore;
use crate::loader::LoadedDataset;

/// Throbber frames advance at this interval while loading
const THROBBER_TICK_MS: u128 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Loading,
    Graph,
    Table,
    Dashboard,
    Filters,
    Columns,
}

impl AppScreen {
    /// Screens reachable with Tab and the number keys
    pub const MAIN: [Self; 3] = [Self::Graph, Self::Table, Self::Dashboard];

    pub const fn title(self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::Graph => "Graph",
            Self::Table => "Connections",
            Self::Dashboard => "Dashboard",
            Self::Filters => "Filters",
            Self::Columns => "Columns",
        }
    }

    pub const fn is_modal(self) -> bool {
        matches!(self, Self::Filters | Self::Columns)
    }
}

/// What typed characters go to on the table screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableInput {
    Normal,
    /// Free-text query over all visible columns
    Search,
    /// Query on the focused column only
    ColumnSearch(Column),
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub screen: AppScreen,
    /// Screen a modal returns to
    pub return_screen: AppScreen,
    pub show_help: bool,
    pub status_message: String,
    pub config: AppConfig,
    pub storage: KeyValueStore,
    pub views: Option<Views>,
    pub pending_load: Option<JoinHandle<LoadedDataset>>,
    /// Selection to start from once the dataset is in
    pub initial_selection: FilterSelection,
    pub load_error: Option<String>,
    pub load_warnings: Vec<String>,
    pub throbber_state: ThrobberState,
    pub last_frame: Instant,
    pub chart_tab_index: usize,
    pub dashboard_scroll: usize,
    pub table_input: TableInput,
    pub table_input_buffer: String,
    /// Index into the visible columns
    pub column_cursor: usize,
    /// Row cursor within the current page
    pub row_cursor: usize,
    /// Index into the full column order in the columns modal
    pub columns_cursor: usize,
    pub columns_before: Option<ColumnLayout>,
    pub filter_draft: Option<FilterDraft>,
    pub export_requested: bool,
}

impl App {
    pub fn new(config: AppConfig, storage: KeyValueStore) -> Self {
        Self {
            running: true,
            screen: AppScreen::Loading,
            return_screen: AppScreen::Graph,
            show_help: false,
            status_message: String::new(),
            config,
            storage,
            views: None,
            pending_load: None,
            initial_selection: FilterSelection::default(),
            load_error: None,
            load_warnings: Vec::new(),
            throbber_state: ThrobberState::default(),
            last_frame: Instant::now(),
            chart_tab_index: 0,
            dashboard_scroll: 0,
            table_input: TableInput::Normal,
            table_input_buffer: String::new(),
            column_cursor: 0,
            row_cursor: 0,
            columns_cursor: 0,
            columns_before: None,
            filter_draft: None,
            export_requested: false,
        }
    }

    /// Per-frame housekeeping
    pub fn update(&mut self) {
        if self.screen == AppScreen::Loading
            && self.last_frame.elapsed().as_millis() >= THROBBER_TICK_MS
        {
            self.throbber_state.calc_next();
            self.last_frame = Instant::now();
        }
    }

    /// Builds the store and views from a finished load
    pub async fn finish_loading(&mut self, loaded: LoadedDataset) {
        let layout = self.storage.load_layout().await;
        let selection = std::mem::take(&mut self.initial_selection);

        self.status_message = match (&loaded.error, loaded.warnings.len()) {
            (Some(error), _) => format!("Error: {error}"),
            (None, 0) => format!(
                "Loaded {} units and {} connections",
                loaded.dataset.units().len(),
                loaded.dataset.edges().len()
            ),
            (None, count) => format!("Loaded with {count} warning(s), see log"),
        };

        self.views = Some(Views::new(
            loaded.dataset,
            selection,
            layout,
            self.config.page_size,
        ));
        self.load_error = loaded.error;
        self.load_warnings = loaded.warnings;
        self.screen = AppScreen::Graph;
    }

    pub fn show_screen(&mut self, screen: AppScreen) {
        if self.views.is_none() {
            return;
        }
        self.screen = screen;
        self.table_input = TableInput::Normal;
        self.table_input_buffer.clear();
    }

    pub fn next_screen(&mut self) {
        let index = AppScreen::MAIN
            .iter()
            .position(|screen| *screen == self.screen)
            .map_or(0, |index| (index + 1) % AppScreen::MAIN.len());
        self.show_screen(AppScreen::MAIN[index]);
    }

    pub fn open_filters(&mut self) {
        let Some(views) = &self.views else {
            return;
        };
        self.filter_draft = Some(FilterDraft::new(
            views.dataset(),
            views.store.selection(),
        ));
        if !self.screen.is_modal() {
            self.return_screen = self.screen;
        }
        self.screen = AppScreen::Filters;
    }

    /// Pushes the draft into the store and closes the modal
    pub fn apply_filter_draft(&mut self) {
        let (Some(views), Some(draft)) = (&mut self.views, self.filter_draft.take()) else {
            return;
        };
        let changed = views.store.replace(draft.selection);
        self.status_message = if changed {
            filter_status(views.store.selection())
        } else {
            "Filters unchanged".to_string()
        };
        self.screen = self.return_screen;
    }

    pub fn close_modal(&mut self) {
        self.filter_draft = None;
        self.screen = self.return_screen;
    }

    pub fn reset_filters(&mut self) {
        if let Some(views) = &mut self.views {
            views.store.reset();
            self.status_message = "Filters cleared".to_string();
        }
    }

    pub fn toggle_connections_only(&mut self) {
        if let Some(views) = &mut self.views {
            let enabled = !views.store.selection().connections_only;
            views.store.set_connections_only(enabled);
            self.status_message = format!(
                "Connections only: {}",
                if enabled { "on" } else { "off" }
            );
        }
    }

    pub fn open_columns(&mut self) {
        let Some(views) = &self.views else {
            return;
        };
        self.columns_before = Some(views.table.borrow().layout().clone());
        self.columns_cursor = 0;
        self.return_screen = AppScreen::Table;
        self.screen = AppScreen::Columns;
    }

    /// Restores the layout the columns modal started from
    pub fn revert_columns(&mut self) {
        if let (Some(views), Some(layout)) = (&self.views, self.columns_before.take()) {
            views.table.borrow_mut().set_layout(layout);
        }
        self.screen = AppScreen::Table;
    }

    /// Column under the table's column cursor
    pub fn focused_column(&self) -> Option<Column> {
        let views = self.views.as_ref()?;
        let visible = views.table.borrow().layout().visible_columns();
        visible
            .get(self.column_cursor.min(visible.len().saturating_sub(1)))
            .copied()
    }

    pub fn clamp_table_cursors(&mut self) {
        let Some(views) = &self.views else {
            return;
        };
        let table = views.table.borrow();
        let visible = table.layout().visible_columns().len();
        let rows = table.page_rows().len();
        drop(table);
        self.column_cursor = self.column_cursor.min(visible.saturating_sub(1));
        self.row_cursor = self.row_cursor.min(rows.saturating_sub(1));
    }
}

/// One-line readout of the active filter
pub fn filter_status(selection: &FilterSelection) -> String {
    let Some(active) = selection.active_category() else {
        return "No filters: pick some with f".to_string();
    };
    let mut status = format!(
        "Filtering by {} ({})",
        active.label(),
        selection.ids(active).len()
    );
    let shadowed = selection.shadowed_categories();
    if !shadowed.is_empty() {
        let names: Vec<&str> = shadowed.iter().map(|category| category.label()).collect();
        status.push_str(&format!("; ignored: {}", names.join(", ")));
    }
    status
}
