//! Connection table: text filters, multi-key sort, pagination and the
//! persisted column layout.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::filter::FilteredDataset;
use crate::model::Edge;
use crate::store::ViewSink;

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Source,
    SourceComplex,
    Target,
    TargetComplex,
    Theme,
    Label,
}

impl Column {
    pub const ALL: [Self; 6] = [
        Self::Source,
        Self::SourceComplex,
        Self::Target,
        Self::TargetComplex,
        Self::Theme,
        Self::Label,
    ];

    /// Display name, also the persisted identifier
    pub const fn label(self) -> &'static str {
        match self {
            Self::Source => "Source",
            Self::SourceComplex => "Source complex",
            Self::Target => "Target",
            Self::TargetComplex => "Target complex",
            Self::Theme => "Theme",
            Self::Label => "Description",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|column| column.label().eq_ignore_ascii_case(label))
    }

    const fn index(self) -> usize {
        match self {
            Self::Source => 0,
            Self::SourceComplex => 1,
            Self::Target => 2,
            Self::TargetComplex => 3,
            Self::Theme => 4,
            Self::Label => 5,
        }
    }
}

/// One edge resolved to display strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRow {
    pub edge_id: String,
    pub source_id: String,
    pub target_id: String,
    cells: [String; 6],
}

impl ConnectionRow {
    pub fn from_edge(edge: &Edge, data: &FilteredDataset) -> Self {
        Self {
            edge_id: edge.key(),
            source_id: edge.source.clone(),
            target_id: edge.target.clone(),
            cells: [
                data.unit_name(&edge.source).to_string(),
                data.unit_complex_name(&edge.source).to_string(),
                data.unit_name(&edge.target).to_string(),
                data.unit_complex_name(&edge.target).to_string(),
                edge.theme.clone(),
                edge.label.clone(),
            ],
        }
    }

    pub fn cell(&self, column: Column) -> &str {
        &self.cells[column.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: Column,
    pub direction: SortDirection,
}

impl SortKey {
    pub const fn ascending(column: Column) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }
}

/// Serialized column preferences (`selectedColumns` / `columnOrder`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPrefs {
    pub selected: Vec<String>,
    pub order: Vec<String>,
}

/// Column order and visibility
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    order: Vec<Column>,
    hidden: BTreeSet<Column>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            order: Column::ALL.to_vec(),
            hidden: BTreeSet::new(),
        }
    }
}

impl ColumnLayout {
    pub fn order(&self) -> &[Column] {
        &self.order
    }

    pub fn visible_columns(&self) -> Vec<Column> {
        self.order
            .iter()
            .copied()
            .filter(|column| !self.hidden.contains(column))
            .collect()
    }

    pub fn is_visible(&self, column: Column) -> bool {
        !self.hidden.contains(&column)
    }

    /// Shows or hides a column; the last visible column cannot be hidden
    pub fn toggle(&mut self, column: Column) -> bool {
        if self.hidden.remove(&column) {
            return true;
        }
        if self.visible_columns().len() <= 1 {
            return false;
        }
        self.hidden.insert(column);
        true
    }

    /// Moves a column one slot; `forward` moves it towards the end
    pub fn shift(&mut self, column: Column, forward: bool) -> bool {
        let Some(index) = self.order.iter().position(|c| *c == column) else {
            return false;
        };
        let target = if forward {
            index + 1
        } else {
            match index.checked_sub(1) {
                Some(target) => target,
                None => return false,
            }
        };
        if target >= self.order.len() {
            return false;
        }
        self.order.swap(index, target);
        true
    }

    pub fn to_storage(&self) -> ColumnPrefs {
        ColumnPrefs {
            selected: self
                .visible_columns()
                .into_iter()
                .map(|column| column.label().to_string())
                .collect(),
            order: self
                .order
                .iter()
                .map(|column| column.label().to_string())
                .collect(),
        }
    }

    /// Rebuilds a layout from stored names.
    ///
    /// Unknown names are skipped. Columns missing from the stored order are
    /// appended, visible only when no visibility list was stored. Falls back
    /// to the default layout when nothing resolves.
    pub fn from_storage(selected: Option<&[String]>, order: Option<&[String]>) -> Self {
        let mut layout_order: Vec<Column> = Vec::new();
        for name in order.unwrap_or_default() {
            if let Some(column) = Column::from_label(name) {
                if !layout_order.contains(&column) {
                    layout_order.push(column);
                }
            }
        }

        let visible: Option<BTreeSet<Column>> = selected.map(|names| {
            names
                .iter()
                .filter_map(|name| Column::from_label(name))
                .collect()
        });

        // Columns only known from the visibility list keep that list's order
        if let Some(names) = selected {
            for column in names.iter().filter_map(|name| Column::from_label(name)) {
                if !layout_order.contains(&column) {
                    layout_order.push(column);
                }
            }
        }

        let known: BTreeSet<Column> = layout_order.iter().copied().collect();
        let mut hidden: BTreeSet<Column> = BTreeSet::new();
        for column in Column::ALL {
            if !known.contains(&column) {
                layout_order.push(column);
                if visible.is_some() {
                    hidden.insert(column);
                }
            }
        }

        if let Some(visible) = &visible {
            hidden.extend(
                layout_order
                    .iter()
                    .copied()
                    .filter(|column| !visible.contains(column)),
            );
        }

        let layout = Self {
            order: layout_order,
            hidden,
        };
        if known.is_empty() || layout.visible_columns().is_empty() {
            return Self::default();
        }
        layout
    }
}

/// Paginated, filterable, sortable view over the filtered connections
#[derive(Debug, Clone)]
pub struct TableController {
    rows: Vec<ConnectionRow>,
    view: Vec<usize>,
    query: String,
    column_queries: BTreeMap<Column, String>,
    sort: Vec<SortKey>,
    page: usize,
    page_size: usize,
    layout: ColumnLayout,
}

impl Default for TableController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl TableController {
    pub fn new(page_size: usize) -> Self {
        Self {
            rows: Vec::new(),
            view: Vec::new(),
            query: String::new(),
            column_queries: BTreeMap::new(),
            sort: Vec::new(),
            page: 0,
            page_size: page_size.max(1),
            layout: ColumnLayout::default(),
        }
    }

    pub fn set_rows(&mut self, data: &FilteredDataset) {
        self.rows = data
            .edges
            .iter()
            .map(|edge| ConnectionRow::from_edge(edge, data))
            .collect();
        self.rebuild();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: &str) {
        if self.query != query {
            self.query = query.to_string();
            self.rebuild();
        }
    }

    pub fn column_query(&self, column: Column) -> &str {
        self.column_queries.get(&column).map_or("", String::as_str)
    }

    pub fn column_queries(&self) -> &BTreeMap<Column, String> {
        &self.column_queries
    }

    pub fn set_column_query(&mut self, column: Column, query: &str) {
        if query.trim().is_empty() {
            self.column_queries.remove(&column);
        } else {
            self.column_queries.insert(column, query.to_string());
        }
        self.rebuild();
    }

    pub fn clear_filters(&mut self) {
        self.query.clear();
        self.column_queries.clear();
        self.rebuild();
    }

    pub fn sort_keys(&self) -> &[SortKey] {
        &self.sort
    }

    /// Plain click replaces the sort with `column`; an additive
    /// (modifier) click appends it as the next key. Clicking a key again
    /// flips it to descending, a third time removes it.
    pub fn sort_by(&mut self, column: Column, additive: bool) {
        let existing = self.sort.iter().position(|key| key.column == column);

        if additive {
            match existing {
                Some(index) => match self.sort[index].direction {
                    SortDirection::Ascending => {
                        self.sort[index].direction = SortDirection::Descending;
                    }
                    SortDirection::Descending => {
                        self.sort.remove(index);
                    }
                },
                None => self.sort.push(SortKey::ascending(column)),
            }
        } else {
            let only_this = self.sort.len() == 1 && existing == Some(0);
            self.sort = match (only_this, self.sort.first().map(|key| key.direction)) {
                (true, Some(SortDirection::Ascending)) => vec![SortKey {
                    column,
                    direction: SortDirection::Descending,
                }],
                (true, _) => Vec::new(),
                (false, _) => vec![SortKey::ascending(column)],
            };
        }

        self.rebuild();
    }

    pub fn clear_sort(&mut self) {
        self.sort.clear();
        self.rebuild();
    }

    pub const fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: ColumnLayout) {
        self.layout = layout;
        self.rebuild();
    }

    pub fn toggle_column(&mut self, column: Column) -> bool {
        let changed = self.layout.toggle(column);
        if changed {
            self.rebuild();
        }
        changed
    }

    pub fn shift_column(&mut self, column: Column, forward: bool) -> bool {
        self.layout.shift(column, forward)
    }

    pub const fn page(&self) -> usize {
        self.page
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// At least one page, even when nothing matches
    pub fn page_count(&self) -> usize {
        self.view.len().div_ceil(self.page_size).max(1)
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.min(self.page_count() - 1);
    }

    pub fn next_page(&mut self) -> bool {
        let before = self.page;
        self.set_page(self.page + 1);
        before != self.page
    }

    pub fn prev_page(&mut self) -> bool {
        let before = self.page;
        self.page = self.page.saturating_sub(1);
        before != self.page
    }

    pub fn last_page(&mut self) {
        self.set_page(self.page_count() - 1);
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn matching_rows(&self) -> usize {
        self.view.len()
    }

    /// Rows of the current page, filtered and sorted
    pub fn page_rows(&self) -> Vec<&ConnectionRow> {
        self.view
            .iter()
            .skip(self.page * self.page_size)
            .take(self.page_size)
            .filter_map(|index| self.rows.get(*index))
            .collect()
    }

    /// Every filtered and sorted row
    pub fn rows(&self) -> Vec<&ConnectionRow> {
        self.view
            .iter()
            .filter_map(|index| self.rows.get(*index))
            .collect()
    }

    fn rebuild(&mut self) {
        let query = self.query.trim().to_lowercase();
        let column_queries: Vec<(Column, String)> = self
            .column_queries
            .iter()
            .map(|(column, query)| (*column, query.trim().to_lowercase()))
            .collect();
        let visible = self.layout.visible_columns();

        let mut view: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                let global = query.is_empty()
                    || visible
                        .iter()
                        .any(|column| row.cell(*column).to_lowercase().contains(&query));
                global
                    && column_queries
                        .iter()
                        .all(|(column, query)| row.cell(*column).to_lowercase().contains(query))
            })
            .map(|(index, _)| index)
            .collect();

        if !self.sort.is_empty() {
            let rows = &self.rows;
            let keys = &self.sort;
            view.sort_by(|a, b| compare_rows(&rows[*a], &rows[*b], keys));
        }

        self.view = view;
        self.page = 0;
    }
}

fn compare_rows(a: &ConnectionRow, b: &ConnectionRow, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = a
            .cell(key.column)
            .to_lowercase()
            .cmp(&b.cell(key.column).to_lowercase());
        let ordering = match key.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl ViewSink for TableController {
    fn name(&self) -> &str {
        "table"
    }

    fn on_filtered_data_changed(&mut self, data: &FilteredDataset) {
        self.set_rows(data);
    }
}
