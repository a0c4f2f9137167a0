use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use oiv_core::{CatalogEntry, Dataset, FilterCategory, FilterSelection};
use std::collections::BTreeSet;

use crate::app::input::helpers::{wrap_decrement, wrap_increment};

/// One selectable option in the filter modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    pub id: String,
    pub label: String,
}

impl FilterEntry {
    fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: if label.is_empty() { id } else { label }.to_string(),
        }
    }
}

/// Options offered for `category`, in dataset order
pub fn filter_entries(dataset: &Dataset, category: FilterCategory) -> Vec<FilterEntry> {
    match category {
        FilterCategory::SourceOiv | FilterCategory::TargetOiv => dataset
            .units()
            .iter()
            .map(|unit| FilterEntry::new(&unit.id, unit.display_name()))
            .collect(),
        FilterCategory::Theme => {
            let mut names: BTreeSet<&str> = dataset.theme_names();
            names.extend(
                dataset
                    .themes()
                    .iter()
                    .map(|theme| theme.name.as_str())
                    .filter(|name| !name.is_empty()),
            );
            names
                .into_iter()
                .map(|name| FilterEntry::new(name, name))
                .collect()
        }
        FilterCategory::Complex => dataset
            .complexes()
            .iter()
            .map(|complex| FilterEntry::new(&complex.id, &complex.name))
            .collect(),
        FilterCategory::Strategy => catalog_entries(
            dataset.strategies(),
            dataset.units().iter().flat_map(|unit| unit.strategies.iter()),
        ),
        FilterCategory::Program => catalog_entries(
            dataset.programs(),
            dataset.units().iter().flat_map(|unit| unit.programs.iter()),
        ),
        FilterCategory::Edge => dataset
            .resolvable_edges()
            .map(|edge| {
                let mut label = format!(
                    "{} → {}",
                    dataset.unit_name(&edge.source),
                    dataset.unit_name(&edge.target)
                );
                if !edge.theme.is_empty() {
                    label.push_str(&format!(" · {}", edge.theme));
                }
                FilterEntry::new(&edge.key(), &label)
            })
            .collect(),
    }
}

/// Catalog records followed by ids units reference but the catalog lacks
fn catalog_entries<'a>(
    catalog: &[CatalogEntry],
    referenced: impl Iterator<Item = &'a String>,
) -> Vec<FilterEntry> {
    let mut entries: Vec<FilterEntry> = catalog
        .iter()
        .map(|entry| FilterEntry::new(&entry.id, &entry.name))
        .collect();
    let mut seen: BTreeSet<String> = entries.iter().map(|entry| entry.id.clone()).collect();
    for id in referenced {
        if seen.insert(id.clone()) {
            entries.push(FilterEntry::new(id, id));
        }
    }
    entries
}

/// Working copy of the selection while the filter modal is open.
///
/// Nothing reaches the store until the draft is applied.
#[derive(Debug, Clone)]
pub struct FilterDraft {
    pub category: FilterCategory,
    pub selection: FilterSelection,
    pub query: String,
    pub searching: bool,
    pub cursor: usize,
    entries: Vec<FilterEntry>,
}

impl FilterDraft {
    pub fn new(dataset: &Dataset, selection: &FilterSelection) -> Self {
        let category = selection
            .active_category()
            .unwrap_or(FilterCategory::SourceOiv);
        Self {
            category,
            selection: selection.clone(),
            query: String::new(),
            searching: false,
            cursor: 0,
            entries: filter_entries(dataset, category),
        }
    }

    pub fn set_category(&mut self, dataset: &Dataset, category: FilterCategory) {
        self.category = category;
        self.entries = filter_entries(dataset, category);
        self.query.clear();
        self.searching = false;
        self.cursor = 0;
    }

    pub fn next_category(&mut self, dataset: &Dataset) {
        let len = FilterCategory::PRIORITY.len();
        let next = wrap_increment(self.category.index(), len);
        if let Some(category) = FilterCategory::from_index(next) {
            self.set_category(dataset, category);
        }
    }

    pub fn prev_category(&mut self, dataset: &Dataset) {
        let len = FilterCategory::PRIORITY.len();
        let prev = wrap_decrement(self.category.index(), len);
        if let Some(category) = FilterCategory::from_index(prev) {
            self.set_category(dataset, category);
        }
    }

    /// Entries matching the query, best fuzzy match first
    pub fn visible(&self) -> Vec<&FilterEntry> {
        let query = self.query.trim();
        if query.is_empty() {
            return self.entries.iter().collect();
        }

        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &FilterEntry)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                fuzzy_score(&matcher, &entry.label, query)
                    .or_else(|| fuzzy_score(&matcher, &entry.id, query))
                    .map(|score| (score, entry))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, entry)| entry).collect()
    }

    pub fn cursor_down(&mut self) {
        self.cursor = wrap_increment(self.cursor, self.visible().len());
    }

    pub fn cursor_up(&mut self) {
        self.cursor = wrap_decrement(self.cursor, self.visible().len());
    }

    pub fn push_query(&mut self, ch: char) {
        self.query.push(ch);
        self.cursor = 0;
    }

    pub fn pop_query(&mut self) {
        self.query.pop();
        self.cursor = 0;
    }

    /// Toggles the entry under the cursor; returns whether it is now selected
    pub fn toggle_current(&mut self) -> Option<bool> {
        let id = self.visible().get(self.cursor).map(|entry| entry.id.clone())?;
        Some(self.selection.toggle(self.category, &id))
    }

    pub fn is_selected(&self, entry: &FilterEntry) -> bool {
        self.selection.contains(self.category, &entry.id)
    }

    pub fn clear_category(&mut self) {
        self.selection.ids_mut(self.category).clear();
    }

    pub fn clear_all(&mut self) {
        self.selection.clear();
    }
}

fn fuzzy_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}
