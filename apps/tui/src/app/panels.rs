use oiv_core::{
    apply_filters, summary_sheet, DashboardSummary, Dataset, FilterCategory, FilterSelection,
    FilteredDataset, SelectionStats, Sheet, ViewSink, Workbook,
};
use std::sync::Arc;

/// Where the dashboard takes its selection from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardSource {
    /// Follows the store like every other view
    Live,
    /// Frozen on the selection handed over through `dashboardFilters`
    Pinned(FilterSelection),
}

/// Charts and export source for the dashboard screen
#[derive(Debug, Clone)]
pub struct DashboardPanel {
    dataset: Arc<Dataset>,
    source: DashboardSource,
    data: FilteredDataset,
    summary: DashboardSummary,
    cross_tab: Sheet,
}

impl DashboardPanel {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            source: DashboardSource::Live,
            data: FilteredDataset::default(),
            summary: DashboardSummary::default(),
            cross_tab: summary_sheet(&FilteredDataset::default()),
        }
    }

    pub fn pin(&mut self, selection: FilterSelection) {
        let data = apply_filters(&self.dataset, &selection);
        self.source = DashboardSource::Pinned(selection);
        self.set_data(data);
    }

    /// Drops a pinned selection and takes the store's current result
    pub fn follow_live(&mut self, live: &FilteredDataset) {
        self.source = DashboardSource::Live;
        self.set_data(live.clone());
    }

    pub const fn is_pinned(&self) -> bool {
        matches!(self.source, DashboardSource::Pinned(_))
    }

    pub const fn pinned_selection(&self) -> Option<&FilterSelection> {
        match &self.source {
            DashboardSource::Pinned(selection) => Some(selection),
            DashboardSource::Live => None,
        }
    }

    pub const fn data(&self) -> &FilteredDataset {
        &self.data
    }

    pub const fn summary(&self) -> &DashboardSummary {
        &self.summary
    }

    /// Source × theme table shown on the summary tab
    pub const fn cross_tab(&self) -> &Sheet {
        &self.cross_tab
    }

    pub fn workbook(&self) -> Workbook {
        Workbook::build(&self.dataset, &self.data)
    }

    fn set_data(&mut self, data: FilteredDataset) {
        self.summary = DashboardSummary::build(&data);
        self.cross_tab = summary_sheet(&data);
        self.data = data;
    }
}

impl ViewSink for DashboardPanel {
    fn name(&self) -> &str {
        "dashboard"
    }

    fn on_filtered_data_changed(&mut self, data: &FilteredDataset) {
        if self.source == DashboardSource::Live {
            self.set_data(data.clone());
        }
    }
}

/// Counts shown in the sidebar next to the graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSidebar {
    pub stats: SelectionStats,
    pub category: Option<FilterCategory>,
    pub linked_units: usize,
}

impl ViewSink for StatsSidebar {
    fn name(&self) -> &str {
        "stats-sidebar"
    }

    fn on_filtered_data_changed(&mut self, data: &FilteredDataset) {
        self.stats = SelectionStats::from_filtered(data);
        self.category = data.category;
        self.linked_units = data.linked_oiv.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oiv_core::{Catalogs, DataFile, SelectionStore};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dataset() -> Arc<Dataset> {
        let data = DataFile::from_json(
            r#"{
                "complexes": [{"id": "c1", "name": "Economy"}, {"id": "c2", "name": "Transport"}],
                "oiv": [
                    {"id": "A", "name": "Alpha", "complex": "c1"},
                    {"id": "B", "name": "Beta", "complex": "c1"},
                    {"id": "C", "name": "Gamma", "complex": "c2"}
                ],
                "edges": [
                    {"source": "A", "target": "C", "theme": "T1"},
                    {"source": "B", "target": "C", "theme": "T2"}
                ]
            }"#,
        )
        .unwrap();
        Arc::new(Dataset::from_parts(data, Catalogs::default()))
    }

    #[test]
    fn pinned_dashboard_ignores_store_changes() {
        let dataset = dataset();
        let mut store = SelectionStore::new(Arc::clone(&dataset));
        let panel = Rc::new(RefCell::new(DashboardPanel::new(Arc::clone(&dataset))));
        store.register(&panel);

        store.set_category(FilterCategory::Theme, ["T1"]);
        assert_eq!(panel.borrow().summary().total_edges, 1);

        let mut pinned = FilterSelection::new();
        pinned.set(FilterCategory::SourceOiv, ["B"]);
        panel.borrow_mut().pin(pinned.clone());
        store.set_category(FilterCategory::Theme, ["T1", "T2"]);

        let panel_ref = panel.borrow();
        assert!(panel_ref.is_pinned());
        assert_eq!(panel_ref.pinned_selection(), Some(&pinned));
        assert_eq!(panel_ref.summary().by_theme[0].label, "T2");
        assert_eq!(panel_ref.cross_tab().header, vec!["Source", "T2", "Total"]);
        assert_eq!(panel_ref.cross_tab().rows[0], vec!["Beta", "1", "1"]);
        drop(panel_ref);

        panel.borrow_mut().follow_live(store.filtered());
        assert_eq!(panel.borrow().summary().total_edges, 2);
    }

    #[test]
    fn sidebar_tracks_selection_stats() {
        let dataset = dataset();
        let mut store = SelectionStore::new(dataset);
        let sidebar = Rc::new(RefCell::new(StatsSidebar::default()));
        store.register(&sidebar);

        store.set_category(FilterCategory::Complex, ["c1"]);
        let sidebar = sidebar.borrow();
        assert_eq!(sidebar.category, Some(FilterCategory::Complex));
        assert_eq!(sidebar.stats.edges, 2);
        assert_eq!(sidebar.linked_units, 1);
        assert_eq!(sidebar.stats.units, 3);
    }
}
