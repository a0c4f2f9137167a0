use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::filter::{apply_filters, FilteredDataset};
use crate::model::Dataset;
use crate::selection::{FilterCategory, FilterSelection};

/// A view that re-renders from the filtered dataset
pub trait ViewSink {
    fn name(&self) -> &str;

    fn on_filtered_data_changed(&mut self, data: &FilteredDataset);
}

/// Handle returned by [`SelectionStore::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(u64);

/// Owns the current selection and broadcasts every change to all sinks.
///
/// Sinks are held weakly: a sink dropped by its owner is skipped and
/// pruned on the next broadcast.
pub struct SelectionStore {
    dataset: Arc<Dataset>,
    selection: FilterSelection,
    filtered: FilteredDataset,
    sinks: Vec<(SinkId, Weak<RefCell<dyn ViewSink>>)>,
    next_sink_id: u64,
}

impl std::fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionStore")
            .field("selection", &self.selection)
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}

impl SelectionStore {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self::with_selection(dataset, FilterSelection::default())
    }

    pub fn with_selection(dataset: Arc<Dataset>, selection: FilterSelection) -> Self {
        let filtered = apply_filters(&dataset, &selection);
        Self {
            dataset,
            selection,
            filtered,
            sinks: Vec::new(),
            next_sink_id: 0,
        }
    }

    pub const fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub const fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub const fn filtered(&self) -> &FilteredDataset {
        &self.filtered
    }

    /// Registers a sink and pushes the current filtered data to it
    pub fn register<S>(&mut self, sink: &Rc<RefCell<S>>) -> SinkId
    where
        S: ViewSink + 'static,
    {
        let id = SinkId(self.next_sink_id);
        self.next_sink_id += 1;

        let shared: Rc<RefCell<dyn ViewSink>> = sink.clone();
        sink.borrow_mut().on_filtered_data_changed(&self.filtered);
        tracing::debug!(sink = sink.borrow().name(), "view sink registered");
        self.sinks.push((id, Rc::downgrade(&shared)));
        id
    }

    pub fn unregister(&mut self, id: SinkId) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|(sink_id, _)| *sink_id != id);
        before != self.sinks.len()
    }

    /// Number of sinks still alive
    pub fn sink_count(&self) -> usize {
        self.sinks
            .iter()
            .filter(|(_, sink)| sink.strong_count() > 0)
            .count()
    }

    /// Applies `change` to a copy of the selection; notifies only if the
    /// selection actually changed. Returns whether it did.
    pub fn update<F>(&mut self, change: F) -> bool
    where
        F: FnOnce(&mut FilterSelection),
    {
        let mut next = self.selection.clone();
        change(&mut next);
        if next == self.selection {
            return false;
        }
        self.selection = next;
        self.refresh();
        true
    }

    pub fn toggle(&mut self, category: FilterCategory, id: &str) -> bool {
        let mut selected = false;
        self.update(|selection| selected = selection.toggle(category, id));
        selected
    }

    pub fn set_category<I, S>(&mut self, category: FilterCategory, ids: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update(|selection| selection.set(category, ids))
    }

    pub fn set_connections_only(&mut self, enabled: bool) -> bool {
        self.update(|selection| selection.connections_only = enabled)
    }

    pub fn replace(&mut self, selection: FilterSelection) -> bool {
        self.update(|current| *current = selection)
    }

    /// Clears every category and the toggle, then notifies once
    pub fn reset(&mut self) {
        self.selection.clear();
        self.refresh();
    }

    fn refresh(&mut self) {
        self.filtered = apply_filters(&self.dataset, &self.selection);
        self.broadcast();
    }

    fn broadcast(&mut self) {
        self.sinks.retain(|(_, sink)| sink.strong_count() > 0);
        tracing::debug!(sinks = self.sinks.len(), "broadcasting filtered data");

        for (_, sink) in &self.sinks {
            let Some(sink) = sink.upgrade() else {
                continue;
            };
            let Ok(mut sink) = sink.try_borrow_mut() else {
                tracing::warn!("view sink is busy, skipping update");
                continue;
            };
            sink.on_filtered_data_changed(&self.filtered);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::sample_dataset;

    #[derive(Default)]
    struct CountingSink {
        calls: usize,
        last_edges: usize,
    }

    impl ViewSink for CountingSink {
        fn name(&self) -> &str {
            "counting"
        }

        fn on_filtered_data_changed(&mut self, data: &FilteredDataset) {
            self.calls += 1;
            self.last_edges = data.edges.len();
        }
    }

    fn store() -> SelectionStore {
        SelectionStore::new(Arc::new(sample_dataset()))
    }

    #[test]
    fn register_pushes_current_state() {
        let mut store = store();
        let sink = Rc::new(RefCell::new(CountingSink::default()));
        store.register(&sink);
        assert_eq!(sink.borrow().calls, 1);
        assert_eq!(store.sink_count(), 1);
    }

    #[test]
    fn every_sink_sees_every_change() {
        let mut store = store();
        let table = Rc::new(RefCell::new(CountingSink::default()));
        let scene = Rc::new(RefCell::new(CountingSink::default()));
        store.register(&table);
        store.register(&scene);

        assert!(store.toggle(FilterCategory::SourceOiv, "A"));
        assert_eq!(table.borrow().calls, 2);
        assert_eq!(scene.borrow().calls, 2);
        assert_eq!(scene.borrow().last_edges, 1);
        assert_eq!(store.filtered().edges.len(), 1);
    }

    #[test]
    fn unchanged_selection_does_not_notify() {
        let mut store = store();
        let sink = Rc::new(RefCell::new(CountingSink::default()));
        store.register(&sink);

        assert!(store.set_category(FilterCategory::Theme, ["T1"]));
        assert!(!store.set_category(FilterCategory::Theme, ["T1"]));
        assert_eq!(sink.borrow().calls, 2);
    }

    #[test]
    fn reset_clears_everything_and_notifies_once() {
        let mut store = store();
        store.set_category(FilterCategory::Complex, ["complex1"]);
        store.set_connections_only(true);
        let sink = Rc::new(RefCell::new(CountingSink::default()));
        store.register(&sink);

        store.reset();
        assert_eq!(sink.borrow().calls, 2);
        assert_eq!(sink.borrow().last_edges, 0);
        assert!(store.selection().is_empty());
        assert!(!store.selection().connections_only);
        assert!(store.filtered().is_empty());
    }

    #[test]
    fn unregistered_and_dropped_sinks_are_skipped() {
        let mut store = store();
        let kept = Rc::new(RefCell::new(CountingSink::default()));
        let removed = Rc::new(RefCell::new(CountingSink::default()));
        store.register(&kept);
        let removed_id = store.register(&removed);
        {
            let dropped = Rc::new(RefCell::new(CountingSink::default()));
            store.register(&dropped);
        }
        assert_eq!(store.sink_count(), 2);

        assert!(store.unregister(removed_id));
        assert!(!store.unregister(removed_id));
        store.toggle(FilterCategory::Complex, "complex2");

        assert_eq!(kept.borrow().calls, 2);
        assert_eq!(removed.borrow().calls, 1);
        assert_eq!(store.sink_count(), 1);
    }

    #[test]
    fn toggle_reports_membership() {
        let mut store = store();
        assert!(store.toggle(FilterCategory::Strategy, "s1"));
        assert!(!store.toggle(FilterCategory::Strategy, "s1"));
        assert!(store.selection().is_empty());
    }
}
