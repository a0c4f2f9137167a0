use std::sync::Arc;

use crate::filter::FilteredDataset;
use crate::model::{CatalogEntry, Dataset};
use crate::selection::{FilterCategory, FilterSelection};
use crate::store::ViewSink;

/// A connection as seen from the focused unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSummary {
    pub edge_id: String,
    pub other: String,
    pub theme: String,
    pub label: String,
}

/// Everything the info panel shows about one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDetails {
    pub id: String,
    pub name: String,
    pub complex: Option<String>,
    pub linked_only: bool,
    pub strategies: Vec<String>,
    pub programs: Vec<String>,
    pub projects: Vec<String>,
    pub outgoing: Vec<ConnectionSummary>,
    pub incoming: Vec<ConnectionSummary>,
}

/// Info panel model: tracks the focused unit inside the filtered view
#[derive(Debug, Clone)]
pub struct InfoPanel {
    dataset: Arc<Dataset>,
    data: FilteredDataset,
    focus: Option<String>,
}

impl InfoPanel {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            data: FilteredDataset::default(),
            focus: None,
        }
    }

    pub fn focused(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Focuses a unit if it is part of the filtered view
    pub fn focus(&mut self, unit_id: &str) -> bool {
        if self.data.contains_unit(unit_id) {
            self.focus = Some(unit_id.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    pub fn focus_next(&mut self) {
        self.step(true);
    }

    pub fn focus_prev(&mut self) {
        self.step(false);
    }

    fn step(&mut self, forward: bool) {
        let ids: Vec<&str> = self.data.visible_oiv().map(|unit| unit.id.as_str()).collect();
        if ids.is_empty() {
            self.focus = None;
            return;
        }

        let current = self
            .focus
            .as_deref()
            .and_then(|focus| ids.iter().position(|id| *id == focus));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => ids.len() - 1,
            (Some(index), true) => (index + 1) % ids.len(),
            (Some(index), false) => (index + ids.len() - 1) % ids.len(),
        };
        self.focus = Some(ids[next].to_string());
    }

    pub fn details(&self) -> Option<UnitDetails> {
        let unit = self.data.unit(self.focus.as_deref()?)?;

        let resolve = |ids: &[String], catalog: &[CatalogEntry]| -> Vec<String> {
            ids.iter()
                .map(|id| {
                    catalog
                        .iter()
                        .find(|entry| entry.id == *id)
                        .filter(|entry| !entry.name.is_empty())
                        .map_or_else(|| id.clone(), |entry| entry.name.clone())
                })
                .collect()
        };

        let summarize = |edge: &crate::model::Edge, other: &str| ConnectionSummary {
            edge_id: edge.key(),
            other: self.data.unit_name(other).to_string(),
            theme: edge.theme.clone(),
            label: edge.label.clone(),
        };

        Some(UnitDetails {
            id: unit.id.clone(),
            name: unit.display_name().to_string(),
            complex: self
                .dataset
                .complex(&unit.complex)
                .map(|complex| complex.name.clone()),
            linked_only: self.data.is_linked_only(&unit.id),
            strategies: resolve(&unit.strategies, self.dataset.strategies()),
            programs: resolve(&unit.programs, self.dataset.programs()),
            projects: resolve(&unit.projects, self.dataset.projects()),
            outgoing: self
                .data
                .edges_from(&unit.id)
                .map(|edge| summarize(edge, &edge.target))
                .collect(),
            incoming: self
                .data
                .edges_to(&unit.id)
                .map(|edge| summarize(edge, &edge.source))
                .collect(),
        })
    }

    /// Selection handed to the dashboard by the "detail" action.
    ///
    /// With a focused unit: that unit as source plus its outgoing edge ids.
    /// Otherwise the current selection unchanged.
    pub fn detail_selection(&self, current: &FilterSelection) -> FilterSelection {
        let Some(focus) = self.focus.as_deref() else {
            return current.clone();
        };

        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::SourceOiv, [focus]);
        selection.set(
            FilterCategory::Edge,
            self.data.edges_from(focus).map(crate::model::Edge::key),
        );
        selection.connections_only = current.connections_only;
        selection
    }
}

impl ViewSink for InfoPanel {
    fn name(&self) -> &str {
        "info-panel"
    }

    fn on_filtered_data_changed(&mut self, data: &FilteredDataset) {
        self.data = data.clone();
        if let Some(focus) = &self.focus {
            if !self.data.contains_unit(focus) {
                self.focus = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::apply_filters;
    use crate::filter::tests::sample_dataset;

    fn panel_for(category: FilterCategory, ids: &[&str]) -> InfoPanel {
        let dataset = Arc::new(sample_dataset());
        let mut selection = FilterSelection::new();
        selection.set(category, ids.iter().copied());
        let mut panel = InfoPanel::new(Arc::clone(&dataset));
        panel.on_filtered_data_changed(&apply_filters(&dataset, &selection));
        panel
    }

    #[test]
    fn focus_cycles_through_visible_units() {
        let mut panel = panel_for(FilterCategory::Complex, &["complex1"]);
        panel.focus_next();
        assert_eq!(panel.focused(), Some("A"));
        panel.focus_next();
        panel.focus_next();
        assert_eq!(panel.focused(), Some("C"));
        panel.focus_next();
        assert_eq!(panel.focused(), Some("A"));
        panel.focus_prev();
        assert_eq!(panel.focused(), Some("C"));
    }

    #[test]
    fn details_resolve_names_and_connections() {
        let mut panel = panel_for(FilterCategory::SourceOiv, &["A"]);
        assert!(panel.focus("C"));
        let details = panel.details().unwrap();
        assert_eq!(details.name, "Gamma");
        assert_eq!(details.complex.as_deref(), Some("Transport"));
        assert_eq!(details.programs, vec!["p1".to_string(), "p2".to_string()]);
        assert!(details.outgoing.is_empty());
        assert_eq!(details.incoming.len(), 1);
        assert_eq!(details.incoming[0].other, "Alpha");
        assert_eq!(details.incoming[0].theme, "T1");
    }

    #[test]
    fn focus_is_dropped_when_unit_leaves_view() {
        let dataset = Arc::new(sample_dataset());
        let mut panel = panel_for(FilterCategory::Complex, &["complex1"]);
        assert!(panel.focus("B"));
        assert!(!panel.focus("missing"));

        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::SourceOiv, ["A"]);
        panel.on_filtered_data_changed(&apply_filters(&dataset, &selection));
        assert_eq!(panel.focused(), None);
        assert!(panel.details().is_none());
    }

    #[test]
    fn detail_selection_hands_off_focused_unit() {
        let mut panel = panel_for(FilterCategory::Complex, &["complex1"]);
        let mut current = FilterSelection::new();
        current.set(FilterCategory::Complex, ["complex1"]);

        assert_eq!(panel.detail_selection(&current), current);

        panel.focus("A");
        let handed = panel.detail_selection(&current);
        assert_eq!(handed.active_category(), Some(FilterCategory::SourceOiv));
        assert!(handed.source_oiv_ids.contains("A"));
        assert_eq!(handed.edges.len(), 1);
        assert!(handed.complexes.is_empty());
    }
}
