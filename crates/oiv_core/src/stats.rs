use serde::Serialize;
use std::collections::BTreeSet;

use crate::filter::{apply_filters, FilteredDataset};
use crate::model::Dataset;
use crate::selection::FilterSelection;

/// Distinct entities touched by the current selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SelectionStats {
    pub complexes: usize,
    pub units: usize,
    pub themes: usize,
    pub edges: usize,
    pub strategies: usize,
    pub programs: usize,
}

impl SelectionStats {
    pub fn from_filtered(data: &FilteredDataset) -> Self {
        let complexes: BTreeSet<&str> = data
            .visible_oiv()
            .map(|unit| unit.complex.as_str())
            .filter(|id| !id.is_empty())
            .collect();
        let units: BTreeSet<&str> = data.visible_oiv().map(|unit| unit.id.as_str()).collect();
        let themes: BTreeSet<&str> = data
            .edges
            .iter()
            .map(|edge| edge.theme.as_str())
            .filter(|theme| !theme.is_empty())
            .collect();
        let strategies: BTreeSet<&str> = data
            .oiv
            .iter()
            .flat_map(|unit| unit.strategies.iter().map(String::as_str))
            .collect();
        let programs: BTreeSet<&str> = data
            .oiv
            .iter()
            .flat_map(|unit| unit.programs.iter().map(String::as_str))
            .collect();

        Self {
            complexes: complexes.len(),
            units: units.len(),
            themes: themes.len(),
            edges: data.edges.len(),
            strategies: strategies.len(),
            programs: programs.len(),
        }
    }

    pub fn compute(dataset: &Dataset, selection: &FilterSelection) -> Self {
        Self::from_filtered(&apply_filters(dataset, selection))
    }
}

/// Unfiltered totals shown next to the selection readout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatasetTotals {
    pub complexes: usize,
    pub units: usize,
    pub edges: usize,
    pub themes: usize,
    pub strategies: usize,
    pub programs: usize,
    pub projects: usize,
}

impl DatasetTotals {
    pub fn of(dataset: &Dataset) -> Self {
        Self {
            complexes: dataset.complexes().len(),
            units: dataset.units().len(),
            edges: dataset.resolvable_edges().count(),
            themes: dataset.theme_names().len().max(dataset.themes().len()),
            strategies: dataset.strategies().len(),
            programs: dataset.programs().len(),
            projects: dataset.projects().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::sample_dataset;
    use crate::selection::FilterCategory;

    #[test]
    fn empty_selection_counts_nothing() {
        let stats = SelectionStats::compute(&sample_dataset(), &FilterSelection::new());
        assert_eq!(stats, SelectionStats::default());
    }

    #[test]
    fn complex_selection_counts_linked_units() {
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::Complex, ["complex1"]);
        let stats = SelectionStats::compute(&sample_dataset(), &selection);

        assert_eq!(stats.units, 3);
        assert_eq!(stats.complexes, 2);
        assert_eq!(stats.edges, 1);
        assert_eq!(stats.themes, 1);
        // s1 from A, s2 from B; C is only linked
        assert_eq!(stats.strategies, 2);
        assert_eq!(stats.programs, 1);
    }

    #[test]
    fn totals_cover_the_whole_dataset() {
        let totals = DatasetTotals::of(&sample_dataset());
        assert_eq!(totals.units, 3);
        assert_eq!(totals.complexes, 2);
        assert_eq!(totals.edges, 1);
        assert_eq!(totals.themes, 2);
    }
}
