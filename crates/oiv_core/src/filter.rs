//! Cascading filter engine.
//!
//! [`apply_filters`] turns a dataset and a [`FilterSelection`] into a
//! [`FilteredDataset`] that every view renders. Only the first non-empty
//! category (see [`FilterCategory::PRIORITY`]) is evaluated.

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use crate::model::{Complex, Dataset, Edge, Theme, Unit};
use crate::selection::{FilterCategory, FilterSelection};

/// Consistent subgraph produced by [`apply_filters`]
///
/// `oiv` holds the units the category matched. For unit-driven categories
/// (complexes, strategies, programs) kept edges may reach units outside
/// that set; those endpoints are listed in `linked_oiv` so views can still
/// resolve them. Every edge endpoint is in `oiv ∪ linked_oiv`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredDataset {
    pub category: Option<FilterCategory>,
    pub oiv: Vec<Unit>,
    pub linked_oiv: Vec<Unit>,
    pub edges: Vec<Edge>,
    pub complexes: Vec<Complex>,
    pub themes: Vec<Theme>,
}

impl FilteredDataset {
    pub fn is_empty(&self) -> bool {
        self.oiv.is_empty() && self.edges.is_empty()
    }

    /// Matched units followed by linked endpoints
    pub fn visible_oiv(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.oiv.iter().chain(self.linked_oiv.iter())
    }

    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.visible_oiv().find(|unit| unit.id == id)
    }

    pub fn contains_unit(&self, id: &str) -> bool {
        self.unit(id).is_some()
    }

    pub fn is_linked_only(&self, id: &str) -> bool {
        self.linked_oiv.iter().any(|unit| unit.id == id)
    }

    pub fn unit_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.unit(id).map_or(id, Unit::display_name)
    }

    pub fn complex(&self, id: &str) -> Option<&Complex> {
        self.complexes.iter().find(|complex| complex.id == id)
    }

    /// Complex name of a visible unit, empty when unknown
    pub fn unit_complex_name(&self, unit_id: &str) -> &str {
        self.unit(unit_id)
            .and_then(|unit| self.complex(&unit.complex))
            .map_or("", |complex| complex.name.as_str())
    }

    pub fn theme(&self, edge_theme: &str) -> Option<&Theme> {
        self.themes.iter().find(|theme| theme.matches(edge_theme))
    }

    pub fn edges_from<'a>(&'a self, unit_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| edge.source == unit_id)
    }

    pub fn edges_to<'a>(&'a self, unit_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| edge.target == unit_id)
    }
}

/// Applies the selection to the dataset.
///
/// Pure: the dataset is only read and the result owns clones of the kept
/// entities, in dataset order. An empty selection yields an empty result.
pub fn apply_filters(dataset: &Dataset, selection: &FilterSelection) -> FilteredDataset {
    let Some(category) = selection.active_category() else {
        return FilteredDataset::default();
    };
    let ids = selection.ids(category);

    let filtered = match category {
        FilterCategory::SourceOiv => by_edges(dataset, category, |edge| ids.contains(&edge.source)),
        FilterCategory::TargetOiv => by_edges(dataset, category, |edge| ids.contains(&edge.target)),
        FilterCategory::Theme => by_edges(dataset, category, |edge| ids.contains(&edge.theme)),
        FilterCategory::Edge => by_edges(dataset, category, |edge| ids.contains(&edge.key())),
        FilterCategory::Complex => by_units(dataset, category, selection.connections_only, |unit| {
            ids.contains(&unit.complex)
        }),
        FilterCategory::Strategy => {
            by_units(dataset, category, selection.connections_only, |unit| {
                unit.strategies.iter().any(|id| ids.contains(id))
            })
        }
        FilterCategory::Program => by_units(dataset, category, selection.connections_only, |unit| {
            unit.programs.iter().any(|id| ids.contains(id))
        }),
    };

    tracing::debug!(
        category = category.as_str(),
        oiv = filtered.oiv.len(),
        linked = filtered.linked_oiv.len(),
        edges = filtered.edges.len(),
        "filters applied"
    );

    filtered
}

/// Keeps edges matching `keep`; units are the kept edges' endpoints
fn by_edges<F>(dataset: &Dataset, category: FilterCategory, keep: F) -> FilteredDataset
where
    F: Fn(&Edge) -> bool,
{
    let edges: Vec<Edge> = dataset
        .resolvable_edges()
        .filter(|&edge| keep(edge))
        .cloned()
        .collect();

    let endpoints = endpoint_ids(&edges);
    let oiv = dataset
        .units()
        .iter()
        .filter(|unit| endpoints.contains(unit.id.as_str()))
        .cloned()
        .collect();

    finish(dataset, category, oiv, Vec::new(), edges)
}

/// Keeps units matching `keep`; edges are those touching a kept unit
fn by_units<F>(
    dataset: &Dataset,
    category: FilterCategory,
    connections_only: bool,
    keep: F,
) -> FilteredDataset
where
    F: Fn(&Unit) -> bool,
{
    let matched: HashSet<&str> = dataset
        .units()
        .iter()
        .filter(|&unit| keep(unit))
        .map(|unit| unit.id.as_str())
        .collect();

    let edges: Vec<Edge> = dataset
        .resolvable_edges()
        .filter(|edge| matched.contains(edge.source.as_str()) || matched.contains(edge.target.as_str()))
        .cloned()
        .collect();

    let endpoints = endpoint_ids(&edges);

    let mut oiv = Vec::new();
    let mut linked_oiv = Vec::new();
    for unit in dataset.units() {
        let id = unit.id.as_str();
        if matched.contains(id) {
            if !connections_only || endpoints.contains(id) {
                oiv.push(unit.clone());
            }
        } else if endpoints.contains(id) {
            linked_oiv.push(unit.clone());
        }
    }

    finish(dataset, category, oiv, linked_oiv, edges)
}

fn endpoint_ids(edges: &[Edge]) -> HashSet<&str> {
    edges
        .iter()
        .flat_map(|edge| [edge.source.as_str(), edge.target.as_str()])
        .collect()
}

fn finish(
    dataset: &Dataset,
    category: FilterCategory,
    oiv: Vec<Unit>,
    linked_oiv: Vec<Unit>,
    edges: Vec<Edge>,
) -> FilteredDataset {
    let complex_ids: BTreeSet<&str> = oiv
        .iter()
        .chain(linked_oiv.iter())
        .map(|unit| unit.complex.as_str())
        .collect();
    let complexes = dataset
        .complexes()
        .iter()
        .filter(|complex| complex_ids.contains(complex.id.as_str()))
        .cloned()
        .collect();

    let themes = dataset
        .themes()
        .iter()
        .filter(|theme| edges.iter().any(|edge| theme.matches(&edge.theme)))
        .cloned()
        .collect();

    FilteredDataset {
        category: Some(category),
        oiv,
        linked_oiv,
        edges,
        complexes,
        themes,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{Catalogs, DataFile};

    /// Units A, B in complex1 and C in complex2 with a single A→C edge
    pub fn sample_dataset() -> Dataset {
        let data = DataFile::from_json(
            r##"{
                "complexes": [
                    {"id": "complex1", "name": "Economy", "color": "#ff0000", "radius": 40},
                    {"id": "complex2", "name": "Transport", "color": "#00ff00", "radius": 30}
                ],
                "oiv": [
                    {"id": "A", "name": "Alpha", "complex": "complex1", "strategies": ["s1"], "programs": ["p1"]},
                    {"id": "B", "name": "Beta", "complex": "complex1", "strategies": ["s2"]},
                    {"id": "C", "name": "Gamma", "complex": "complex2", "programs": ["p1", "p2"]}
                ],
                "edges": [
                    {"source": "A", "target": "C", "theme": "T1", "label": "joint reporting"}
                ],
                "themes": [
                    {"id": "t1", "name": "T1", "color": "#0000ff"},
                    {"id": "t2", "name": "T2", "color": "#ffff00"}
                ]
            }"##,
        )
        .unwrap();
        Dataset::from_parts(data, Catalogs::default())
    }

    fn ids(units: &[Unit]) -> Vec<&str> {
        units.iter().map(|unit| unit.id.as_str()).collect()
    }

    #[test]
    fn empty_selection_yields_empty_result() {
        let filtered = apply_filters(&sample_dataset(), &FilterSelection::new());
        assert_eq!(filtered, FilteredDataset::default());
        assert!(filtered.is_empty());
    }

    #[test]
    fn source_selection_keeps_outgoing_edges_and_endpoints() {
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::SourceOiv, ["A"]);
        let filtered = apply_filters(&sample_dataset(), &selection);

        assert_eq!(filtered.category, Some(FilterCategory::SourceOiv));
        assert_eq!(filtered.edges.len(), 1);
        assert_eq!(filtered.edges[0].source, "A");
        assert_eq!(filtered.edges[0].target, "C");
        assert_eq!(ids(&filtered.oiv), vec!["A", "C"]);
        assert!(filtered.linked_oiv.is_empty());
        assert_eq!(filtered.themes.len(), 1);
        assert_eq!(filtered.complexes.len(), 2);
    }

    #[test]
    fn theme_selection_matches_source_example() {
        let dataset = sample_dataset();
        let mut by_source = FilterSelection::new();
        by_source.set(FilterCategory::SourceOiv, ["A"]);
        let mut by_theme = FilterSelection::new();
        by_theme.set(FilterCategory::Theme, ["T1"]);

        let from_source = apply_filters(&dataset, &by_source);
        let from_theme = apply_filters(&dataset, &by_theme);
        assert_eq!(from_source.edges, from_theme.edges);
        assert_eq!(from_source.oiv, from_theme.oiv);
    }

    #[test]
    fn target_selection_keeps_incoming_edges() {
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::TargetOiv, ["A"]);
        let filtered = apply_filters(&sample_dataset(), &selection);
        assert!(filtered.edges.is_empty());
        assert!(filtered.oiv.is_empty());

        selection.set(FilterCategory::TargetOiv, ["C"]);
        let filtered = apply_filters(&sample_dataset(), &selection);
        assert_eq!(filtered.edges.len(), 1);
    }

    #[test]
    fn complex_selection_links_outside_endpoints() {
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::Complex, ["complex1"]);
        let filtered = apply_filters(&sample_dataset(), &selection);

        assert_eq!(ids(&filtered.oiv), vec!["A", "B"]);
        assert_eq!(ids(&filtered.linked_oiv), vec!["C"]);
        assert_eq!(filtered.edges.len(), 1);
        assert_eq!(filtered.unit_name("C"), "Gamma");
        assert!(filtered.is_linked_only("C"));
    }

    #[test]
    fn connections_only_drops_isolated_units() {
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::Complex, ["complex1"]);
        selection.connections_only = true;
        let filtered = apply_filters(&sample_dataset(), &selection);

        assert_eq!(ids(&filtered.oiv), vec!["A"]);
        assert_eq!(ids(&filtered.linked_oiv), vec!["C"]);
    }

    #[test]
    fn strategy_and_program_selections_intersect_unit_lists() {
        let dataset = sample_dataset();
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::Strategy, ["s2"]);
        let filtered = apply_filters(&dataset, &selection);
        assert_eq!(ids(&filtered.oiv), vec!["B"]);
        assert!(filtered.edges.is_empty());

        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::Program, ["p1"]);
        let filtered = apply_filters(&dataset, &selection);
        assert_eq!(ids(&filtered.oiv), vec!["A", "C"]);
        assert!(filtered.linked_oiv.is_empty());
        assert_eq!(filtered.edges.len(), 1);
    }

    #[test]
    fn edge_selection_uses_composite_key() {
        let dataset = sample_dataset();
        let key = dataset.edges()[0].key();
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::Edge, [key]);
        let filtered = apply_filters(&dataset, &selection);
        assert_eq!(filtered.edges.len(), 1);
        assert_eq!(ids(&filtered.oiv), vec!["A", "C"]);
    }

    #[test]
    fn higher_priority_category_shadows_lower_ones() {
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::Theme, ["T2"]);
        selection.set(FilterCategory::Complex, ["complex1"]);
        let filtered = apply_filters(&sample_dataset(), &selection);
        assert_eq!(filtered.category, Some(FilterCategory::Theme));
        assert!(filtered.edges.is_empty());
        assert!(filtered.oiv.is_empty());
    }

    #[test]
    fn dangling_edges_stay_invisible() {
        let data = DataFile::from_json(
            r#"{"oiv": [{"id": "A", "complex": "c"}],
                "edges": [{"source": "A", "target": "missing", "theme": "T"}]}"#,
        )
        .unwrap();
        let dataset = Dataset::from_parts(data, Catalogs::default());
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::SourceOiv, ["A"]);
        assert!(apply_filters(&dataset, &selection).is_empty());

        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::Complex, ["c"]);
        let filtered = apply_filters(&dataset, &selection);
        assert_eq!(ids(&filtered.oiv), vec!["A"]);
        assert!(filtered.edges.is_empty());
    }

    #[test]
    fn malformed_dataset_degrades_to_empty() {
        let dataset = Dataset::from_parts(DataFile::default(), Catalogs::default());
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::Complex, ["complex1"]);
        let filtered = apply_filters(&dataset, &selection);
        assert!(filtered.is_empty());
        assert_eq!(filtered.category, Some(FilterCategory::Complex));
    }

    #[test]
    fn repeated_application_is_byte_identical() {
        let dataset = sample_dataset();
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::Complex, ["complex1", "complex2"]);
        let first = serde_json::to_string(&apply_filters(&dataset, &selection)).unwrap();
        let second = serde_json::to_string(&apply_filters(&dataset, &selection)).unwrap();
        assert_eq!(first, second);
    }
}
