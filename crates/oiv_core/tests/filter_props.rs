//! Property-based tests for the cascading filter engine
//!
//! Invariants:
//! - An empty selection yields an empty result
//! - Every kept edge has both endpoints among the visible units
//! - Single-category selections keep exactly the matching edges
//! - Only the highest-priority non-empty category matters
//! - Filtering is deterministic
//! - The selection blob survives storage

use std::collections::BTreeSet;

use oiv_core::storage::{decode_selection, encode_selection};
use oiv_core::{apply_filters, Catalogs, DataFile, Dataset, FilterCategory, FilterSelection};
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Strategies
// ============================================================================

const UNITS: usize = 8;
const COMPLEXES: usize = 3;
const THEMES: usize = 3;
const CATALOG: usize = 4;

#[derive(Debug, Clone)]
struct UnitShape {
    complex: usize,
    strategies: Vec<usize>,
    programs: Vec<usize>,
}

#[derive(Debug, Clone)]
struct EdgeShape {
    source: usize,
    target: usize,
    theme: usize,
}

fn unit_shape() -> impl Strategy<Value = UnitShape> {
    (
        0..COMPLEXES,
        prop::collection::vec(0..CATALOG, 0..3),
        prop::collection::vec(0..CATALOG, 0..3),
    )
        .prop_map(|(complex, strategies, programs)| UnitShape {
            complex,
            strategies,
            programs,
        })
}

/// Endpoints may point past the unit list to produce dangling edges
fn edge_shape(units: usize) -> impl Strategy<Value = EdgeShape> {
    (0..units + 2, 0..units + 2, 0..THEMES).prop_map(|(source, target, theme)| EdgeShape {
        source,
        target,
        theme,
    })
}

fn dataset_strategy() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(unit_shape(), 1..UNITS).prop_flat_map(|units| {
        let count = units.len();
        prop::collection::vec(edge_shape(count), 0..16)
            .prop_map(move |edges| build_dataset(&units, &edges))
    })
}

fn build_dataset(units: &[UnitShape], edges: &[EdgeShape]) -> Dataset {
    let complexes: Vec<_> = (0..COMPLEXES)
        .map(|index| json!({"id": format!("c{index}"), "name": format!("Complex {index}")}))
        .collect();
    let oiv: Vec<_> = units
        .iter()
        .enumerate()
        .map(|(index, unit)| {
            json!({
                "id": format!("u{index}"),
                "name": format!("Unit {index}"),
                "complex": format!("c{}", unit.complex),
                "strategies": unit.strategies.iter().map(|id| format!("s{id}")).collect::<Vec<_>>(),
                "programs": unit.programs.iter().map(|id| format!("p{id}")).collect::<Vec<_>>(),
            })
        })
        .collect();
    let edges: Vec<_> = edges
        .iter()
        .map(|edge| {
            json!({
                "source": format!("u{}", edge.source),
                "target": format!("u{}", edge.target),
                "theme": format!("T{}", edge.theme),
            })
        })
        .collect();

    let data = DataFile::from_value(json!({
        "complexes": complexes,
        "oiv": oiv,
        "edges": edges,
    }))
    .unwrap();
    Dataset::from_parts(data, Catalogs::default())
}

fn category_strategy() -> impl Strategy<Value = FilterCategory> {
    (0..FilterCategory::PRIORITY.len()).prop_map(|index| FilterCategory::PRIORITY[index])
}

/// Plausible ids for a category, with a few that match nothing
fn ids_for(category: FilterCategory) -> BoxedStrategy<BTreeSet<String>> {
    let prefix = match category {
        FilterCategory::SourceOiv | FilterCategory::TargetOiv => "u",
        FilterCategory::Theme => "T",
        FilterCategory::Complex => "c",
        FilterCategory::Strategy => "s",
        FilterCategory::Program => "p",
        FilterCategory::Edge => "u",
    };
    if category == FilterCategory::Edge {
        return prop::collection::btree_set(
            (0..UNITS, 0..UNITS, 0..THEMES).prop_map(|(s, t, th)| format!("u{s}|u{t}|T{th}|")),
            1..6,
        )
        .boxed();
    }
    prop::collection::btree_set((0..UNITS).prop_map(move |id| format!("{prefix}{id}")), 1..4)
        .boxed()
}

fn single_category() -> impl Strategy<Value = (FilterCategory, BTreeSet<String>, bool)> {
    category_strategy()
        .prop_flat_map(|category| (Just(category), ids_for(category), any::<bool>()))
}

fn any_selection() -> impl Strategy<Value = FilterSelection> {
    prop::collection::vec(single_category(), 0..4).prop_map(|parts| {
        let mut selection = FilterSelection::new();
        for (category, ids, connections_only) in parts {
            selection.set(category, ids);
            selection.connections_only |= connections_only;
        }
        selection
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn empty_selection_is_empty(dataset in dataset_strategy(), toggle in any::<bool>()) {
        let mut selection = FilterSelection::new();
        selection.connections_only = toggle;
        let filtered = apply_filters(&dataset, &selection);
        prop_assert!(filtered.is_empty());
        prop_assert!(filtered.linked_oiv.is_empty());
        prop_assert_eq!(filtered.category, None);
    }

    #[test]
    fn kept_edges_have_visible_endpoints(
        dataset in dataset_strategy(),
        selection in any_selection(),
    ) {
        let filtered = apply_filters(&dataset, &selection);
        for edge in &filtered.edges {
            prop_assert!(filtered.contains_unit(&edge.source), "missing source {}", edge.source);
            prop_assert!(filtered.contains_unit(&edge.target), "missing target {}", edge.target);
            prop_assert!(dataset.is_resolvable(edge));
        }
        for unit in &filtered.linked_oiv {
            prop_assert!(!filtered.oiv.iter().any(|matched| matched.id == unit.id));
        }
    }

    #[test]
    fn single_category_keeps_exactly_matching_edges(
        dataset in dataset_strategy(),
        (category, ids, connections_only) in single_category(),
    ) {
        let mut selection = FilterSelection::new();
        selection.set(category, ids.iter().cloned());
        selection.connections_only = connections_only;
        let filtered = apply_filters(&dataset, &selection);
        prop_assert_eq!(filtered.category, Some(category));

        let matched: BTreeSet<&str> = filtered.oiv.iter().map(|unit| unit.id.as_str()).collect();
        let expected: Vec<_> = dataset
            .resolvable_edges()
            .filter(|edge| match category {
                FilterCategory::SourceOiv => ids.contains(&edge.source),
                FilterCategory::TargetOiv => ids.contains(&edge.target),
                FilterCategory::Theme => ids.contains(&edge.theme),
                FilterCategory::Edge => ids.contains(&edge.key()),
                FilterCategory::Complex
                | FilterCategory::Strategy
                | FilterCategory::Program => {
                    matched.contains(edge.source.as_str()) || matched.contains(edge.target.as_str())
                }
            })
            .cloned()
            .collect();
        prop_assert_eq!(&filtered.edges, &expected);

        if !category.is_edge_driven() {
            for unit in &filtered.oiv {
                let hit = match category {
                    FilterCategory::Complex => ids.contains(&unit.complex),
                    FilterCategory::Strategy => unit.strategies.iter().any(|id| ids.contains(id)),
                    _ => unit.programs.iter().any(|id| ids.contains(id)),
                };
                prop_assert!(hit, "unit {} does not match", unit.id);
            }
        }
    }

    #[test]
    fn only_the_first_non_empty_category_counts(
        dataset in dataset_strategy(),
        selection in any_selection(),
    ) {
        let full = apply_filters(&dataset, &selection);
        let mut reduced = FilterSelection::new();
        reduced.connections_only = selection.connections_only;
        if let Some(active) = selection.active_category() {
            reduced.set(active, selection.ids(active).iter().cloned());
        }
        prop_assert_eq!(full, apply_filters(&dataset, &reduced));
    }

    #[test]
    fn filtering_is_deterministic(dataset in dataset_strategy(), selection in any_selection()) {
        prop_assert_eq!(apply_filters(&dataset, &selection), apply_filters(&dataset, &selection));
    }

    #[test]
    fn selection_blob_round_trips(selection in any_selection()) {
        let raw = encode_selection(&selection).unwrap();
        prop_assert_eq!(decode_selection(&raw).unwrap(), selection);
    }
}
