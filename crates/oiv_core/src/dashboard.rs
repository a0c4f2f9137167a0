use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::filter::FilteredDataset;
use crate::model::{CatalogEntry, Dataset};

/// One bar of a dashboard chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartBar {
    pub label: String,
    pub count: usize,
}

/// Edge counts grouped for the dashboard charts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_edges: usize,
    pub by_theme: Vec<ChartBar>,
    pub by_source: Vec<ChartBar>,
}

impl DashboardSummary {
    pub fn build(data: &FilteredDataset) -> Self {
        let mut by_theme: BTreeMap<&str, usize> = BTreeMap::new();
        let mut by_source_id: BTreeMap<&str, usize> = BTreeMap::new();

        for edge in &data.edges {
            let theme = if edge.theme.is_empty() {
                "(no theme)"
            } else {
                edge.theme.as_str()
            };
            *by_theme.entry(theme).or_default() += 1;
            *by_source_id.entry(edge.source.as_str()).or_default() += 1;
        }

        let by_source = by_source_id
            .into_iter()
            .map(|(id, count)| (data.unit_name(id), count));

        Self {
            total_edges: data.edges.len(),
            by_theme: ranked(by_theme),
            by_source: ranked(by_source),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_edges == 0
    }
}

/// Count descending, then label ascending
fn ranked<'a>(counts: impl IntoIterator<Item = (&'a str, usize)>) -> Vec<ChartBar> {
    let mut bars: Vec<ChartBar> = counts
        .into_iter()
        .map(|(label, count)| ChartBar {
            label: label.to_string(),
            count,
        })
        .collect();
    bars.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    bars
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn new(name: &str, header: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            header: header.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        }
    }
}

/// Multi-sheet export of the filtered view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn build(dataset: &Dataset, data: &FilteredDataset) -> Self {
        Self {
            sheets: vec![
                summary_sheet(data),
                connections_sheet(data),
                oiv_sheet(dataset, data),
                themes_sheet(data),
                catalog_sheet("Strategies", dataset.strategies(), data, |unit| &unit.strategies),
                catalog_sheet("Programs", dataset.programs(), data, |unit| &unit.programs),
            ],
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

/// Source unit × theme cross-tab with totals
pub fn summary_sheet(data: &FilteredDataset) -> Sheet {
    let themes: BTreeSet<&str> = data.edges.iter().map(|edge| edge.theme.as_str()).collect();
    let mut counts: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for edge in &data.edges {
        *counts
            .entry(edge.source.as_str())
            .or_default()
            .entry(edge.theme.as_str())
            .or_default() += 1;
    }
    let mut sources: Vec<(&str, &str, &BTreeMap<&str, usize>)> = counts
        .iter()
        .map(|(id, per_theme)| (data.unit_name(id), *id, per_theme))
        .collect();
    sources.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(b.1)));

    let mut header = vec!["Source".to_string()];
    header.extend(themes.iter().map(ToString::to_string));
    header.push("Total".to_string());

    let mut rows = Vec::new();
    let mut column_totals = vec![0_usize; themes.len()];
    for (name, _, per_theme) in sources {
        let mut row = vec![name.to_string()];
        let mut row_total = 0;
        for (index, theme) in themes.iter().enumerate() {
            let count = per_theme.get(theme).copied().unwrap_or(0);
            column_totals[index] += count;
            row_total += count;
            row.push(count.to_string());
        }
        row.push(row_total.to_string());
        rows.push(row);
    }

    let mut totals = vec!["Total".to_string()];
    totals.extend(column_totals.iter().map(ToString::to_string));
    totals.push(data.edges.len().to_string());
    rows.push(totals);

    Sheet {
        name: "Summary".to_string(),
        header,
        rows,
    }
}

fn connections_sheet(data: &FilteredDataset) -> Sheet {
    let mut sheet = Sheet::new(
        "Connections",
        &["Source", "Source complex", "Target", "Target complex", "Theme", "Description"],
    );
    sheet.rows = data
        .edges
        .iter()
        .map(|edge| {
            vec![
                data.unit_name(&edge.source).to_string(),
                data.unit_complex_name(&edge.source).to_string(),
                data.unit_name(&edge.target).to_string(),
                data.unit_complex_name(&edge.target).to_string(),
                edge.theme.clone(),
                edge.label.clone(),
            ]
        })
        .collect();
    sheet
}

fn oiv_sheet(dataset: &Dataset, data: &FilteredDataset) -> Sheet {
    let mut sheet = Sheet::new(
        "OIV",
        &["Id", "Name", "Complex", "Strategies", "Programs", "Linked only"],
    );
    let names = |ids: &[String], catalog: &[CatalogEntry]| {
        ids.iter()
            .map(|id| {
                catalog
                    .iter()
                    .find(|entry| entry.id == *id)
                    .map_or(id.as_str(), |entry| entry.name.as_str())
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("; ")
    };

    sheet.rows = data
        .visible_oiv()
        .map(|unit| {
            vec![
                unit.id.clone(),
                unit.display_name().to_string(),
                dataset.complex_name(&unit.complex).to_string(),
                names(&unit.strategies, dataset.strategies()),
                names(&unit.programs, dataset.programs()),
                if data.is_linked_only(&unit.id) { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    sheet
}

fn themes_sheet(data: &FilteredDataset) -> Sheet {
    let mut sheet = Sheet::new("Themes", &["Theme", "Color", "Connections"]);
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for edge in &data.edges {
        *counts.entry(edge.theme.as_str()).or_default() += 1;
    }
    sheet.rows = counts
        .into_iter()
        .map(|(theme, count)| {
            let color = data.theme(theme).map_or("", |record| record.color.as_str());
            vec![theme.to_string(), color.to_string(), count.to_string()]
        })
        .collect();
    sheet
}

/// Catalog entries referenced by the matched units, with usage counts
fn catalog_sheet<F>(
    name: &str,
    catalog: &[CatalogEntry],
    data: &FilteredDataset,
    ids_of: F,
) -> Sheet
where
    F: Fn(&crate::model::Unit) -> &Vec<String>,
{
    let mut usage: BTreeMap<&str, usize> = BTreeMap::new();
    for unit in &data.oiv {
        for id in ids_of(unit) {
            *usage.entry(id.as_str()).or_default() += 1;
        }
    }

    let mut sheet = Sheet::new(name, &["Id", "Name", "Type", "OIV"]);
    sheet.rows = usage
        .into_iter()
        .map(|(id, count)| {
            let entry = catalog.iter().find(|entry| entry.id == id);
            vec![
                id.to_string(),
                entry.map_or_else(String::new, |entry| entry.name.clone()),
                entry
                    .and_then(|entry| entry.kind.clone())
                    .unwrap_or_default(),
                count.to_string(),
            ]
        })
        .collect();
    sheet
}
