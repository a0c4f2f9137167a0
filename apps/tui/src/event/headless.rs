use chrono::Utc;
use color_eyre::Result;
use oiv_core::{
    apply_filters, DashboardSummary, Dataset, DatasetTotals, FilterCategory, FilterSelection,
    SelectionStats, Workbook,
};
use serde::Serialize;
use std::path::Path;

use crate::app::actions::write_workbook;
use crate::cli::CliArgs;
use crate::config::AppConfig;
use crate::db::KeyValueStore;
use crate::loader::load_dataset;

/// Everything headless mode prints
#[derive(Debug, Serialize)]
pub struct HeadlessReport {
    pub totals: DatasetTotals,
    pub selection: FilterSelection,
    pub active_category: Option<FilterCategory>,
    pub ignored_categories: Vec<FilterCategory>,
    pub selected: Vec<(FilterCategory, usize)>,
    pub stats: SelectionStats,
    pub dashboard: DashboardSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub storage: StorageSummary,
}

/// Where settings live and which keys are stored
#[derive(Debug, Default, Serialize)]
pub struct StorageSummary {
    pub persistent: bool,
    pub keys: Vec<StoredKey>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct StoredKey {
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub updated: String,
}

pub async fn summarize_storage(storage: &KeyValueStore) -> StorageSummary {
    let keys = match storage.list_items().await {
        Ok(items) => items
            .into_iter()
            .map(|item| StoredKey {
                key: item.key,
                updated: item.updated,
            })
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "could not list stored settings");
            Vec::new()
        }
    };
    StorageSummary {
        persistent: storage.is_persistent(),
        keys,
    }
}

pub fn build_report(dataset: &Dataset, selection: &FilterSelection) -> HeadlessReport {
    let filtered = apply_filters(dataset, selection);
    HeadlessReport {
        totals: DatasetTotals::of(dataset),
        selection: selection.clone(),
        active_category: filtered.category,
        ignored_categories: selection.shadowed_categories(),
        selected: selection
            .counts()
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .collect(),
        stats: SelectionStats::from_filtered(&filtered),
        dashboard: DashboardSummary::build(&filtered),
        load_error: None,
        warnings: Vec::new(),
        storage: StorageSummary::default(),
    }
}

/// Run the application in headless mode (no UI)
pub async fn run_headless(
    args: &CliArgs,
    config: &AppConfig,
    storage: &KeyValueStore,
) -> Result<()> {
    let loaded = load_dataset(&config.data_dir).await;

    let selection = if args.from_storage {
        storage.load_selection().await
    } else {
        args.selection()
    };

    let mut report = build_report(&loaded.dataset, &selection);
    report.load_error = loaded.error;
    report.warnings = loaded.warnings;
    report.storage = summarize_storage(storage).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(path) = &args.export {
        let filtered = apply_filters(&loaded.dataset, &selection);
        let workbook = Workbook::build(&loaded.dataset, &filtered);
        write_workbook(Path::new(path), &selection, &workbook, Utc::now()).await?;
        if !args.json {
            println!("\nWorkbook written to {path}");
        }
    }

    Ok(())
}

fn print_report(report: &HeadlessReport) {
    println!("\nOIV Dashboard");
    println!("=============");
    if let Some(error) = &report.load_error {
        println!("Dataset unavailable: {error}");
    }
    for warning in &report.warnings {
        println!("Warning: {warning}");
    }

    let totals = &report.totals;
    println!(
        "Dataset: {} complexes, {} units, {} connections, {} themes",
        totals.complexes, totals.units, totals.edges, totals.themes
    );
    println!(
        "Catalogs: {} strategies, {} programs, {} projects",
        totals.strategies, totals.programs, totals.projects
    );

    println!("\nFilters:");
    match report.active_category {
        Some(category) => println!("- active: {}", category.label()),
        None => println!("- none (nothing to show)"),
    }
    for (category, count) in &report.selected {
        println!("- {}: {count} selected", category.label());
    }
    if !report.ignored_categories.is_empty() {
        let names: Vec<&str> = report
            .ignored_categories
            .iter()
            .map(|category| category.label())
            .collect();
        println!("- ignored: {}", names.join(", "));
    }
    if report.selection.connections_only {
        println!("- connections only");
    }

    let stats = &report.stats;
    println!("\nSelection:");
    println!("- complexes: {}", stats.complexes);
    println!("- units: {}", stats.units);
    println!("- themes: {}", stats.themes);
    println!("- connections: {}", stats.edges);
    println!("- strategies: {}", stats.strategies);
    println!("- programs: {}", stats.programs);

    println!("\nConnections by theme:");
    for bar in &report.dashboard.by_theme {
        println!("- {}: {}", bar.label, bar.count);
    }

    println!("\nConnections by source:");
    for bar in &report.dashboard.by_source {
        println!("- {}: {}", bar.label, bar.count);
    }

    let storage = &report.storage;
    println!(
        "\nStorage ({}):",
        if storage.persistent { "sqlite" } else { "memory only" }
    );
    if storage.keys.is_empty() {
        println!("- nothing stored");
    }
    for stored in &storage.keys {
        if stored.updated.is_empty() {
            println!("- {}", stored.key);
        } else {
            println!("- {} (updated {})", stored.key, stored.updated);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oiv_core::{Catalogs, DataFile};

    fn dataset() -> Dataset {
        let data = DataFile::from_json(
            r#"{
                "complexes": [{"id": "c1", "name": "Economy"}, {"id": "c2", "name": "Transport"}],
                "oiv": [
                    {"id": "A", "name": "Alpha", "complex": "c1", "strategies": ["s1"]},
                    {"id": "B", "name": "Beta", "complex": "c1"},
                    {"id": "C", "name": "Gamma", "complex": "c2"}
                ],
                "edges": [
                    {"source": "A", "target": "C", "theme": "T1"},
                    {"source": "B", "target": "C", "theme": "T1"},
                    {"source": "C", "target": "A", "theme": "T2"}
                ]
            }"#,
        )
        .unwrap();
        Dataset::from_parts(data, Catalogs::default())
    }

    #[test]
    fn report_reflects_active_category() {
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::Theme, ["T1"]);
        selection.set(FilterCategory::Strategy, ["s1"]);

        let report = build_report(&dataset(), &selection);
        assert_eq!(report.active_category, Some(FilterCategory::Theme));
        assert_eq!(report.ignored_categories, vec![FilterCategory::Strategy]);
        assert_eq!(
            report.selected,
            vec![(FilterCategory::Theme, 1), (FilterCategory::Strategy, 1)]
        );
        assert_eq!(report.stats.edges, 2);
        assert_eq!(report.dashboard.by_source.len(), 2);
        assert_eq!(report.totals.units, 3);
    }

    #[tokio::test]
    async fn storage_summary_lists_keys() {
        let mut storage = KeyValueStore::default();
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::Complex, ["c1"]);
        storage.save_selection(&selection).await.unwrap();

        let summary = summarize_storage(&storage).await;
        assert!(!summary.persistent);
        assert_eq!(
            summary.keys,
            vec![StoredKey {
                key: "dashboardFilters".to_string(),
                updated: String::new(),
            }]
        );

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["keys"][0]["key"], "dashboardFilters");
        assert!(json["keys"][0].get("updated").is_none());
    }

    #[test]
    fn report_serializes_for_json_output() {
        let report = build_report(&dataset(), &FilterSelection::new());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stats"]["edges"], 0);
        assert_eq!(json["totals"]["edges"], 3);
        assert!(json["active_category"].is_null());
        assert!(json.get("load_error").is_none());
    }
}
