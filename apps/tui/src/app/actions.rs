use chrono::{DateTime, Utc};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use oiv_core::{FilterSelection, Workbook};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::app::state::{App, AppScreen};

/// File written by the export action: the workbook plus what produced it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookExport<'a> {
    pub generated_at: String,
    pub filters: &'a FilterSelection,
    #[serde(flatten)]
    pub workbook: &'a Workbook,
}

pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("oiv-dashboard-{}.json", now.format("%Y%m%d-%H%M%S"))
}

/// Serializes the export and writes it, creating parent directories
pub async fn write_workbook(
    path: &Path,
    filters: &FilterSelection,
    workbook: &Workbook,
    now: DateTime<Utc>,
) -> Result<()> {
    let export = WorkbookExport {
        generated_at: now.to_rfc3339(),
        filters,
        workbook,
    };
    let json = serde_json::to_string_pretty(&export)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| eyre!("Failed to create {}: {e}", parent.display()))?;
    }
    tokio::fs::write(path, json)
        .await
        .map_err(|e| eyre!("Failed to write {}: {e}", path.display()))?;

    tracing::info!(path = %path.display(), sheets = workbook.sheets.len(), "workbook exported");
    Ok(())
}

impl App {
    /// Hands the info panel's selection to the dashboard through the
    /// `dashboardFilters` key and switches to it.
    pub async fn open_detail(&mut self) {
        let Some(views) = &self.views else {
            return;
        };
        let selection = views
            .info
            .borrow()
            .detail_selection(views.store.selection());
        if selection.is_empty() {
            self.status_message = "Nothing to show: focus a unit or pick filters".to_string();
            return;
        }

        if let Err(e) = self.storage.save_selection(&selection).await {
            tracing::warn!(error = %e, "dashboard filters not persisted");
            self.status_message = format!("Error: {e}");
        } else {
            self.status_message = "Dashboard pinned to the focused unit".to_string();
        }

        views.dashboard.borrow_mut().pin(selection);
        self.chart_tab_index = 0;
        self.dashboard_scroll = 0;
        self.show_screen(AppScreen::Dashboard);
    }

    /// Unpins the dashboard and forgets the stored hand-off
    pub async fn follow_live_filters(&mut self) {
        let Some(views) = &self.views else {
            return;
        };
        views.dashboard.borrow_mut().follow_live(views.store.filtered());
        if let Err(e) = self.storage.clear_selection().await {
            tracing::warn!(error = %e, "stored dashboard filters not cleared");
        }
        self.status_message = "Dashboard follows the current filters".to_string();
    }

    /// Writes the dashboard's workbook into the export directory
    pub async fn export_workbook(&self) -> Result<PathBuf> {
        let views = self
            .views
            .as_ref()
            .ok_or_else(|| eyre!("Dataset not loaded yet"))?;

        let dashboard = views.dashboard.borrow();
        if dashboard.data().is_empty() {
            return Err(eyre!("Nothing to export for the current filters"));
        }
        let filters = dashboard
            .pinned_selection()
            .unwrap_or_else(|| views.store.selection())
            .clone();
        let workbook = dashboard.workbook();
        drop(dashboard);

        let now = Utc::now();
        let path = self.config.export_dir.join(export_file_name(now));
        write_workbook(&path, &filters, &workbook, now).await?;
        Ok(path)
    }

    /// Persists the table's column layout and leaves the columns modal
    pub async fn save_columns(&mut self) {
        let Some(views) = &self.views else {
            return;
        };
        let layout = views.table.borrow().layout().clone();
        self.status_message = match self.storage.save_layout(&layout).await {
            Ok(()) => "Columns saved".to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "column layout not persisted");
                format!("Error: {e}")
            }
        };
        self.columns_before = None;
        self.screen = AppScreen::Table;
    }
}
