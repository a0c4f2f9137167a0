use std::collections::BTreeMap;

use oiv_core::storage::{
    encode_columns, encode_selection, layout_or_default, selection_or_empty, COLUMN_ORDER_KEY,
    DASHBOARD_FILTERS_KEY, SELECTED_COLUMNS_KEY,
};
use oiv_core::{ColumnLayout, FilterSelection, StorageError};
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::db::models::StorageRecord;
use crate::db::{create_database_pool, queries};

/// String key/value store shared by the views.
///
/// Backed by SQLite; when the database cannot be opened the app keeps
/// running on an in-memory map that is lost on exit.
#[derive(Debug, Clone)]
pub enum KeyValueStore {
    Sqlite(SqlitePool),
    Memory(BTreeMap<String, String>),
}

impl Default for KeyValueStore {
    fn default() -> Self {
        Self::Memory(BTreeMap::new())
    }
}

fn backend(err: sqlx::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

impl KeyValueStore {
    pub async fn open(config: &AppConfig) -> Self {
        match create_database_pool(config).await {
            Ok(pool) => Self::Sqlite(pool),
            Err(err) => {
                tracing::warn!(error = %err, "storage unavailable, settings will not persist");
                Self::default()
            }
        }
    }

    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Sqlite(_))
    }

    pub async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Sqlite(pool) => queries::get_item(pool, key).await.map_err(backend),
            Self::Memory(map) => Ok(map.get(key).cloned()),
        }
    }

    pub async fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Self::Sqlite(pool) => queries::set_item(pool, key, value).await.map_err(backend),
            Self::Memory(map) => {
                map.insert(key.to_string(), value.to_string());
                Ok(())
            }
        }
    }

    pub async fn remove_item(&mut self, key: &str) -> Result<bool, StorageError> {
        match self {
            Self::Sqlite(pool) => queries::remove_item(pool, key).await.map_err(backend),
            Self::Memory(map) => Ok(map.remove(key).is_some()),
        }
    }

    /// Every stored pair, ordered by key. Memory entries carry no write time.
    pub async fn list_items(&self) -> Result<Vec<StorageRecord>, StorageError> {
        match self {
            Self::Sqlite(pool) => queries::list_items(pool).await.map_err(backend),
            Self::Memory(map) => Ok(map
                .iter()
                .map(|(key, value)| StorageRecord {
                    key: key.clone(),
                    value: value.clone(),
                    updated: String::new(),
                })
                .collect()),
        }
    }

    /// Stored dashboard filters; anything unreadable means no filters
    pub async fn load_selection(&self) -> FilterSelection {
        match self.get_item(DASHBOARD_FILTERS_KEY).await {
            Ok(raw) => selection_or_empty(raw.as_deref()),
            Err(err) => {
                tracing::warn!(error = %err, "could not read dashboard filters");
                FilterSelection::default()
            }
        }
    }

    pub async fn save_selection(&mut self, selection: &FilterSelection) -> Result<(), StorageError> {
        let raw = encode_selection(selection)?;
        self.set_item(DASHBOARD_FILTERS_KEY, &raw).await
    }

    pub async fn clear_selection(&mut self) -> Result<(), StorageError> {
        self.remove_item(DASHBOARD_FILTERS_KEY).await.map(|_| ())
    }

    pub async fn load_layout(&self) -> ColumnLayout {
        let selected = self.get_item(SELECTED_COLUMNS_KEY).await;
        let order = self.get_item(COLUMN_ORDER_KEY).await;
        match (selected, order) {
            (Ok(selected), Ok(order)) => layout_or_default(selected.as_deref(), order.as_deref()),
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(error = %err, "could not read column layout");
                ColumnLayout::default()
            }
        }
    }

    pub async fn save_layout(&mut self, layout: &ColumnLayout) -> Result<(), StorageError> {
        let (selected, order) = encode_columns(layout)?;
        self.set_item(SELECTED_COLUMNS_KEY, &selected).await?;
        self.set_item(COLUMN_ORDER_KEY, &order).await
    }
}
