//! Storage keys and the JSON blobs persisted under them.
//!
//! The backends (SQLite in the terminal app, `window.localStorage` in the
//! browser) only ever see strings; encoding and tolerant decoding live here.

use thiserror::Error;

use crate::selection::FilterSelection;
use crate::table::ColumnLayout;

/// Selection handed from the info panel to the dashboard
pub const DASHBOARD_FILTERS_KEY: &str = "dashboardFilters";
/// Visible table columns, display names in order
pub const SELECTED_COLUMNS_KEY: &str = "selectedColumns";
/// Full table column order, display names
pub const COLUMN_ORDER_KEY: &str = "columnOrder";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("malformed value under `{key}`: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage backend failed: {0}")]
    Backend(String),
}

pub fn encode_selection(selection: &FilterSelection) -> Result<String, StorageError> {
    serde_json::to_string(selection).map_err(|source| StorageError::Malformed {
        key: DASHBOARD_FILTERS_KEY,
        source,
    })
}

pub fn decode_selection(raw: &str) -> Result<FilterSelection, StorageError> {
    serde_json::from_str(raw).map_err(|source| StorageError::Malformed {
        key: DASHBOARD_FILTERS_KEY,
        source,
    })
}

/// Decodes a stored blob, treating absence or garbage as "no filters"
pub fn selection_or_empty(raw: Option<&str>) -> FilterSelection {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return FilterSelection::default();
    };
    decode_selection(raw).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring stored dashboard filters");
        FilterSelection::default()
    })
}

/// `(selectedColumns, columnOrder)` values for the given layout
pub fn encode_columns(layout: &ColumnLayout) -> Result<(String, String), StorageError> {
    let prefs = layout.to_storage();
    let selected = serde_json::to_string(&prefs.selected).map_err(|source| {
        StorageError::Malformed {
            key: SELECTED_COLUMNS_KEY,
            source,
        }
    })?;
    let order = serde_json::to_string(&prefs.order).map_err(|source| StorageError::Malformed {
        key: COLUMN_ORDER_KEY,
        source,
    })?;
    Ok((selected, order))
}

fn decode_names(key: &'static str, raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw?;
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(names) => Some(names),
        Err(source) => {
            tracing::warn!(error = %StorageError::Malformed { key, source }, "ignoring stored columns");
            None
        }
    }
}

/// Restores the column layout from the two stored arrays, falling back to
/// the default layout for anything missing or malformed.
pub fn layout_or_default(selected: Option<&str>, order: Option<&str>) -> ColumnLayout {
    let selected = decode_names(SELECTED_COLUMNS_KEY, selected);
    let order = decode_names(COLUMN_ORDER_KEY, order);
    ColumnLayout::from_storage(selected.as_deref(), order.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::FilterCategory;
    use crate::table::Column;

    #[test]
    fn selection_blob_uses_camel_case_keys() {
        let mut selection = FilterSelection::new();
        selection.set(FilterCategory::SourceOiv, ["A"]);
        selection.set(FilterCategory::Edge, ["A|C|T1|joint reporting"]);
        selection.connections_only = true;

        let raw = encode_selection(&selection).unwrap();
        assert!(raw.contains("\"sourceOivIds\":[\"A\"]"));
        assert!(raw.contains("\"connectionsOnly\":true"));
        assert_eq!(decode_selection(&raw).unwrap(), selection);
    }

    #[test]
    fn decode_ignores_order_and_missing_keys() {
        let decoded = decode_selection(r#"{"themes": ["T2", "T1", "T2"], "complexes": [7]}"#).unwrap();
        let mut expected = FilterSelection::new();
        expected.set(FilterCategory::Theme, ["T1", "T2"]);
        expected.set(FilterCategory::Complex, ["7"]);
        assert_eq!(decoded, expected);
    }

    #[test]
    fn garbage_blob_falls_back_to_empty() {
        assert!(decode_selection("{not json").is_err());
        assert_eq!(selection_or_empty(Some("{not json")), FilterSelection::default());
        assert_eq!(selection_or_empty(Some("   ")), FilterSelection::default());
        assert_eq!(selection_or_empty(None), FilterSelection::default());
    }

    #[test]
    fn column_prefs_survive_storage() {
        let mut layout = ColumnLayout::default();
        layout.toggle(Column::SourceComplex);
        layout.shift(Column::Theme, false);

        let (selected, order) = encode_columns(&layout).unwrap();
        let restored = layout_or_default(Some(&selected), Some(&order));
        assert_eq!(restored, layout);
    }

    #[test]
    fn malformed_column_prefs_use_default_layout() {
        assert_eq!(layout_or_default(Some("nope"), Some("[1, 2")), ColumnLayout::default());
        assert_eq!(layout_or_default(None, None), ColumnLayout::default());
    }
}
