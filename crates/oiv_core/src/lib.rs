//! Dataset model and view logic shared by the OIV terminal and web
//! dashboards.
//!
//! The flow is one-way: a [`SelectionStore`] owns the user's
//! [`FilterSelection`], runs [`apply_filters`] on every change and pushes
//! the resulting [`FilteredDataset`] to each registered [`ViewSink`].

pub mod dashboard;
pub mod filter;
pub mod info;
pub mod model;
pub mod scene;
pub mod selection;
pub mod stats;
pub mod storage;
pub mod store;
pub mod table;

pub use dashboard::{summary_sheet, ChartBar, DashboardSummary, Sheet, Workbook};
pub use filter::{apply_filters, FilteredDataset};
pub use info::{InfoPanel, UnitDetails};
pub use model::{
    parse_catalog, parse_catalog_value, CatalogEntry, Catalogs, Complex, DataFile, Dataset,
    DatasetError, Edge, Position, Theme, Unit,
};
pub use scene::{GraphScene, Rgb};
pub use selection::{FilterCategory, FilterSelection};
pub use stats::{DatasetTotals, SelectionStats};
pub use storage::StorageError;
pub use store::{SelectionStore, SinkId, ViewSink};
pub use table::{Column, ColumnLayout, SortDirection, TableController};
