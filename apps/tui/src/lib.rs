//! Terminal dashboard for the OIV relationship graph.
//!
//! Loads the dataset asynchronously, wires the graph, table, info panel,
//! dashboard and stats sidebar to one selection store, and persists the
//! dashboard hand-off and column preferences in SQLite.

pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod event;
pub mod loader;
pub mod logging;
pub mod terminal;
pub mod ui;
