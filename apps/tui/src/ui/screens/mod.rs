pub mod chrome;
pub mod columns;
pub mod dashboard;
pub mod filters;
pub mod graph;
pub mod help;
pub mod loading;
pub mod table;
