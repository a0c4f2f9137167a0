pub mod charts;
pub mod graph;
pub mod popup;
pub mod tables;
