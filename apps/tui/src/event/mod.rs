mod export;
mod headless;
mod loop_handler;

pub use headless::{build_report, run_headless, summarize_storage, HeadlessReport, StorageSummary};
pub use loop_handler::run;
