use clap::{CommandFactory, Parser};
use oiv_core::{FilterCategory, FilterSelection};

#[derive(Debug, Default, Parser)]
#[command(name = "oiv_dashboard", version, about = "OIV relationship dashboard")]
pub struct CliArgs {
    /// Print stats and exit
    #[arg(long)]
    pub headless: bool,

    /// Print headless stats as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Directory holding data.json and the catalog files
    #[arg(long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<String>,

    /// Override database path
    #[arg(long, value_name = "PATH")]
    pub db: Option<String>,

    /// Select connections by source unit id
    #[arg(long = "source", value_name = "ID")]
    pub sources: Vec<String>,

    /// Select connections by target unit id
    #[arg(long = "target", value_name = "ID")]
    pub targets: Vec<String>,

    /// Select connections by theme name
    #[arg(long = "theme", value_name = "NAME")]
    pub themes: Vec<String>,

    /// Select units by complex id
    #[arg(long = "complex", value_name = "ID")]
    pub complexes: Vec<String>,

    /// Select units by strategy id
    #[arg(long = "strategy", value_name = "ID")]
    pub strategies: Vec<String>,

    /// Select units by program id
    #[arg(long = "program", value_name = "ID")]
    pub programs: Vec<String>,

    /// Select connections by edge id
    #[arg(long = "edge", value_name = "ID")]
    pub edges: Vec<String>,

    /// Hide matched units without connections
    #[arg(long = "connections-only")]
    pub connections_only: bool,

    /// Use the stored dashboard filters as the selection
    #[arg(long = "from-storage")]
    pub from_storage: bool,

    /// Write the workbook export to PATH (headless)
    #[arg(long, value_name = "PATH")]
    pub export: Option<String>,

    /// Table rows per page
    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<usize>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(dir) = &self.data_dir {
            std::env::set_var("DATA_DIR", dir);
        }
        if let Some(db) = &self.db {
            std::env::set_var("DATABASE_NAME", db);
        }
        if let Some(size) = self.page_size {
            std::env::set_var("PAGE_SIZE", size.to_string());
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }

    /// Selection described by the filter flags
    pub fn selection(&self) -> FilterSelection {
        let mut selection = FilterSelection::new();
        for (category, ids) in [
            (FilterCategory::SourceOiv, &self.sources),
            (FilterCategory::TargetOiv, &self.targets),
            (FilterCategory::Theme, &self.themes),
            (FilterCategory::Complex, &self.complexes),
            (FilterCategory::Strategy, &self.strategies),
            (FilterCategory::Program, &self.programs),
            (FilterCategory::Edge, &self.edges),
        ] {
            selection.set(category, ids.iter().cloned());
        }
        selection.connections_only = self.connections_only;
        selection
    }

    pub fn help_text() -> String {
        let mut command = Self::command();
        let mut buffer = Vec::new();
        command.write_help(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_flags_build_selection() {
        let args = CliArgs::parse_from([
            "oiv_dashboard",
            "--complex",
            "complex1",
            "--complex",
            "complex2",
            "--theme",
            "Roads",
            "--connections-only",
        ]);
        let selection = args.selection();

        assert_eq!(selection.complexes.len(), 2);
        assert!(selection.themes.contains("Roads"));
        assert!(selection.connections_only);
        assert_eq!(selection.active_category(), Some(FilterCategory::Theme));
    }

    #[test]
    fn no_flags_means_empty_selection() {
        let args = CliArgs::parse_from(["oiv_dashboard", "--headless"]);
        assert!(args.selection().is_empty());
        assert!(CliArgs::help_text().contains("--data-dir"));
    }
}
