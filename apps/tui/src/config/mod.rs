use color_eyre::eyre::eyre;
use dotenv::dotenv;
use oiv_core::table::DEFAULT_PAGE_SIZE;
use std::env;
use std::path::{Path, PathBuf};

/// Runtime settings resolved from `.env`, the environment and CLI overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub database_url: String,
    pub log_file: PathBuf,
    pub export_dir: PathBuf,
    pub page_size: usize,
    pub debug: bool,
}

/// Initializes the application configuration
pub fn init_app_config() -> color_eyre::eyre::Result<AppConfig> {
    // Load environment variables from .env file
    dotenv().ok();

    let base_dir: PathBuf = env::current_dir()?;
    let db_name = env::var("DATABASE_NAME").unwrap_or_else(|_| "oiv_dashboard.db".to_string());
    let database_path = base_dir.join(db_name);

    if let Some(parent) = database_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(AppConfig {
        data_dir: get_data_dir(),
        database_url: sqlite_url(&database_path)?,
        log_file: env::var("LOG_FILE")
            .map_or_else(|_| PathBuf::from("oiv_dashboard.log"), PathBuf::from),
        export_dir: env::var("EXPORT_DIR").map_or_else(|_| PathBuf::from("./exports"), PathBuf::from),
        page_size: parse_page_size(env::var("PAGE_SIZE").ok().as_deref()),
        debug: env::var("DEBUG").is_ok_and(|value| value != "0"),
    })
}

/// Directory holding `data.json` and the catalog files
pub fn get_data_dir() -> PathBuf {
    env::var("DATA_DIR").map_or_else(|_| PathBuf::from("./data"), PathBuf::from)
}

fn parse_page_size(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|size| *size > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// SQLx wants `sqlite:///abs/path` for absolute and `sqlite://rel/path`
/// for relative paths.
fn sqlite_url(database_path: &Path) -> color_eyre::eyre::Result<String> {
    let path_str = database_path
        .to_str()
        .ok_or_else(|| eyre!("Invalid database path"))?;
    let clean_path = path_str.trim_start_matches('/');

    Ok(if database_path.is_absolute() {
        format!("sqlite:///{clean_path}")
    } else {
        format!("sqlite://{clean_path}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_falls_back_to_default() {
        assert_eq!(parse_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("0")), DEFAULT_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("abc")), DEFAULT_PAGE_SIZE);
        assert_eq!(parse_page_size(Some(" 50 ")), 50);
    }

    #[test]
    fn sqlite_url_slashes() {
        assert_eq!(
            sqlite_url(Path::new("/tmp/oiv.db")).unwrap(),
            "sqlite:///tmp/oiv.db"
        );
        assert_eq!(
            sqlite_url(Path::new("data/oiv.db")).unwrap(),
            "sqlite://data/oiv.db"
        );
    }
}
