use oiv_core::{parse_catalog, CatalogEntry, Catalogs, DataFile, Dataset, DatasetError};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DATA_FILE: &str = "data.json";
pub const STRATEGIES_FILE: &str = "strategies.json";
pub const PROGRAMS_FILE: &str = "programs.json";
pub const PROJECTS_FILE: &str = "objects.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] DatasetError),
}

/// Result of a load: always a usable dataset, plus what went wrong
#[derive(Debug, Default)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    /// Set when `data.json` itself could not be used
    pub error: Option<String>,
    pub warnings: Vec<String>,
}

/// Loads `data.json` and the catalog files from `data_dir`.
///
/// A missing or malformed `data.json` yields an empty dataset; catalog
/// problems only produce warnings.
pub async fn load_dataset(data_dir: &Path) -> LoadedDataset {
    let data = match load_data_file(&data_dir.join(DATA_FILE)).await {
        Ok(data) => data,
        Err(err) => {
            tracing::error!(error = %err, "dataset unavailable, starting empty");
            return LoadedDataset {
                dataset: Dataset::empty(),
                error: Some(err.to_string()),
                warnings: Vec::new(),
            };
        }
    };

    let mut warnings = Vec::new();
    let mut catalog = |result: Result<Vec<CatalogEntry>, LoadError>| {
        result.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "catalog skipped");
            warnings.push(err.to_string());
            Vec::new()
        })
    };

    let catalogs = Catalogs {
        strategies: catalog(load_catalog(data_dir, STRATEGIES_FILE, true).await),
        programs: catalog(load_catalog(data_dir, PROGRAMS_FILE, true).await),
        projects: catalog(load_catalog(data_dir, PROJECTS_FILE, false).await),
    };

    let dataset = Dataset::from_parts(data, catalogs);
    tracing::info!(
        units = dataset.units().len(),
        edges = dataset.edges().len(),
        complexes = dataset.complexes().len(),
        strategies = dataset.strategies().len(),
        programs = dataset.programs().len(),
        "dataset loaded"
    );

    LoadedDataset {
        dataset,
        error: None,
        warnings,
    }
}

async fn load_data_file(path: &Path) -> Result<DataFile, LoadError> {
    let text = read(path).await?;
    Ok(DataFile::from_json(&text)?)
}

/// A missing optional catalog is an empty catalog, not a warning
async fn load_catalog(
    data_dir: &Path,
    file_name: &str,
    expected: bool,
) -> Result<Vec<CatalogEntry>, LoadError> {
    let path = data_dir.join(file_name);
    if !expected && !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        tracing::debug!(file = file_name, "optional catalog not present");
        return Ok(Vec::new());
    }
    let text = read(&path).await?;
    Ok(parse_catalog(&text, file_name)?)
}

async fn read(path: &Path) -> Result<String, LoadError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const DATA: &str = r##"{
        "complexes": [{"id": "c1", "name": "Economy", "color": "#ff0000", "radius": 40}],
        "oiv": [
            {"id": "A", "name": "Alpha", "complex": "c1", "strategies": ["s1"]},
            {"id": "B", "name": "Beta", "complex": "c1"}
        ],
        "edges": [{"source": "A", "target": "B", "theme": "Roads"}]
    }"##;

    #[tokio::test]
    async fn loads_data_and_catalogs() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DATA_FILE), DATA).unwrap();
        fs::write(
            dir.path().join(STRATEGIES_FILE),
            r#"{"strategies": [{"id": "s1", "name": "Smart City"}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join(PROGRAMS_FILE), r#"[{"id": 3, "title": "Roads 2030"}]"#).unwrap();

        let loaded = load_dataset(dir.path()).await;
        assert!(loaded.error.is_none());
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.dataset.units().len(), 2);
        assert_eq!(loaded.dataset.strategy("s1").unwrap().name, "Smart City");
        assert_eq!(loaded.dataset.program("3").unwrap().name, "Roads 2030");
        assert!(loaded.dataset.projects().is_empty());
    }

    #[tokio::test]
    async fn missing_data_file_gives_empty_dataset() {
        let dir = tempdir().unwrap();
        let loaded = load_dataset(dir.path()).await;
        assert!(loaded.dataset.is_empty());
        assert!(loaded.error.unwrap().contains(DATA_FILE));
    }

    #[tokio::test]
    async fn malformed_data_file_gives_empty_dataset() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DATA_FILE), "{\"oiv\": [").unwrap();
        let loaded = load_dataset(dir.path()).await;
        assert!(loaded.dataset.is_empty());
        assert!(loaded.error.is_some());
    }

    #[tokio::test]
    async fn broken_catalogs_only_warn() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DATA_FILE), DATA).unwrap();
        fs::write(dir.path().join(PROGRAMS_FILE), "42").unwrap();

        let loaded = load_dataset(dir.path()).await;
        assert!(loaded.error.is_none());
        // strategies.json missing, programs.json has the wrong shape
        assert_eq!(loaded.warnings.len(), 2);
        assert_eq!(loaded.dataset.edges().len(), 1);
    }
}
