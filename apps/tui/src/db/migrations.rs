use crate::config::AppConfig;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use sqlx::{
    migrate::MigrateDatabase, query, query_scalar, sqlite::SqlitePoolOptions, Sqlite, SqlitePool,
};

/// Creates the key/value table backing persisted filters and column prefs
pub async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    query(
        "CREATE TABLE IF NOT EXISTS local_storage (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Creates a database connection pool for the configured database file
pub async fn create_database_pool(config: &AppConfig) -> Result<SqlitePool> {
    let database_url = &config.database_url;
    tracing::debug!(url = %database_url, "initializing database");

    let db_path = extract_db_path_from_url(database_url)
        .map_err(|e| eyre!("Invalid database URL format: {e}"))?;

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tracing::debug!(dir = %parent.display(), "creating database directory");
            std::fs::create_dir_all(parent)
                .map_err(|e| eyre!("Failed to create database directory: {e}"))?;
        }
    }

    let db_file = std::path::Path::new(&db_path);
    if db_file.exists() {
        std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(db_file)
            .map_err(|e| eyre!("Database file permission error: {e}"))?;
    }

    let db_exists = Sqlite::database_exists(database_url)
        .await
        .map_err(|e| eyre!("Error checking database: {e}"))?;
    if !db_exists {
        tracing::info!(path = %db_path, "creating database");
        Sqlite::create_database(database_url)
            .await
            .map_err(|e| eyre!("Failed to create SQLite database: {e}"))?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .after_connect(|conn, _| {
            Box::pin(async move {
                use sqlx::Executor as _;
                conn.execute("PRAGMA journal_mode = WAL;").await?;
                conn.execute("PRAGMA synchronous = NORMAL;").await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
        .map_err(|e| eyre!("Failed to connect to SQLite database: {e}"))?;

    setup_database(&pool)
        .await
        .map_err(|e| eyre!("Failed to set up database schema: {e}"))?;

    tracing::debug!("database ready");
    Ok(pool)
}

/// Helper function to extract the database path from a SQLite URL
fn extract_db_path_from_url(url: &str) -> Result<String> {
    let Some(path_part) = url.strip_prefix("sqlite://") else {
        return Err(eyre!("Not a valid SQLite URL: {url}"));
    };

    if cfg!(windows) {
        // sqlite:///C:/path or sqlite://C:/path
        if let Some(drive_idx) = path_part.find(':') {
            if drive_idx > 0 {
                return Ok(path_part
                    .strip_prefix('/')
                    .unwrap_or(path_part)
                    .to_string());
            }
        }
    }

    if path_part.starts_with('/') {
        return Ok(format!("/{}", path_part.trim_start_matches('/')));
    }

    Ok(path_part.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_paths() {
        assert_eq!(
            extract_db_path_from_url("sqlite:///tmp/oiv.db").unwrap(),
            "/tmp/oiv.db"
        );
        assert_eq!(
            extract_db_path_from_url("sqlite://oiv.db").unwrap(),
            "oiv.db"
        );
        assert!(extract_db_path_from_url("postgres://localhost").is_err());
    }

    #[tokio::test]
    async fn schema_setup_is_idempotent() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        setup_database(&pool).await.unwrap();
        setup_database(&pool).await.unwrap();

        let columns: Vec<String> =
            query_scalar("SELECT name FROM pragma_table_info('local_storage') ORDER BY cid")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(columns, ["key", "value", "updated"]);
    }

    #[tokio::test]
    async fn creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("oiv.db");
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            database_url: format!("sqlite://{}", path.display()),
            log_file: dir.path().join("oiv.log"),
            export_dir: dir.path().join("exports"),
            page_size: 20,
            debug: false,
        };

        let pool = create_database_pool(&config).await.unwrap();
        pool.close().await;
        assert!(path.exists());
    }
}
