use sqlx::{query, query_as, query_scalar, SqlitePool};

use crate::db::models::StorageRecord;

pub async fn get_item(pool: &SqlitePool, key: &str) -> Result<Option<String>, sqlx::Error> {
    query_scalar("SELECT value FROM local_storage WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
}

/// Inserts or overwrites `key`, stamping the write time
pub async fn set_item(pool: &SqlitePool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    let updated = chrono::Utc::now().to_rfc3339();
    query(
        "INSERT INTO local_storage (key, value, updated) VALUES (?, ?, ?) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated = excluded.updated",
    )
    .bind(key)
    .bind(value)
    .bind(updated)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns whether a row was removed
pub async fn remove_item(pool: &SqlitePool, key: &str) -> Result<bool, sqlx::Error> {
    let result = query("DELETE FROM local_storage WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_items(pool: &SqlitePool) -> Result<Vec<StorageRecord>, sqlx::Error> {
    query_as::<_, StorageRecord>("SELECT key, value, updated FROM local_storage ORDER BY key")
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::setup_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> Result<SqlitePool, sqlx::Error> {
        // A single connection keeps every query on the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        setup_database(&pool).await?;
        Ok(pool)
    }

    #[tokio::test]
    async fn test_set_and_get_item() {
        let pool = setup_test_db().await.unwrap();

        assert_eq!(get_item(&pool, "dashboardFilters").await.unwrap(), None);

        set_item(&pool, "dashboardFilters", "{}").await.unwrap();
        assert_eq!(
            get_item(&pool, "dashboardFilters").await.unwrap().as_deref(),
            Some("{}")
        );
    }

    #[tokio::test]
    async fn test_set_item_overwrites() {
        let pool = setup_test_db().await.unwrap();

        set_item(&pool, "columnOrder", "[\"Source\"]").await.unwrap();
        set_item(&pool, "columnOrder", "[\"Theme\"]").await.unwrap();

        let items = list_items(&pool).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].value, "[\"Theme\"]");
        assert!(!items[0].updated.is_empty());
    }

    #[tokio::test]
    async fn test_remove_item() {
        let pool = setup_test_db().await.unwrap();

        set_item(&pool, "selectedColumns", "[]").await.unwrap();
        assert!(remove_item(&pool, "selectedColumns").await.unwrap());
        assert!(!remove_item(&pool, "selectedColumns").await.unwrap());
        assert_eq!(get_item(&pool, "selectedColumns").await.unwrap(), None);
    }
}
