use sqlx::FromRow;

/// One persisted key/value pair
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StorageRecord {
    pub key: String,
    pub value: String,
    /// RFC 3339 time of the last write
    pub updated: String,
}
