pub mod local_storage;
pub mod migrations;
pub mod models;
pub mod queries;

pub use local_storage::KeyValueStore;
pub use migrations::create_database_pool;
