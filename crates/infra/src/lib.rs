//! Infrastructure layer: configuration, SQLite persistence, media storage.

pub mod config;
pub mod db;
pub mod media;
pub mod store;
pub mod users;

pub use config::{Config, ConfigError};
pub use media::{FileSystemStorage, MediaStorage};
pub use store::{CatalogStore, SqliteCatalogStore, StoreError, StoreResult};
pub use users::{SqliteUserStore, UserRecord, UserStore};
