//! Catalog persistence: the store contract and its SQLite implementation.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx error | `StoreError` | Scenario |
//! |------------|--------------|----------|
//! | Database (unique violation) | `Integrity` | duplicate brand or product name |
//! | Database (foreign key violation) | `Integrity` | product pointing at an unknown brand/category |
//! | Database (check violation) | `Integrity` | negative stock |
//! | Database (not null violation) | `Integrity` | missing required column |
//! | anything else | `Database` | IO, pool closed, malformed rows |
//!
//! The save-time price guard runs before any SQL and reports `Rejected`.

use async_trait::async_trait;
use thiserror::Error;

use catalog_core::{BrandId, CategoryId, DomainError, ProductId};
use catalog_products::{Brand, BrandFields, Category, CategoryFields, Product, ProductFields};

pub mod sqlite;

pub use sqlite::SqliteCatalogStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No row with the requested id.
    #[error("not found")]
    NotFound,

    /// A storage constraint rejected the write.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// The model refused to be saved (application-level save guard).
    #[error(transparent)]
    Rejected(DomainError),

    #[error("database error: {0}")]
    Database(String),
}

/// Persistent catalog of brands, categories and products.
///
/// Every method is a single atomic unit; product writes cover the product row
/// and its category links together.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_brands(&self) -> StoreResult<Vec<Brand>>;
    async fn get_brand(&self, id: BrandId) -> StoreResult<Brand>;
    async fn create_brand(&self, fields: BrandFields) -> StoreResult<Brand>;
    async fn update_brand(&self, id: BrandId, fields: BrandFields) -> StoreResult<Brand>;
    /// Deletes the brand and, by cascade, every product referencing it.
    async fn delete_brand(&self, id: BrandId) -> StoreResult<()>;

    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn get_category(&self, id: CategoryId) -> StoreResult<Category>;
    /// Categories among `ids` that exist, ordered by id. Unknown ids are skipped.
    async fn categories_by_ids(&self, ids: &[CategoryId]) -> StoreResult<Vec<Category>>;
    async fn create_category(&self, fields: CategoryFields) -> StoreResult<Category>;
    async fn update_category(&self, id: CategoryId, fields: CategoryFields) -> StoreResult<Category>;
    /// Deletes the category and its product links; products are kept.
    async fn delete_category(&self, id: CategoryId) -> StoreResult<()>;

    async fn list_products(&self) -> StoreResult<Vec<Product>>;
    async fn get_product(&self, id: ProductId) -> StoreResult<Product>;
    async fn create_product(&self, fields: ProductFields) -> StoreResult<Product>;
    async fn update_product(&self, id: ProductId, fields: ProductFields) -> StoreResult<Product>;
    async fn delete_product(&self, id: ProductId) -> StoreResult<()>;
}

/// Map SQLx errors to `StoreError`.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            use sqlx::error::ErrorKind;

            let msg = format!("{}: {}", operation, db_err.message());
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::CheckViolation
                | ErrorKind::NotNullViolation => StoreError::Integrity(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Database(format!("{}: {}", operation, other)),
    }
}
