//! SQLite-backed catalog store.
//!
//! Prices are stored as integer cents (`price_cents`) and surfaced as
//! two-decimal `Decimal`s.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool, Transaction};
use tracing::instrument;

use catalog_core::{BrandId, CategoryId, ProductId};
use catalog_products::{
    Brand, BrandFields, Category, CategoryFields, PRICE_DECIMAL_PLACES, Product, ProductFields,
};

use super::{CatalogStore, StoreError, StoreResult, map_sqlx_error};

#[derive(Debug, Clone)]
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    /// Wrap an already-migrated pool (see [`crate::db::open`]).
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[derive(Debug, FromRow)]
struct NamedRow {
    id: i64,
    name: String,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    brand_id: i64,
    image: Option<String>,
    file: Option<String>,
    price_cents: i64,
    stock: i64,
}

impl ProductRow {
    fn into_product(self, categories: Vec<CategoryId>) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name,
            brand: BrandId::new(self.brand_id),
            categories,
            image: self.image,
            file: self.file,
            price: cents_to_price(self.price_cents),
            stock: self.stock,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, brand_id, image, file, price_cents, stock";

fn price_to_cents(price: &Decimal) -> StoreResult<i64> {
    let mut scaled = *price;
    scaled.rescale(PRICE_DECIMAL_PLACES);
    i64::try_from(scaled.mantissa())
        .map_err(|_| StoreError::Integrity(format!("price {price} is out of range")))
}

fn cents_to_price(cents: i64) -> Decimal {
    Decimal::new(cents, PRICE_DECIMAL_PLACES)
}

/// Sorted, de-duplicated category ids (the link table is a set).
fn category_set(ids: &[CategoryId]) -> Vec<CategoryId> {
    let mut ids = ids.to_vec();
    ids.sort();
    ids.dedup();
    ids
}

fn affected(operation: &str, rows: u64) -> StoreResult<()> {
    if rows == 0 {
        tracing::debug!(operation, "no row matched");
        return Err(StoreError::NotFound);
    }
    Ok(())
}

async fn replace_links(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: i64,
    categories: &[CategoryId],
) -> StoreResult<()> {
    sqlx::query("DELETE FROM product_categories WHERE product_id = ?")
        .bind(product_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("clear_product_categories", e))?;

    for category in categories {
        sqlx::query("INSERT INTO product_categories (product_id, category_id) VALUES (?, ?)")
            .bind(product_id)
            .bind(category.get())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("link_product_category", e))?;
    }
    Ok(())
}

impl SqliteCatalogStore {
    async fn category_ids_of(&self, product_id: i64) -> StoreResult<Vec<CategoryId>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT category_id FROM product_categories WHERE product_id = ? ORDER BY category_id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("product_category_ids", e))?;
        Ok(ids.into_iter().map(CategoryId::new).collect())
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn list_brands(&self) -> StoreResult<Vec<Brand>> {
        let rows: Vec<NamedRow> = sqlx::query_as("SELECT id, name FROM brands ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_brands", e))?;
        Ok(rows
            .into_iter()
            .map(|r| Brand { id: BrandId::new(r.id), name: r.name })
            .collect())
    }

    async fn get_brand(&self, id: BrandId) -> StoreResult<Brand> {
        let row: Option<NamedRow> = sqlx::query_as("SELECT id, name FROM brands WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_brand", e))?;
        row.map(|r| Brand { id: BrandId::new(r.id), name: r.name })
            .ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self, fields), fields(name = %fields.name))]
    async fn create_brand(&self, fields: BrandFields) -> StoreResult<Brand> {
        let result = sqlx::query("INSERT INTO brands (name) VALUES (?)")
            .bind(&fields.name)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_brand", e))?;
        Ok(Brand {
            id: BrandId::new(result.last_insert_rowid()),
            name: fields.name,
        })
    }

    async fn update_brand(&self, id: BrandId, fields: BrandFields) -> StoreResult<Brand> {
        let result = sqlx::query("UPDATE brands SET name = ? WHERE id = ?")
            .bind(&fields.name)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_brand", e))?;
        affected("update_brand", result.rows_affected())?;
        Ok(Brand { id, name: fields.name })
    }

    #[instrument(skip(self))]
    async fn delete_brand(&self, id: BrandId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM brands WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_brand", e))?;
        affected("delete_brand", result.rows_affected())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let rows: Vec<NamedRow> = sqlx::query_as("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_categories", e))?;
        Ok(rows
            .into_iter()
            .map(|r| Category { id: CategoryId::new(r.id), name: r.name })
            .collect())
    }

    async fn get_category(&self, id: CategoryId) -> StoreResult<Category> {
        let row: Option<NamedRow> = sqlx::query_as("SELECT id, name FROM categories WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_category", e))?;
        row.map(|r| Category { id: CategoryId::new(r.id), name: r.name })
            .ok_or(StoreError::NotFound)
    }

    async fn categories_by_ids(&self, ids: &[CategoryId]) -> StoreResult<Vec<Category>> {
        let ids = category_set(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT id, name FROM categories WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in &ids {
            separated.push_bind(id.get());
        }
        separated.push_unseparated(") ORDER BY id");

        let rows: Vec<NamedRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("categories_by_ids", e))?;
        Ok(rows
            .into_iter()
            .map(|r| Category { id: CategoryId::new(r.id), name: r.name })
            .collect())
    }

    async fn create_category(&self, fields: CategoryFields) -> StoreResult<Category> {
        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(&fields.name)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_category", e))?;
        Ok(Category {
            id: CategoryId::new(result.last_insert_rowid()),
            name: fields.name,
        })
    }

    async fn update_category(&self, id: CategoryId, fields: CategoryFields) -> StoreResult<Category> {
        let result = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(&fields.name)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_category", e))?;
        affected("update_category", result.rows_affected())?;
        Ok(Category { id, name: fields.name })
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, id: CategoryId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_category", e))?;
        affected("delete_category", result.rows_affected())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let rows: Vec<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("list_products", e))?;

        let links: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT product_id, category_id FROM product_categories ORDER BY product_id, category_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_product_categories", e))?;

        let mut by_product: HashMap<i64, Vec<CategoryId>> = HashMap::new();
        for (product_id, category_id) in links {
            by_product
                .entry(product_id)
                .or_default()
                .push(CategoryId::new(category_id));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let categories = by_product.remove(&row.id).unwrap_or_default();
                row.into_product(categories)
            })
            .collect())
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Product> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("get_product", e))?;
        let row = row.ok_or(StoreError::NotFound)?;
        let categories = self.category_ids_of(row.id).await?;
        Ok(row.into_product(categories))
    }

    #[instrument(skip(self, fields), fields(name = %fields.name, brand = %fields.brand))]
    async fn create_product(&self, fields: ProductFields) -> StoreResult<Product> {
        fields.ensure_savable().map_err(StoreError::Rejected)?;
        let price_cents = price_to_cents(&fields.price)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let result = sqlx::query(
            "INSERT INTO products (name, brand_id, image, file, price_cents, stock) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&fields.name)
        .bind(fields.brand.get())
        .bind(&fields.image)
        .bind(&fields.file)
        .bind(price_cents)
        .bind(fields.stock)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create_product", e))?;
        let id = result.last_insert_rowid();

        let categories = category_set(&fields.categories);
        replace_links(&mut tx, id, &categories).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        let mut fields = fields;
        fields.categories = categories;
        fields.price = cents_to_price(price_cents);
        Ok(Product::from_fields(ProductId::new(id), fields))
    }

    #[instrument(skip(self, fields), fields(name = %fields.name))]
    async fn update_product(&self, id: ProductId, fields: ProductFields) -> StoreResult<Product> {
        fields.ensure_savable().map_err(StoreError::Rejected)?;
        let price_cents = price_to_cents(&fields.price)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let result = sqlx::query(
            "UPDATE products SET name = ?, brand_id = ?, image = ?, file = ?, price_cents = ?, stock = ? WHERE id = ?",
        )
        .bind(&fields.name)
        .bind(fields.brand.get())
        .bind(&fields.image)
        .bind(&fields.file)
        .bind(price_cents)
        .bind(fields.stock)
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;
        affected("update_product", result.rows_affected())?;

        let categories = category_set(&fields.categories);
        replace_links(&mut tx, id.get(), &categories).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        let mut fields = fields;
        fields.categories = categories;
        fields.price = cents_to_price(price_cents);
        Ok(Product::from_fields(id, fields))
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        affected("delete_product", result.rows_affected())
    }
}
