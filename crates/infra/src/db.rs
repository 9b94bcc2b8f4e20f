//! SQLite connection pool and schema.
//!
//! Constraints are declared in the schema rather than left to application code:
//! brand deletion cascades to products, product/category links cascade from
//! both sides, and `stock` is an unsigned column (`CHECK (stock >= 0)`).

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS brands (
        id   INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(100) NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id   INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(100) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        VARCHAR(100) NOT NULL UNIQUE,
        brand_id    INTEGER NOT NULL REFERENCES brands (id) ON DELETE CASCADE,
        image       VARCHAR(100),
        file        VARCHAR(100),
        price_cents INTEGER NOT NULL,
        stock       INTEGER NOT NULL CHECK (stock >= 0)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS products_brand_id ON products (brand_id)",
    r#"
    CREATE TABLE IF NOT EXISTS product_categories (
        product_id  INTEGER NOT NULL REFERENCES products (id) ON DELETE CASCADE,
        category_id INTEGER NOT NULL REFERENCES categories (id) ON DELETE CASCADE,
        PRIMARY KEY (product_id, category_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS product_categories_category_id ON product_categories (category_id)",
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        username      VARCHAR(150) NOT NULL UNIQUE,
        email         VARCHAR(254) NOT NULL DEFAULT '',
        password_hash TEXT NOT NULL,
        created_at    TEXT NOT NULL
    )
    "#,
];

/// Open a pool for `database_url`.
///
/// An in-memory database lives only as long as its connection, so it gets a
/// single connection that is never recycled.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if is_in_memory(database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    pool.connect_with(options).await
}

/// Create missing tables and indexes.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!(statements = SCHEMA.len(), "schema applied");
    Ok(())
}

/// `connect` + `migrate`.
pub async fn open(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = connect(database_url).await?;
    migrate(&pool).await?;
    Ok(pool)
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
