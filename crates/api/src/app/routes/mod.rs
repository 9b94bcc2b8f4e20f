use axum::Router;

pub mod accounts;
pub mod brands;
pub mod categories;
pub mod common;
pub mod media;
pub mod products;
pub mod system;

/// Router for endpoints open to anonymous callers.
pub fn router() -> Router {
    Router::new()
        .merge(categories::router())
        .merge(products::router())
        .merge(accounts::router())
}
