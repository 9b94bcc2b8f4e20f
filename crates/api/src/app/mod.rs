//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, media, and token wiring
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `shapes.rs`: product read/write representations
//! - `fields.rs`: loosely typed JSON field reading
//! - `payload.rs`: request body extractors
//! - `dto.rs`: remaining request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use catalog_infra::Config;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod fields;
pub mod payload;
pub mod routes;
pub mod services;
pub mod shapes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: Config) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(&config).await?);
    let auth_state = middleware::AuthState {
        jwt: services.tokens.clone(),
    };
    let context_state = middleware::ContextState {
        debug: config.debug,
    };

    // Brands: every verb needs a bearer access token.
    let protected = routes::brands::router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    let mut app = Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .merge(protected);

    if config.debug {
        let prefix = config.media_url.trim_end_matches('/');
        if prefix.starts_with('/') && prefix.len() > 1 {
            app = app.route(&format!("{prefix}/*name"), get(routes::media::serve));
        } else {
            tracing::warn!(media_url = %config.media_url, "media not served: MEDIA_URL is not a local path");
        }
    }

    Ok(app.layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                context_state,
                middleware::request_context,
            ))
            .layer(Extension(services)),
    ))
}
