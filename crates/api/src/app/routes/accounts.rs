use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;

use catalog_auth::{hash_password, verify_password};
use catalog_core::FieldErrors;
use catalog_core::validation::REQUIRED;
use catalog_infra::StoreError;

use crate::app::dto::{
    AccessResponse, BAD_CREDENTIALS, RegisterRequest, RegisterResponse, TokenObtainRequest,
    TokenRefreshRequest, USERNAME_TAKEN,
};
use crate::app::errors::{self, ApiResult};
use crate::app::payload::JsonFields;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/api/register/", post(register))
        .route("/api/token/", post(obtain_token))
        .route("/api/token/refresh/", post(refresh_token))
}

/// Create an account and hand back a token pair for it.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<JsonFields<RegisterRequest>, Response>,
) -> ApiResult {
    let JsonFields(body) = body?;
    let input = body.validate().map_err(errors::validation_error)?;

    let existing = services
        .users
        .find_by_username(&input.username)
        .await
        .map_err(|e| errors::store_error_to_response(e, "user"))?;
    if existing.is_some() {
        return Err(username_taken());
    }

    let password = input.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| errors::internal_error("hash_error", e))?
        .map_err(|e| errors::internal_error("hash_error", e))?;

    let user = services
        .users
        .create_user(&input.username, &input.email, &password_hash)
        .await
        .map_err(|e| match e {
            StoreError::Integrity(_) => username_taken(),
            other => errors::store_error_to_response(other, "user"),
        })?;

    let tokens = services
        .tokens
        .issue_pair(user.id, &user.username, Utc::now())
        .map_err(|e| errors::internal_error("token_error", e))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            refresh: tokens.refresh,
            access: tokens.access,
        }),
    )
        .into_response())
}

/// Exchange credentials for a token pair.
pub async fn obtain_token(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<JsonFields<TokenObtainRequest>, Response>,
) -> ApiResult {
    let JsonFields(body) = body?;
    let (username, password) = body.validate().map_err(errors::validation_error)?;

    let user = services
        .users
        .find_by_username(&username)
        .await
        .map_err(|e| errors::store_error_to_response(e, "user"))?
        .ok_or_else(bad_credentials)?;

    let stored = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| errors::internal_error("hash_error", e))?
        .map_err(|e| errors::internal_error("hash_error", e))?;
    if !matches {
        return Err(bad_credentials());
    }

    let tokens = services
        .tokens
        .issue_pair(user.id, &user.username, Utc::now())
        .map_err(|e| errors::internal_error("token_error", e))?;
    Ok(Json(tokens).into_response())
}

/// Exchange a refresh token for a new access token.
pub async fn refresh_token(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<JsonFields<TokenRefreshRequest>, Response>,
) -> ApiResult {
    let JsonFields(body) = body?;
    let Some(refresh) = body.refresh.filter(|r| !r.trim().is_empty()) else {
        let mut fields = FieldErrors::new();
        fields.add("refresh", REQUIRED);
        return Err(errors::validation_error(fields));
    };

    let access = services.tokens.refresh(&refresh, Utc::now()).map_err(|e| {
        tracing::debug!("refresh rejected: {e}");
        errors::json_error(
            StatusCode::UNAUTHORIZED,
            "token_not_valid",
            "Token is invalid or expired",
        )
    })?;
    Ok(Json(AccessResponse { access }).into_response())
}

fn username_taken() -> axum::response::Response {
    let mut fields = FieldErrors::new();
    fields.add("username", USERNAME_TAKEN);
    errors::validation_error(fields)
}

fn bad_credentials() -> axum::response::Response {
    errors::json_error(StatusCode::UNAUTHORIZED, "no_active_account", BAD_CREDENTIALS)
}
