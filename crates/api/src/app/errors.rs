use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_core::{DomainError, FieldErrors};
use catalog_infra::StoreError;

/// Handler result: both arms are finished responses.
pub type ApiResult = Result<axum::response::Response, axum::response::Response>;

pub fn store_error_to_response(err: StoreError, kind: &str) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", format!("{kind} not found")),
        StoreError::Integrity(msg) => json_error(StatusCode::CONFLICT, "integrity_error", msg),
        StoreError::Rejected(DomainError::Validation(fields)) => validation_error(fields),
        StoreError::Database(msg) => {
            tracing::error!(kind, "store failure: {msg}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

/// 400 with per-field messages under `fields`.
pub fn validation_error(fields: FieldErrors) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "message": fields.to_string(),
            "fields": fields,
        })),
    )
        .into_response()
}

/// Body-level JSON failures. Field types are checked after parsing, so
/// anything reaching here is malformed input.
pub fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    let status = match &rejection {
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::BAD_REQUEST,
    };
    json_error(status, "parse_error", rejection.body_text())
}

pub fn internal_error(code: &'static str, err: impl std::fmt::Display) -> axum::response::Response {
    tracing::error!(code, "{err}");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, code, err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
