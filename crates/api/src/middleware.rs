use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use catalog_auth::JwtValidator;

use crate::app::errors::json_error;
use crate::context::{PrincipalContext, RequestContext};

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Require a valid bearer access token.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).map_err(|_| {
        json_error(
            StatusCode::UNAUTHORIZED,
            "not_authenticated",
            "Authentication credentials were not provided.",
        )
    })?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!("bearer token rejected: {e}");
        json_error(
            StatusCode::UNAUTHORIZED,
            "token_not_valid",
            "Given token not valid for any token type",
        )
    })?;

    req.extensions_mut()
        .insert(PrincipalContext::new(claims.user_id, claims.username));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}

#[derive(Debug, Clone, Copy)]
pub struct ContextState {
    pub debug: bool,
}

/// Attach a [`RequestContext`] to every request.
pub async fn request_context(
    State(state): State<ContextState>,
    mut req: Request,
    next: Next,
) -> Response {
    let origin = request_origin(req.headers());
    req.extensions_mut()
        .insert(RequestContext::new(origin, state.debug));
    next.run(req).await
}

fn request_origin(headers: &HeaderMap) -> Option<String> {
    let host = headers
        .get(axum::http::header::HOST)?
        .to_str()
        .ok()?
        .trim();
    if host.is_empty() {
        return None;
    }
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .filter(|v| *v == "https" || *v == "http")
        .unwrap_or("http");
    Some(format!("{scheme}://{host}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_bearer(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer(&headers), Ok("abc.def"));
    }

    #[test]
    fn origin_uses_host_and_forwarded_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_origin(&headers), None);

        headers.insert("host", HeaderValue::from_static("shop.test:8080"));
        assert_eq!(request_origin(&headers).as_deref(), Some("http://shop.test:8080"));

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(request_origin(&headers).as_deref(), Some("https://shop.test:8080"));
    }
}
