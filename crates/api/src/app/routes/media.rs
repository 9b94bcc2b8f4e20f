use std::io;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
};

use catalog_infra::media::content_type_for;

use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;

/// Serve a stored blob. Only routed in debug mode.
pub async fn serve(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> ApiResult {
    match services.media.open(&name).await {
        Ok(content) => {
            Ok(([(header::CONTENT_TYPE, content_type_for(&name))], content).into_response())
        }
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::InvalidInput) => {
            Err(errors::json_error(StatusCode::NOT_FOUND, "not_found", "media not found"))
        }
        Err(e) => Err(errors::internal_error("media_error", e)),
    }
}
