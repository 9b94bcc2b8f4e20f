use std::str::FromStr;

use axum::http::StatusCode;
use axum::response::Response;

use catalog_infra::MediaStorage;

use crate::app::errors;
use crate::context::RequestContext;

/// Path ids that do not parse cannot match any row.
pub fn parse_id<T: FromStr>(raw: &str, kind: &str) -> Result<T, Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::NOT_FOUND, "not_found", format!("{kind} not found")))
}

/// Public locator for a stored blob name.
pub fn locate(media: &dyn MediaStorage, ctx: &RequestContext, name: &str) -> String {
    ctx.locator(media.url(name))
}
