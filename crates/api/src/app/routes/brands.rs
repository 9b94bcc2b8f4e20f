use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use catalog_core::{BrandId, Entity, Validate};
use catalog_products::{Brand, BrandFields};

use crate::app::dto::NameWrite;
use crate::app::errors::{self, ApiResult};
use crate::app::payload::JsonFields;
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Brand endpoints. Mounted behind the bearer-token middleware.
pub fn router() -> Router {
    Router::new()
        .route("/api/brands/", get(list_brands).post(create_brand))
        .route(
            "/api/brands/:id/",
            get(get_brand)
                .put(update_brand)
                .patch(partial_update_brand)
                .delete(delete_brand),
        )
}

pub async fn list_brands(Extension(services): Extension<Arc<AppServices>>) -> ApiResult {
    let brands = services
        .catalog
        .list_brands()
        .await
        .map_err(|e| errors::store_error_to_response(e, Brand::KIND))?;
    Ok(Json(brands).into_response())
}

pub async fn create_brand(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<JsonFields<NameWrite>, Response>,
) -> ApiResult {
    let JsonFields(body) = body?;
    let fields = BrandFields::new(body.resolve(None).map_err(errors::validation_error)?);
    fields.full_clean().map_err(errors::validation_error)?;

    let brand = services
        .catalog
        .create_brand(fields)
        .await
        .map_err(|e| errors::store_error_to_response(e, Brand::KIND))?;

    tracing::info!(brand_id = %brand.id, user = principal.username(), "brand created");
    Ok((StatusCode::CREATED, Json(brand)).into_response())
}

pub async fn get_brand(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: BrandId = parse_id(&id, Brand::KIND)?;
    let brand = services
        .catalog
        .get_brand(id)
        .await
        .map_err(|e| errors::store_error_to_response(e, Brand::KIND))?;
    Ok(Json(brand).into_response())
}

pub async fn update_brand(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<JsonFields<NameWrite>, Response>,
) -> ApiResult {
    write_brand(&services, &id, body, false).await
}

pub async fn partial_update_brand(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<JsonFields<NameWrite>, Response>,
) -> ApiResult {
    write_brand(&services, &id, body, true).await
}

async fn write_brand(
    services: &AppServices,
    raw_id: &str,
    body: Result<JsonFields<NameWrite>, Response>,
    partial: bool,
) -> ApiResult {
    let id: BrandId = parse_id(raw_id, Brand::KIND)?;
    let current = services
        .catalog
        .get_brand(id)
        .await
        .map_err(|e| errors::store_error_to_response(e, Brand::KIND))?;

    let JsonFields(body) = body?;
    let fallback = partial.then_some(current.name.as_str());
    let fields = BrandFields::new(body.resolve(fallback).map_err(errors::validation_error)?);
    fields.full_clean().map_err(errors::validation_error)?;

    let brand = services
        .catalog
        .update_brand(id, fields)
        .await
        .map_err(|e| errors::store_error_to_response(e, Brand::KIND))?;
    Ok(Json(brand).into_response())
}

pub async fn delete_brand(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: BrandId = parse_id(&id, Brand::KIND)?;
    services
        .catalog
        .delete_brand(id)
        .await
        .map_err(|e| errors::store_error_to_response(e, Brand::KIND))?;

    tracing::info!(brand_id = %id, user_id = %principal.user_id(), "brand deleted with its products");
    Ok(StatusCode::NO_CONTENT.into_response())
}
