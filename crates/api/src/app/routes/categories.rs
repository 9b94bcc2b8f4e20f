use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use catalog_core::{CategoryId, Entity, Validate};
use catalog_products::{Category, CategoryFields};

use crate::app::dto::NameWrite;
use crate::app::errors::{self, ApiResult};
use crate::app::payload::JsonFields;
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/api/categories/", get(list_categories).post(create_category))
        .route(
            "/api/categories/:id/",
            get(get_category)
                .put(update_category)
                .patch(partial_update_category)
                .delete(delete_category),
        )
}

pub async fn list_categories(Extension(services): Extension<Arc<AppServices>>) -> ApiResult {
    let categories = services
        .catalog
        .list_categories()
        .await
        .map_err(|e| errors::store_error_to_response(e, Category::KIND))?;
    Ok(Json(categories).into_response())
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<JsonFields<NameWrite>, Response>,
) -> ApiResult {
    let JsonFields(body) = body?;
    let fields = CategoryFields::new(body.resolve(None).map_err(errors::validation_error)?);
    fields.full_clean().map_err(errors::validation_error)?;

    let category = services
        .catalog
        .create_category(fields)
        .await
        .map_err(|e| errors::store_error_to_response(e, Category::KIND))?;
    Ok((StatusCode::CREATED, Json(category)).into_response())
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: CategoryId = parse_id(&id, Category::KIND)?;
    let category = services
        .catalog
        .get_category(id)
        .await
        .map_err(|e| errors::store_error_to_response(e, Category::KIND))?;
    Ok(Json(category).into_response())
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<JsonFields<NameWrite>, Response>,
) -> ApiResult {
    write_category(&services, &id, body, false).await
}

pub async fn partial_update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<JsonFields<NameWrite>, Response>,
) -> ApiResult {
    write_category(&services, &id, body, true).await
}

async fn write_category(
    services: &AppServices,
    raw_id: &str,
    body: Result<JsonFields<NameWrite>, Response>,
    partial: bool,
) -> ApiResult {
    let id: CategoryId = parse_id(raw_id, Category::KIND)?;
    let current = services
        .catalog
        .get_category(id)
        .await
        .map_err(|e| errors::store_error_to_response(e, Category::KIND))?;

    let JsonFields(body) = body?;
    let fallback = partial.then_some(current.name.as_str());
    let fields = CategoryFields::new(body.resolve(fallback).map_err(errors::validation_error)?);
    fields.full_clean().map_err(errors::validation_error)?;

    let category = services
        .catalog
        .update_category(id, fields)
        .await
        .map_err(|e| errors::store_error_to_response(e, Category::KIND))?;
    Ok(Json(category).into_response())
}

/// Products keep existing; only their links to this category go.
pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: CategoryId = parse_id(&id, Category::KIND)?;
    services
        .catalog
        .delete_category(id)
        .await
        .map_err(|e| errors::store_error_to_response(e, Category::KIND))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
