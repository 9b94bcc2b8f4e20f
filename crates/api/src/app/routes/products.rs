use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use catalog_core::{BrandId, CategoryId, Entity, FieldErrors, ProductId, Validate};
use catalog_infra::media::sniff_image;
use catalog_infra::StoreError;
use catalog_products::{Brand, Category, Product};

use crate::app::errors::{self, ApiResult};
use crate::app::payload::ProductPayload;
use crate::app::routes::common::{locate, parse_id};
use crate::app::services::AppServices;
use crate::app::shapes::{
    BlobInput, INVALID_IMAGE, MISSING_FILE, Operation, ProductRead, ProductRepr, ProductWrite, ProductWriteRepr,
    Shape,
};
use crate::context::RequestContext;

const IMAGE_UPLOAD_TO: &str = "products/";
const FILE_UPLOAD_TO: &str = "files/";

pub fn router() -> Router {
    Router::new()
        .route("/api/products/", get(list_products).post(create_product))
        .route(
            "/api/products/:id/",
            get(get_product)
                .put(update_product)
                .patch(partial_update_product)
                .delete(delete_product),
        )
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult {
    let products = services.catalog.list_products().await.map_err(store_error)?;
    let brands: HashMap<BrandId, Brand> = services
        .catalog
        .list_brands()
        .await
        .map_err(store_error)?
        .into_iter()
        .map(|b| (b.id, b))
        .collect();
    let categories: HashMap<CategoryId, Category> = services
        .catalog
        .list_categories()
        .await
        .map_err(store_error)?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let mut body = Vec::with_capacity(products.len());
    for product in products {
        let Some(brand) = brands.get(&product.brand).cloned() else {
            return Err(errors::internal_error(
                "store_error",
                format!("product {} references missing brand {}", product.id, product.brand),
            ));
        };
        let linked = product
            .categories
            .iter()
            .filter_map(|id| categories.get(id).cloned())
            .collect();
        body.push(ProductRead::new(product, brand, linked, |name| {
            locate(services.media.as_ref(), &ctx, name)
        }));
    }

    Ok(Json(body).into_response())
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: ProductId = parse_id(&id, Product::KIND)?;
    let product = services.catalog.get_product(id).await.map_err(store_error)?;
    let body = represent(&services, &ctx, Operation::Retrieve, product).await?;
    Ok(Json(body).into_response())
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    ProductPayload(write): ProductPayload,
) -> ApiResult {
    let product = save_product(&services, Operation::Create, None, write).await?;
    tracing::info!(product_id = %product.id, brand_id = %product.brand, "product created");

    let body = represent(&services, &ctx, Operation::Create, product).await?;
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    ProductPayload(write): ProductPayload,
) -> ApiResult {
    write_product(&services, &ctx, &id, Operation::Update, write).await
}

pub async fn partial_update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    ProductPayload(write): ProductPayload,
) -> ApiResult {
    write_product(&services, &ctx, &id, Operation::PartialUpdate, write).await
}

async fn write_product(
    services: &AppServices,
    ctx: &RequestContext,
    raw_id: &str,
    op: Operation,
    write: ProductWrite,
) -> ApiResult {
    let id: ProductId = parse_id(raw_id, Product::KIND)?;
    let existing = services.catalog.get_product(id).await.map_err(store_error)?;

    let product = save_product(services, op, Some(existing), write).await?;
    let body = represent(services, ctx, op, product).await?;
    Ok(Json(body).into_response())
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: ProductId = parse_id(&id, Product::KIND)?;
    services.catalog.delete_product(id).await.map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Render `product` in the shape `op` calls for.
async fn represent(
    services: &AppServices,
    ctx: &RequestContext,
    op: Operation,
    product: Product,
) -> Result<ProductRepr, Response> {
    let locator = |name: &str| locate(services.media.as_ref(), ctx, name);
    match op.shape() {
        Shape::Write => Ok(ProductRepr::Write(ProductWriteRepr::new(product, locator))),
        Shape::Read => {
            let brand = services
                .catalog
                .get_brand(product.brand)
                .await
                .map_err(store_error)?;
            let categories = services
                .catalog
                .categories_by_ids(&product.categories)
                .await
                .map_err(store_error)?;
            Ok(ProductRepr::Read(ProductRead::new(product, brand, categories, locator)))
        }
    }
}

/// Validate, store uploads, then insert or update the row.
async fn save_product(
    services: &AppServices,
    op: Operation,
    existing: Option<Product>,
    mut write: ProductWrite,
) -> Result<Product, Response> {
    let base = existing.as_ref().map(Product::fields);
    let mut field_errors = write.check(op.is_partial());
    check_references(services, &write, &mut field_errors).await?;
    if let Ok(candidate) = write.merged(base.clone(), None, None) {
        if let Err(invalid) = candidate.full_clean() {
            field_errors.merge(invalid);
        }
    }
    field_errors.into_result().map_err(errors::validation_error)?;

    let image = store_blob(services, write.image.take(), IMAGE_UPLOAD_TO).await?;
    let file = store_blob(services, write.file.take(), FILE_UPLOAD_TO).await?;
    let uploaded: Vec<String> = [&image, &file]
        .into_iter()
        .flatten()
        .filter(|b| b.fresh)
        .filter_map(|b| b.name.clone())
        .collect();

    let fields = write
        .merged(base, image.map(|b| b.name), file.map(|b| b.name))
        .map_err(errors::validation_error)?;

    let saved = match existing {
        None => services.catalog.create_product(fields).await,
        Some(product) => services.catalog.update_product(product.id, fields).await,
    };

    saved.map_err(|e| {
        if !uploaded.is_empty() {
            tracing::warn!(?uploaded, "product write failed after blobs were stored");
        }
        store_error(e)
    })
}

/// Brand, category and stored-blob references must resolve.
async fn check_references(
    services: &AppServices,
    write: &ProductWrite,
    field_errors: &mut FieldErrors,
) -> Result<(), Response> {
    if let Some(brand) = write.brand {
        match services.catalog.get_brand(brand).await {
            Ok(_) => {}
            Err(StoreError::NotFound) => field_errors.add("brand", missing_pk(brand)),
            Err(e) => return Err(store_error(e)),
        }
    }

    if let Some(ids) = &write.category {
        let found = services
            .catalog
            .categories_by_ids(ids)
            .await
            .map_err(store_error)?;
        for id in ids {
            if !found.iter().any(|c| c.id == *id) {
                field_errors.add("category", missing_pk(id));
            }
        }
    }

    for (field, blob, upload_to) in [
        ("image", &write.image, IMAGE_UPLOAD_TO),
        ("file", &write.file, FILE_UPLOAD_TO),
    ] {
        if let Some(BlobInput::Stored(name)) = blob {
            if let Some(message) = stored_blob_error(services, name, upload_to).await? {
                field_errors.add(field, message);
            }
        }
    }

    Ok(())
}

/// A stored name may only point at an existing object under the field's
/// upload prefix. Stored images must still sniff as images.
async fn stored_blob_error(
    services: &AppServices,
    name: &str,
    upload_to: &str,
) -> Result<Option<&'static str>, Response> {
    if !name.starts_with(upload_to) {
        return Ok(Some(MISSING_FILE));
    }

    let media_error = |e: std::io::Error| match e.kind() {
        std::io::ErrorKind::InvalidInput | std::io::ErrorKind::NotFound => Ok(Some(MISSING_FILE)),
        _ => Err(errors::internal_error("media_error", e)),
    };

    match services.media.exists(name).await {
        Ok(true) => {}
        Ok(false) => return Ok(Some(MISSING_FILE)),
        Err(e) => return media_error(e),
    }
    if upload_to != IMAGE_UPLOAD_TO {
        return Ok(None);
    }

    match services.media.open(name).await {
        Ok(content) if sniff_image(&content).is_some() => Ok(None),
        Ok(_) => Ok(Some(INVALID_IMAGE)),
        Err(e) => media_error(e),
    }
}

/// Resolved blob field: `name` is `None` when the field is being cleared.
struct StoredBlob {
    name: Option<String>,
    fresh: bool,
}

async fn store_blob(
    services: &AppServices,
    input: Option<BlobInput>,
    upload_to: &str,
) -> Result<Option<StoredBlob>, Response> {
    let blob = match input {
        None => return Ok(None),
        Some(BlobInput::Clear) => StoredBlob { name: None, fresh: false },
        Some(BlobInput::Stored(name)) => StoredBlob { name: Some(name), fresh: false },
        Some(BlobInput::Upload { filename, content }) => {
            let name = services
                .media
                .save(upload_to, &filename, &content)
                .await
                .map_err(|e| errors::internal_error("media_error", e))?;
            StoredBlob { name: Some(name), fresh: true }
        }
    };
    Ok(Some(blob))
}

fn missing_pk(id: impl std::fmt::Display) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

fn store_error(err: StoreError) -> Response {
    errors::store_error_to_response(err, Product::KIND)
}
