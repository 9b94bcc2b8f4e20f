//! Request bodies: field-checked JSON, and JSON or `multipart/form-data` for products.

use std::str::FromStr;

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    response::Response,
    Json,
};
use serde_json::Value;

use catalog_core::{BrandId, CategoryId, FieldErrors};

use crate::app::errors;
use crate::app::fields::{
    incorrect_pk, parse_decimal, parse_integer, read_json, FromJsonObject, NOT_AN_INTEGER,
    NOT_A_NUMBER,
};
use crate::app::shapes::{BlobInput, ProductWrite};

/// JSON body read field by field.
///
/// Malformed JSON is a 400 `parse_error`; wrongly typed fields are a 400
/// `validation_error` keyed by field.
#[derive(Debug)]
pub struct JsonFields<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonFields<T>
where
    S: Send + Sync,
    T: FromJsonObject + Send,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        read_json_body(req, state).await.map(JsonFields)
    }
}

async fn read_json_body<S, T>(req: Request, state: &S) -> Result<T, Response>
where
    S: Send + Sync,
    T: FromJsonObject,
{
    let Json(value) = Json::<Value>::from_request(req, state)
        .await
        .map_err(errors::json_rejection)?;
    read_json(value).map_err(errors::validation_error)
}

/// Extractor yielding a [`ProductWrite`] from either body encoding.
///
/// Uploads are only possible through multipart; JSON bodies name stored blobs.
#[derive(Debug)]
pub struct ProductPayload(pub ProductWrite);

#[async_trait]
impl<S> FromRequest<S> for ProductPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if multipart {
            let form = Multipart::from_request(req, state).await.map_err(|rejection| {
                errors::json_error(StatusCode::BAD_REQUEST, "parse_error", rejection.body_text())
            })?;
            return read_form(form).await.map(ProductPayload);
        }

        read_json_body(req, state).await.map(ProductPayload)
    }
}

async fn read_form(mut form: Multipart) -> Result<ProductWrite, Response> {
    let mut write = ProductWrite::default();
    let mut field_errors = FieldErrors::new();
    let mut categories: Option<Vec<CategoryId>> = None;

    while let Some(field) = form.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "image" || name == "file" {
            let file_name = field.file_name().map(str::to_owned);
            let blob = match file_name {
                Some(filename) => BlobInput::Upload {
                    filename,
                    content: field.bytes().await.map_err(multipart_error)?,
                },
                None => BlobInput::from_text(field.text().await.map_err(multipart_error)?),
            };
            if name == "image" {
                write.image = Some(blob);
            } else {
                write.file = Some(blob);
            }
            continue;
        }

        let text = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "name" => write.name = Some(text.trim().to_string()),
            "brand" => match BrandId::from_str(text.trim()) {
                Ok(id) => write.brand = Some(id),
                Err(_) => field_errors.add("brand", incorrect_pk("str")),
            },
            "category" => {
                let ids = categories.get_or_insert_with(Vec::new);
                if text.trim().is_empty() {
                    continue;
                }
                match CategoryId::from_str(text.trim()) {
                    Ok(id) => ids.push(id),
                    Err(_) => field_errors.add("category", incorrect_pk("str")),
                }
            }
            "price" => match parse_decimal(&text) {
                Some(price) => write.price = Some(price),
                None => field_errors.add("price", NOT_A_NUMBER),
            },
            "stock" => match parse_integer(&text) {
                Some(stock) => write.stock = Some(stock),
                None => field_errors.add("stock", NOT_AN_INTEGER),
            },
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    write.category = categories;
    field_errors.into_result().map_err(errors::validation_error)?;
    Ok(write)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> Response {
    errors::json_error(err.status(), "parse_error", err.body_text())
}
