//! Product serializer selection and the two product representations.
//!
//! Every product handler names its [`Operation`]; the operation picks the
//! [`Shape`]. Mutating operations accept and echo plain ids. Everything else
//! renders brand and categories as nested objects plus `total_price`.

use axum::body::Bytes;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use catalog_core::validation::REQUIRED;
use catalog_core::{BrandId, CategoryId, FieldErrors, ProductId};
use catalog_infra::media::sniff_image;
use catalog_products::{Brand, Category, Product, ProductFields};

use crate::app::fields::{FromJsonObject, JsonObject, NOT_A_FILE};

pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const EMPTY_FILE: &str = "The submitted file is empty.";
pub const MISSING_FILE: &str = "The submitted file does not exist.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Read,
    Write,
}

impl Operation {
    pub fn shape(self) -> Shape {
        match self {
            Operation::Create | Operation::Update | Operation::PartialUpdate => Shape::Write,
            Operation::List | Operation::Retrieve | Operation::Destroy => Shape::Read,
        }
    }

    /// Omitted required fields are an error unless the operation is partial.
    pub fn is_partial(self) -> bool {
        self == Operation::PartialUpdate
    }
}

// -------------------------
// Write shape (input)
// -------------------------

/// A blob field as submitted.
#[derive(Debug, Clone, PartialEq)]
pub enum BlobInput {
    /// Name of an object already in media storage.
    Stored(String),
    /// Uploaded content, not yet stored.
    Upload { filename: String, content: Bytes },
    /// Empty value: detach the blob.
    Clear,
}

impl BlobInput {
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            BlobInput::Clear
        } else {
            BlobInput::Stored(text)
        }
    }

    fn from_json(object: &JsonObject, field: &str, errors: &mut FieldErrors) -> Option<Self> {
        match object.get(field)? {
            Value::Null => Some(BlobInput::Clear),
            Value::String(name) => Some(BlobInput::from_text(name.clone())),
            _ => {
                errors.add(field, NOT_A_FILE);
                None
            }
        }
    }
}

/// Product input in the write shape. Absent fields are `None`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProductWrite {
    pub name: Option<String>,
    pub brand: Option<BrandId>,
    pub category: Option<Vec<CategoryId>>,
    pub image: Option<BlobInput>,
    pub file: Option<BlobInput>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
}

impl FromJsonObject for ProductWrite {
    fn from_object(object: &JsonObject, errors: &mut FieldErrors) -> Self {
        Self {
            name: object
                .string("name", errors)
                .map(|name| name.trim().to_string()),
            brand: object.pk("brand", errors),
            category: object.pk_list("category", errors),
            image: BlobInput::from_json(object, "image", errors),
            file: BlobInput::from_json(object, "file", errors),
            price: object.decimal("price", errors),
            stock: object.integer("stock", errors),
        }
    }
}

impl ProductWrite {
    /// Presence and upload checks. Value rules live in `ProductFields::full_clean`.
    pub fn check(&self, partial: bool) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if !partial {
            if self.name.is_none() {
                errors.add("name", REQUIRED);
            }
            if self.brand.is_none() {
                errors.add("brand", REQUIRED);
            }
            if self.price.is_none() {
                errors.add("price", REQUIRED);
            }
            if self.stock.is_none() {
                errors.add("stock", REQUIRED);
            }
        }

        if let Some(BlobInput::Upload { content, .. }) = &self.image {
            if content.is_empty() {
                errors.add("image", EMPTY_FILE);
            } else if sniff_image(content).is_none() {
                errors.add("image", INVALID_IMAGE);
            }
        }
        if let Some(BlobInput::Upload { content, .. }) = &self.file {
            if content.is_empty() {
                errors.add("file", EMPTY_FILE);
            }
        }

        errors
    }

    /// Overlay this input on `base` (the stored row for updates).
    ///
    /// `image` and `file` are the resolved blob names: `None` leaves the base
    /// value, `Some(None)` clears it.
    pub fn merged(
        &self,
        base: Option<ProductFields>,
        image: Option<Option<String>>,
        file: Option<Option<String>>,
    ) -> Result<ProductFields, FieldErrors> {
        let mut fields = match base {
            Some(base) => base,
            None => {
                let (Some(name), Some(brand), Some(price), Some(stock)) =
                    (&self.name, self.brand, self.price, self.stock)
                else {
                    return Err(self.check(false));
                };
                ProductFields::new(name.clone(), brand, price, stock)
            }
        };

        if let Some(name) = &self.name {
            fields.name = name.clone();
        }
        if let Some(brand) = self.brand {
            fields.brand = brand;
        }
        if let Some(categories) = &self.category {
            fields.categories = dedup(categories);
        }
        if let Some(price) = self.price {
            fields.price = price;
        }
        if let Some(stock) = self.stock {
            fields.stock = stock;
        }
        if let Some(image) = image {
            fields.image = image;
        }
        if let Some(file) = file {
            fields.file = file;
        }
        Ok(fields)
    }
}

fn dedup(ids: &[CategoryId]) -> Vec<CategoryId> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

// -------------------------
// Output shapes
// -------------------------

/// Write-shape echo: ids for references, no `total_price`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductWriteRepr {
    pub id: ProductId,
    pub name: String,
    pub brand: BrandId,
    pub category: Vec<CategoryId>,
    pub image: Option<String>,
    pub file: Option<String>,
    pub price: Decimal,
    pub stock: i64,
}

impl ProductWriteRepr {
    pub fn new(product: Product, locate: impl Fn(&str) -> String) -> Self {
        Self {
            id: product.id,
            image: product.image.as_deref().map(&locate),
            file: product.file.as_deref().map(&locate),
            name: product.name,
            brand: product.brand,
            category: product.categories,
            price: product.price,
            stock: product.stock,
        }
    }
}

/// Read shape: nested brand and categories plus the derived `total_price`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRead {
    pub id: ProductId,
    pub name: String,
    pub brand: Brand,
    pub category: Vec<Category>,
    pub image: Option<String>,
    pub file: Option<String>,
    pub price: Decimal,
    pub stock: i64,
    pub total_price: Decimal,
}

impl ProductRead {
    /// `categories` are the linked categories, ordered by id.
    pub fn new(
        product: Product,
        brand: Brand,
        categories: Vec<Category>,
        locate: impl Fn(&str) -> String,
    ) -> Self {
        Self {
            id: product.id,
            total_price: product.total_price(),
            image: product.image.as_deref().map(&locate),
            file: product.file.as_deref().map(&locate),
            name: product.name,
            brand,
            category: categories,
            price: product.price,
            stock: product.stock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProductRepr {
    Read(ProductRead),
    Write(ProductWriteRepr),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::fields::read_json;
    use catalog_core::Validate;
    use catalog_products::NEGATIVE_PRICE;
    use core::str::FromStr;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn iphone() -> Product {
        Product {
            id: ProductId::new(7),
            name: "iPhone".into(),
            brand: BrandId::new(1),
            categories: vec![],
            image: Some("products/iphone.png".into()),
            file: None,
            price: dec("999.99"),
            stock: 50,
        }
    }

    #[test]
    fn reads_use_read_shape_and_writes_use_write_shape() {
        for op in [Operation::List, Operation::Retrieve, Operation::Destroy] {
            assert_eq!(op.shape(), Shape::Read);
        }
        for op in [Operation::Create, Operation::Update, Operation::PartialUpdate] {
            assert_eq!(op.shape(), Shape::Write);
        }
        assert!(Operation::PartialUpdate.is_partial());
        assert!(!Operation::Update.is_partial());
    }

    #[test]
    fn read_shape_nests_references_and_totals() {
        let brand = Brand { id: BrandId::new(1), name: "Apple".into() };
        let repr = ProductRead::new(iphone(), brand, vec![], |n| format!("/media/{n}"));
        let value = serde_json::to_value(ProductRepr::Read(repr)).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 7,
                "name": "iPhone",
                "brand": {"id": 1, "name": "Apple"},
                "category": [],
                "image": "/media/products/iphone.png",
                "file": null,
                "price": "999.99",
                "stock": 50,
                "total_price": "49999.50",
            })
        );
    }

    #[test]
    fn write_shape_echoes_ids_without_total() {
        let mut product = iphone();
        product.categories = vec![CategoryId::new(3), CategoryId::new(4)];
        let value = serde_json::to_value(ProductWriteRepr::new(product, |n| n.to_string())).unwrap();

        assert_eq!(value["brand"], json!(1));
        assert_eq!(value["category"], json!([3, 4]));
        assert!(value.get("total_price").is_none());
    }

    #[test]
    fn json_input_accepts_numbers_or_strings_for_price() {
        let write: ProductWrite = read_json(json!({
            "name": "  iPhone ", "brand": 1, "price": "999.99", "stock": 50, "image": ""
        }))
        .unwrap();
        assert_eq!(write.name.as_deref(), Some("iPhone"));
        assert_eq!(write.price, Some(dec("999.99")));
        assert_eq!(write.image, Some(BlobInput::Clear));
        assert!(write.check(false).is_empty());

        let write: ProductWrite = read_json(json!({"price": 12.5, "category": [2, 2, 5]})).unwrap();
        assert_eq!(write.price, Some(dec("12.5")));
    }

    #[test]
    fn json_blob_fields_must_be_names_or_null() {
        let write: ProductWrite = read_json(json!({"image": null, "file": "files/a.pdf"})).unwrap();
        assert_eq!(write.image, Some(BlobInput::Clear));
        assert_eq!(write.file, Some(BlobInput::Stored("files/a.pdf".into())));

        let errors = read_json::<ProductWrite>(json!({"image": 3})).unwrap_err();
        assert_eq!(errors.get("image"), Some(&[NOT_A_FILE.to_string()][..]));
    }

    #[test]
    fn full_writes_require_core_fields_partial_do_not() {
        let write = ProductWrite::default();
        let errors = write.check(false);
        for field in ["name", "brand", "price", "stock"] {
            assert!(errors.contains(field), "{field} should be required");
        }
        assert!(!errors.contains("category"));
        assert!(write.check(true).is_empty());
    }

    #[test]
    fn merged_fields_run_model_validation() {
        let base = iphone().fields();

        let write = ProductWrite { price: Some(dec("-1")), ..Default::default() };
        let errors = write.merged(Some(base.clone()), None, None).unwrap().full_clean().unwrap_err();
        assert_eq!(errors.get("price"), Some(&[NEGATIVE_PRICE.to_string()][..]));

        let write = ProductWrite { price: Some(dec("1.999")), ..Default::default() };
        let errors = write.merged(Some(base.clone()), None, None).unwrap().full_clean().unwrap_err();
        assert!(errors.contains("price"));

        let write = ProductWrite { name: Some("x".repeat(101)), ..Default::default() };
        let errors = write.merged(Some(base), None, None).unwrap().full_clean().unwrap_err();
        assert!(errors.contains("name"));
    }

    #[test]
    fn negative_stock_passes_field_checks() {
        let base = iphone().fields();
        let write = ProductWrite { stock: Some(-5), ..Default::default() };
        assert!(write.check(true).is_empty());
        assert!(write.merged(Some(base), None, None).unwrap().full_clean().is_ok());
    }

    #[test]
    fn uploaded_image_must_look_like_an_image() {
        let write = ProductWrite {
            image: Some(BlobInput::Upload {
                filename: "notes.txt".into(),
                content: Bytes::from_static(b"plain text"),
            }),
            ..Default::default()
        };
        assert_eq!(write.check(true).get("image"), Some(&[INVALID_IMAGE.to_string()][..]));
    }

    #[test]
    fn partial_overlay_keeps_untouched_fields() {
        let base = iphone().fields();
        let write = ProductWrite {
            stock: Some(10),
            category: Some(vec![CategoryId::new(2), CategoryId::new(2)]),
            ..Default::default()
        };
        let fields = write.merged(Some(base.clone()), None, Some(None)).unwrap();

        assert_eq!(fields.name, base.name);
        assert_eq!(fields.price, base.price);
        assert_eq!(fields.image, base.image);
        assert_eq!(fields.stock, 10);
        assert_eq!(fields.categories, vec![CategoryId::new(2)]);
        assert_eq!(fields.file, None);
    }

    #[test]
    fn create_overlay_needs_required_fields() {
        let write = ProductWrite { name: Some("x".into()), ..Default::default() };
        let errors = write.merged(None, None, None).unwrap_err();
        assert!(errors.contains("brand"));
        assert!(!errors.contains("name"));
    }
}
