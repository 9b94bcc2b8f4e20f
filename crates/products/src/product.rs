use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_core::validation::{NAME_MAX_CHARS, check_decimal, check_text};
use catalog_core::{BrandId, CategoryId, DomainError, DomainResult, Entity, FieldErrors, ProductId, Validate};

/// Price column precision: `DECIMAL(9, 2)`.
pub const PRICE_MAX_DIGITS: u32 = 9;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

pub const NEGATIVE_PRICE: &str = "Price cannot be negative";

/// Persisted product.
///
/// `categories` holds the ids of the linked categories, ordered by id.
/// `image` and `file` are blob names relative to the media root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: BrandId,
    pub categories: Vec<CategoryId>,
    pub image: Option<String>,
    pub file: Option<String>,
    pub price: Decimal,
    pub stock: i64,
}

impl Product {
    pub fn from_fields(id: ProductId, fields: ProductFields) -> Self {
        Self {
            id,
            name: fields.name,
            brand: fields.brand,
            categories: fields.categories,
            image: fields.image,
            file: fields.file,
            price: fields.price,
            stock: fields.stock,
        }
    }

    /// Writable view of this product, used as the base of partial updates.
    pub fn fields(&self) -> ProductFields {
        ProductFields {
            name: self.name.clone(),
            brand: self.brand,
            categories: self.categories.clone(),
            image: self.image.clone(),
            file: self.file.clone(),
            price: self.price,
            stock: self.stock,
        }
    }

    /// Inventory value: `price × stock`, exact.
    pub fn total_price(&self) -> Decimal {
        self.price * Decimal::from(self.stock)
    }
}

impl Entity for Product {
    type Id = ProductId;
    const KIND: &'static str = "product";

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Writable product fields (insert/update payload for the store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub name: String,
    pub brand: BrandId,
    pub categories: Vec<CategoryId>,
    pub image: Option<String>,
    pub file: Option<String>,
    pub price: Decimal,
    pub stock: i64,
}

impl ProductFields {
    /// Minimal product: no categories, no blobs.
    pub fn new(name: impl Into<String>, brand: BrandId, price: Decimal, stock: i64) -> Self {
        Self {
            name: name.into(),
            brand,
            categories: Vec::new(),
            image: None,
            file: None,
            price,
            stock,
        }
    }

    /// Guard applied on every save, independent of input validation.
    ///
    /// Only the price sign is checked here; stock is left to the storage constraint.
    pub fn ensure_savable(&self) -> DomainResult<()> {
        if self.price < Decimal::ZERO {
            return Err(DomainError::field("price", NEGATIVE_PRICE));
        }
        Ok(())
    }
}

impl Validate for ProductFields {
    fn full_clean(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &self.name, NAME_MAX_CHARS);
        check_decimal(&mut errors, "price", &self.price, PRICE_MAX_DIGITS, PRICE_DECIMAL_PLACES);
        if let Err(DomainError::Validation(price)) = self.ensure_savable() {
            errors.merge(price);
        }
        errors.into_result()
    }
}
