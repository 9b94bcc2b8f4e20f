//! Catalog domain module: brands, categories and products.
//!
//! Plain data plus the validation rules that belong to it (no IO, no HTTP,
//! no storage).

pub mod brand;
pub mod category;
pub mod product;

pub use brand::{Brand, BrandFields};
pub use category::{Category, CategoryFields};
pub use product::{
    PRICE_DECIMAL_PLACES, PRICE_MAX_DIGITS, Product, ProductFields, NEGATIVE_PRICE,
};
