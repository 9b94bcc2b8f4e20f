//! `catalog-core`: domain building blocks shared by every crate.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod validation;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{BrandId, CategoryId, ProductId, UserId};
pub use validation::{FieldErrors, Validate};
