//! Domain error model.

use thiserror::Error;

use crate::validation::FieldErrors;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Storage and transport failures have their own error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more input fields failed validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
}

impl DomainError {
    /// Shorthand for a validation error on a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        Self::Validation(errors)
    }
}

impl From<FieldErrors> for DomainError {
    fn from(value: FieldErrors) -> Self {
        Self::Validation(value)
    }
}
