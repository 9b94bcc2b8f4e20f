use serde::{Deserialize, Serialize};

use catalog_core::validation::{NAME_MAX_CHARS, check_text};
use catalog_core::{BrandId, Entity, FieldErrors, Validate};

/// Persisted brand. Names are unique across brands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
}

/// Writable brand fields (insert/update payload for the store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandFields {
    pub name: String,
}

impl BrandFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Validate for BrandFields {
    fn full_clean(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &self.name, NAME_MAX_CHARS);
        errors.into_result()
    }
}

impl Entity for Brand {
    type Id = BrandId;
    const KIND: &'static str = "brand";

    fn id(&self) -> BrandId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlong_name_fails_full_clean_but_assignment_is_unchecked() {
        let mut fields = BrandFields::new("Apple");
        assert!(fields.full_clean().is_ok());

        fields.name = "a".repeat(101);
        assert_eq!(fields.name.chars().count(), 101);

        let errors = fields.full_clean().unwrap_err();
        assert!(errors.contains("name"));
    }
}
