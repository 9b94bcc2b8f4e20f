use serde::{Deserialize, Serialize};

use catalog_core::validation::{NAME_MAX_CHARS, check_text};
use catalog_core::{CategoryId, Entity, FieldErrors, Validate};

/// Persisted category. Linked to products many-to-many; owns nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFields {
    pub name: String,
}

impl CategoryFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Validate for CategoryFields {
    fn full_clean(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &self.name, NAME_MAX_CHARS);
        errors.into_result()
    }
}

impl Entity for Category {
    type Id = CategoryId;
    const KIND: &'static str = "category";

    fn id(&self) -> CategoryId {
        self.id
    }
}
