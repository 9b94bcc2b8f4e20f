//! Field-scoped validation errors and the shared field checks.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

/// Maximum length (in characters) of catalog names.
pub const NAME_MAX_CHARS: usize = 100;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Validation failures keyed by input field name.
///
/// Serializes as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(())` when no field failed.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl core::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Full-object validation.
///
/// Constructing or mutating a value never validates it; callers that need the
/// complete rule set run `full_clean` explicitly before persisting.
pub trait Validate {
    fn full_clean(&self) -> Result<(), FieldErrors>;
}

/// Non-blank, bounded-length text field.
pub fn check_text(errors: &mut FieldErrors, field: &str, value: &str, max_chars: usize) {
    if value.trim().is_empty() {
        errors.add(field, BLANK);
        return;
    }
    if value.chars().count() > max_chars {
        errors.add(
            field,
            format!("Ensure this field has no more than {max_chars} characters."),
        );
    }
}

/// Precision limits of a fixed-point decimal column.
///
/// Trailing zeros do not count against either limit (`1.50` has one decimal place).
pub fn check_decimal(
    errors: &mut FieldErrors,
    field: &str,
    value: &Decimal,
    max_digits: u32,
    decimal_places: u32,
) {
    let normalized = value.normalize();
    let scale = normalized.scale();
    let significant = normalized.mantissa().unsigned_abs().to_string().len() as u32;
    let total = significant.max(scale);
    let whole = total - scale;

    if total > max_digits {
        errors.add(
            field,
            format!("Ensure that there are no more than {max_digits} digits in total."),
        );
    } else if scale > decimal_places {
        errors.add(
            field,
            format!("Ensure that there are no more than {decimal_places} decimal places."),
        );
    } else if whole > max_digits - decimal_places {
        errors.add(
            field,
            format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                max_digits - decimal_places
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn text_rejects_blank_and_overlong_values() {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", "   ", NAME_MAX_CHARS);
        assert_eq!(errors.get("name").unwrap(), [BLANK.to_string()]);

        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &"x".repeat(101), NAME_MAX_CHARS);
        assert!(errors.contains("name"));

        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &"x".repeat(100), NAME_MAX_CHARS);
        assert!(errors.is_empty());
    }

    #[test]
    fn text_length_counts_characters_not_bytes() {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &"é".repeat(100), NAME_MAX_CHARS);
        assert!(errors.is_empty());
    }

    #[test]
    fn decimal_precision_limits() {
        let cases = [
            ("999.99", true),
            ("1234567.89", true),
            ("0.05", true),
            ("1.500", true),
            ("12345678.9", false),
            ("1.234", false),
            ("1234567890", false),
        ];
        for (raw, ok) in cases {
            let mut errors = FieldErrors::new();
            check_decimal(&mut errors, "price", &dec(raw), 9, 2);
            assert_eq!(errors.is_empty(), ok, "{raw}");
        }
    }

    #[test]
    fn errors_merge_and_render() {
        let mut a = FieldErrors::new();
        a.add("price", "Price cannot be negative");
        let mut b = FieldErrors::new();
        b.add("name", BLANK);
        b.add("price", "too many digits");
        a.merge(b);

        assert_eq!(a.get("price").unwrap().len(), 2);
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["name"][0], BLANK);
        assert!(a.to_string().starts_with("name: "));
        assert!(FieldErrors::new().into_result().is_ok());
    }
}
