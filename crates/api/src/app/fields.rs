//! Loosely typed request fields.
//!
//! JSON bodies are read as [`Value`]s first, so a wrongly typed field becomes a
//! message under that field instead of a rejected body. Multipart parsing uses
//! the same conversions and messages.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use catalog_core::FieldErrors;

pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NOT_A_NUMBER: &str = "A valid number is required.";
pub const NOT_AN_INTEGER: &str = "A valid integer is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_A_FILE: &str = "The submitted data was not a file. Check the encoding type on the form.";

/// A body type that can be read field by field from a JSON object.
pub trait FromJsonObject: Sized {
    /// Read every known field, recording type errors in `errors`.
    fn from_object(object: &JsonObject, errors: &mut FieldErrors) -> Self;
}

/// Read `value` as `T`, failing with every field error found.
pub fn read_json<T: FromJsonObject>(value: Value) -> Result<T, FieldErrors> {
    let object = JsonObject::parse(value)?;
    let mut errors = FieldErrors::new();
    let parsed = T::from_object(&object, &mut errors);
    errors.into_result()?;
    Ok(parsed)
}

/// Top-level JSON object of a request body.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonObject(Map<String, Value>);

impl JsonObject {
    pub fn parse(value: Value) -> Result<Self, FieldErrors> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => {
                let mut errors = FieldErrors::new();
                errors.add(
                    "non_field_errors",
                    format!("Invalid data. Expected a dictionary, but got {}.", type_name(&other)),
                );
                Err(errors)
            }
        }
    }

    /// Raw value, for fields where `null` carries a meaning.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Present, non-null value. `null` is recorded as an error.
    fn present(&self, field: &str, errors: &mut FieldErrors) -> Option<&Value> {
        match self.0.get(field)? {
            Value::Null => {
                errors.add(field, NOT_NULL);
                None
            }
            value => Some(value),
        }
    }

    pub fn string(&self, field: &str, errors: &mut FieldErrors) -> Option<String> {
        match self.present(field, errors)? {
            Value::String(s) => Some(s.clone()),
            _ => {
                errors.add(field, NOT_A_STRING);
                None
            }
        }
    }

    pub fn decimal(&self, field: &str, errors: &mut FieldErrors) -> Option<Decimal> {
        let parsed = match self.present(field, errors)? {
            Value::String(s) => parse_decimal(s),
            Value::Number(n) => parse_decimal(&n.to_string()),
            _ => None,
        };
        if parsed.is_none() {
            errors.add(field, NOT_A_NUMBER);
        }
        parsed
    }

    pub fn integer(&self, field: &str, errors: &mut FieldErrors) -> Option<i64> {
        let parsed = match self.present(field, errors)? {
            Value::String(s) => parse_integer(s),
            Value::Number(n) => n.as_i64(),
            _ => None,
        };
        if parsed.is_none() {
            errors.add(field, NOT_AN_INTEGER);
        }
        parsed
    }

    /// Primary key of a referenced row, given as a number or numeric string.
    pub fn pk<T: From<i64> + FromStr>(&self, field: &str, errors: &mut FieldErrors) -> Option<T> {
        let value = self.present(field, errors)?;
        let parsed = pk_value(value);
        if parsed.is_none() {
            errors.add(field, incorrect_pk(type_name(value)));
        }
        parsed
    }

    pub fn pk_list<T: From<i64> + FromStr>(
        &self,
        field: &str,
        errors: &mut FieldErrors,
    ) -> Option<Vec<T>> {
        let value = self.present(field, errors)?;
        let Value::Array(items) = value else {
            errors.add(
                field,
                format!("Expected a list of items but got type \"{}\".", type_name(value)),
            );
            return None;
        };

        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            match pk_value(item) {
                Some(id) => ids.push(id),
                None => errors.add(field, incorrect_pk(type_name(item))),
            }
        }
        Some(ids)
    }
}

fn pk_value<T: From<i64> + FromStr>(value: &Value) -> Option<T> {
    match value {
        Value::Number(n) => n.as_i64().map(T::from),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

pub fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

pub fn incorrect_pk(received: &str) -> String {
    format!("Incorrect type. Expected pk value, received {received}.")
}

/// Type names as they appear in client-facing messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::BrandId;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        JsonObject::parse(value).unwrap()
    }

    #[test]
    fn non_objects_are_a_body_level_error() {
        let errors = JsonObject::parse(json!([1, 2])).unwrap_err();
        assert_eq!(
            errors.get("non_field_errors"),
            Some(&["Invalid data. Expected a dictionary, but got list.".to_string()][..])
        );
    }

    #[test]
    fn wrong_types_are_scoped_to_their_field() {
        let body = object(json!({
            "name": 5, "price": "abc", "stock": "many", "brand": "x", "category": "y"
        }));
        let mut errors = FieldErrors::new();

        assert_eq!(body.string("name", &mut errors), None);
        assert_eq!(body.decimal("price", &mut errors), None);
        assert_eq!(body.integer("stock", &mut errors), None);
        assert_eq!(body.pk::<BrandId>("brand", &mut errors), None);
        assert_eq!(body.pk_list::<BrandId>("category", &mut errors), None);

        assert_eq!(errors.get("name"), Some(&[NOT_A_STRING.to_string()][..]));
        assert_eq!(errors.get("price"), Some(&[NOT_A_NUMBER.to_string()][..]));
        assert_eq!(errors.get("stock"), Some(&[NOT_AN_INTEGER.to_string()][..]));
        assert_eq!(errors.get("brand"), Some(&[incorrect_pk("str")][..]));
        assert_eq!(
            errors.get("category"),
            Some(&["Expected a list of items but got type \"str\".".to_string()][..])
        );
    }

    #[test]
    fn numeric_strings_and_numbers_are_accepted() {
        let body = object(json!({"price": "999.99", "stock": "50", "brand": "3", "category": [1, "2"]}));
        let mut errors = FieldErrors::new();

        assert_eq!(body.decimal("price", &mut errors), Some(Decimal::new(99999, 2)));
        assert_eq!(body.integer("stock", &mut errors), Some(50));
        assert_eq!(body.pk::<BrandId>("brand", &mut errors), Some(BrandId::new(3)));
        assert_eq!(
            body.pk_list::<BrandId>("category", &mut errors),
            Some(vec![BrandId::new(1), BrandId::new(2)])
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn absent_is_silent_and_null_is_an_error() {
        let body = object(json!({"name": null}));
        let mut errors = FieldErrors::new();

        assert_eq!(body.string("missing", &mut errors), None);
        assert!(errors.is_empty());

        assert_eq!(body.string("name", &mut errors), None);
        assert_eq!(errors.get("name"), Some(&[NOT_NULL.to_string()][..]));
    }
}
