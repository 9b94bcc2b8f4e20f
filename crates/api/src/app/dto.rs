use serde::Serialize;

use catalog_core::validation::{BLANK, REQUIRED};
use catalog_core::{FieldErrors, UserId};

use crate::app::fields::{FromJsonObject, JsonObject};

pub const USERNAME_MAX_CHARS: usize = 150;
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const BAD_CREDENTIALS: &str = "No active account found with the given credentials";

// -------------------------
// Request DTOs
// -------------------------

/// Write body for brands and categories.
#[derive(Debug, Default)]
pub struct NameWrite {
    pub name: Option<String>,
}

impl FromJsonObject for NameWrite {
    fn from_object(object: &JsonObject, errors: &mut FieldErrors) -> Self {
        Self { name: trimmed(object, "name", errors) }
    }
}

impl NameWrite {
    /// The name to store. `current` is the fallback for partial updates.
    pub fn resolve(self, current: Option<&str>) -> Result<String, FieldErrors> {
        match (self.name, current) {
            (Some(name), _) => Ok(name),
            (None, Some(current)) => Ok(current.to_string()),
            (None, None) => {
                let mut errors = FieldErrors::new();
                errors.add("name", REQUIRED);
                Err(errors)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl FromJsonObject for RegisterRequest {
    fn from_object(object: &JsonObject, errors: &mut FieldErrors) -> Self {
        Self {
            username: trimmed(object, "username", errors),
            email: trimmed(object, "email", errors),
            password: object.string("password", errors),
        }
    }
}

/// Registration input that passed field validation.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<NewUser, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = required(&mut errors, "username", self.username);
        if let Some(username) = &username {
            if username.chars().count() > USERNAME_MAX_CHARS {
                errors.add(
                    "username",
                    format!("Ensure this field has no more than {USERNAME_MAX_CHARS} characters."),
                );
            } else if !username
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
            {
                errors.add(
                    "username",
                    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
                );
            }
        }

        let email = self.email.unwrap_or_default().trim().to_string();
        if !email.is_empty() && !looks_like_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }

        let password = required(&mut errors, "password", self.password);

        errors.into_result()?;
        match (username, password) {
            (Some(username), Some(password)) => Ok(NewUser { username, email, password }),
            _ => Err(FieldErrors::new()),
        }
    }
}

#[derive(Debug, Default)]
pub struct TokenObtainRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl FromJsonObject for TokenObtainRequest {
    fn from_object(object: &JsonObject, errors: &mut FieldErrors) -> Self {
        Self {
            username: object.string("username", errors),
            password: object.string("password", errors),
        }
    }
}

impl TokenObtainRequest {
    pub fn validate(self) -> Result<(String, String), FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = required(&mut errors, "username", self.username);
        let password = required(&mut errors, "password", self.password);
        errors.into_result()?;
        Ok((username.unwrap_or_default(), password.unwrap_or_default()))
    }
}

#[derive(Debug, Default)]
pub struct TokenRefreshRequest {
    pub refresh: Option<String>,
}

impl FromJsonObject for TokenRefreshRequest {
    fn from_object(object: &JsonObject, errors: &mut FieldErrors) -> Self {
        Self { refresh: object.string("refresh", errors) }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub refresh: String,
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub access: String,
}

/// String field with surrounding whitespace removed.
fn trimmed(object: &JsonObject, field: &str, errors: &mut FieldErrors) -> Option<String> {
    object.string(field, errors).map(|s| s.trim().to_string())
}

fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.add(field, BLANK);
            None
        }
        Some(v) => Some(v),
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
