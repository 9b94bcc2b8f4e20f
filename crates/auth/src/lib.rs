//! `catalog-auth`: JWT access/refresh tokens and password hashing.
//!
//! No HTTP or storage dependencies.

pub mod claims;
pub mod jwt;
pub mod password;

pub use claims::{TokenClaims, TokenKind, TokenValidationError, validate_claims};
pub use jwt::{Hs256TokenService, JwtValidator, TokenError, TokenPair};
pub use password::{PasswordError, hash_password, verify_password};
