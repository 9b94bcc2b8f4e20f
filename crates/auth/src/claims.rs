use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use catalog_core::UserId;

/// Which half of a token pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl core::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT claims carried by both access and refresh tokens.
///
/// `iat`/`exp` are Unix timestamps (seconds), as registered JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub username: String,
    pub token_type: TokenKind,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("expected {expected} token, got {found} token")]
    WrongKind { expected: TokenKind, found: TokenKind },
}

/// Deterministically validate decoded claims.
///
/// Signature verification happens before this, in [`crate::jwt`].
pub fn validate_claims(
    claims: &TokenClaims,
    now: DateTime<Utc>,
    expected: TokenKind,
) -> Result<(), TokenValidationError> {
    if claims.token_type != expected {
        return Err(TokenValidationError::WrongKind {
            expected,
            found: claims.token_type,
        });
    }
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
