//! HS256 token pairs on top of `jsonwebtoken`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use catalog_core::UserId;

use crate::claims::{TokenClaims, TokenKind, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, bad encoding or unparseable claims.
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Access + refresh tokens returned by registration and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// Verifies bearer (access) tokens. Implemented by [`Hs256TokenService`].
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError>;
}

/// Issues and verifies HS256-signed tokens with a shared secret.
#[derive(Clone)]
pub struct Hs256TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl Hs256TokenService {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue(
        &self,
        user_id: UserId,
        username: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = TokenClaims {
            user_id,
            username: username.to_string(),
            token_type: kind,
            jti: Uuid::now_v7(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn issue_pair(
        &self,
        user_id: UserId,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            refresh: self.issue(user_id, username, TokenKind::Refresh, now)?,
            access: self.issue(user_id, username, TokenKind::Access, now)?,
        })
    }

    /// Verify the signature, then the claims against `now` and the expected kind.
    pub fn decode(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks run in `validate_claims` against the injected clock.
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &validation)?;
        validate_claims(&data.claims, now, expected)?;
        Ok(data.claims)
    }

    /// Exchange a refresh token for a fresh access token.
    pub fn refresh(&self, refresh_token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = self.decode(refresh_token, TokenKind::Refresh, now)?;
        self.issue(claims.user_id, &claims.username, TokenKind::Access, now)
    }
}

impl JwtValidator for Hs256TokenService {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        self.decode(token, TokenKind::Access, now)
    }
}
