//! Configuration loading and representation.
//!
//! Everything comes from environment variables; unset variables fall back to
//! development defaults, malformed ones are errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// sqlx SQLite URL (`sqlite::memory:` or `sqlite://path/to/db`).
    pub database_url: String,
    pub jwt_secret: String,
    /// Development mode: absolute media locators and media serving.
    pub debug: bool,
    pub media_root: PathBuf,
    /// Public prefix of stored blobs; always ends with `/`.
    pub media_url: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            debug: false,
            media_root: PathBuf::from("./media"),
            media_url: "/media/".to_string(),
            access_token_ttl_secs: 5 * 60,
            refresh_token_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                defaults.jwt_secret
            }
        };

        let media_url = lookup("MEDIA_URL").unwrap_or(defaults.media_url);
        let media_url = if media_url.ends_with('/') {
            media_url
        } else {
            format!("{media_url}/")
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            jwt_secret,
            debug: parse_var(&lookup, "DEBUG", parse_bool)?.unwrap_or(defaults.debug),
            media_root: lookup("MEDIA_ROOT").map(PathBuf::from).unwrap_or(defaults.media_root),
            media_url,
            access_token_ttl_secs: parse_var(&lookup, "ACCESS_TOKEN_TTL_SECS", parse_ttl)?
                .unwrap_or(defaults.access_token_ttl_secs),
            refresh_token_ttl_secs: parse_var(&lookup, "REFRESH_TOKEN_TTL_SECS", parse_ttl)?
                .unwrap_or(defaults.refresh_token_ttl_secs),
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    parse: fn(&str) -> Result<T, String>,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => parse(&value).map(Some).map_err(|reason| ConfigError {
            var,
            value,
            reason,
        }),
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err("expected a boolean".to_string()),
    }
}

fn parse_ttl(value: &str) -> Result<i64, String> {
    let secs: i64 = value.trim().parse().map_err(|e| format!("{e}"))?;
    if secs <= 0 {
        return Err("must be positive".to_string());
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        assert_eq!(config(&[]).unwrap(), Config::default());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config(&[
            ("DEBUG", "true"),
            ("JWT_SECRET", "s3cret"),
            ("MEDIA_URL", "/uploads"),
            ("ACCESS_TOKEN_TTL_SECS", "60"),
            ("DATABASE_URL", "sqlite://catalog.db"),
        ])
        .unwrap();
        assert!(cfg.debug);
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert_eq!(cfg.media_url, "/uploads/");
        assert_eq!(cfg.access_token_ttl_secs, 60);
        assert_eq!(cfg.database_url, "sqlite://catalog.db");
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = config(&[("DEBUG", "maybe")]).unwrap_err();
        assert_eq!(err.var, "DEBUG");

        let err = config(&[("REFRESH_TOKEN_TTL_SECS", "-1")]).unwrap_err();
        assert_eq!(err.var, "REFRESH_TOKEN_TTL_SECS");
    }
}
