//! Configuration loading and representation.
//!
//! Everything the process needs at startup is read once into [`AppConfig`] and
//! passed down explicitly; nothing reads the environment after boot.

use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_MEDIA_ROOT: &str = "media";
pub const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;
/// Upper bound for `ACCESS_TOKEN_EXPIRE_MINUTES` (one year).
pub const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 60 * 24 * 365;
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// Public origin used to build media URLs (no trailing slash).
    pub base_url: String,
    /// Directory under which uploaded media is written.
    pub media_root: PathBuf,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    /// Postgres connection string; `None` selects in-memory storage.
    pub database_url: Option<String>,
}

impl AppConfig {
    /// Load from the process environment (after reading `.env`, if any).
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let access_token_expire_minutes = match get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            None => DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(n) if (1..=MAX_ACCESS_TOKEN_EXPIRE_MINUTES).contains(&n) => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "ACCESS_TOKEN_EXPIRE_MINUTES",
                        expected: "an integer between 1 and 525600",
                        value: raw,
                    });
                }
            },
        };

        let base_url = get("BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
            media_root: PathBuf::from(get("MEDIA_ROOT").unwrap_or_else(|| DEFAULT_MEDIA_ROOT.to_string())),
            jwt_secret,
            access_token_expire_minutes,
            database_url: get("DATABASE_URL"),
        })
    }

    /// Token lifetime. Saturates for hand-built configs beyond chrono's range;
    /// the token issuer then reports the overflow as an error.
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.access_token_expire_minutes).unwrap_or(chrono::Duration::MAX)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            media_root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            access_token_expire_minutes: DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
            database_url: None,
        }
    }
}
