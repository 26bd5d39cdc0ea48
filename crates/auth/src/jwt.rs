//! HS256 access tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;

use crate::{AccessClaims, AuthError, User, validate_claims};

/// `token_type` reported alongside every issued token.
pub const TOKEN_TYPE: &str = "bearer";

/// Signed token + its type, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Verifies a bearer token and yields its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, AuthError>;
}

/// Symmetric-key (HS256) token issuer and validator.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl core::fmt::Debug for Hs256Jwt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Jwt").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl Hs256Jwt {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Build the claims for `user` at `now`.
    ///
    /// Fails when `now + ttl` is not a representable timestamp.
    pub fn claims_for(&self, user: &User, now: DateTime<Utc>) -> Result<AccessClaims, AuthError> {
        let expires = now.checked_add_signed(self.ttl).ok_or_else(|| {
            AuthError::Signing(format!("token lifetime {} overflows the expiry timestamp", self.ttl))
        })?;
        Ok(AccessClaims {
            sub: user.email.to_string(),
            id: user.id,
            iat: now.timestamp(),
            exp: expires.timestamp(),
        })
    }

    pub fn encode(&self, claims: &AccessClaims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Issue a signed access token for `user`.
    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<AccessToken, AuthError> {
        let access_token = self.encode(&self.claims_for(user, now)?)?;
        Ok(AccessToken {
            access_token,
            token_type: TOKEN_TYPE,
        })
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, AuthError> {
        // Signature and shape here; the time window is checked against the
        // caller's clock by `validate_claims`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
