use thiserror::Error;

use userdesk_core::DomainError;

use crate::TokenValidationError;

/// Authentication-layer failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown user, wrong password, or inactive account.
    #[error("incorrect username or password")]
    InvalidCredentials,

    /// Token could not be decoded, failed signature checks, or is outside its
    /// validity window.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<TokenValidationError> for AuthError {
    fn from(value: TokenValidationError) -> Self {
        Self::InvalidToken(value.to_string())
    }
}
