//! Email address value object (the login key of a user).

use serde::{Deserialize, Serialize};

use crate::{DomainError, ValueObject};

/// Maximum stored length of an email address.
pub const MAX_EMAIL_LEN: usize = 255;

/// A syntactically plausible, normalized email address.
///
/// Normalization lower-cases the domain part and trims surrounding
/// whitespace. The local part is kept as entered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DomainError::validation("email must not be empty"));
        }
        if raw.len() > MAX_EMAIL_LEN {
            return Err(DomainError::validation(format!(
                "email must be at most {MAX_EMAIL_LEN} characters"
            )));
        }

        let (local, domain) = raw
            .rsplit_once('@')
            .ok_or_else(|| DomainError::validation("email must contain '@'"))?;

        if local.is_empty() || domain.is_empty() {
            return Err(DomainError::validation("email must have a local part and a domain"));
        }
        if raw.chars().any(char::is_whitespace) || local.contains('@') {
            return Err(DomainError::validation("email contains invalid characters"));
        }
        if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
            return Err(DomainError::validation("email domain is malformed"));
        }

        Ok(Self(format!("{local}@{}", domain.to_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Email {}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl core::str::FromStr for Email {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
