//! User account entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use userdesk_core::{Email, Entity, UserId};

/// A registered user account.
///
/// # Invariants
/// - `email` uniquely identifies a user (enforced by the repository).
/// - `phone_number`, when present, is unique across users.
/// - `password_hash` is always a PHC string, never plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub profile_picture: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub verified: bool,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A fresh, inactive, unprivileged user.
    pub fn new(
        id: UserId,
        email: Email,
        full_name: Option<String>,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            full_name,
            phone_number: None,
            profile_picture: None,
            password_hash,
            verified: false,
            is_staff: false,
            is_active: false,
            is_superuser: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Login name. Users sign in with their email.
    pub fn username(&self) -> &str {
        self.email.as_str()
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} - {}", self.id, self.full_name.as_deref().unwrap_or(""))
    }
}
