//! Persistence interfaces for users and profiles.
//!
//! Handlers depend on these traits only; [`InMemoryStore`] backs dev/test and
//! [`PostgresStore`] backs deployments with a `DATABASE_URL`.

use async_trait::async_trait;
use thiserror::Error;

use userdesk_auth::{Profile, User};
use userdesk_core::{Email, UserId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Repository operation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A uniqueness constraint was violated (email, phone number, id).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced or updated row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other storage failure (connectivity, corrupt rows, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user. Fails with `Conflict` on a taken email or phone number.
    async fn insert_user(&self, user: User) -> Result<User, RepositoryError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Replace an existing user's mutable fields. Fails with `NotFound` for an
    /// unknown id.
    async fn update_user(&self, user: User) -> Result<User, RepositoryError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Persist a new profile. Fails with `NotFound` when the owner does not exist.
    async fn insert_profile(&self, profile: Profile) -> Result<Profile, RepositoryError>;
}
