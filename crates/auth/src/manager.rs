//! User construction rules (regular users and superusers).
//!
//! The manager is storage-agnostic: it validates input, hashes the password and
//! returns a ready-to-persist [`User`]. Uniqueness is the repository's job.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use userdesk_core::{DomainError, Email, UserId};

use crate::{AuthError, PasswordHasher, User};

/// Field length limits, mirroring the persisted column sizes.
pub const MAX_FULL_NAME_LEN: usize = 255;
pub const MAX_PHONE_NUMBER_LEN: usize = 20;

/// Valid Argon2id PHC string (default parameters) matching no real password.
/// Verified against when a login names an unknown user, so that path costs the
/// same hash as a real check.
pub const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dXNlcmRlc2stZHVtbXkhIQ$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Optional extra fields accepted when creating a user.
///
/// `None` means "use the default for this kind of user".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFields {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub verified: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct UserManager {
    hasher: Arc<dyn PasswordHasher>,
}

impl UserManager {
    pub fn new(hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { hasher }
    }

    /// Build an active user with a hashed password.
    ///
    /// `is_active` is always `true`; the remaining flags come from `extra`.
    pub fn create_user(
        &self,
        email: &str,
        full_name: Option<String>,
        password: &str,
        extra: UserFields,
        now: DateTime<Utc>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let full_name = full_name.or(extra.full_name);
        validate_lengths(full_name.as_deref(), extra.phone_number.as_deref())?;

        let hash = self.hasher.hash(password)?;
        let mut user = User::new(UserId::new(), email, full_name, hash, now);
        user.phone_number = extra.phone_number;
        user.verified = extra.verified.unwrap_or(false);
        user.is_staff = extra.is_staff.unwrap_or(false);
        user.is_superuser = extra.is_superuser.unwrap_or(false);
        user.is_active = true;

        tracing::debug!(user_id = %user.id, "user built");
        Ok(user)
    }

    /// Build a superuser.
    ///
    /// Staff, superuser and active default to `true`; explicitly passing
    /// `false` for staff or superuser is a validation error.
    pub fn create_superuser(
        &self,
        email: &str,
        password: &str,
        extra: UserFields,
        now: DateTime<Utc>,
    ) -> Result<User, AuthError> {
        let is_staff = extra.is_staff.unwrap_or(true);
        let is_superuser = extra.is_superuser.unwrap_or(true);
        let is_active = extra.is_active.unwrap_or(true);

        if !is_staff {
            return Err(DomainError::validation("Superuser must be assigned to is_staff=True.").into());
        }
        if !is_superuser {
            return Err(
                DomainError::validation("Superuser must be assigned to is_superuser=True.").into(),
            );
        }

        let email = Email::parse(email)?;
        validate_lengths(extra.full_name.as_deref(), extra.phone_number.as_deref())?;

        let hash = self.hasher.hash(password)?;
        let mut user = User::new(UserId::new(), email, extra.full_name, hash, now);
        user.phone_number = extra.phone_number;
        user.verified = extra.verified.unwrap_or(false);
        user.is_staff = is_staff;
        user.is_superuser = is_superuser;
        user.is_active = is_active;

        tracing::debug!(user_id = %user.id, "superuser built");
        Ok(user)
    }

    /// Check a login attempt against a stored user.
    ///
    /// Inactive users never authenticate, but their hash is still checked. A
    /// malformed stored hash counts as a mismatch.
    pub fn check_password(&self, user: &User, password: &str) -> bool {
        let matches = match self.hasher.verify(password, &user.password_hash) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!(user_id = %user.id, "stored password hash unreadable: {e}");
                false
            }
        };
        matches && user.is_active
    }

    /// Run a full hash verification for a login that named no existing user.
    /// Always `false`.
    pub fn check_password_for_missing_user(&self, password: &str) -> bool {
        if let Err(e) = self.hasher.verify(password, DUMMY_PASSWORD_HASH) {
            tracing::warn!("dummy password hash unreadable: {e}");
        }
        false
    }
}

fn validate_lengths(full_name: Option<&str>, phone_number: Option<&str>) -> Result<(), DomainError> {
    if full_name.is_some_and(|n| n.chars().count() > MAX_FULL_NAME_LEN) {
        return Err(DomainError::validation(format!(
            "full_name must be at most {MAX_FULL_NAME_LEN} characters"
        )));
    }
    if phone_number.is_some_and(|p| p.chars().count() > MAX_PHONE_NUMBER_LEN) {
        return Err(DomainError::validation(format!(
            "phone_number must be at most {MAX_PHONE_NUMBER_LEN} characters"
        )));
    }
    Ok(())
}
