//! `userdesk-auth`: accounts and authentication.
//!
//! No HTTP or storage here. The crate builds and checks users, hashes
//! passwords, and issues/validates access tokens; callers persist users.

pub mod claims;
pub mod error;
pub mod jwt;
pub mod manager;
pub mod password;
pub mod profile;
pub mod user;

pub use claims::{AccessClaims, TokenValidationError, validate_claims};
pub use error::AuthError;
pub use jwt::{AccessToken, Hs256Jwt, JwtValidator, TOKEN_TYPE};
pub use manager::{UserFields, UserManager};
pub use password::{Argon2Hasher, PasswordHasher};
pub use profile::Profile;
pub use user::User;
