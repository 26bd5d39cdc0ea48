use serde::{Deserialize, Serialize};

use userdesk_auth::{AccessToken, Profile, User};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// OAuth2 password-grant form. Other form fields (`grant_type`, `scope`,
/// client credentials) are accepted and ignored.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username().to_string(),
            email: user.email.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub data: UserSummary,
}

impl LoginResponse {
    pub fn new(token: AccessToken, user: &User) -> Self {
        Self {
            access_token: token.access_token,
            token_type: token.token_type,
            data: UserSummary::from(user),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileData {
    pub id: String,
    pub user_id: String,
    pub address: String,
    pub phone_number: String,
    /// Public URL, not the stored filename.
    pub profile_picture: String,
}

impl ProfileData {
    pub fn new(profile: &Profile, picture_url: String) -> Self {
        Self {
            id: profile.id.to_string(),
            user_id: profile.user_id.to_string(),
            address: profile.address.clone(),
            phone_number: profile.phone_number.clone(),
            profile_picture: picture_url,
        }
    }
}

/// `{"data": ...}` wrapper used by the read endpoints.
#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}
