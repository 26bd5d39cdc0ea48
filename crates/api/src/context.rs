use userdesk_auth::AccessClaims;
use userdesk_core::UserId;

/// Authenticated identity for a request, derived from a validated bearer token.
///
/// Inserted into request extensions by [`crate::middleware::auth_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    user_id: UserId,
}

impl AuthContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl From<AccessClaims> for AuthContext {
    fn from(claims: AccessClaims) -> Self {
        Self::new(claims.id)
    }
}
