//! Per-user profile record (address, contact, picture).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use userdesk_core::{Entity, ProfileId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    /// Owning user; must reference an existing user.
    pub user_id: UserId,
    pub address: String,
    pub phone_number: String,
    /// Stored filename of the picture (not the public URL).
    pub profile_picture: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(
        user_id: UserId,
        address: String,
        phone_number: String,
        profile_picture: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProfileId::new(),
            user_id,
            address,
            phone_number,
            profile_picture,
            created_at: now,
        }
    }
}

impl Entity for Profile {
    type Id = ProfileId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
