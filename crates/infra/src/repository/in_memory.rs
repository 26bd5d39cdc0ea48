use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use userdesk_auth::{Profile, User};
use userdesk_core::{Email, ProfileId, UserId};

use super::{ProfileRepository, RepositoryError, UserRepository};

/// In-memory user/profile store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    profiles: RwLock<HashMap<ProfileId, Profile>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Backend("in-memory store lock poisoned".to_string())
}

/// Uniqueness checks shared by insert and update. `skip` is the user being
/// updated, whose own values do not conflict with themselves.
fn check_unique(
    users: &HashMap<UserId, User>,
    candidate: &User,
    skip: Option<UserId>,
) -> Result<(), RepositoryError> {
    for other in users.values().filter(|u| Some(u.id) != skip) {
        if other.email == candidate.email {
            return Err(RepositoryError::Conflict(format!(
                "email {} already registered",
                candidate.email
            )));
        }
        if candidate.phone_number.is_some() && other.phone_number == candidate.phone_number {
            return Err(RepositoryError::Conflict("phone number already registered".to_string()));
        }
    }
    Ok(())
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if users.contains_key(&user.id) {
            return Err(RepositoryError::Conflict(format!("user {} already exists", user.id)));
        }
        check_unique(&users, &user, None)?;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().find(|u| &u.email == email).cloned())
    }

    async fn update_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if !users.contains_key(&user.id) {
            return Err(RepositoryError::NotFound(format!("user {}", user.id)));
        }
        check_unique(&users, &user, Some(user.id))?;
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn insert_profile(&self, profile: Profile) -> Result<Profile, RepositoryError> {
        // Lock order: users, then profiles.
        let users = self.users.read().map_err(|_| poisoned())?;
        if !users.contains_key(&profile.user_id) {
            return Err(RepositoryError::NotFound(format!("user {}", profile.user_id)));
        }

        let mut profiles = self.profiles.write().map_err(|_| poisoned())?;
        if profiles.contains_key(&profile.id) {
            return Err(RepositoryError::Conflict(format!("profile {} already exists", profile.id)));
        }
        profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user(email: &str) -> User {
        let mut user = User::new(
            UserId::new(),
            Email::parse(email).unwrap(),
            Some("Test".to_string()),
            "hash".to_string(),
            Utc::now(),
        );
        user.is_active = true;
        user
    }

    #[tokio::test]
    async fn insert_then_lookup_by_id_and_email() {
        let store = InMemoryStore::new();
        let alice = store.insert_user(user("alice@example.com")).await.unwrap();

        assert_eq!(store.get_user(alice.id).await.unwrap(), Some(alice.clone()));
        let by_email = store
            .find_user_by_email(&Email::parse("alice@EXAMPLE.com").unwrap())
            .await
            .unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(alice.id));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = InMemoryStore::new();
        store.insert_user(user("dup@example.com")).await.unwrap();

        let err = store.insert_user(user("dup@example.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn duplicate_phone_conflicts_but_missing_phones_do_not() {
        let store = InMemoryStore::new();
        store.insert_user(user("a@example.com")).await.unwrap();
        store.insert_user(user("b@example.com")).await.unwrap();

        let mut c = user("c@example.com");
        c.phone_number = Some("+15550100".to_string());
        store.insert_user(c).await.unwrap();

        let mut d = user("d@example.com");
        d.phone_number = Some("+15550100".to_string());
        assert!(matches!(
            store.insert_user(d).await.unwrap_err(),
            RepositoryError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn update_requires_existing_user() {
        let store = InMemoryStore::new();
        let err = store.update_user(user("ghost@example.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));

        let mut alice = store.insert_user(user("alice@example.com")).await.unwrap();
        alice.verified = true;
        store.update_user(alice.clone()).await.unwrap();
        assert!(store.get_user(alice.id).await.unwrap().unwrap().verified);
    }

    #[tokio::test]
    async fn profile_requires_existing_owner() {
        let store = InMemoryStore::new();
        let orphan = Profile::new(
            UserId::new(),
            "1 Main St".to_string(),
            "555".to_string(),
            "me.png".to_string(),
            Utc::now(),
        );
        assert!(matches!(
            store.insert_profile(orphan).await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn a_user_may_own_several_profiles() {
        let store = InMemoryStore::new();
        let alice = store.insert_user(user("alice@example.com")).await.unwrap();

        let profile = |pic: &str| {
            Profile::new(alice.id, "addr".to_string(), "555".to_string(), pic.to_string(), Utc::now())
        };
        let first = store.insert_profile(profile("a1.png")).await.unwrap();
        store.insert_profile(profile("a2.png")).await.unwrap();

        assert!(matches!(
            store.insert_profile(first).await.unwrap_err(),
            RepositoryError::Conflict(_)
        ));
    }
}
