//! Service wiring and the account use-cases the routes call into.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use userdesk_auth::{
    AccessToken, Argon2Hasher, AuthError, Hs256Jwt, Profile, User, UserFields, UserManager,
};
use userdesk_core::{DomainError, Email, UserId};
use userdesk_infra::{
    AppConfig, InMemoryStore, MediaError, MediaStore, PostgresStore, ProfileRepository,
    RepositoryError, UserRepository,
};

/// Any failure a use-case can surface to the HTTP layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Media(#[from] MediaError),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        Self::Auth(AuthError::Domain(value))
    }
}

/// Upload handed to [`AppServices::create_profile`].
#[derive(Debug, Clone)]
pub struct ProfileUpload {
    pub address: String,
    pub phone_number: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A persisted profile together with the public URL of its picture.
#[derive(Debug, Clone)]
pub struct CreatedProfile {
    pub profile: Profile,
    pub picture_url: String,
}

pub struct AppServices {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
    media: MediaStore,
    manager: UserManager,
    jwt: Arc<Hs256Jwt>,
}

impl AppServices {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        let media = MediaStore::new(config.media_root.clone(), config.base_url.clone());
        let jwt = Arc::new(Hs256Jwt::new(&config.jwt_secret, config.access_token_ttl()));
        Self {
            users,
            profiles,
            media,
            manager: UserManager::new(Arc::new(Argon2Hasher::new())),
            jwt,
        }
    }

    /// In-memory repositories (dev/test).
    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(config, store.clone(), store)
    }

    pub fn jwt(&self) -> Arc<Hs256Jwt> {
        self.jwt.clone()
    }

    /// Register a new active user and issue its first token.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: String,
    ) -> Result<(User, AccessToken), ServiceError> {
        let now = Utc::now();
        let user = self
            .manager
            .create_user(email, Some(full_name), password, UserFields::default(), now)?;
        let user = self.users.insert_user(user).await?;
        let token = self.jwt.issue(&user, now)?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok((user, token))
    }

    /// Verify credentials and issue a token.
    ///
    /// Every failure (malformed email, unknown user, bad password, inactive
    /// account) is reported as `InvalidCredentials`.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, AccessToken), ServiceError> {
        let email = Email::parse(username).map_err(|_| AuthError::InvalidCredentials)?;
        let Some(user) = self.users.find_user_by_email(&email).await? else {
            self.manager.check_password_for_missing_user(password);
            return Err(AuthError::InvalidCredentials.into());
        };

        if !self.manager.check_password(&user, password) {
            tracing::debug!(user_id = %user.id, "login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.jwt.issue(&user, Utc::now())?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok((user, token))
    }

    /// Resolve an authenticated user id to a live, active account.
    pub async fn current_user(&self, user_id: UserId) -> Result<User, ServiceError> {
        match self.users.get_user(user_id).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AuthError::InvalidToken("user no longer exists or is inactive".to_string()).into()),
        }
    }

    /// Store the uploaded picture, persist a profile pointing at it, and record
    /// the picture on the owning user.
    pub async fn create_profile(
        &self,
        user: &User,
        upload: ProfileUpload,
    ) -> Result<CreatedProfile, ServiceError> {
        let stored = self
            .media
            .save_profile_picture(&upload.filename, &upload.bytes)
            .await?;

        let now = Utc::now();
        let profile = Profile::new(
            user.id,
            upload.address,
            upload.phone_number,
            stored.filename.clone(),
            now,
        );
        let profile = self.profiles.insert_profile(profile).await?;

        let mut owner = user.clone();
        owner.profile_picture = Some(stored.filename);
        owner.touch(now);
        self.users.update_user(owner).await?;

        tracing::info!(user_id = %user.id, profile_id = %profile.id, "profile created");
        Ok(CreatedProfile {
            profile,
            picture_url: stored.url,
        })
    }

    /// Create and persist a superuser (operator CLI).
    pub async fn create_superuser(
        &self,
        email: &str,
        password: &str,
        extra: UserFields,
    ) -> Result<User, ServiceError> {
        let user = self
            .manager
            .create_superuser(email, password, extra, Utc::now())?;
        let user = self.users.insert_user(user).await?;

        tracing::info!(user_id = %user.id, "superuser created");
        Ok(user)
    }
}

/// Build services from configuration: Postgres when `DATABASE_URL` is set,
/// in-memory otherwise.
pub async fn build_services(config: AppConfig) -> Result<AppServices, ServiceError> {
    match config.database_url.clone() {
        Some(url) => {
            let store = Arc::new(PostgresStore::connect(&url).await?);
            tracing::info!("using postgres repositories");
            Ok(AppServices::new(config, store.clone(), store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory repositories");
            Ok(AppServices::in_memory(config))
        }
    }
}
