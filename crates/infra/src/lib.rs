//! Infrastructure layer: configuration, persistence, media storage.

pub mod config;
pub mod media;
pub mod repository;

pub use config::{AppConfig, ConfigError};
pub use media::{MediaError, MediaStore, StoredMedia};
pub use repository::{
    InMemoryStore, PostgresStore, ProfileRepository, RepositoryError, UserRepository,
};
