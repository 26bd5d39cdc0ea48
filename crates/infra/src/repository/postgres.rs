//! Postgres-backed user/profile store.
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | RepositoryError | Scenario |
//! |-----------------------|-----------------|----------|
//! | `23505` | `Conflict` | email / phone number / id already taken |
//! | `23503` | `NotFound` | profile references a missing user |
//! | any other, pool closed, network | `Backend` | infrastructure failure |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;

use userdesk_auth::{Profile, User};
use userdesk_core::{Email, UserId};

use super::{ProfileRepository, RepositoryError, UserRepository};

/// Idempotent schema bootstrap, one statement per entry.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id              UUID PRIMARY KEY,
        email           VARCHAR(255) NOT NULL UNIQUE,
        full_name       VARCHAR(255),
        phone_number    VARCHAR(20) UNIQUE,
        profile_picture VARCHAR(255),
        password_hash   TEXT NOT NULL,
        verified        BOOLEAN NOT NULL DEFAULT FALSE,
        is_staff        BOOLEAN NOT NULL DEFAULT FALSE,
        is_active       BOOLEAN NOT NULL DEFAULT FALSE,
        is_superuser    BOOLEAN NOT NULL DEFAULT FALSE,
        created_at      TIMESTAMPTZ NOT NULL,
        updated_at      TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        id              UUID PRIMARY KEY,
        user_id         UUID NOT NULL REFERENCES users (id),
        address         TEXT NOT NULL,
        phone_number    TEXT NOT NULL,
        profile_picture TEXT NOT NULL,
        created_at      TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS profiles_user_id_idx ON profiles (user_id)",
];

const USER_COLUMNS: &str = "id, email, full_name, phone_number, profile_picture, password_hash, \
     verified, is_staff, is_active, is_superuser, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the tables exist.
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, full_name, phone_number, profile_picture, password_hash,
                verified, is_staff, is_active, is_superuser, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.email.as_str())
        .bind(&user.full_name)
        .bind(&user.phone_number)
        .bind(&user.profile_picture)
        .bind(&user.password_hash)
        .bind(user.verified)
        .bind(user.is_staff)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_user", e))?;

        row.map(User::try_from).transpose()
    }

    #[instrument(skip(self, email), err)]
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.map(User::try_from).transpose()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn update_user(&self, user: User) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = $2,
                full_name = $3,
                phone_number = $4,
                profile_picture = $5,
                password_hash = $6,
                verified = $7,
                is_staff = $8,
                is_active = $9,
                is_superuser = $10,
                updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.email.as_str())
        .bind(&user.full_name)
        .bind(&user.phone_number)
        .bind(&user.profile_picture)
        .bind(&user.password_hash)
        .bind(user.verified)
        .bind(user.is_staff)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("user {}", user.id)));
        }
        Ok(user)
    }
}

#[async_trait]
impl ProfileRepository for PostgresStore {
    #[instrument(skip(self, profile), fields(profile_id = %profile.id, user_id = %profile.user_id), err)]
    async fn insert_profile(&self, profile: Profile) -> Result<Profile, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, user_id, address, phone_number, profile_picture, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(profile.id.as_uuid())
        .bind(profile.user_id.as_uuid())
        .bind(&profile.address)
        .bind(&profile.phone_number)
        .bind(&profile.profile_picture)
        .bind(profile.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_profile", e))?;

        Ok(profile)
    }
}

/// Map SQLx errors into `RepositoryError` by SQLSTATE.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => RepositoryError::Conflict(msg),
                Some("23503") => RepositoryError::NotFound(msg),
                _ => RepositoryError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => RepositoryError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct UserRow {
    id: uuid::Uuid,
    email: String,
    full_name: Option<String>,
    phone_number: Option<String>,
    profile_picture: Option<String>,
    password_hash: String,
    verified: bool,
    is_staff: bool,
    is_active: bool,
    is_superuser: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            full_name: row.try_get("full_name")?,
            phone_number: row.try_get("phone_number")?,
            profile_picture: row.try_get("profile_picture")?,
            password_hash: row.try_get("password_hash")?,
            verified: row.try_get("verified")?,
            is_staff: row.try_get("is_staff")?,
            is_active: row.try_get("is_active")?,
            is_superuser: row.try_get("is_superuser")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email)
            .map_err(|e| RepositoryError::Backend(format!("stored email for user {}: {e}", row.id)))?;
        Ok(User {
            id: UserId::from_uuid(row.id),
            email,
            full_name: row.full_name,
            phone_number: row.phone_number,
            profile_picture: row.profile_picture,
            password_hash: row.password_hash,
            verified: row.verified,
            is_staff: row.is_staff,
            is_active: row.is_active,
            is_superuser: row.is_superuser,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
