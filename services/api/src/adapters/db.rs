//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `SurpriseStore` and `AccountStore` ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lovecraft_core::domain::{Surprise, SurpriseContent, User, UserCredentials};
use lovecraft_core::ports::{AccountStore, PortError, PortResult, SurpriseStore};
use lovecraft_core::theme::Theme;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// PostgreSQL's SQLSTATE for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|d| d.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

fn not_found_or_unexpected(e: sqlx::Error, what: String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const SURPRISE_COLUMNS: &str = "id, user_id, pour_qui, de_la_part_de, question1, reponse1, \
     message_final, theme, views, completed_views, created_at";

const USER_COLUMNS: &str = "user_id, email, display_name, photo_url, created_at";

#[derive(FromRow)]
struct SurpriseRecord {
    id: String,
    user_id: Uuid,
    pour_qui: String,
    de_la_part_de: String,
    question1: Option<String>,
    reponse1: Option<String>,
    message_final: String,
    theme: String,
    views: i64,
    completed_views: i64,
    created_at: DateTime<Utc>,
}
impl SurpriseRecord {
    fn to_domain(self) -> Surprise {
        Surprise {
            id: self.id,
            user_id: self.user_id,
            content: SurpriseContent {
                recipient: self.pour_qui,
                sender: self.de_la_part_de,
                question: self.question1,
                answer: self.reponse1,
                final_message: self.message_final,
                theme: Theme::from_name(&self.theme),
            },
            views: u64::try_from(self.views).unwrap_or(0),
            completed_views: u64::try_from(self.completed_views).unwrap_or(0),
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
    display_name: Option<String>,
    photo_url: Option<String>,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: Some(self.email),
            display_name: self.display_name,
            photo_url: self.photo_url,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

//=========================================================================================
// `SurpriseStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SurpriseStore for DbAdapter {
    async fn get_surprise(&self, id: &str) -> PortResult<Surprise> {
        let record = sqlx::query_as::<_, SurpriseRecord>(&format!(
            "SELECT {SURPRISE_COLUMNS} FROM surprises WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("Surprise {} not found", id)))?;
        Ok(record.to_domain())
    }

    async fn create_surprise(
        &self,
        user_id: Uuid,
        content: &SurpriseContent,
    ) -> PortResult<Surprise> {
        let record = sqlx::query_as::<_, SurpriseRecord>(&format!(
            "INSERT INTO surprises (id, user_id, pour_qui, de_la_part_de, question1, reponse1, message_final, theme) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {SURPRISE_COLUMNS}"
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(&content.recipient)
        .bind(&content.sender)
        .bind(&content.question)
        .bind(&content.answer)
        .bind(&content.final_message)
        .bind(content.theme.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn update_surprise(&self, id: &str, content: &SurpriseContent) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE surprises SET pour_qui = $1, de_la_part_de = $2, question1 = $3, reponse1 = $4, \
             message_final = $5, theme = $6 WHERE id = $7",
        )
        .bind(&content.recipient)
        .bind(&content.sender)
        .bind(&content.question)
        .bind(&content.answer)
        .bind(&content.final_message)
        .bind(content.theme.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Surprise {} not found", id)));
        }
        Ok(())
    }

    async fn delete_surprise(&self, id: &str) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM surprises WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Surprise {} not found", id)));
        }
        Ok(())
    }

    async fn list_surprises_by_user(&self, user_id: Uuid) -> PortResult<Vec<Surprise>> {
        let records = sqlx::query_as::<_, SurpriseRecord>(&format!(
            "SELECT {SURPRISE_COLUMNS} FROM surprises WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_surprises_by_user(&self, user_id: Uuid) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM surprises WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn increment_views(&self, id: &str) -> PortResult<()> {
        let result = sqlx::query("UPDATE surprises SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Surprise {} not found", id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `AccountStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AccountStore for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        display_name: Option<&str>,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (user_id, email, hashed_password, display_name) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Conflict(format!("Email {} is already registered", email))
            } else {
                unexpected(e)
            }
        })?;
        Ok(record.to_domain())
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", email)))?;
        Ok(record.to_domain())
    }

    async fn update_display_name(&self, user_id: Uuid, display_name: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET display_name = $1 WHERE user_id = $2 RETURNING {USER_COLUMNS}"
        ))
        .bind(display_name)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn update_photo_url(&self, user_id: Uuid, photo_url: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET photo_url = $1 WHERE user_id = $2 RETURNING {USER_COLUMNS}"
        ))
        .bind(photo_url)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn delete_user(&self, user_id: Uuid) -> PortResult<()> {
        // auth_sessions and surprises follow through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let pruned = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?
            .rows_affected();
        if pruned > 0 {
            debug!("Pruned {} expired auth sessions", pruned);
        }

        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Uuid = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)?;
        Ok(user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
