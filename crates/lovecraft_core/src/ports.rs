//! crates/lovecraft_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the document store, the account backend and blob storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Surprise, SurpriseContent, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness rule rejected the write, e.g. an email that is already registered.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The document store holding surprises. No transactions are assumed.
#[async_trait]
pub trait SurpriseStore: Send + Sync {
    async fn get_surprise(&self, id: &str) -> PortResult<Surprise>;

    /// Persists a new surprise with both counters at zero. The store assigns the id.
    async fn create_surprise(&self, user_id: Uuid, content: &SurpriseContent)
        -> PortResult<Surprise>;

    /// Overwrites the editable fields. Counters, owner and creation time are untouched.
    async fn update_surprise(&self, id: &str, content: &SurpriseContent) -> PortResult<()>;

    async fn delete_surprise(&self, id: &str) -> PortResult<()>;

    /// All surprises owned by `user_id`, newest first.
    async fn list_surprises_by_user(&self, user_id: Uuid) -> PortResult<Vec<Surprise>>;

    /// Returns how many surprises were removed.
    async fn delete_surprises_by_user(&self, user_id: Uuid) -> PortResult<u64>;

    async fn increment_views(&self, id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    // --- Users ---
    /// Fails with `PortError::Conflict` when the email is already registered.
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        display_name: Option<&str>,
    ) -> PortResult<User>;

    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn update_display_name(&self, user_id: Uuid, display_name: &str) -> PortResult<User>;

    async fn update_photo_url(&self, user_id: Uuid, photo_url: &str) -> PortResult<User>;

    /// Removes the user and every auth session belonging to them.
    async fn delete_user(&self, user_id: Uuid) -> PortResult<()>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves an unexpired session to its user.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Stores `bytes` under `key`, replacing any previous object.
    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> PortResult<()>;

    /// Removes the object stored under `key`. A missing object is not an error.
    async fn delete(&self, key: &str) -> PortResult<()>;

    /// The publicly reachable URL of the object stored under `key`.
    fn public_url(&self, key: &str) -> String;
}
