//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the storage ports. It backs the service when
//! no `DATABASE_URL` is configured and gives the tests a store without PostgreSQL.
//! Nothing survives a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lovecraft_core::domain::{AuthSession, Surprise, SurpriseContent, User, UserCredentials};
use lovecraft_core::ports::{AccountStore, PortError, PortResult, SurpriseStore};
use tokio::sync::RwLock;
use uuid::Uuid;

struct StoredUser {
    profile: User,
    hashed_password: String,
}

#[derive(Default)]
struct Tables {
    surprises: HashMap<String, Surprise>,
    users: HashMap<Uuid, StoredUser>,
    auth_sessions: HashMap<String, AuthSession>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn surprise_not_found(id: &str) -> PortError {
    PortError::NotFound(format!("Surprise {} not found", id))
}

fn user_not_found(user_id: Uuid) -> PortError {
    PortError::NotFound(format!("User {} not found", user_id))
}

//=========================================================================================
// `SurpriseStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SurpriseStore for InMemoryStore {
    async fn get_surprise(&self, id: &str) -> PortResult<Surprise> {
        self.tables
            .read()
            .await
            .surprises
            .get(id)
            .cloned()
            .ok_or_else(|| surprise_not_found(id))
    }

    async fn create_surprise(
        &self,
        user_id: Uuid,
        content: &SurpriseContent,
    ) -> PortResult<Surprise> {
        let surprise = Surprise {
            id: Uuid::new_v4().to_string(),
            user_id,
            content: content.clone(),
            views: 0,
            completed_views: 0,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .surprises
            .insert(surprise.id.clone(), surprise.clone());
        Ok(surprise)
    }

    async fn update_surprise(&self, id: &str, content: &SurpriseContent) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let surprise = tables
            .surprises
            .get_mut(id)
            .ok_or_else(|| surprise_not_found(id))?;
        surprise.content = content.clone();
        Ok(())
    }

    async fn delete_surprise(&self, id: &str) -> PortResult<()> {
        self.tables
            .write()
            .await
            .surprises
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| surprise_not_found(id))
    }

    async fn list_surprises_by_user(&self, user_id: Uuid) -> PortResult<Vec<Surprise>> {
        let tables = self.tables.read().await;
        let mut owned: Vec<Surprise> = tables
            .surprises
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn delete_surprises_by_user(&self, user_id: Uuid) -> PortResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.surprises.len();
        tables.surprises.retain(|_, s| s.user_id != user_id);
        Ok((before - tables.surprises.len()) as u64)
    }

    async fn increment_views(&self, id: &str) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let surprise = tables
            .surprises
            .get_mut(id)
            .ok_or_else(|| surprise_not_found(id))?;
        surprise.views += 1;
        Ok(())
    }
}

//=========================================================================================
// `AccountStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        display_name: Option<&str>,
    ) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .users
            .values()
            .any(|u| u.profile.email.as_deref() == Some(email));
        if taken {
            return Err(PortError::Conflict(format!(
                "Email {} is already registered",
                email
            )));
        }

        let profile = User {
            user_id: Uuid::new_v4(),
            email: Some(email.to_string()),
            display_name: display_name.map(str::to_string),
            photo_url: None,
            created_at: Utc::now(),
        };
        tables.users.insert(
            profile.user_id,
            StoredUser {
                profile: profile.clone(),
                hashed_password: hashed_password.to_string(),
            },
        );
        Ok(profile)
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        self.tables
            .read()
            .await
            .users
            .get(&user_id)
            .map(|u| u.profile.clone())
            .ok_or_else(|| user_not_found(user_id))
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.profile.email.as_deref() == Some(email))
            .map(|u| UserCredentials {
                user_id: u.profile.user_id,
                email: email.to_string(),
                hashed_password: u.hashed_password.clone(),
            })
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn update_display_name(&self, user_id: Uuid, display_name: &str) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        user.profile.display_name = Some(display_name.to_string());
        Ok(user.profile.clone())
    }

    async fn update_photo_url(&self, user_id: Uuid, photo_url: &str) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        user.profile.photo_url = Some(photo_url.to_string());
        Ok(user.profile.clone())
    }

    async fn delete_user(&self, user_id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .users
            .remove(&user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        tables.auth_sessions.retain(|_, s| s.user_id != user_id);
        tables.surprises.retain(|_, s| s.user_id != user_id);
        Ok(())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let session = AuthSession {
            id: session_id.to_string(),
            user_id,
            expires_at,
        };
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        tables.auth_sessions.retain(|_, s| s.expires_at > now);
        tables.auth_sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        self.tables
            .read()
            .await
            .auth_sessions
            .get(session_id)
            .filter(|s| s.expires_at > Utc::now())
            .map(|s| s.user_id)
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.tables.write().await.auth_sessions.remove(session_id);
        Ok(())
    }
}
