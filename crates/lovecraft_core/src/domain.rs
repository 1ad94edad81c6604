//! crates/lovecraft_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::theme::Theme;

/// Upper bound on the length of a surprise's final message, in characters.
pub const MAX_FINAL_MESSAGE_CHARS: usize = 500;

/// The author-editable part of a surprise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurpriseContent {
    /// Recipient display name. Doubles as the identity-check secret.
    pub recipient: String,
    pub sender: String,
    pub question: Option<String>,
    /// Expected answer fragment. `None` or blank means any answer is accepted.
    pub answer: Option<String>,
    pub final_message: String,
    pub theme: Theme,
}

/// Reasons a `SurpriseContent` is rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("The recipient name is required")]
    MissingRecipient,
    #[error("The sender name is required")]
    MissingSender,
    #[error("The final message is required")]
    MissingMessage,
    #[error("The final message is {0} characters long, the limit is {}", MAX_FINAL_MESSAGE_CHARS)]
    MessageTooLong(usize),
}

impl SurpriseContent {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.recipient.trim().is_empty() {
            return Err(ValidationError::MissingRecipient);
        }
        if self.sender.trim().is_empty() {
            return Err(ValidationError::MissingSender);
        }
        if self.final_message.trim().is_empty() {
            return Err(ValidationError::MissingMessage);
        }
        let len = self.final_message.chars().count();
        if len > MAX_FINAL_MESSAGE_CHARS {
            return Err(ValidationError::MessageTooLong(len));
        }
        Ok(())
    }

    /// The quiz answer, with blank values folded into `None`.
    pub fn expected_answer(&self) -> Option<&str> {
        self.answer
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

/// A persisted surprise: one personalized reveal owned by a user.
#[derive(Debug, Clone)]
pub struct Surprise {
    pub id: String,
    pub user_id: Uuid,
    pub content: SurpriseContent,
    pub views: u64,
    pub completed_views: u64,
    pub created_at: DateTime<Utc>,
}

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}
