//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the recipient's browser and the
//! API server for the reveal flow.

use lovecraft_core::reveal::RevealView;
use lovecraft_core::theme::ThemeStyle;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================
// NOTE: The surprise to reveal is chosen during the upgrade request, not here.
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The recipient's answer to "who are you?".
    SubmitName { name: String },

    /// The recipient's answer to the author's quiz question.
    SubmitAnswer { answer: String },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Replaces whatever the client is showing with this view.
    Render { view: ViewPayload },

    /// The client sent something the current step cannot handle.
    Error { message: String },
}

impl ServerMessage {
    pub fn render(view: RevealView) -> Self {
        ServerMessage::Render { view: view.into() }
    }
}

/// Presentation details of a theme, as sent to clients.
#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
pub struct ThemePayload {
    pub name: String,
    pub label: String,
    pub emoji: String,
    pub primary_color: String,
    pub background: String,
}

impl From<ThemeStyle> for ThemePayload {
    fn from(style: ThemeStyle) -> Self {
        Self {
            name: style.name.to_string(),
            label: style.label.to_string(),
            emoji: style.emoji.to_string(),
            primary_color: style.primary_color.to_string(),
            background: style.background.to_string(),
        }
    }
}

/// One step of the reveal, ready to be drawn.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ViewPayload {
    IdentityCheck {
        theme: ThemePayload,
        error: Option<String>,
    },
    Quiz {
        theme: ThemePayload,
        recipient: String,
        question: Option<String>,
        hint: Option<String>,
    },
    Revealed {
        theme: ThemePayload,
        sender: String,
        recipient: String,
        message: String,
    },
    NotFound,
}

impl From<RevealView> for ViewPayload {
    fn from(view: RevealView) -> Self {
        match view {
            RevealView::IdentityCheck { theme, error } => ViewPayload::IdentityCheck {
                theme: theme.into(),
                error,
            },
            RevealView::Quiz {
                theme,
                recipient,
                question,
                hint,
            } => ViewPayload::Quiz {
                theme: theme.into(),
                recipient,
                question,
                hint,
            },
            RevealView::Revealed {
                theme,
                sender,
                recipient,
                message,
            } => ViewPayload::Revealed {
                theme: theme.into(),
                sender,
                recipient,
                message,
            },
            RevealView::NotFound => ViewPayload::NotFound,
        }
    }
}
