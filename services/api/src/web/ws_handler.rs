//! services/api/src/web/ws_handler.rs
//!
//! This is the entry point and control loop for a reveal WebSocket connection.
//! Each connection owns one `RevealController`; closing the socket (or reloading
//! the page) throws its progress away.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::{header, HeaderMap},
    response::Response,
};
use lovecraft_core::reveal::{resolve_surprise_id, RevealController, RevealStep};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::web::{
    cookies::{clear_last_surprise_cookie, last_surprise_cookie, read_cookie, LAST_SURPRISE_COOKIE},
    protocol::{ClientMessage, ServerMessage},
    state::AppState,
};

#[derive(Deserialize, Debug, Default)]
pub struct RevealParams {
    pub id: Option<String>,
}

/// The handler for upgrading reveal requests to WebSocket connections.
///
/// The surprise is loaded before the upgrade so the handshake can remember it
/// in the `last_surprise` cookie, or forget a remembered one that is gone.
pub async fn reveal_ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<RevealParams>,
    headers: HeaderMap,
) -> Response {
    let persisted = read_cookie(&headers, LAST_SURPRISE_COOKIE);
    let target = resolve_surprise_id(persisted, params.id.as_deref()).map(str::to_string);

    let reveal = RevealController::load(app_state.surprises.clone(), target.as_deref()).await;
    let found = reveal.step() != RevealStep::NotFound;

    let mut response = ws.on_upgrade(move |socket| handle_socket(socket, reveal));

    let secure = app_state.config.cookie_secure;
    let cookie = match target {
        Some(id) if found => last_surprise_cookie(&id, secure),
        _ if persisted.is_some() => Some(clear_last_surprise_cookie(secure)),
        _ => None,
    };
    if let Some(cookie) = cookie {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

async fn handle_socket(mut socket: WebSocket, mut reveal: RevealController) {
    info!("Reveal connection opened at step {}", reveal.step());

    if send(&mut socket, &ServerMessage::render(reveal.view()))
        .await
        .is_err()
    {
        return;
    }

    while !reveal.is_terminal() {
        let text = match socket.recv().await {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(_))) | None => {
                debug!("Recipient left at step {}", reveal.step());
                return;
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                warn!("Reveal socket error: {:?}", e);
                return;
            }
        };

        let reply = apply_client_message(&mut reveal, text.as_str());
        if send(&mut socket, &reply).await.is_err() {
            return;
        }
    }

    info!("Reveal finished at step {}", reveal.step());
    let _ = socket.send(Message::Close(None)).await;
}

/// Feeds one client message into the controller and returns what to send back.
pub fn apply_client_message(reveal: &mut RevealController, text: &str) -> ServerMessage {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            debug!("Unreadable reveal message: {}", e);
            return ServerMessage::Error {
                message: "Unrecognized message".to_string(),
            };
        }
    };

    let outcome = match message {
        ClientMessage::SubmitName { name } => reveal.submit_name(&name),
        ClientMessage::SubmitAnswer { answer } => reveal.submit_answer(&answer),
    };

    match outcome {
        Ok(_) => ServerMessage::render(reveal.view()),
        Err(e) => ServerMessage::Error {
            message: e.to_string(),
        },
    }
}

async fn send(socket: &mut WebSocket, message: &ServerMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await.map_err(|e| {
        warn!("Failed to send reveal message: {:?}", e);
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::web::protocol::ViewPayload;
    use lovecraft_core::domain::SurpriseContent;
    use lovecraft_core::ports::SurpriseStore;
    use lovecraft_core::theme::Theme;
    use uuid::Uuid;

    async fn loaded_reveal() -> RevealController {
        let store = Arc::new(InMemoryStore::new());
        let surprise = store
            .create_surprise(
                Uuid::new_v4(),
                &SurpriseContent {
                    recipient: "Eve".to_string(),
                    sender: "Max".to_string(),
                    question: Some("Qui t'aime ?".to_string()),
                    answer: Some("Max".to_string()),
                    final_message: "Je t'aime".to_string(),
                    theme: Theme::Romantique,
                },
            )
            .await
            .unwrap();
        RevealController::load(store, Some(surprise.id.as_str())).await
    }

    #[tokio::test]
    async fn messages_walk_the_flow() {
        let mut reveal = loaded_reveal().await;

        let reply = apply_client_message(&mut reveal, r#"{"type":"submit_name","name":"Bob"}"#);
        match reply {
            ServerMessage::Render {
                view: ViewPayload::IdentityCheck { error: Some(e), .. },
            } => assert!(e.contains("Eve")),
            other => panic!("unexpected reply {:?}", other),
        }

        let reply = apply_client_message(&mut reveal, r#"{"type":"submit_name","name":"eve"}"#);
        assert!(matches!(
            reply,
            ServerMessage::Render {
                view: ViewPayload::Quiz { .. }
            }
        ));

        let reply =
            apply_client_message(&mut reveal, r#"{"type":"submit_answer","answer":"maxime"}"#);
        match reply {
            ServerMessage::Render {
                view: ViewPayload::Revealed {
                    sender, message, ..
                },
            } => {
                assert_eq!(sender, "Max");
                assert_eq!(message, "Je t'aime");
            }
            other => panic!("unexpected reply {:?}", other),
        }
        assert!(reveal.is_terminal());
    }

    #[tokio::test]
    async fn out_of_order_and_garbage_messages_are_errors() {
        let mut reveal = loaded_reveal().await;

        let reply =
            apply_client_message(&mut reveal, r#"{"type":"submit_answer","answer":"Max"}"#);
        assert!(matches!(reply, ServerMessage::Error { .. }));

        let reply = apply_client_message(&mut reveal, "not json");
        assert_eq!(
            reply,
            ServerMessage::Error {
                message: "Unrecognized message".to_string()
            }
        );
        assert_eq!(reveal.step(), RevealStep::IdentityCheck);
    }
}
