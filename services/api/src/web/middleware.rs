//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use lovecraft_core::ports::PortError;
use tracing::{debug, error};

use crate::web::cookies::{read_cookie, SESSION_COOKIE};
use crate::web::state::AppState;

/// Middleware that validates the auth session cookie and extracts the user_id.
///
/// If valid, inserts the user_id into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized. A failing session store is a 500.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_session_id =
        read_cookie(req.headers(), SESSION_COOKIE).ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = state
        .accounts
        .validate_auth_session(auth_session_id)
        .await
        .map_err(|e| match e {
            PortError::Unauthorized | PortError::NotFound(_) => {
                debug!("Rejected auth session: {:?}", e);
                StatusCode::UNAUTHORIZED
            }
            e => {
                error!("Failed to validate auth session: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    req.extensions_mut().insert(user_id);

    Ok(next.run(req).await)
}
