//! services/api/src/web/surprises.rs
//!
//! Authoring endpoints: create, list, read, edit, delete and share a surprise.
//! Every route here sits behind `require_auth` and only ever touches the caller's
//! own surprises. Someone else's surprise answers 404, the same as a missing one.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use lovecraft_core::domain::Surprise;
use lovecraft_core::ports::PortError;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::{SurpriseRequest, SurpriseResponse};
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct ShareResponse {
    pub id: String,
    /// The link to send to the recipient. Clients render it as a QR code too.
    pub url: String,
}

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Surprise not found".to_string())
}

/// Fetches a surprise the caller owns.
async fn load_owned(
    state: &AppState,
    user_id: Uuid,
    id: &str,
) -> Result<Surprise, (StatusCode, String)> {
    let surprise = state.surprises.get_surprise(id).await.map_err(|e| match e {
        PortError::NotFound(_) => not_found(),
        e => {
            error!("Failed to fetch surprise {}: {:?}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch surprise".to_string(),
            )
        }
    })?;

    if surprise.user_id != user_id {
        return Err(not_found());
    }
    Ok(surprise)
}

/// Create a surprise owned by the caller.
#[utoipa::path(
    post,
    path = "/surprises",
    request_body = SurpriseRequest,
    responses(
        (status = 201, description = "Surprise created", body = SurpriseResponse),
        (status = 400, description = "Missing names or message too long"),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_surprise_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<SurpriseRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let content = req.into_content();
    content
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let surprise = state
        .surprises
        .create_surprise(user_id, &content)
        .await
        .map_err(|e| {
            error!("Failed to create surprise: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create surprise".to_string(),
            )
        })?;

    info!("User {} created surprise {}", user_id, surprise.id);
    Ok((StatusCode::CREATED, Json(SurpriseResponse::from(surprise))))
}

/// List the caller's surprises, newest first.
#[utoipa::path(
    get,
    path = "/surprises",
    responses(
        (status = 200, description = "The caller's surprises", body = [SurpriseResponse]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_surprises_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let surprises = state
        .surprises
        .list_surprises_by_user(user_id)
        .await
        .map_err(|e| {
            error!("Failed to list surprises for {}: {:?}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list surprises".to_string(),
            )
        })?;

    let body: Vec<SurpriseResponse> = surprises.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/surprises/{id}",
    params(("id" = String, Path, description = "Surprise id")),
    responses(
        (status = 200, description = "The surprise", body = SurpriseResponse),
        (status = 404, description = "No such surprise for this user")
    )
)]
pub async fn get_surprise_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let surprise = load_owned(&state, user_id, &id).await?;
    Ok(Json(SurpriseResponse::from(surprise)))
}

/// Overwrite the editable fields. Counters are kept.
#[utoipa::path(
    put,
    path = "/surprises/{id}",
    params(("id" = String, Path, description = "Surprise id")),
    request_body = SurpriseRequest,
    responses(
        (status = 200, description = "Updated surprise", body = SurpriseResponse),
        (status = 400, description = "Missing names or message too long"),
        (status = 404, description = "No such surprise for this user")
    )
)]
pub async fn update_surprise_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<String>,
    Json(req): Json<SurpriseRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let content = req.into_content();
    content
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let mut surprise = load_owned(&state, user_id, &id).await?;
    state
        .surprises
        .update_surprise(&id, &content)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => not_found(),
            e => {
                error!("Failed to update surprise {}: {:?}", id, e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to update surprise".to_string(),
                )
            }
        })?;

    surprise.content = content;
    Ok(Json(SurpriseResponse::from(surprise)))
}

/// Delete a surprise permanently.
#[utoipa::path(
    delete,
    path = "/surprises/{id}",
    params(("id" = String, Path, description = "Surprise id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such surprise for this user")
    )
)]
pub async fn delete_surprise_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    load_owned(&state, user_id, &id).await?;
    state.surprises.delete_surprise(&id).await.map_err(|e| match e {
        PortError::NotFound(_) => not_found(),
        e => {
            error!("Failed to delete surprise {}: {:?}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete surprise".to_string(),
            )
        }
    })?;

    info!("User {} deleted surprise {}", user_id, id);
    Ok(StatusCode::NO_CONTENT)
}

/// The link a recipient opens to start the reveal.
#[utoipa::path(
    get,
    path = "/surprises/{id}/share",
    params(("id" = String, Path, description = "Surprise id")),
    responses(
        (status = 200, description = "Share link", body = ShareResponse),
        (status = 404, description = "No such surprise for this user")
    )
)]
pub async fn share_surprise_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let surprise = load_owned(&state, user_id, &id).await?;
    let url = format!(
        "{}/reveal?id={}",
        state.config.public_base_url, surprise.id
    );
    Ok(Json(ShareResponse {
        id: surprise.id,
        url,
    }))
}
