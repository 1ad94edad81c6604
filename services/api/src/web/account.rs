//! services/api/src/web/account.rs
//!
//! Account settings: profile, profile picture, data export and account deletion.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use lovecraft_core::ports::BlobStorage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::cookies::clear_session_cookie;
use crate::web::rest::{ProfileResponse, SurpriseResponse};
use crate::web::state::AppState;

const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;
const MAX_DISPLAY_NAME_CHARS: usize = 60;

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub display_name: String,
}

/// Everything the service stores about a user.
#[derive(Serialize, ToSchema)]
pub struct ExportResponse {
    pub exported_at: DateTime<Utc>,
    pub profile: ProfileResponse,
    pub surprises: Vec<SurpriseResponse>,
}

fn internal(what: &str) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to {}", what))
}

/// One avatar per user; a new upload of the same type overwrites the old file.
fn avatar_key(user_id: Uuid, content_type: &str) -> String {
    format!("profiles/{}/avatar.{}", user_id, extension_for(content_type))
}

/// The blob key behind a URL this service handed out, if it is one.
fn blob_key_of(blobs: &dyn BlobStorage, url: &str) -> Option<String> {
    url.strip_prefix(&blobs.public_url(""))
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "img",
    }
}

#[utoipa::path(
    get,
    path = "/account",
    responses(
        (status = 200, description = "The caller's profile", body = ProfileResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = state.accounts.get_user(user_id).await.map_err(|e| {
        error!("Failed to load profile {}: {:?}", user_id, e);
        internal("load profile")
    })?;
    Ok(Json(ProfileResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/account",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Blank or overlong display name")
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let display_name = req.display_name.trim();
    if display_name.is_empty() || display_name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Display name must be between 1 and {} characters",
                MAX_DISPLAY_NAME_CHARS
            ),
        ));
    }

    let user = state
        .accounts
        .update_display_name(user_id, display_name)
        .await
        .map_err(|e| {
            error!("Failed to update profile {}: {:?}", user_id, e);
            internal("update profile")
        })?;
    Ok(Json(ProfileResponse::from(user)))
}

/// Replace the profile picture.
///
/// Accepts a multipart/form-data request whose first part is an image.
#[utoipa::path(
    post,
    path = "/account/photo",
    request_body(content_type = "multipart/form-data", description = "The image to upload."),
    responses(
        (status = 200, description = "Profile with the new photo URL", body = ProfileResponse),
        (status = 400, description = "Missing part, not an image, or too large"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_photo_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read multipart data: {}", e),
            )
        })?
        .ok_or((
            StatusCode::BAD_REQUEST,
            "Multipart form must include an image".to_string(),
        ))?;

    let content_type = field
        .content_type()
        .map(str::to_string)
        .filter(|ct| ct.starts_with("image/"))
        .ok_or((
            StatusCode::BAD_REQUEST,
            "Uploaded file must be an image".to_string(),
        ))?;

    let data = field.bytes().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read file bytes: {}", e),
        )
    })?;
    if data.is_empty() || data.len() > MAX_PHOTO_BYTES {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Image must be between 1 byte and {} bytes", MAX_PHOTO_BYTES),
        ));
    }

    let previous_url = state
        .accounts
        .get_user(user_id)
        .await
        .ok()
        .and_then(|u| u.photo_url);

    let key = avatar_key(user_id, &content_type);
    state
        .blobs
        .upload(&key, &data, &content_type)
        .await
        .map_err(|e| {
            error!("Failed to store profile photo for {}: {:?}", user_id, e);
            internal("store photo")
        })?;

    let photo_url = state.blobs.public_url(&key);
    let user = state
        .accounts
        .update_photo_url(user_id, &photo_url)
        .await
        .map_err(|e| {
            error!("Failed to save photo URL for {}: {:?}", user_id, e);
            internal("update profile")
        })?;

    // A new image type lands under a new key; drop the one it replaces.
    let stale_key = previous_url
        .filter(|url| *url != photo_url)
        .and_then(|url| blob_key_of(state.blobs.as_ref(), &url));
    if let Some(stale_key) = stale_key {
        if let Err(e) = state.blobs.delete(&stale_key).await {
            warn!("Failed to remove old profile photo {}: {:?}", stale_key, e);
        }
    }

    Ok(Json(ProfileResponse::from(user)))
}

/// Download the profile and every owned surprise as JSON.
#[utoipa::path(
    get,
    path = "/account/export",
    responses(
        (status = 200, description = "Export document", body = ExportResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn export_account_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = state.accounts.get_user(user_id).await.map_err(|e| {
        error!("Failed to load profile {} for export: {:?}", user_id, e);
        internal("export account")
    })?;
    let surprises = state
        .surprises
        .list_surprises_by_user(user_id)
        .await
        .map_err(|e| {
            error!("Failed to load surprises of {} for export: {:?}", user_id, e);
            internal("export account")
        })?;

    let export = ExportResponse {
        exported_at: Utc::now(),
        profile: user.into(),
        surprises: surprises.into_iter().map(Into::into).collect(),
    };

    Ok((
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"lovecraft-export.json\"",
        )],
        Json(export),
    ))
}

/// Delete the account, its surprises and its sessions. There is no undo.
#[utoipa::path(
    delete,
    path = "/account",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_account_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let removed = state
        .surprises
        .delete_surprises_by_user(user_id)
        .await
        .map_err(|e| {
            error!("Failed to delete surprises of {}: {:?}", user_id, e);
            internal("delete account")
        })?;

    if let Err(e) = state.accounts.delete_user(user_id).await {
        warn!("Surprises of {} removed but user deletion failed", user_id);
        error!("Failed to delete user {}: {:?}", user_id, e);
        return Err(internal("delete account"));
    }

    info!("Deleted account {} and {} surprises", user_id, removed);
    Ok((
        StatusCode::NO_CONTENT,
        [(
            header::SET_COOKIE,
            clear_session_cookie(state.config.cookie_secure),
        )],
    ))
}
