//! services/api/src/web/rest.rs
//!
//! Contains the master definition for the OpenAPI specification, the JSON
//! payloads shared by the REST handlers, and the theme catalog endpoint.

use axum::response::{IntoResponse, Json};
use chrono::{DateTime, Utc};
use lovecraft_core::domain::{Surprise, SurpriseContent, User};
use lovecraft_core::theme::Theme;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::protocol::ThemePayload;
use crate::web::{account, auth, dashboard, surprises};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::demo_login_handler,
        auth::logout_handler,
        list_themes_handler,
        surprises::create_surprise_handler,
        surprises::list_surprises_handler,
        surprises::get_surprise_handler,
        surprises::update_surprise_handler,
        surprises::delete_surprise_handler,
        surprises::share_surprise_handler,
        dashboard::dashboard_handler,
        account::get_profile_handler,
        account::update_profile_handler,
        account::upload_photo_handler,
        account::export_account_handler,
        account::delete_account_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            SurpriseRequest,
            SurpriseResponse,
            ProfileResponse,
            ThemePayload,
            surprises::ShareResponse,
            dashboard::DashboardResponse,
            dashboard::StatsResponse,
            dashboard::BadgeResponse,
            account::UpdateProfileRequest,
            account::ExportResponse,
        )
    ),
    tags(
        (name = "LoveCraft API", description = "Create, share and reveal personalized surprises.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The editable fields of a surprise, as sent by its author.
#[derive(Deserialize, ToSchema)]
pub struct SurpriseRequest {
    pub recipient: String,
    pub sender: String,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub final_message: String,
    /// One of `romantique`, `geek`, `fun`, `classique`. Anything else uses the default.
    pub theme: Option<String>,
}

impl SurpriseRequest {
    pub fn into_content(self) -> SurpriseContent {
        SurpriseContent {
            recipient: self.recipient.trim().to_string(),
            sender: self.sender.trim().to_string(),
            question: self.question,
            answer: self.answer,
            final_message: self.final_message,
            theme: Theme::from_name(self.theme.as_deref().unwrap_or_default()),
        }
    }
}

/// A surprise as shown to its owner.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SurpriseResponse {
    pub id: String,
    pub user_id: Uuid,
    pub recipient: String,
    pub sender: String,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub final_message: String,
    pub theme: String,
    pub views: u64,
    pub completed_views: u64,
    pub created_at: DateTime<Utc>,
}

impl From<Surprise> for SurpriseResponse {
    fn from(s: Surprise) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            recipient: s.content.recipient,
            sender: s.content.sender,
            question: s.content.question,
            answer: s.content.answer,
            final_message: s.content.final_message,
            theme: s.content.theme.as_str().to_string(),
            views: s.views,
            completed_views: s.completed_views,
            created_at: s.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(u: User) -> Self {
        Self {
            user_id: u.user_id,
            email: u.email,
            display_name: u.display_name,
            photo_url: u.photo_url,
            created_at: u.created_at,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List the themes a surprise can use.
#[utoipa::path(
    get,
    path = "/themes",
    responses(
        (status = 200, description = "The theme catalog", body = [ThemePayload])
    )
)]
pub async fn list_themes_handler() -> impl IntoResponse {
    let catalog: Vec<ThemePayload> = Theme::ALL.into_iter().map(|t| t.style().into()).collect();
    Json(catalog)
}
