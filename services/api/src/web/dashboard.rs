//! services/api/src/web/dashboard.rs
//!
//! The author's dashboard: counters across all their surprises and the badges
//! those counters unlock.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use lovecraft_core::dashboard::{Badge, DashboardStats};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::SurpriseResponse;
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_surprises: u64,
    pub total_views: u64,
    pub total_completed_views: u64,
    pub completion_rate_percent: u64,
}

impl From<DashboardStats> for StatsResponse {
    fn from(s: DashboardStats) -> Self {
        Self {
            total_surprises: s.total_surprises,
            total_views: s.total_views,
            total_completed_views: s.total_completed_views,
            completion_rate_percent: s.completion_rate_percent,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct BadgeResponse {
    pub code: String,
    pub description: String,
}

impl From<Badge> for BadgeResponse {
    fn from(b: Badge) -> Self {
        Self {
            code: b.code().to_string(),
            description: b.description().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    pub stats: StatsResponse,
    pub badges: Vec<BadgeResponse>,
    pub surprises: Vec<SurpriseResponse>,
}

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Stats, badges and surprises", body = DashboardResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let surprises = state
        .surprises
        .list_surprises_by_user(user_id)
        .await
        .map_err(|e| {
            error!("Failed to load dashboard for {}: {:?}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load dashboard".to_string(),
            )
        })?;

    let stats = DashboardStats::from_surprises(&surprises);
    let badges = Badge::unlocked(&stats).into_iter().map(Into::into).collect();

    Ok(Json(DashboardResponse {
        stats: stats.into(),
        badges,
        surprises: surprises.into_iter().map(Into::into).collect(),
    }))
}
