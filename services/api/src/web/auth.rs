//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for signup, login, logout and the shared demo account.

use std::sync::{Arc, LazyLock};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use lovecraft_core::ports::{AccountStore, PortError, PortResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::DemoAccount;
use crate::web::cookies::{clear_session_cookie, read_cookie, session_cookie, SESSION_COOKIE};
use crate::web::state::AppState;

const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
}

//=========================================================================================
// Helpers
//=========================================================================================

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates the demo user unless it already exists, returning its id.
pub async fn ensure_demo_account(
    accounts: &dyn AccountStore,
    demo: &DemoAccount,
) -> PortResult<Uuid> {
    let email = normalize_email(&demo.email);
    match accounts.get_user_by_email(&email).await {
        Ok(existing) => Ok(existing.user_id),
        Err(PortError::NotFound(_)) => {
            let hashed =
                hash_password(&demo.password).map_err(|e| PortError::Unexpected(e.to_string()))?;
            let user = accounts
                .create_user_with_email(&email, &hashed, Some("Demo"))
                .await?;
            info!("Created demo account {}", email);
            Ok(user.user_id)
        }
        Err(e) => Err(e),
    }
}

/// Opens a 30-day auth session and returns the cookie that carries it.
async fn start_session(state: &AppState, user_id: Uuid) -> Result<String, (StatusCode, String)> {
    let auth_session_id = Uuid::new_v4().to_string();
    let lifetime = Duration::days(30);

    state
        .accounts
        .create_auth_session(&auth_session_id, user_id, Utc::now() + lifetime)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session".to_string())
        })?;

    Ok(session_cookie(
        &auth_session_id,
        lifetime,
        state.config.cookie_secure,
    ))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let email = normalize_email(&req.email);
    if !EMAIL_RE.is_match(&email) {
        return Err((StatusCode::BAD_REQUEST, "Invalid email address".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Password must be at least {} characters", MIN_PASSWORD_CHARS),
        ));
    }

    match state.accounts.get_user_by_email(&email).await {
        Ok(_) => {
            return Err((StatusCode::CONFLICT, "Email already registered".to_string()));
        }
        Err(PortError::NotFound(_)) => {}
        Err(e) => {
            error!("Failed to look up user: {:?}", e);
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user".to_string()));
        }
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        error!("Failed to hash password: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password".to_string())
    })?;

    let display_name = req
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let user = state
        .accounts
        .create_user_with_email(&email, &password_hash, display_name)
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => {
                (StatusCode::CONFLICT, "Email already registered".to_string())
            }
            e => {
                error!("Failed to create user: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user".to_string())
            }
        })?;

    let cookie = start_session(&state, user.user_id).await?;

    let response = AuthResponse {
        user_id: user.user_id,
        email: user.email.unwrap_or(email),
    };

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(response),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_creds = state
        .accounts
        .get_user_by_email(&normalize_email(&req.email))
        .await
        .map_err(|e| {
            error!("Failed to get user: {:?}", e);
            (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string())
        })?;

    let parsed_hash = PasswordHash::new(&user_creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Err((StatusCode::UNAUTHORIZED, "Invalid email or password".to_string()));
    }

    let cookie = start_session(&state, user_creds.user_id).await?;

    let response = AuthResponse {
        user_id: user_creds.user_id,
        email: user_creds.email,
    };

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /auth/demo - Sign in to the shared demo account
#[utoipa::path(
    post,
    path = "/auth/demo",
    responses(
        (status = 200, description = "Signed in as the demo user", body = AuthResponse),
        (status = 404, description = "No demo account is configured"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn demo_login_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let demo = state.config.demo_account.as_ref().ok_or((
        StatusCode::NOT_FOUND,
        "Demo account is not available".to_string(),
    ))?;

    let user_id = ensure_demo_account(state.accounts.as_ref(), demo)
        .await
        .map_err(|e| {
            error!("Failed to load demo account: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Demo account error".to_string())
        })?;

    let cookie = start_session(&state, user_id).await?;

    let response = AuthResponse {
        user_id,
        email: normalize_email(&demo.email),
    };

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let auth_session_id = read_cookie(&headers, SESSION_COOKIE)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state
        .accounts
        .delete_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            error!("Failed to delete auth session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout".to_string())
        })?;

    let cookie = clear_session_cookie(state.config.cookie_secure);

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}
