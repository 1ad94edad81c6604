//! services/api/src/web/router.rs
//!
//! Assembles the complete HTTP application: public routes, authenticated routes,
//! the reveal WebSocket, uploaded media and the Swagger UI.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiError;
use crate::web::{
    account, auth, dashboard, middleware::require_auth, rest, state::AppState, surprises,
    ws_handler::reveal_ws_handler,
};

pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS origin: {}", e)))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/demo", post(auth::demo_login_handler))
        .route("/themes", get(rest::list_themes_handler))
        .route("/reveal/ws", get(reveal_ws_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/surprises",
            get(surprises::list_surprises_handler).post(surprises::create_surprise_handler),
        )
        .route(
            "/surprises/{id}",
            get(surprises::get_surprise_handler)
                .put(surprises::update_surprise_handler)
                .delete(surprises::delete_surprise_handler),
        )
        .route("/surprises/{id}/share", get(surprises::share_surprise_handler))
        .route("/dashboard", get(dashboard::dashboard_handler))
        .route(
            "/account",
            get(account::get_profile_handler)
                .put(account::update_profile_handler)
                .delete(account::delete_account_handler),
        )
        .route("/account/photo", post(account::upload_photo_handler))
        .route("/account/export", get(account::export_account_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let media = ServeDir::new(&app_state.config.media_path);

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/media", media)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", rest::ApiDoc::openapi())))
}
