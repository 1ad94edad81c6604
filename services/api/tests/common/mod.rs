#![allow(dead_code)]

use std::sync::Arc;

use api_lib::adapters::{InMemoryStore, LocalBlobStorage};
use api_lib::config::{Config, DemoAccount};
use api_lib::web::{build_router, state::AppState};
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use tracing::Level;

pub const DEMO_EMAIL: &str = "demo@lovecraft.test";

/// A router over the in-memory store, plus handles tests need to inspect state.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub media: TempDir,
}

/// Build a test `Config` with safe defaults.
pub fn test_config(media: &TempDir) -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: None,
        log_level: Level::DEBUG,
        media_path: media.path().to_path_buf(),
        public_base_url: "https://love.test".to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        demo_account: Some(DemoAccount {
            email: DEMO_EMAIL.to_string(),
            password: "demo-password".to_string(),
        }),
        cookie_secure: false,
    }
}

/// Build the full application router exactly as `main` does, minus PostgreSQL.
pub fn test_app() -> TestApp {
    let media = tempfile::tempdir().unwrap();
    let config = Arc::new(test_config(&media));
    let store = Arc::new(InMemoryStore::new());

    let state = Arc::new(AppState {
        surprises: store.clone(),
        accounts: store.clone(),
        blobs: Arc::new(LocalBlobStorage::new(media.path(), "https://love.test/media")),
        config,
    });

    TestApp {
        router: build_router(state).unwrap(),
        store,
        media,
    }
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub fn request(method: Method, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match cookie {
        Some(cookie) => builder.header(header::COOKIE, cookie),
        None => builder,
    }
}

pub async fn get(app: &TestApp, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, request(Method::GET, uri, cookie).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: &TestApp, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, request(Method::DELETE, uri, cookie).body(Body::empty()).unwrap()).await
}

pub async fn send_json(
    app: &TestApp,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let req = request(method, uri, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `name=value` pair of the session cookie set by a response.
pub fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .and_then(|v| v.split(';').next())
        .expect("response sets a session cookie")
        .to_string()
}

/// Sign up a fresh user and return their session cookie.
pub async fn signup(app: &TestApp, email: &str) -> String {
    let response = send_json(
        app,
        Method::POST,
        "/auth/signup",
        None,
        serde_json::json!({ "email": email, "password": "hunter22", "display_name": "Max" }),
    )
    .await;
    assert_eq!(response.status(), 201);
    session_cookie(&response)
}

pub fn surprise_body() -> serde_json::Value {
    serde_json::json!({
        "recipient": "Eve",
        "sender": "Max",
        "question": "Qui t'aime ?",
        "answer": "Max",
        "final_message": "Je t'aime",
        "theme": "romantique"
    })
}

/// Create the canonical Eve/Max surprise and return its id.
pub async fn create_surprise(app: &TestApp, cookie: &str) -> String {
    let response = send_json(app, Method::POST, "/surprises", Some(cookie), surprise_body()).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["id"].as_str().unwrap().to_string()
}
