pub mod account;
pub mod auth;
pub mod cookies;
pub mod dashboard;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod router;
pub mod state;
pub mod surprises;
pub mod ws_handler;

// Re-export what the binary needs to build and serve the application.
pub use middleware::require_auth;
pub use router::build_router;
pub use ws_handler::reveal_ws_handler;
