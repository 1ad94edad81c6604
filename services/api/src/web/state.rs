//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use lovecraft_core::ports::{AccountStore, BlobStorage, SurpriseStore};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub surprises: Arc<dyn SurpriseStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub blobs: Arc<dyn BlobStorage>,
    pub config: Arc<Config>,
}
