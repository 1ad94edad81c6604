//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, InMemoryStore, LocalBlobStorage},
    config::Config,
    error::ApiError,
    web::{auth::ensure_demo_account, build_router, state::AppState},
};
use lovecraft_core::ports::{AccountStore, SurpriseStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect the Stores ---
    let (surprises, accounts): (Arc<dyn SurpriseStore>, Arc<dyn AccountStore>) =
        match &config.database_url {
            Some(database_url) => {
                info!("Connecting to database...");
                let db_pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect(database_url)
                    .await?;
                let db_adapter = Arc::new(DbAdapter::new(db_pool));
                info!("Running database migrations...");
                db_adapter.run_migrations().await?;
                info!("Database migrations complete.");
                (
                    db_adapter.clone() as Arc<dyn SurpriseStore>,
                    db_adapter as Arc<dyn AccountStore>,
                )
            }
            None => {
                warn!("DATABASE_URL is not set; using the in-memory store. Data will not survive a restart.");
                let store = Arc::new(InMemoryStore::new());
                (
                    store.clone() as Arc<dyn SurpriseStore>,
                    store as Arc<dyn AccountStore>,
                )
            }
        };

    // --- 3. Blob Storage for Profile Pictures ---
    tokio::fs::create_dir_all(&config.media_path).await?;
    let blobs = Arc::new(LocalBlobStorage::new(
        config.media_path.clone(),
        format!("{}/media", config.public_base_url),
    ));

    // --- 4. Seed the Demo Account ---
    if let Some(demo) = &config.demo_account {
        let demo_user = ensure_demo_account(accounts.as_ref(), demo).await?;
        info!("Demo account ready ({})", demo_user);
    }

    // --- 5. Build the Shared AppState and Router ---
    let app_state = Arc::new(AppState {
        surprises,
        accounts,
        blobs,
        config: config.clone(),
    });
    let app = build_router(app_state)?;

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
