mod app;
mod config;
mod db;
mod domain;
mod error;
mod logging;
mod middleware;
mod routes;
mod services;
mod store;

use std::sync::Arc;

use anyhow::Result;

use services::ProfileService;
use store::PgProfileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting client profiles backend"
    );

    // Create database pool and apply schema migrations
    let pool = db::create_pool(&settings).await?;
    db::run_migrations(&pool).await?;

    // Wire the profile service against the PostgreSQL store
    let profiles = ProfileService::new(Arc::new(PgProfileStore::new(pool.clone())));

    // Create application state
    let state = app::AppState::new(pool, settings.clone(), profiles);

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
