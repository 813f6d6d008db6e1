// Main entry point for the FormReach API server

use std::sync::Arc;

use anyhow::{Context, Result};
use formreach_server::domains::settings::PostgresSettingsStore;
use formreach_server::http::{build_app, AppState};
use formreach_server::Config;
use outreach::{PostgresCampaignStore, RandomFormSubmitter};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,formreach_server=debug,outreach=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FormReach outreach API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Build application
    let state = AppState {
        db_pool: pool.clone(),
        store: Arc::new(PostgresCampaignStore::new(pool.clone())),
        submitter: Arc::new(RandomFormSubmitter::new(config.submit_success_rate)),
        settings: Arc::new(PostgresSettingsStore::new(pool)),
        demo_discovery_count: config.demo_discovery_count,
    };
    let app = build_app(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
