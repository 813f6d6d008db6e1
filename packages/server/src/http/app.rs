//! Application setup and router assembly.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use outreach::{CampaignStore, FormSubmitter};

use crate::domains::settings::SettingsStore;
use crate::http::routes::{
    clear_results, crawl_demo, create_setting, delete_setting, export_results, get_stats,
    health_handler, list_results, list_runs, list_settings, submit_demo, update_setting,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub store: Arc<dyn CampaignStore>,
    pub submitter: Arc<dyn FormSubmitter>,
    pub settings: Arc<dyn SettingsStore>,
    pub demo_discovery_count: usize,
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    // Permissive CORS: the browser dashboard runs as a separate service.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/settings", get(list_settings).post(create_setting))
        .route(
            "/settings/:id",
            put(update_setting).delete(delete_setting),
        )
        .route("/crawl/demo", post(crawl_demo))
        .route("/submit/demo", post(submit_demo))
        .route("/results", get(list_results))
        .route("/results/export", get(export_results))
        .route("/results/clear", post(clear_results))
        .route("/stats", get(get_stats))
        .route("/runs", get(list_runs))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
