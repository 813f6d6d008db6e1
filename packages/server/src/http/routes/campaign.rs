use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use outreach::{CampaignRun, CampaignStats, DiscoveryStage, SubmissionStage};

use crate::http::app::AppState;
use crate::http::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CrawlRequest {
    pub keyword: String,
    /// Overrides the configured default candidate count.
    pub count: Option<usize>,
}

#[derive(Serialize)]
pub struct CrawlResponse {
    pub message: String,
    pub count: i64,
}

pub async fn crawl_demo(
    Extension(state): Extension<AppState>,
    Json(req): Json<CrawlRequest>,
) -> ApiResult<Json<CrawlResponse>> {
    if req.keyword.trim().is_empty() {
        return Err(ApiError::Validation("keyword must not be empty".into()));
    }
    let count = req.count.unwrap_or(state.demo_discovery_count);
    let stage = DiscoveryStage::new(state.store.clone());
    let report = stage.run(&req.keyword, count).await?;
    Ok(Json(CrawlResponse {
        message: report.message,
        count: report.inserted,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default = "default_target_count")]
    pub target_count: i64,
}

fn default_target_count() -> i64 {
    3
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub message: String,
    pub success: i64,
    pub failed: i64,
    pub skipped: i64,
}

pub async fn submit_demo(
    Extension(state): Extension<AppState>,
    Json(req): Json<SubmitRequest>,
) -> ApiResult<Json<SubmitResponse>> {
    if req.target_count < 0 {
        return Err(ApiError::Validation(
            "target_count must not be negative".into(),
        ));
    }
    let stage = SubmissionStage::new(state.store.clone(), state.submitter.clone());
    let report = stage.run(req.target_count).await?;
    Ok(Json(SubmitResponse {
        message: "Submission batch complete".into(),
        success: report.success,
        failed: report.failed,
        skipped: report.skipped,
    }))
}

pub async fn get_stats(Extension(state): Extension<AppState>) -> ApiResult<Json<CampaignStats>> {
    let stats = state.store.stats().await?;
    Ok(Json(stats))
}

pub async fn list_runs(Extension(state): Extension<AppState>) -> ApiResult<Json<Vec<CampaignRun>>> {
    let runs = state.store.list_runs().await?;
    Ok(Json(runs))
}
