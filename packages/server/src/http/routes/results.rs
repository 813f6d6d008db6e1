use axum::{
    extract::{Extension, Query},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use outreach::{export_csv, export_filename, TargetRecord, TargetStatus};

use crate::http::app::AppState;
use crate::http::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    pub status: Option<String>,
}

pub async fn list_results(
    Extension(state): Extension<AppState>,
    Query(query): Query<ResultsQuery>,
) -> ApiResult<Json<Vec<TargetRecord>>> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            TargetStatus::parse(s)
                .ok_or_else(|| ApiError::Validation(format!("unknown status filter: {}", s)))
        })
        .transpose()?;
    let records = state.store.list_targets(status).await?;
    Ok(Json(records))
}

pub async fn export_results(
    Extension(state): Extension<AppState>,
) -> ApiResult<impl IntoResponse> {
    let records = state.store.list_targets(None).await?;
    let body = export_csv(&records)?;
    let filename = export_filename(Utc::now());
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/csv; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}

pub async fn clear_results(Extension(state): Extension<AppState>) -> ApiResult<Json<Value>> {
    let deleted = state.store.clear_targets().await?;
    tracing::info!(deleted, "all target records cleared");
    Ok(Json(json!({
        "message": "All results cleared",
        "deleted": deleted,
    })))
}
