use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domains::settings::{CampaignSetting, SettingFields};
use crate::http::app::AppState;
use crate::http::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct SettingPayload {
    pub name: String,
    pub company_name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

impl SettingPayload {
    fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("name must not be empty".into()));
        }
        Ok(())
    }

    fn into_fields(self) -> SettingFields {
        SettingFields {
            name: self.name,
            company_name: self.company_name,
            contact_person: self.contact_person,
            email: self.email,
            phone: self.phone,
            message: self.message,
        }
    }
}

#[derive(Serialize)]
pub struct SettingCreated {
    pub id: Uuid,
    pub message: String,
}

pub async fn list_settings(
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<Vec<CampaignSetting>>> {
    let settings = state.settings.list().await?;
    Ok(Json(settings))
}

pub async fn create_setting(
    Extension(state): Extension<AppState>,
    Json(payload): Json<SettingPayload>,
) -> ApiResult<Json<SettingCreated>> {
    payload.validate()?;
    let setting = state.settings.create(payload.into_fields()).await?;
    Ok(Json(SettingCreated {
        id: setting.id,
        message: "Setting saved".into(),
    }))
}

pub async fn update_setting(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SettingPayload>,
) -> ApiResult<Json<CampaignSetting>> {
    payload.validate()?;
    let updated = state.settings.update(id, payload.into_fields()).await?;
    updated.map(Json).ok_or(ApiError::NotFound("setting"))
}

pub async fn delete_setting(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if !state.settings.delete(id).await? {
        return Err(ApiError::NotFound("setting"));
    }
    Ok(Json(json!({ "message": "Setting deleted" })))
}
