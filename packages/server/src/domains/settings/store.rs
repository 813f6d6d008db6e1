use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::CampaignSetting;

/// Field set shared by create and full-field update.
#[derive(Debug, Clone)]
pub struct SettingFields {
    pub name: String,
    pub company_name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

/// Storage seam for the settings domain, so route handlers stay
/// backend-agnostic like the campaign routes.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn create(&self, fields: SettingFields) -> Result<CampaignSetting>;
    /// Newest created first.
    async fn list(&self) -> Result<Vec<CampaignSetting>>;
    /// `None` when the id does not exist.
    async fn update(&self, id: Uuid, fields: SettingFields) -> Result<Option<CampaignSetting>>;
    /// `false` when the id does not exist.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct PostgresSettingsStore {
    pool: PgPool,
}

impl PostgresSettingsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for PostgresSettingsStore {
    async fn create(&self, fields: SettingFields) -> Result<CampaignSetting> {
        CampaignSetting::create(
            &fields.name,
            fields.company_name.as_deref(),
            fields.contact_person.as_deref(),
            fields.email.as_deref(),
            fields.phone.as_deref(),
            fields.message.as_deref(),
            &self.pool,
        )
        .await
    }

    async fn list(&self) -> Result<Vec<CampaignSetting>> {
        CampaignSetting::list(&self.pool).await
    }

    async fn update(&self, id: Uuid, fields: SettingFields) -> Result<Option<CampaignSetting>> {
        CampaignSetting::update(
            id,
            &fields.name,
            fields.company_name.as_deref(),
            fields.contact_person.as_deref(),
            fields.email.as_deref(),
            fields.phone.as_deref(),
            fields.message.as_deref(),
            &self.pool,
        )
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        CampaignSetting::delete(id, &self.pool).await
    }
}

/// In-memory settings store with the same contract as the Postgres one;
/// backs the route-level tests.
#[derive(Default)]
pub struct MemorySettingsStore {
    // Kept in creation order; listing reverses for newest-first.
    inner: Mutex<Vec<CampaignSetting>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn create(&self, fields: SettingFields) -> Result<CampaignSetting> {
        let setting = CampaignSetting {
            id: Uuid::now_v7(),
            name: fields.name,
            company_name: fields.company_name,
            contact_person: fields.contact_person,
            email: fields.email,
            phone: fields.phone,
            message: fields.message,
            created_at: Utc::now(),
        };
        self.inner.lock().unwrap().push(setting.clone());
        Ok(setting)
    }

    async fn list(&self) -> Result<Vec<CampaignSetting>> {
        Ok(self.inner.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn update(&self, id: Uuid, fields: SettingFields) -> Result<Option<CampaignSetting>> {
        let mut settings = self.inner.lock().unwrap();
        let Some(setting) = settings.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        setting.name = fields.name;
        setting.company_name = fields.company_name;
        setting.contact_person = fields.contact_person;
        setting.email = fields.email;
        setting.phone = fields.phone;
        setting.message = fields.message;
        Ok(Some(setting.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut settings = self.inner.lock().unwrap();
        let before = settings.len();
        settings.retain(|s| s.id != id);
        Ok(settings.len() != before)
    }
}
