use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// An outreach message template used to fill submitted forms.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CampaignSetting {
    pub id: Uuid,
    pub name: String,
    pub company_name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CampaignSetting {
    pub async fn create(
        name: &str,
        company_name: Option<&str>,
        contact_person: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        message: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO settings (id, name, company_name, contact_person, email, phone, message)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(company_name)
        .bind(contact_person)
        .bind(email)
        .bind(phone)
        .bind(message)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM settings ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Full-field update. Returns `None` when the id does not exist.
    pub async fn update(
        id: Uuid,
        name: &str,
        company_name: Option<&str>,
        contact_person: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        message: Option<&str>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE settings
            SET name = $2, company_name = $3, contact_person = $4, email = $5, phone = $6, message = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(company_name)
        .bind(contact_person)
        .bind(email)
        .bind(phone)
        .bind(message)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Returns `false` when the id does not exist.
    pub async fn delete(id: Uuid, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM settings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
