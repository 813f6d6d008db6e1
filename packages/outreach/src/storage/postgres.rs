use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::traits::CampaignStore;
use crate::types::{
    CampaignRun, CampaignStats, NewTarget, RunCounters, RunId, RunStatus, SubmissionOutcome,
    TargetId, TargetRecord, TargetStatus,
};

/// Postgres-backed campaign store.
///
/// Writes are serialized by the database: the `source_url` UNIQUE constraint
/// enforces discovery uniqueness under concurrent calls, and outcome
/// application is a conditional update so each record is claimed at most
/// once.
pub struct PostgresCampaignStore {
    pool: PgPool,
}

impl PostgresCampaignStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TargetRow {
    id: Uuid,
    keyword: String,
    company_name: String,
    source_url: String,
    form_url: Option<String>,
    has_captcha: bool,
    status: String,
    error_message: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TargetRow> for TargetRecord {
    type Error = anyhow::Error;

    fn try_from(row: TargetRow) -> Result<Self> {
        let status = TargetStatus::parse(&row.status)
            .ok_or_else(|| anyhow!("unknown target status in store: {}", row.status))?;
        Ok(TargetRecord {
            id: TargetId(row.id),
            keyword: row.keyword,
            company_name: row.company_name,
            source_url: row.source_url,
            form_url: row.form_url,
            has_captcha: row.has_captcha,
            status,
            error_message: row.error_message,
            submitted_at: row.submitted_at,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RunRow {
    id: Uuid,
    keyword: String,
    total_found: i64,
    total_submitted: i64,
    success_count: i64,
    fail_count: i64,
    captcha_count: i64,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    status: String,
}

impl TryFrom<RunRow> for CampaignRun {
    type Error = anyhow::Error;

    fn try_from(row: RunRow) -> Result<Self> {
        let status = RunStatus::parse(&row.status)
            .ok_or_else(|| anyhow!("unknown run status in store: {}", row.status))?;
        Ok(CampaignRun {
            id: RunId(row.id),
            keyword: row.keyword,
            total_found: row.total_found,
            total_submitted: row.total_submitted,
            success_count: row.success_count,
            fail_count: row.fail_count,
            captcha_count: row.captcha_count,
            started_at: row.started_at,
            completed_at: row.completed_at,
            status,
        })
    }
}

fn collect_targets(rows: Vec<TargetRow>) -> Result<Vec<TargetRecord>> {
    rows.into_iter().map(TargetRecord::try_from).collect()
}

fn collect_runs(rows: Vec<RunRow>) -> Result<Vec<CampaignRun>> {
    rows.into_iter().map(CampaignRun::try_from).collect()
}

#[async_trait]
impl CampaignStore for PostgresCampaignStore {
    async fn insert_target(&self, candidate: NewTarget) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO targets (id, keyword, company_name, source_url, form_url, has_captcha, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            ON CONFLICT (source_url) DO NOTHING
            "#,
        )
        .bind(TargetId::new().0)
        .bind(&candidate.keyword)
        .bind(&candidate.company_name)
        .bind(&candidate.source_url)
        .bind(&candidate.form_url)
        .bind(candidate.has_captcha)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn pending_targets(&self, limit: i64) -> Result<Vec<TargetRecord>> {
        let rows = sqlx::query_as::<_, TargetRow>(
            r#"
            SELECT * FROM targets
            WHERE status = 'pending'
            ORDER BY created_at ASC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        collect_targets(rows)
    }

    async fn record_outcome(&self, id: TargetId, outcome: &SubmissionOutcome) -> Result<bool> {
        // Conditional update is the atomic pending -> terminal claim.
        let result = sqlx::query(
            r#"
            UPDATE targets
            SET status = $2, error_message = $3, submitted_at = now()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.0)
        .bind(outcome.status().as_str())
        .bind(outcome.error_message())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_targets(&self, status: Option<TargetStatus>) -> Result<Vec<TargetRecord>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, TargetRow>(
                    "SELECT * FROM targets WHERE status = $1 ORDER BY created_at DESC, id DESC",
                )
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, TargetRow>(
                    "SELECT * FROM targets ORDER BY created_at DESC, id DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        collect_targets(rows)
    }

    async fn stats(&self) -> Result<CampaignStats> {
        // Single statement keeps the aggregation consistent as of one read.
        let (total, success, failed, captcha, pending) =
            sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
                r#"
                SELECT
                    COUNT(*),
                    COUNT(*) FILTER (WHERE status = 'success'),
                    COUNT(*) FILTER (WHERE status = 'failed'),
                    COUNT(*) FILTER (WHERE has_captcha OR status = 'skipped'),
                    COUNT(*) FILTER (WHERE status = 'pending')
                FROM targets
                "#,
            )
            .fetch_one(&self.pool)
            .await?;
        Ok(CampaignStats::from_counts(
            total, success, failed, captcha, pending,
        ))
    }

    async fn clear_targets(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM targets")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn start_run(&self, keyword: &str, total_found: i64) -> Result<CampaignRun> {
        let row = sqlx::query_as::<_, RunRow>(
            r#"
            INSERT INTO campaign_runs (id, keyword, total_found, status)
            VALUES ($1, $2, $3, 'running')
            RETURNING *
            "#,
        )
        .bind(RunId::new().0)
        .bind(keyword)
        .bind(total_found)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn complete_run(&self, id: RunId, counters: RunCounters) -> Result<Option<CampaignRun>> {
        let row = sqlx::query_as::<_, RunRow>(
            r#"
            UPDATE campaign_runs
            SET total_submitted = $2,
                success_count = $3,
                fail_count = $4,
                captcha_count = $5,
                completed_at = now(),
                status = 'completed'
            WHERE id = $1 AND status = 'running'
            RETURNING *
            "#,
        )
        .bind(id.0)
        .bind(counters.submitted)
        .bind(counters.success)
        .bind(counters.failed)
        .bind(counters.captcha)
        .fetch_optional(&self.pool)
        .await?;
        row.map(CampaignRun::try_from).transpose()
    }

    async fn latest_running_run(&self) -> Result<Option<CampaignRun>> {
        let row = sqlx::query_as::<_, RunRow>(
            r#"
            SELECT * FROM campaign_runs
            WHERE status = 'running'
            ORDER BY started_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        row.map(CampaignRun::try_from).transpose()
    }

    async fn list_runs(&self) -> Result<Vec<CampaignRun>> {
        let rows = sqlx::query_as::<_, RunRow>(
            "SELECT * FROM campaign_runs ORDER BY started_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        collect_runs(rows)
    }
}
