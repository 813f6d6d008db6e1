use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use crate::traits::CampaignStore;
use crate::types::{
    CampaignRun, CampaignStats, NewTarget, RunCounters, RunId, RunStatus, SubmissionOutcome,
    TargetId, TargetRecord, TargetStatus,
};

#[derive(Default)]
struct Inner {
    // Kept in creation order; listing reverses for newest-first.
    targets: Vec<TargetRecord>,
    runs: Vec<CampaignRun>,
}

/// In-memory campaign store with the same contract as the Postgres one.
///
/// Backs the unit and integration tests, and doubles as a no-database demo
/// backend. A single lock per operation gives the one-consistent-read
/// guarantee the aggregator needs.
#[derive(Default)]
pub struct MemoryCampaignStore {
    inner: Mutex<Inner>,
}

impl MemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CampaignStore for MemoryCampaignStore {
    async fn insert_target(&self, candidate: NewTarget) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .targets
            .iter()
            .any(|t| t.source_url == candidate.source_url)
        {
            return Ok(false);
        }
        inner.targets.push(candidate.into_record(Utc::now()));
        Ok(true)
    }

    async fn pending_targets(&self, limit: i64) -> Result<Vec<TargetRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .targets
            .iter()
            .filter(|t| t.status == TargetStatus::Pending)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn record_outcome(&self, id: TargetId, outcome: &SubmissionOutcome) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let Some(target) = inner
            .targets
            .iter_mut()
            .find(|t| t.id == id && t.status == TargetStatus::Pending)
        else {
            return Ok(false);
        };
        target.status = outcome.status();
        target.error_message = outcome.error_message().map(str::to_owned);
        target.submitted_at = Some(Utc::now());
        Ok(true)
    }

    async fn list_targets(&self, status: Option<TargetStatus>) -> Result<Vec<TargetRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .targets
            .iter()
            .rev()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect())
    }

    async fn stats(&self) -> Result<CampaignStats> {
        let inner = self.inner.lock().unwrap();
        let total = inner.targets.len() as i64;
        let mut success = 0;
        let mut failed = 0;
        let mut captcha = 0;
        let mut pending = 0;
        for target in &inner.targets {
            match target.status {
                TargetStatus::Success => success += 1,
                TargetStatus::Failed => failed += 1,
                TargetStatus::Pending => pending += 1,
                TargetStatus::Skipped => {}
            }
            if target.has_captcha || target.status == TargetStatus::Skipped {
                captcha += 1;
            }
        }
        Ok(CampaignStats::from_counts(
            total, success, failed, captcha, pending,
        ))
    }

    async fn clear_targets(&self) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.targets.len() as u64;
        inner.targets.clear();
        Ok(removed)
    }

    async fn start_run(&self, keyword: &str, total_found: i64) -> Result<CampaignRun> {
        let mut inner = self.inner.lock().unwrap();
        let run = CampaignRun::start(keyword.to_owned(), total_found, Utc::now());
        inner.runs.push(run.clone());
        Ok(run)
    }

    async fn complete_run(&self, id: RunId, counters: RunCounters) -> Result<Option<CampaignRun>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(run) = inner
            .runs
            .iter_mut()
            .find(|r| r.id == id && r.status == RunStatus::Running)
        else {
            return Ok(None);
        };
        run.total_submitted = counters.submitted;
        run.success_count = counters.success;
        run.fail_count = counters.failed;
        run.captcha_count = counters.captcha;
        run.completed_at = Some(Utc::now());
        run.status = RunStatus::Completed;
        Ok(Some(run.clone()))
    }

    async fn latest_running_run(&self) -> Result<Option<CampaignRun>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .runs
            .iter()
            .rev()
            .find(|r| r.status == RunStatus::Running)
            .cloned())
    }

    async fn list_runs(&self) -> Result<Vec<CampaignRun>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.runs.iter().rev().cloned().collect())
    }
}
