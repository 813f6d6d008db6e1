// Trait definitions for dependency injection
//
// These are infrastructure seams only. The lifecycle rules themselves live
// in the stages; implementations of these traits must not make outcome
// decisions.

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{
    CampaignRun, CampaignStats, NewTarget, RunCounters, RunId, SubmissionOutcome, TargetId,
    TargetRecord, TargetStatus,
};

/// Result of one submission attempt against a target's form.
///
/// A rejected attempt is a normal terminal outcome of the lifecycle, never
/// an error; `Err` from [`FormSubmitter::submit`] is reserved for transport
/// failures, which the submission stage also folds into `failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Delivered,
    Rejected { reason: String },
}

/// The act of delivering the outreach message to one target's form.
///
/// This revision ships [`crate::RandomFormSubmitter`]; a real HTTP form
/// poster replaces it without touching the state-machine contract.
#[async_trait]
pub trait FormSubmitter: Send + Sync {
    async fn submit(&self, target: &TargetRecord) -> Result<SubmitOutcome>;
}

/// Durable keyed storage for target records and campaign runs.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Insert a discovered candidate as a pending record.
    ///
    /// Returns `false` (not an error) when the `source_url` uniqueness
    /// constraint rejects the row; the caller treats that as a silent skip.
    async fn insert_target(&self, candidate: NewTarget) -> Result<bool>;

    /// Up to `limit` records still in `pending`, in stable creation order.
    async fn pending_targets(&self, limit: i64) -> Result<Vec<TargetRecord>>;

    /// Atomically claim a pending record and apply its terminal outcome,
    /// setting status, error_message and submitted_at in one step.
    ///
    /// Returns `false` when the record was not pending (already terminal or
    /// absent), in which case nothing is written. This is the guard that
    /// keeps two overlapping submission batches from double-processing a
    /// record.
    async fn record_outcome(&self, id: TargetId, outcome: &SubmissionOutcome) -> Result<bool>;

    /// All records, optionally filtered by exact status, newest created
    /// first.
    async fn list_targets(&self, status: Option<TargetStatus>) -> Result<Vec<TargetRecord>>;

    /// One consistent aggregation pass over the full record set.
    async fn stats(&self) -> Result<CampaignStats>;

    /// Irreversibly delete all target records. Settings and runs are left
    /// untouched. Returns the number of rows removed.
    async fn clear_targets(&self) -> Result<u64>;

    /// Open a campaign run for a discovery batch.
    async fn start_run(&self, keyword: &str, total_found: i64) -> Result<CampaignRun>;

    /// Close a running campaign run with the batch counters. Returns `None`
    /// when the run is absent or already completed.
    async fn complete_run(&self, id: RunId, counters: RunCounters) -> Result<Option<CampaignRun>>;

    /// The most recently started run still in `running`, if any.
    async fn latest_running_run(&self) -> Result<Option<CampaignRun>>;

    /// Run history, newest first.
    async fn list_runs(&self) -> Result<Vec<CampaignRun>>;
}
