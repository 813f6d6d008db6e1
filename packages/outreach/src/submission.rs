use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;

use crate::traits::{CampaignStore, FormSubmitter, SubmitOutcome};
use crate::types::{RunCounters, SubmissionOutcome, TargetRecord};

const CAPTCHA_REASON: &str = "CAPTCHA detected";
const TIMEOUT_REASON: &str = "submission timeout";

/// Per-invocation counts; not cumulative across calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionReport {
    pub success: i64,
    pub failed: i64,
    pub skipped: i64,
}

/// Consumes pending target records and applies one terminal outcome each.
///
/// CAPTCHA-flagged records are skipped before the submitter is ever
/// consulted. Per-record failures never abort the batch; only a storage
/// error does.
pub struct SubmissionStage {
    store: Arc<dyn CampaignStore>,
    submitter: Arc<dyn FormSubmitter>,
}

impl SubmissionStage {
    pub fn new(store: Arc<dyn CampaignStore>, submitter: Arc<dyn FormSubmitter>) -> Self {
        Self { store, submitter }
    }

    pub async fn run(&self, target_count: i64) -> Result<SubmissionReport> {
        let pending = self.store.pending_targets(target_count).await?;
        let mut report = SubmissionReport::default();

        for target in &pending {
            let outcome = self.resolve(target).await;
            // A record already claimed elsewhere is not counted here.
            if self.store.record_outcome(target.id, &outcome).await? {
                match outcome {
                    SubmissionOutcome::Success => report.success += 1,
                    SubmissionOutcome::Failed { .. } => report.failed += 1,
                    SubmissionOutcome::Skipped { .. } => report.skipped += 1,
                }
            }
        }

        self.close_run(&report).await?;

        tracing::info!(
            requested = target_count,
            processed = pending.len(),
            success = report.success,
            failed = report.failed,
            skipped = report.skipped,
            "submission batch complete"
        );
        Ok(report)
    }

    /// Decide the terminal outcome for one record. CAPTCHA precedence is
    /// absolute: a flagged record never reaches the submitter.
    async fn resolve(&self, target: &TargetRecord) -> SubmissionOutcome {
        if target.has_captcha {
            return SubmissionOutcome::Skipped {
                reason: CAPTCHA_REASON.to_owned(),
            };
        }
        match self.submitter.submit(target).await {
            Ok(SubmitOutcome::Delivered) => SubmissionOutcome::Success,
            Ok(SubmitOutcome::Rejected { reason }) => SubmissionOutcome::Failed { reason },
            Err(e) => {
                // Transport failure on one record is a failed outcome for
                // that record, not an aborted batch.
                tracing::warn!(target_id = %target.id.0, error = %e, "submitter error");
                SubmissionOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Fold the batch counters into the most recent open campaign run.
    /// Submission without a prior discovery run still processes records.
    async fn close_run(&self, report: &SubmissionReport) -> Result<()> {
        if let Some(run) = self.store.latest_running_run().await? {
            let counters = RunCounters {
                submitted: report.success + report.failed + report.skipped,
                success: report.success,
                failed: report.failed,
                captcha: report.skipped,
            };
            self.store.complete_run(run.id, counters).await?;
        }
        Ok(())
    }
}

/// Stand-in for real HTTP form submission: draws the outcome from a
/// configurable success probability. Rejections report a timeout, the shape
/// a real submitter's per-request deadline would produce.
pub struct RandomFormSubmitter {
    success_rate: f64,
}

impl RandomFormSubmitter {
    pub fn new(success_rate: f64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl FormSubmitter for RandomFormSubmitter {
    async fn submit(&self, _target: &TargetRecord) -> Result<SubmitOutcome> {
        if rand::rng().random_bool(self.success_rate) {
            Ok(SubmitOutcome::Delivered)
        } else {
            Ok(SubmitOutcome::Rejected {
                reason: TIMEOUT_REASON.to_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TargetId, TargetStatus};
    use chrono::Utc;

    fn target(has_captcha: bool) -> TargetRecord {
        TargetRecord {
            id: TargetId::new(),
            keyword: "acme".into(),
            company_name: "Acme Company A".into(),
            source_url: "https://example-a.com/?ref=1".into(),
            form_url: Some("https://example-a.com/contact".into()),
            has_captcha,
            status: TargetStatus::Pending,
            error_message: None,
            submitted_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn rate_one_always_delivers() {
        let submitter = RandomFormSubmitter::new(1.0);
        for _ in 0..50 {
            assert_eq!(
                submitter.submit(&target(false)).await.unwrap(),
                SubmitOutcome::Delivered
            );
        }
    }

    #[tokio::test]
    async fn rate_zero_always_rejects_with_timeout() {
        let submitter = RandomFormSubmitter::new(0.0);
        for _ in 0..50 {
            let outcome = submitter.submit(&target(false)).await.unwrap();
            assert_eq!(
                outcome,
                SubmitOutcome::Rejected {
                    reason: TIMEOUT_REASON.to_owned()
                }
            );
        }
    }

    #[tokio::test]
    async fn out_of_range_rates_are_clamped() {
        // random_bool panics outside [0, 1]; the constructor must not let
        // a bad config value through.
        let high = RandomFormSubmitter::new(1.7);
        assert_eq!(
            high.submit(&target(false)).await.unwrap(),
            SubmitOutcome::Delivered
        );
        let low = RandomFormSubmitter::new(-0.3);
        assert!(matches!(
            low.submit(&target(false)).await.unwrap(),
            SubmitOutcome::Rejected { .. }
        ));
    }
}
