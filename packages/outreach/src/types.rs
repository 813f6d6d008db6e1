use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a target record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub Uuid);

impl TargetId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TargetId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a campaign run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle status of a target record.
///
/// `Pending` is the only non-terminal value; a record moves to exactly one
/// of the other three and never transitions again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Pending,
    Success,
    Failed,
    Skipped,
}

impl TargetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetStatus::Pending => "pending",
            TargetStatus::Success => "success",
            TargetStatus::Failed => "failed",
            TargetStatus::Skipped => "skipped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TargetStatus::Pending),
            "success" => Some(TargetStatus::Success),
            "failed" => Some(TargetStatus::Failed),
            "skipped" => Some(TargetStatus::Skipped),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TargetStatus::Pending)
    }
}

/// One discovered organization/contact-form candidate, tracked through the
/// outreach lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRecord {
    pub id: TargetId,
    pub keyword: String,
    pub company_name: String,
    /// Globally unique among all target records.
    pub source_url: String,
    /// Candidate submission endpoint; `None` if no form was detected.
    pub form_url: Option<String>,
    /// Set at discovery time, never changed afterward.
    pub has_captcha: bool,
    pub status: TargetStatus,
    /// Set only for `failed` or `skipped`.
    pub error_message: Option<String>,
    /// Set exactly once, at the moment status leaves `pending`.
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Candidate produced by the discovery stage, before insertion.
#[derive(Debug, Clone)]
pub struct NewTarget {
    pub keyword: String,
    pub company_name: String,
    pub source_url: String,
    pub form_url: Option<String>,
    pub has_captcha: bool,
}

impl NewTarget {
    /// Materialize the candidate as a pending record.
    pub fn into_record(self, created_at: DateTime<Utc>) -> TargetRecord {
        TargetRecord {
            id: TargetId::new(),
            keyword: self.keyword,
            company_name: self.company_name,
            source_url: self.source_url,
            form_url: self.form_url,
            has_captcha: self.has_captcha,
            status: TargetStatus::Pending,
            error_message: None,
            submitted_at: None,
            created_at,
        }
    }
}

/// Terminal outcome applied to a pending record by the submission stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success,
    Failed { reason: String },
    Skipped { reason: String },
}

impl SubmissionOutcome {
    pub fn status(&self) -> TargetStatus {
        match self {
            SubmissionOutcome::Success => TargetStatus::Success,
            SubmissionOutcome::Failed { .. } => TargetStatus::Failed,
            SubmissionOutcome::Skipped { .. } => TargetStatus::Skipped,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Success => None,
            SubmissionOutcome::Failed { reason } | SubmissionOutcome::Skipped { reason } => {
                Some(reason)
            }
        }
    }
}

/// Status of a campaign run. Runs go `running` -> `completed`; a batch runs
/// to completion or process termination, so no abort marker is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(RunStatus::Running),
            "completed" => Some(RunStatus::Completed),
            _ => None,
        }
    }
}

/// Summary of one discovery+submission batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRun {
    pub id: RunId,
    pub keyword: String,
    pub total_found: i64,
    pub total_submitted: i64,
    pub success_count: i64,
    pub fail_count: i64,
    pub captcha_count: i64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
}

impl CampaignRun {
    pub fn start(keyword: String, total_found: i64, started_at: DateTime<Utc>) -> Self {
        Self {
            id: RunId::new(),
            keyword,
            total_found,
            total_submitted: 0,
            success_count: 0,
            fail_count: 0,
            captcha_count: 0,
            started_at,
            completed_at: None,
            status: RunStatus::Running,
        }
    }
}

/// Counters a submission batch reports back into its campaign run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunCounters {
    pub submitted: i64,
    pub success: i64,
    pub failed: i64,
    pub captcha: i64,
}

/// Aggregate view over the full current record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignStats {
    pub total: i64,
    pub success: i64,
    pub failed: i64,
    /// Records where `has_captcha` is set OR status is `skipped` (union,
    /// each record counted once).
    pub captcha: i64,
    pub pending: i64,
    pub success_rate: f64,
}

impl CampaignStats {
    /// Derive stats from raw counts. The zero-total branch is a defined
    /// result, not an error; division by zero cannot occur.
    pub fn from_counts(total: i64, success: i64, failed: i64, captcha: i64, pending: i64) -> Self {
        let success_rate = if total > 0 {
            round_one_decimal(success as f64 / total as f64 * 100.0)
        } else {
            0.0
        };
        Self {
            total,
            success,
            failed,
            captcha,
            pending,
            success_rate,
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip() {
        for status in [
            TargetStatus::Pending,
            TargetStatus::Success,
            TargetStatus::Failed,
            TargetStatus::Skipped,
        ] {
            assert_eq!(TargetStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TargetStatus::parse("in-flight"), None);
    }

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!TargetStatus::Pending.is_terminal());
        assert!(TargetStatus::Success.is_terminal());
        assert!(TargetStatus::Failed.is_terminal());
        assert!(TargetStatus::Skipped.is_terminal());
    }

    #[test]
    fn success_rate_rounds_to_one_decimal() {
        let stats = CampaignStats::from_counts(3, 1, 2, 0, 0);
        assert_eq!(stats.success_rate, 33.3);

        let stats = CampaignStats::from_counts(3, 2, 1, 0, 0);
        assert_eq!(stats.success_rate, 66.7);

        let stats = CampaignStats::from_counts(4, 2, 2, 0, 0);
        assert_eq!(stats.success_rate, 50.0);
    }

    #[test]
    fn empty_record_set_has_zero_rate() {
        let stats = CampaignStats::from_counts(0, 0, 0, 0, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.total, 0);
    }

    #[test]
    fn outcome_carries_reason_only_when_not_success() {
        assert_eq!(SubmissionOutcome::Success.error_message(), None);
        let failed = SubmissionOutcome::Failed {
            reason: "submission timeout".into(),
        };
        assert_eq!(failed.error_message(), Some("submission timeout"));
        assert_eq!(failed.status(), TargetStatus::Failed);
        let skipped = SubmissionOutcome::Skipped {
            reason: "CAPTCHA detected".into(),
        };
        assert_eq!(skipped.status(), TargetStatus::Skipped);
    }
}
