// Outreach campaign core: target lifecycle, discovery/submission stages,
// statistics aggregation and CSV export.
//
// Storage and form submission sit behind traits so the demo stand-ins
// (fabricated candidates, randomized outcomes) can be swapped for real
// crawling and HTTP form posts without touching the state machine.

pub mod discovery;
pub mod export;
pub mod storage;
pub mod submission;
pub mod traits;
pub mod types;

pub use discovery::{DiscoveryReport, DiscoveryStage};
pub use export::{export_csv, export_filename};
pub use storage::{MemoryCampaignStore, PostgresCampaignStore};
pub use submission::{RandomFormSubmitter, SubmissionReport, SubmissionStage};
pub use traits::{CampaignStore, FormSubmitter, SubmitOutcome};
pub use types::{
    CampaignRun, CampaignStats, NewTarget, RunCounters, RunId, RunStatus, SubmissionOutcome,
    TargetId, TargetRecord, TargetStatus,
};
