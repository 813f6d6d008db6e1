//! End-to-end lifecycle tests over the in-memory store: discovery
//! uniqueness, one-way transitions, CAPTCHA precedence, batch idempotence,
//! aggregation consistency and run tracking.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use outreach::{
    CampaignStore, DiscoveryStage, FormSubmitter, MemoryCampaignStore, NewTarget, RunStatus,
    SubmissionStage, SubmitOutcome, TargetRecord, TargetStatus,
};

/// Deterministic submitter: always delivers.
struct AlwaysDeliver;

#[async_trait]
impl FormSubmitter for AlwaysDeliver {
    async fn submit(&self, _target: &TargetRecord) -> Result<SubmitOutcome> {
        Ok(SubmitOutcome::Delivered)
    }
}

/// Deterministic submitter: always rejects with a fixed reason.
struct AlwaysReject;

#[async_trait]
impl FormSubmitter for AlwaysReject {
    async fn submit(&self, _target: &TargetRecord) -> Result<SubmitOutcome> {
        Ok(SubmitOutcome::Rejected {
            reason: "submission timeout".to_owned(),
        })
    }
}

/// Submitter whose transport always errors, to prove a broken wire still
/// yields per-record failed outcomes rather than an aborted batch.
struct BrokenWire;

#[async_trait]
impl FormSubmitter for BrokenWire {
    async fn submit(&self, _target: &TargetRecord) -> Result<SubmitOutcome> {
        anyhow::bail!("connection reset by peer")
    }
}

fn candidate(url: &str, has_captcha: bool) -> NewTarget {
    NewTarget {
        keyword: "acme".to_owned(),
        company_name: format!("Acme {}", url),
        source_url: url.to_owned(),
        form_url: Some(format!("{}/contact", url)),
        has_captcha,
    }
}

#[tokio::test]
async fn duplicate_discovery_is_a_silent_no_op() {
    let store = MemoryCampaignStore::new();

    assert!(store
        .insert_target(candidate("https://a.example", false))
        .await
        .unwrap());
    assert!(!store
        .insert_target(candidate("https://a.example", true))
        .await
        .unwrap());

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total, 1);
}

#[tokio::test]
async fn discovery_stage_rejects_empty_keyword() {
    let store = Arc::new(MemoryCampaignStore::new());
    let stage = DiscoveryStage::new(store.clone());

    assert!(stage.run("   ", 5).await.is_err());
    assert_eq!(store.stats().await.unwrap().total, 0);
}

#[tokio::test]
async fn repeated_discovery_never_collides() {
    let store = Arc::new(MemoryCampaignStore::new());
    let stage = DiscoveryStage::new(store.clone());

    let first = stage.run("acme", 5).await.unwrap();
    let second = stage.run("acme", 5).await.unwrap();
    assert_eq!(first.inserted, 5);
    assert_eq!(second.inserted, 5);
    assert_eq!(store.stats().await.unwrap().total, 10);
}

#[tokio::test]
async fn acme_scenario_five_candidates_two_captcha() {
    let store = Arc::new(MemoryCampaignStore::new());
    let discovery = DiscoveryStage::new(store.clone());
    let submission = SubmissionStage::new(store.clone(), Arc::new(AlwaysDeliver));

    let report = discovery.run("acme", 5).await.unwrap();
    assert_eq!(report.inserted, 5);

    let report = submission.run(5).await.unwrap();
    assert_eq!(report.skipped, 2);
    assert_eq!(report.success, 3);
    assert_eq!(report.failed, 0);

    let skipped = store
        .list_targets(Some(TargetStatus::Skipped))
        .await
        .unwrap();
    assert_eq!(skipped.len(), 2);
    assert!(skipped
        .iter()
        .all(|t| t.error_message.as_deref() == Some("CAPTCHA detected")));
    assert!(skipped.iter().all(|t| t.has_captcha));

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.captcha, 2);
    assert_eq!(stats.success, 3);
    assert_eq!(stats.success_rate, 60.0);
}

#[tokio::test]
async fn captcha_precedence_holds_on_every_trial() {
    // Even a submitter that would always deliver never sees a flagged
    // record.
    for _ in 0..20 {
        let store = Arc::new(MemoryCampaignStore::new());
        store
            .insert_target(candidate("https://captcha.example", true))
            .await
            .unwrap();
        let submission = SubmissionStage::new(store.clone(), Arc::new(AlwaysDeliver));
        let report = submission.run(1).await.unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.success, 0);

        let records = store.list_targets(None).await.unwrap();
        assert_eq!(records[0].status, TargetStatus::Skipped);
    }
}

#[tokio::test]
async fn submission_with_no_pending_reports_all_zero() {
    let store = Arc::new(MemoryCampaignStore::new());
    let submission = SubmissionStage::new(store.clone(), Arc::new(AlwaysDeliver));

    let report = submission.run(10).await.unwrap();
    assert_eq!((report.success, report.failed, report.skipped), (0, 0, 0));
}

#[tokio::test]
async fn terminal_records_are_never_reprocessed() {
    let store = Arc::new(MemoryCampaignStore::new());
    store
        .insert_target(candidate("https://a.example", false))
        .await
        .unwrap();

    let deliver = SubmissionStage::new(store.clone(), Arc::new(AlwaysDeliver));
    let report = deliver.run(5).await.unwrap();
    assert_eq!(report.success, 1);
    let first_submitted_at = store.list_targets(None).await.unwrap()[0].submitted_at;
    assert!(first_submitted_at.is_some());

    // A second batch, even with a rejecting submitter, touches nothing.
    let reject = SubmissionStage::new(store.clone(), Arc::new(AlwaysReject));
    let report = reject.run(5).await.unwrap();
    assert_eq!((report.success, report.failed, report.skipped), (0, 0, 0));

    let record = &store.list_targets(None).await.unwrap()[0];
    assert_eq!(record.status, TargetStatus::Success);
    assert_eq!(record.submitted_at, first_submitted_at);
}

#[tokio::test]
async fn fewer_pending_than_requested_is_not_an_error() {
    let store = Arc::new(MemoryCampaignStore::new());
    store
        .insert_target(candidate("https://a.example", false))
        .await
        .unwrap();
    store
        .insert_target(candidate("https://b.example", false))
        .await
        .unwrap();

    let submission = SubmissionStage::new(store.clone(), Arc::new(AlwaysDeliver));
    let report = submission.run(100).await.unwrap();
    assert_eq!(report.success, 2);
}

#[tokio::test]
async fn unselected_records_stay_pending() {
    let store = Arc::new(MemoryCampaignStore::new());
    for i in 0..4 {
        store
            .insert_target(candidate(&format!("https://{}.example", i), false))
            .await
            .unwrap();
    }

    let submission = SubmissionStage::new(store.clone(), Arc::new(AlwaysDeliver));
    submission.run(2).await.unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.success, 2);
    assert_eq!(stats.pending, 2);
}

#[tokio::test]
async fn rejection_reason_lands_in_error_message() {
    let store = Arc::new(MemoryCampaignStore::new());
    store
        .insert_target(candidate("https://a.example", false))
        .await
        .unwrap();

    let submission = SubmissionStage::new(store.clone(), Arc::new(AlwaysReject));
    let report = submission.run(1).await.unwrap();
    assert_eq!(report.failed, 1);

    let record = &store.list_targets(None).await.unwrap()[0];
    assert_eq!(record.status, TargetStatus::Failed);
    assert_eq!(record.error_message.as_deref(), Some("submission timeout"));
}

#[tokio::test]
async fn transport_errors_fail_the_record_not_the_batch() {
    let store = Arc::new(MemoryCampaignStore::new());
    store
        .insert_target(candidate("https://a.example", false))
        .await
        .unwrap();
    store
        .insert_target(candidate("https://b.example", true))
        .await
        .unwrap();

    let submission = SubmissionStage::new(store.clone(), Arc::new(BrokenWire));
    let report = submission.run(2).await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 1);

    let failed = store.list_targets(Some(TargetStatus::Failed)).await.unwrap();
    assert_eq!(
        failed[0].error_message.as_deref(),
        Some("connection reset by peer")
    );
}

#[tokio::test]
async fn aggregation_counts_are_consistent() {
    let store = Arc::new(MemoryCampaignStore::new());
    let discovery = DiscoveryStage::new(store.clone());
    discovery.run("acme", 5).await.unwrap();

    let submission = SubmissionStage::new(store.clone(), Arc::new(AlwaysReject));
    submission.run(3).await.unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total, 5);
    // Every record is exactly one of success/failed/skipped/pending; the
    // captcha clause is a union and may overlap the others.
    let skipped = store
        .list_targets(Some(TargetStatus::Skipped))
        .await
        .unwrap()
        .len() as i64;
    assert_eq!(
        stats.success + stats.failed + stats.pending + skipped,
        stats.total
    );
    assert!(stats.captcha >= skipped);
}

#[tokio::test]
async fn listing_is_newest_first_and_filterable() {
    let store = Arc::new(MemoryCampaignStore::new());
    store
        .insert_target(candidate("https://first.example", false))
        .await
        .unwrap();
    store
        .insert_target(candidate("https://second.example", false))
        .await
        .unwrap();

    let all = store.list_targets(None).await.unwrap();
    assert_eq!(all[0].source_url, "https://second.example");
    assert_eq!(all[1].source_url, "https://first.example");

    let pending = store
        .list_targets(Some(TargetStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 2);
    let successes = store
        .list_targets(Some(TargetStatus::Success))
        .await
        .unwrap();
    assert!(successes.is_empty());
}

#[tokio::test]
async fn clearing_resets_stats_but_not_runs() {
    let store = Arc::new(MemoryCampaignStore::new());
    let discovery = DiscoveryStage::new(store.clone());
    discovery.run("acme", 5).await.unwrap();

    let deleted = store.clear_targets().await.unwrap();
    assert_eq!(deleted, 5);

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.success, 0);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.captcha, 0);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.success_rate, 0.0);

    // Run history survives a results clear.
    assert_eq!(store.list_runs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn discovery_then_submission_tracks_one_run() {
    let store = Arc::new(MemoryCampaignStore::new());
    let discovery = DiscoveryStage::new(store.clone());
    let submission = SubmissionStage::new(store.clone(), Arc::new(AlwaysDeliver));

    discovery.run("acme", 5).await.unwrap();
    let open = store.latest_running_run().await.unwrap().unwrap();
    assert_eq!(open.keyword, "acme");
    assert_eq!(open.total_found, 5);
    assert_eq!(open.status, RunStatus::Running);

    submission.run(5).await.unwrap();

    let runs = store.list_runs().await.unwrap();
    assert_eq!(runs.len(), 1);
    let run = &runs[0];
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.total_submitted, 5);
    assert_eq!(run.success_count, 3);
    assert_eq!(run.fail_count, 0);
    assert_eq!(run.captcha_count, 2);
    assert!(run.completed_at.is_some());
    assert!(store.latest_running_run().await.unwrap().is_none());
}

#[tokio::test]
async fn new_discovery_supersedes_a_still_open_run() {
    let store = Arc::new(MemoryCampaignStore::new());
    let discovery = DiscoveryStage::new(store.clone());
    let submission = SubmissionStage::new(store.clone(), Arc::new(AlwaysDeliver));

    // Two discoveries back to back, no submission in between.
    discovery.run("acme", 5).await.unwrap();
    discovery.run("globex", 5).await.unwrap();

    let runs = store.list_runs().await.unwrap();
    assert_eq!(runs.len(), 2);
    // Newest first: the globex run is the only one still open; the acme
    // run was closed with zero submission counters when it was superseded.
    assert_eq!(runs[0].keyword, "globex");
    assert_eq!(runs[0].status, RunStatus::Running);
    assert_eq!(runs[1].keyword, "acme");
    assert_eq!(runs[1].status, RunStatus::Completed);
    assert_eq!(runs[1].total_submitted, 0);
    assert!(runs[1].completed_at.is_some());

    // The next batch pairs with the open globex run, never the stale one.
    submission.run(10).await.unwrap();
    let runs = store.list_runs().await.unwrap();
    assert_eq!(runs[0].keyword, "globex");
    assert_eq!(runs[0].status, RunStatus::Completed);
    assert_eq!(runs[0].total_submitted, 10);
    assert_eq!(runs[1].total_submitted, 0);
    assert!(store.latest_running_run().await.unwrap().is_none());
}

#[tokio::test]
async fn submission_without_open_run_still_processes() {
    let store = Arc::new(MemoryCampaignStore::new());
    store
        .insert_target(candidate("https://a.example", false))
        .await
        .unwrap();

    let submission = SubmissionStage::new(store.clone(), Arc::new(AlwaysDeliver));
    let report = submission.run(1).await.unwrap();
    assert_eq!(report.success, 1);
    assert!(store.list_runs().await.unwrap().is_empty());
}
