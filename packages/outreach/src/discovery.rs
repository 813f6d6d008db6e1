use std::sync::Arc;

use anyhow::{ensure, Result};
use serde::Serialize;
use uuid::Uuid;

use crate::traits::CampaignStore;
use crate::types::{NewTarget, RunCounters};

/// Demo roster: company suffix, domain slug, form path, captcha flag.
///
/// B and E carry a CAPTCHA so every discovery batch exercises the skip path.
const DEMO_ROSTER: [(&str, &str, &str, bool); 5] = [
    ("A", "example-a", "contact", false),
    ("B", "example-b", "inquiry", true),
    ("C", "example-c", "contact", false),
    ("D", "example-d", "form", false),
    ("E", "example-e", "contact", true),
];

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub message: String,
    pub inserted: i64,
}

/// Produces candidate target records for a keyword and inserts them.
///
/// The real implementation crawls and detects contact forms; this revision
/// fabricates candidates from a fixed roster. Either way the contract is the
/// same: emit candidates with store-unique source URLs, absorb uniqueness
/// rejections silently, and report how many rows actually landed.
pub struct DiscoveryStage {
    store: Arc<dyn CampaignStore>,
}

impl DiscoveryStage {
    pub fn new(store: Arc<dyn CampaignStore>) -> Self {
        Self { store }
    }

    /// Fabricate and insert candidates, then open a campaign run.
    ///
    /// At most one run is ever open: a new discovery supersedes any run
    /// still `running`, completing it with zero submission counters, so a
    /// later submission batch always pairs with the run that produced its
    /// records.
    pub async fn run(&self, keyword: &str, count: usize) -> Result<DiscoveryReport> {
        ensure!(!keyword.trim().is_empty(), "keyword must not be empty");

        while let Some(stale) = self.store.latest_running_run().await? {
            self.store
                .complete_run(stale.id, RunCounters::default())
                .await?;
            tracing::debug!(run_id = %stale.id.0, "superseded open campaign run");
        }

        let nonce = Uuid::new_v4();
        let candidates = fabricate_candidates(keyword, count, nonce);

        let mut inserted = 0i64;
        for candidate in candidates {
            let url = candidate.source_url.clone();
            if self.store.insert_target(candidate).await? {
                inserted += 1;
            } else {
                tracing::debug!(source_url = %url, "duplicate source_url, candidate skipped");
            }
        }

        let run = self.store.start_run(keyword, inserted).await?;
        tracing::info!(
            keyword = %keyword,
            inserted,
            run_id = %run.id.0,
            "discovery batch complete"
        );

        Ok(DiscoveryReport {
            message: format!("Discovered {} demo targets", inserted),
            inserted,
        })
    }
}

/// Fabricate `count` candidates from the demo roster, cycling when more are
/// requested than the roster holds. Every URL is tagged with the per-call
/// nonce plus a sequence number so no two candidates collide, within this
/// call or with earlier ones.
fn fabricate_candidates(keyword: &str, count: usize, nonce: Uuid) -> Vec<NewTarget> {
    (0..count)
        .map(|i| {
            let (suffix, slug, form_path, has_captcha) = DEMO_ROSTER[i % DEMO_ROSTER.len()];
            NewTarget {
                keyword: keyword.to_owned(),
                company_name: format!("{} Company {}", keyword, suffix),
                source_url: format!("https://{}.com/?ref={}-{}", slug, nonce.simple(), i),
                form_url: Some(format!("https://{}.com/{}", slug, form_path)),
                has_captcha,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_batch_has_two_captcha_candidates() {
        let candidates = fabricate_candidates("acme", 5, Uuid::new_v4());
        assert_eq!(candidates.len(), 5);
        assert_eq!(candidates.iter().filter(|c| c.has_captcha).count(), 2);
        assert!(candidates.iter().all(|c| c.form_url.is_some()));
        assert!(candidates.iter().all(|c| c.keyword == "acme"));
    }

    #[test]
    fn urls_are_unique_within_a_call_even_when_roster_cycles() {
        let candidates = fabricate_candidates("acme", 12, Uuid::new_v4());
        let urls: HashSet<_> = candidates.iter().map(|c| c.source_url.as_str()).collect();
        assert_eq!(urls.len(), 12);
    }

    #[test]
    fn urls_differ_across_calls() {
        let first = fabricate_candidates("acme", 5, Uuid::new_v4());
        let second = fabricate_candidates("acme", 5, Uuid::new_v4());
        let urls: HashSet<_> = first
            .iter()
            .chain(second.iter())
            .map(|c| c.source_url.as_str())
            .collect();
        assert_eq!(urls.len(), 10);
    }
}
