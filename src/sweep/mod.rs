pub mod classifier;
pub mod extractor;
pub mod purger;
pub mod scanner;

pub use classifier::{classify, QueueState, StateSelection};
pub use extractor::extract_job_ids;
pub use purger::{JobPurger, PurgeOutcome};
pub use scanner::scan_keys;

use serde::Serialize;

use crate::config::DEFAULT_SCAN_COUNT;
use crate::error::AppResult;
use crate::store::{KeyStore, StorageKind, StoreKey};

/// Container key patterns, one per state suffix (`<queue>:<state>`)
pub const QUEUE_PATTERNS: [&str; 6] = [
    "*:failed",
    "*:active",
    "*:waiting",
    "*:wait",
    "*:paused",
    "*:delayed",
];

/// A queue-state container found during a sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueContainer {
    pub key: StoreKey,
    pub kind: StorageKind,
    pub state: QueueState,
}

/// One non-empty container, as reported before its jobs are purged
#[derive(Debug, Clone, Serialize)]
pub struct ContainerReport {
    pub key: StoreKey,
    pub state: QueueState,
    pub kind: StorageKind,
    pub jobs: usize,
}

/// Totals for a whole sweep
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub dry_run: bool,
    pub containers: Vec<ContainerReport>,
    pub jobs: usize,
    #[serde(flatten)]
    pub purged: PurgeOutcome,
}

#[derive(Debug, Clone, Copy)]
pub struct SweepOptions {
    pub dry_run: bool,
    /// Keys requested per SCAN round
    pub scan_count: usize,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            scan_count: DEFAULT_SCAN_COUNT,
        }
    }
}

/// Drives one pass over every container pattern
pub struct Sweeper<'a> {
    store: &'a dyn KeyStore,
    options: SweepOptions,
}

impl<'a> Sweeper<'a> {
    pub fn new(store: &'a dyn KeyStore, options: SweepOptions) -> Self {
        Self { store, options }
    }

    /// Run a single sweep, calling `on_container` for each non-empty container
    /// before its jobs are purged.
    pub async fn run<F>(
        &self,
        selection: &StateSelection,
        mut on_container: F,
    ) -> AppResult<SweepReport>
    where
        F: FnMut(&ContainerReport),
    {
        let purger = JobPurger::new(self.store, self.options.scan_count, self.options.dry_run);
        let mut report = SweepReport {
            dry_run: self.options.dry_run,
            ..Default::default()
        };

        for pattern in QUEUE_PATTERNS {
            let keys = scan_keys(self.store, pattern, self.options.scan_count).await?;

            for key in keys {
                let Some(state) = classify(&key) else {
                    continue;
                };
                if !selection.contains(state) {
                    continue;
                }

                let kind = self.store.storage_kind(&key).await?;
                let container = QueueContainer { key, kind, state };
                let job_ids = extract_job_ids(self.store, &container.key, &container.kind).await?;
                if job_ids.is_empty() {
                    continue;
                }

                let entry = ContainerReport {
                    key: container.key.clone(),
                    state,
                    kind: container.kind.clone(),
                    jobs: job_ids.len(),
                };
                tracing::info!(
                    container = %entry.key,
                    state = state.as_str(),
                    kind = entry.kind.as_str(),
                    jobs = entry.jobs,
                    dry_run = self.options.dry_run,
                    "Cleaning container"
                );
                on_container(&entry);

                let mut purged = PurgeOutcome::default();
                for job_id in &job_ids {
                    purged.merge(purger.purge(&container, job_id).await?);
                }

                tracing::info!(
                    container = %entry.key,
                    references_removed = purged.references_removed,
                    keys_matched = purged.keys_matched,
                    keys_deleted = purged.keys_deleted,
                    "Container cleaned"
                );

                report.jobs += entry.jobs;
                report.purged.merge(purged);
                report.containers.push(entry);
            }
        }

        tracing::info!(
            containers = report.containers.len(),
            jobs = report.jobs,
            keys_deleted = report.purged.keys_deleted,
            dry_run = report.dry_run,
            "Sweep finished"
        );

        Ok(report)
    }
}
