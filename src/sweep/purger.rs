use serde::Serialize;

use crate::error::AppResult;
use crate::store::{KeyStore, StorageKind};
use crate::sweep::scanner::scan_keys;
use crate::sweep::QueueContainer;

/// What a single job purge did (or, in dry-run, would do)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeOutcome {
    /// Container entries removed for the job
    pub references_removed: u64,
    /// Keys whose name contains the job id
    pub keys_matched: u64,
    /// Keys actually deleted
    pub keys_deleted: u64,
}

impl PurgeOutcome {
    pub fn merge(&mut self, other: PurgeOutcome) {
        self.references_removed += other.references_removed;
        self.keys_matched += other.keys_matched;
        self.keys_deleted += other.keys_deleted;
    }
}

/// Removes jobs from their container and deletes their data keys
pub struct JobPurger<'a> {
    store: &'a dyn KeyStore,
    scan_count: usize,
    dry_run: bool,
}

impl<'a> JobPurger<'a> {
    pub fn new(store: &'a dyn KeyStore, scan_count: usize, dry_run: bool) -> Self {
        Self {
            store,
            scan_count,
            dry_run,
        }
    }

    /// Purge one job.
    ///
    /// The container reference goes first, then every key containing the job
    /// id, so nothing scanning the container can follow a reference to data
    /// that is already gone. Targets that have vanished in the meantime count
    /// as removed-nothing, not as errors. Dry-run only enumerates the keys.
    pub async fn purge(&self, container: &QueueContainer, job_id: &str) -> AppResult<PurgeOutcome> {
        let mut outcome = PurgeOutcome::default();

        if job_id.is_empty() {
            tracing::warn!(container = %container.key, "Skipping empty job id");
            return Ok(outcome);
        }

        if !self.dry_run {
            outcome.references_removed = self.remove_reference(container, job_id).await?;
        }

        let job_keys = scan_keys(self.store, &job_key_pattern(job_id), self.scan_count).await?;
        outcome.keys_matched = job_keys.len() as u64;

        if !self.dry_run {
            for key in &job_keys {
                outcome.keys_deleted += self.store.delete(key).await?;
            }
        }

        tracing::debug!(
            container = %container.key,
            job_id = %job_id,
            references_removed = outcome.references_removed,
            keys_matched = outcome.keys_matched,
            keys_deleted = outcome.keys_deleted,
            dry_run = self.dry_run,
            "Job purged"
        );

        Ok(outcome)
    }

    async fn remove_reference(&self, container: &QueueContainer, job_id: &str) -> AppResult<u64> {
        let key = &container.key;
        match &container.kind {
            StorageKind::List => self.store.list_remove_all(key, job_id).await,
            StorageKind::Set => self.store.set_remove(key, job_id).await,
            StorageKind::SortedSet => self.store.sorted_set_remove(key, job_id).await,
            StorageKind::Unknown(_) => Ok(0),
        }
    }
}

/// Scan pattern matching every key that contains `job_id` literally
pub fn job_key_pattern(job_id: &str) -> String {
    format!("*{}*", escape_glob(job_id))
}

/// Escape glob metacharacters so a token matches only itself
pub fn escape_glob(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len());
    for c in token.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, StoreKey};
    use crate::sweep::QueueState;

    fn container(key: &str, kind: StorageKind) -> QueueContainer {
        QueueContainer {
            key: StoreKey::from(key),
            kind,
            state: QueueState::Failed,
        }
    }

    #[test]
    fn test_escape_glob() {
        assert_eq!(escape_glob("abc-123"), "abc-123");
        assert_eq!(escape_glob("a*b?[c]\\"), "a\\*b\\?\\[c\\]\\\\");
        assert_eq!(job_key_pattern("42"), "*42*");
    }

    #[tokio::test]
    async fn test_purge_removes_reference_and_job_keys() {
        let store = InMemoryStore::new();
        store.push_list("bull:q:failed", &["abc", "def", "abc"]).await;
        store.set_hash("bull:q:abc", &[("data", "{}")]).await;
        store.set_string("bull:q:abc:logs", "log").await;
        store.set_hash("bull:q:def", &[("data", "{}")]).await;

        let purger = JobPurger::new(&store, 100, false);
        let outcome = purger
            .purge(&container("bull:q:failed", StorageKind::List), "abc")
            .await
            .unwrap();

        assert_eq!(outcome.references_removed, 2);
        assert_eq!(outcome.keys_matched, 2);
        assert_eq!(outcome.keys_deleted, 2);
        assert_eq!(store.members("bull:q:failed").await, vec!["def"]);
        assert!(!store.exists("bull:q:abc").await);
        assert!(!store.exists("bull:q:abc:logs").await);
        assert!(store.exists("bull:q:def").await);
    }

    #[tokio::test]
    async fn test_purge_is_idempotent() {
        let store = InMemoryStore::new();
        store.add_set("bull:q:active", &["abc"]).await;
        store.set_hash("bull:q:abc", &[("data", "{}")]).await;

        let purger = JobPurger::new(&store, 100, false);
        let c = container("bull:q:active", StorageKind::Set);
        purger.purge(&c, "abc").await.unwrap();
        let again = purger.purge(&c, "abc").await.unwrap();

        assert_eq!(again, PurgeOutcome::default());
    }

    #[tokio::test]
    async fn test_dry_run_issues_no_mutations() {
        let store = InMemoryStore::new();
        store.add_sorted("bull:q:delayed", &[(1.0, "abc")]).await;
        store.set_hash("bull:q:abc", &[("data", "{}")]).await;

        let purger = JobPurger::new(&store, 100, true);
        let outcome = purger
            .purge(&container("bull:q:delayed", StorageKind::SortedSet), "abc")
            .await
            .unwrap();

        assert_eq!(outcome.keys_matched, 1);
        assert_eq!(outcome.keys_deleted, 0);
        assert_eq!(outcome.references_removed, 0);
        assert_eq!(store.mutation_count(), 0);
        assert!(store.exists("bull:q:abc").await);
    }

    #[tokio::test]
    async fn test_non_utf8_job_keys_are_deleted() {
        let store = InMemoryStore::new();
        store.push_list("bull:q:failed", &["abc"]).await;
        store.set_string(b"bull:q:abc:\xfe\xff", "x").await;

        let purger = JobPurger::new(&store, 100, false);
        let outcome = purger
            .purge(&container("bull:q:failed", StorageKind::List), "abc")
            .await
            .unwrap();

        assert_eq!(outcome.keys_deleted, 1);
        assert!(!store.exists(b"bull:q:abc:\xfe\xff").await);
    }

    #[tokio::test]
    async fn test_glob_characters_in_job_id_match_literally() {
        let store = InMemoryStore::new();
        store.push_list("bull:q:failed", &["a*"]).await;
        store.set_string("bull:q:a*", "x").await;
        store.set_string("bull:q:ab", "keep").await;

        let purger = JobPurger::new(&store, 100, false);
        purger
            .purge(&container("bull:q:failed", StorageKind::List), "a*")
            .await
            .unwrap();

        assert!(!store.exists("bull:q:a*").await);
        assert_eq!(store.get_string("bull:q:ab").await.as_deref(), Some("keep"));
    }

    #[tokio::test]
    async fn test_empty_job_id_is_skipped() {
        let store = InMemoryStore::new();
        store.set_string("anything", "x").await;

        let purger = JobPurger::new(&store, 100, false);
        let outcome = purger
            .purge(&container("bull:q:failed", StorageKind::List), "")
            .await
            .unwrap();

        assert_eq!(outcome, PurgeOutcome::default());
        assert!(store.exists("anything").await);
    }
}
