use crate::error::AppResult;
use crate::store::{KeyStore, StorageKind, StoreKey};

/// Member tokens of a container, read according to its storage kind.
///
/// Lists keep store order and duplicates, sets are unordered, sorted sets
/// come back in score order. Any other kind is treated as an empty container.
pub async fn extract_job_ids(
    store: &dyn KeyStore,
    key: &StoreKey,
    kind: &StorageKind,
) -> AppResult<Vec<String>> {
    match kind {
        StorageKind::List => store.list_members(key).await,
        StorageKind::Set => store.set_members(key).await,
        StorageKind::SortedSet => store.sorted_set_members(key).await,
        StorageKind::Unknown(name) => {
            tracing::debug!(container = %key, kind = %name, "Not a job container, skipping");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn test_list_keeps_order_and_duplicates() {
        let store = InMemoryStore::new();
        store.push_list("bull:q:wait", &["3", "1", "3"]).await;

        let container = StoreKey::from("bull:q:wait");
        let ids = extract_job_ids(&store, &container, &StorageKind::List)
            .await
            .unwrap();
        assert_eq!(ids, vec!["3", "1", "3"]);
    }

    #[tokio::test]
    async fn test_set_members() {
        let store = InMemoryStore::new();
        store.add_set("bull:q:active", &["a", "b", "a"]).await;

        let container = StoreKey::from("bull:q:active");
        let mut ids = extract_job_ids(&store, &container, &StorageKind::Set)
            .await
            .unwrap();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_sorted_set_in_score_order() {
        let store = InMemoryStore::new();
        store
            .add_sorted("bull:q:delayed", &[(5.0, "late"), (1.0, "early")])
            .await;

        let container = StoreKey::from("bull:q:delayed");
        let ids = extract_job_ids(&store, &container, &StorageKind::SortedSet)
            .await
            .unwrap();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_unknown_kind_is_empty_without_store_calls() {
        let store = InMemoryStore::new();
        store.set_hash("bull:q:failed", &[("f", "v")]).await;

        let ids = extract_job_ids(
            &store,
            &StoreKey::from("bull:q:failed"),
            &StorageKind::Unknown("hash".to_string()),
        )
        .await
        .unwrap();
        assert!(ids.is_empty());
        assert_eq!(store.call_count(), 0);
    }
}
