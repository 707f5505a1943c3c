use std::collections::HashSet;

use crate::error::AppResult;
use crate::store::{KeyStore, StoreKey};

/// Enumerate every key currently matching `pattern`.
///
/// Walks the keyspace with bounded SCAN rounds of `count` keys until the
/// cursor comes back to 0. SCAN may return a key more than once; each key is
/// yielded once, in first-seen order.
pub async fn scan_keys(
    store: &dyn KeyStore,
    pattern: &str,
    count: usize,
) -> AppResult<Vec<StoreKey>> {
    let mut cursor = 0;
    let mut seen = HashSet::new();
    let mut keys = Vec::new();

    loop {
        let (next, batch) = store.scan(cursor, pattern, count).await?;
        for key in batch {
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }
        if next == 0 {
            break;
        }
        cursor = next;
    }

    tracing::debug!(pattern = %pattern, matched = keys.len(), "Scan finished");

    Ok(keys)
}
