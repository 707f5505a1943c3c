pub mod key;
pub mod kind;
pub mod memory_store;
pub mod redis_store;

pub use key::StoreKey;
pub use kind::StorageKind;
pub use memory_store::InMemoryStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;

use crate::error::AppResult;

/// Key-value store trait for abstracting the queue backing store.
///
/// Every removal returns how many entries it actually removed; zero means the
/// target was already gone, which callers treat as success.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// One incremental scan round. Returns the next cursor (0 when exhausted)
    async fn scan(&self, cursor: u64, pattern: &str, count: usize)
        -> AppResult<(u64, Vec<StoreKey>)>;

    /// Runtime storage representation of a key
    async fn storage_kind(&self, key: &StoreKey) -> AppResult<StorageKind>;

    /// Full contents of a list, in list order
    async fn list_members(&self, key: &StoreKey) -> AppResult<Vec<String>>;

    /// All members of a set
    async fn set_members(&self, key: &StoreKey) -> AppResult<Vec<String>>;

    /// Full contents of a sorted set, in score order
    async fn sorted_set_members(&self, key: &StoreKey) -> AppResult<Vec<String>>;

    /// Remove every occurrence of a value from a list
    async fn list_remove_all(&self, key: &StoreKey, value: &str) -> AppResult<u64>;

    /// Remove a member from a set
    async fn set_remove(&self, key: &StoreKey, member: &str) -> AppResult<u64>;

    /// Remove a member from a sorted set
    async fn sorted_set_remove(&self, key: &StoreKey, member: &str) -> AppResult<u64>;

    /// Delete a key if present
    async fn delete(&self, key: &StoreKey) -> AppResult<u64>;
}
