use async_trait::async_trait;
use redis::aio::{ConnectionManager as RedisConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;

use crate::error::{AppError, AppResult};
use crate::store::{KeyStore, StorageKind, StoreKey};

/// Redis-backed key store
#[derive(Clone)]
pub struct RedisStore {
    conn: RedisConnectionManager,
}

impl RedisStore {
    pub fn new(conn: RedisConnectionManager) -> Self {
        Self { conn }
    }

    /// Open a managed connection to the given URL.
    ///
    /// An unreachable server fails on the first attempt.
    pub async fn connect(url: &str) -> AppResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| AppError::Store(format!("Invalid Redis URL: {}", e)))?;
        let config = ConnectionManagerConfig::new().set_number_of_retries(0);
        let conn = RedisConnectionManager::new_with_config(client, config).await?;
        Ok(Self::new(conn))
    }
}

/// Decode container members, skipping any that are not UTF-8 job ids
fn decode_members(key: &StoreKey, raw: Vec<Vec<u8>>) -> Vec<String> {
    raw.into_iter()
        .filter_map(|bytes| match String::from_utf8(bytes) {
            Ok(member) => Some(member),
            Err(e) => {
                tracing::warn!(
                    container = %key,
                    member = %String::from_utf8_lossy(e.as_bytes()),
                    "Skipping non UTF-8 member"
                );
                None
            }
        })
        .collect()
}

#[async_trait]
impl KeyStore for RedisStore {
    async fn scan(
        &self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> AppResult<(u64, Vec<StoreKey>)> {
        let mut conn = self.conn.clone();
        let (next, keys): (u64, Vec<Vec<u8>>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count)
            .query_async(&mut conn)
            .await?;
        Ok((next, keys.into_iter().map(StoreKey::from).collect()))
    }

    async fn storage_kind(&self, key: &StoreKey) -> AppResult<StorageKind> {
        let mut conn = self.conn.clone();
        let name: String = redis::cmd("TYPE")
            .arg(key.as_bytes())
            .query_async(&mut conn)
            .await?;
        Ok(StorageKind::from_type_name(&name))
    }

    async fn list_members(&self, key: &StoreKey) -> AppResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let raw: Vec<Vec<u8>> = conn.lrange(key.as_bytes(), 0, -1).await?;
        Ok(decode_members(key, raw))
    }

    async fn set_members(&self, key: &StoreKey) -> AppResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let raw: Vec<Vec<u8>> = conn.smembers(key.as_bytes()).await?;
        Ok(decode_members(key, raw))
    }

    async fn sorted_set_members(&self, key: &StoreKey) -> AppResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let raw: Vec<Vec<u8>> = conn.zrange(key.as_bytes(), 0, -1).await?;
        Ok(decode_members(key, raw))
    }

    async fn list_remove_all(&self, key: &StoreKey, value: &str) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        // count 0 removes every occurrence
        let removed: u64 = conn.lrem(key.as_bytes(), 0, value).await?;
        Ok(removed)
    }

    async fn set_remove(&self, key: &StoreKey, member: &str) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.srem(key.as_bytes(), member).await?;
        Ok(removed)
    }

    async fn sorted_set_remove(&self, key: &StoreKey, member: &str) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.zrem(key.as_bytes(), member).await?;
        Ok(removed)
    }

    async fn delete(&self, key: &StoreKey) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(key.as_bytes()).await?;
        Ok(removed)
    }
}
