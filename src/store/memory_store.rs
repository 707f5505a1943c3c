use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::store::{KeyStore, StorageKind, StoreKey};

/// In-memory key store for unit testing.
///
/// Mimics the Redis behaviour the sweep relies on: binary key names, glob
/// matching in SCAN, cursor paging, TYPE names, and empty containers
/// disappearing.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<BTreeMap<StoreKey, Value>>>,
    calls: Arc<AtomicU64>,
    mutations: Arc<AtomicU64>,
    disconnected: Arc<AtomicBool>,
}

#[derive(Debug, Clone)]
enum Value {
    String(String),
    Hash(BTreeMap<String, String>),
    List(Vec<String>),
    Set(BTreeSet<String>),
    SortedSet(Vec<(f64, String)>),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Hash(_) => "hash",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::SortedSet(_) => "zset",
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Value::String(_) => false,
            Value::Hash(h) => h.is_empty(),
            Value::List(l) => l.is_empty(),
            Value::Set(s) => s.is_empty(),
            Value::SortedSet(z) => z.is_empty(),
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ============ Seeding ============

    pub async fn set_string(&self, key: impl AsRef<[u8]>, value: &str) {
        let mut inner = self.inner.lock().await;
        inner.insert(key.as_ref().into(), Value::String(value.to_string()));
    }

    pub async fn set_hash(&self, key: impl AsRef<[u8]>, fields: &[(&str, &str)]) {
        let mut inner = self.inner.lock().await;
        let hash = fields
            .iter()
            .map(|(f, v)| (f.to_string(), v.to_string()))
            .collect();
        inner.insert(key.as_ref().into(), Value::Hash(hash));
    }

    pub async fn push_list(&self, key: impl AsRef<[u8]>, values: &[&str]) {
        let mut inner = self.inner.lock().await;
        let entry = inner
            .entry(key.as_ref().into())
            .or_insert_with(|| Value::List(Vec::new()));
        if let Value::List(list) = entry {
            list.extend(values.iter().map(|v| v.to_string()));
        }
    }

    pub async fn add_set(&self, key: impl AsRef<[u8]>, members: &[&str]) {
        let mut inner = self.inner.lock().await;
        let entry = inner
            .entry(key.as_ref().into())
            .or_insert_with(|| Value::Set(BTreeSet::new()));
        if let Value::Set(set) = entry {
            set.extend(members.iter().map(|m| m.to_string()));
        }
    }

    pub async fn add_sorted(&self, key: impl AsRef<[u8]>, members: &[(f64, &str)]) {
        let mut inner = self.inner.lock().await;
        let entry = inner
            .entry(key.as_ref().into())
            .or_insert_with(|| Value::SortedSet(Vec::new()));
        if let Value::SortedSet(zset) = entry {
            for (score, member) in members {
                zset.retain(|(_, m)| m != member);
                zset.push((*score, member.to_string()));
            }
            zset.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        }
    }

    // ============ Inspection ============

    pub async fn exists(&self, key: impl AsRef<[u8]>) -> bool {
        self.inner.lock().await.contains_key(key.as_ref())
    }

    pub async fn get_string(&self, key: impl AsRef<[u8]>) -> Option<String> {
        match self.inner.lock().await.get(key.as_ref()) {
            Some(Value::String(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Key names, lossily decoded
    pub async fn keys(&self) -> Vec<String> {
        self.inner
            .lock()
            .await
            .keys()
            .map(|k| k.to_string())
            .collect()
    }

    /// Members of a list, set or sorted set, in storage order
    pub async fn members(&self, key: impl AsRef<[u8]>) -> Vec<String> {
        let inner = self.inner.lock().await;
        match inner.get(key.as_ref()) {
            Some(Value::List(list)) => list.clone(),
            Some(Value::Set(set)) => set.iter().cloned().collect(),
            Some(Value::SortedSet(zset)) => zset.iter().map(|(_, m)| m.clone()).collect(),
            _ => Vec::new(),
        }
    }

    /// Number of store calls issued so far
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of mutating store calls issued so far
    pub fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail as if the connection dropped
    pub fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }

    fn record_call(&self) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.disconnected.load(Ordering::SeqCst) {
            return Err(AppError::Store("Connection refused".to_string()));
        }
        Ok(())
    }

    fn record_mutation(&self) -> AppResult<()> {
        self.record_call()?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn wrong_type(key: &StoreKey) -> AppError {
        AppError::Store(format!(
            "WRONGTYPE Operation against a key holding the wrong kind of value: {}",
            key
        ))
    }

    /// Apply a removal to a container and drop the key once it is empty
    async fn remove_from<F>(&self, key: &StoreKey, remove: F) -> AppResult<u64>
    where
        F: FnOnce(&mut Value) -> Option<u64> + Send,
    {
        self.record_mutation()?;
        let mut inner = self.inner.lock().await;
        let Some(value) = inner.get_mut(key) else {
            return Ok(0);
        };
        let removed = remove(value).ok_or_else(|| Self::wrong_type(key))?;
        if value.is_empty() {
            inner.remove(key);
        }
        Ok(removed)
    }
}

#[async_trait]
impl KeyStore for InMemoryStore {
    async fn scan(
        &self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> AppResult<(u64, Vec<StoreKey>)> {
        self.record_call()?;
        let inner = self.inner.lock().await;
        let start = cursor as usize;
        let end = start.saturating_add(count.max(1));
        let keys = inner
            .keys()
            .skip(start)
            .take(end - start)
            .filter(|k| glob_match(pattern.as_bytes(), k.as_bytes()))
            .cloned()
            .collect();
        let next = if end >= inner.len() { 0 } else { end as u64 };
        Ok((next, keys))
    }

    async fn storage_kind(&self, key: &StoreKey) -> AppResult<StorageKind> {
        self.record_call()?;
        let inner = self.inner.lock().await;
        let name = inner.get(key).map_or("none", Value::type_name);
        Ok(StorageKind::from_type_name(name))
    }

    async fn list_members(&self, key: &StoreKey) -> AppResult<Vec<String>> {
        self.record_call()?;
        let inner = self.inner.lock().await;
        match inner.get(key) {
            None => Ok(Vec::new()),
            Some(Value::List(list)) => Ok(list.clone()),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    async fn set_members(&self, key: &StoreKey) -> AppResult<Vec<String>> {
        self.record_call()?;
        let inner = self.inner.lock().await;
        match inner.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    async fn sorted_set_members(&self, key: &StoreKey) -> AppResult<Vec<String>> {
        self.record_call()?;
        let inner = self.inner.lock().await;
        match inner.get(key) {
            None => Ok(Vec::new()),
            Some(Value::SortedSet(zset)) => Ok(zset.iter().map(|(_, m)| m.clone()).collect()),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    async fn list_remove_all(&self, key: &StoreKey, value: &str) -> AppResult<u64> {
        self.remove_from(key, |v| match v {
            Value::List(list) => {
                let before = list.len();
                list.retain(|item| item != value);
                Some((before - list.len()) as u64)
            }
            _ => None,
        })
        .await
    }

    async fn set_remove(&self, key: &StoreKey, member: &str) -> AppResult<u64> {
        self.remove_from(key, |v| match v {
            Value::Set(set) => Some(u64::from(set.remove(member))),
            _ => None,
        })
        .await
    }

    async fn sorted_set_remove(&self, key: &StoreKey, member: &str) -> AppResult<u64> {
        self.remove_from(key, |v| match v {
            Value::SortedSet(zset) => {
                let before = zset.len();
                zset.retain(|(_, m)| m != member);
                Some((before - zset.len()) as u64)
            }
            _ => None,
        })
        .await
    }

    async fn delete(&self, key: &StoreKey) -> AppResult<u64> {
        self.record_mutation()?;
        let mut inner = self.inner.lock().await;
        Ok(u64::from(inner.remove(key).is_some()))
    }
}

/// Redis-style glob matching over raw bytes: `*`, `?`, `[...]` classes (with
/// `^` and ranges) and `\` escapes.
///
/// Iterative, backtracking only to the most recent `*`, so matching stays
/// linear in practice whatever the number of stars.
pub fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    // (pattern index after the last `*`, text index it is currently absorbing up to)
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        let step = match pattern.get(p) {
            Some(b'*') => {
                star = Some((p + 1, t));
                p += 1;
                continue;
            }
            Some(b'?') => Some(p + 1),
            Some(b'[') => match match_class(pattern, p + 1, text[t]) {
                Some((true, next)) => Some(next),
                Some((false, _)) => None,
                // unterminated class matches a literal '['
                None => (text[t] == b'[').then_some(p + 1),
            },
            Some(b'\\') if p + 1 < pattern.len() => (pattern[p + 1] == text[t]).then_some(p + 2),
            Some(&literal) => (literal == text[t]).then_some(p + 1),
            None => None,
        };

        match (step, star) {
            (Some(next), _) => {
                p = next;
                t += 1;
            }
            (None, Some((after_star, absorbed))) => {
                p = after_star;
                t = absorbed + 1;
                star = Some((after_star, absorbed + 1));
            }
            (None, None) => return false,
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}

/// Match `c` against the class starting at `start` (just after `[`). Returns
/// the outcome and the pattern index after the closing `]`, or `None` when
/// the class is unterminated.
fn match_class(pattern: &[u8], start: usize, c: u8) -> Option<(bool, usize)> {
    let negate = pattern.get(start) == Some(&b'^');
    let mut i = if negate { start + 1 } else { start };
    let mut matched = false;

    while i < pattern.len() {
        match pattern[i] {
            b']' => return Some((matched != negate, i + 1)),
            b'\\' if i + 1 < pattern.len() => {
                matched |= pattern[i + 1] == c;
                i += 2;
            }
            lo if i + 2 < pattern.len() && pattern[i + 1] == b'-' && pattern[i + 2] != b']' => {
                let hi = pattern[i + 2];
                let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
                matched |= lo <= c && c <= hi;
                i += 3;
            }
            other => {
                matched |= other == c;
                i += 1;
            }
        }
    }
    None
}
