use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::{CacheBackend, CacheResult};

/// Expired entries are swept once per this many writes.
const SWEEP_EVERY: u64 = 256;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// Process-local [`CacheBackend`].
///
/// Used when no Redis is configured and as the test double for it. Reads skip
/// expired entries; writes periodically sweep them out. Expiry is measured
/// with the Tokio clock, so paused-time tests can advance past a TTL.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<DashMap<String, Entry>>,
    writes: Arc<AtomicU64>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_live(entry: &Entry) -> bool {
        entry.expires_at > Instant::now()
    }

    /// Stored entries, expired ones included until the next sweep.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time left on a live entry, like Redis `TTL`.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.entries
            .get(key)
            .filter(|entry| Self::is_live(entry))
            .map(|entry| entry.expires_at - Instant::now())
    }

    /// Drop every expired entry, returning how many went.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| Self::is_live(entry));
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!(purged, "Swept expired cache entries");
        }
        purged
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>> {
        let value = match self.entries.get(key) {
            Some(entry) if Self::is_live(&entry) => Some(entry.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };
        if value.is_none() {
            self.entries.remove_if(key, |_, entry| !Self::is_live(entry));
        }
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: String, ttl_secs: u64) -> CacheResult<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        if self.writes.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.purge_expired();
        }
        Ok(())
    }

    async fn take_raw(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self
            .entries
            .remove(key)
            .filter(|(_, entry)| Self::is_live(entry))
            .map(|(_, entry)| entry.value))
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| Self::is_live(entry.value()) && glob_match(pattern, entry.key()))
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete_matching(&self, pattern: &str) -> CacheResult<usize> {
        let keys = self.keys(pattern).await?;
        for key in &keys {
            self.entries.remove(key);
        }
        Ok(keys.len())
    }

    async fn ping(&self) -> bool {
        true
    }
}

/// Redis-style glob supporting `*` only.
fn glob_match(pattern: &str, candidate: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == candidate;
    }

    let mut rest = candidate;
    let first = parts[0];
    if !rest.starts_with(first) {
        return false;
    }
    rest = &rest[first.len()..];

    let last = parts[parts.len() - 1];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}
