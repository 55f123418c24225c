use crate::domain_port::{Clock, TtlStore, TtlStoreError};
use crate::logger::*;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

const SWEEP_INTERVAL_SECS: i64 = 60;

struct Entry {
    value: String,
    expire_at: DateTime<Utc>,
}

/// TTL store kept in a concurrent map. Expired entries are dropped on read,
/// and writes sweep the whole map at most once per [`SWEEP_INTERVAL_SECS`].
pub struct MemoryTtlStore {
    entries: DashMap<String, Entry>,
    clock: Arc<dyn Clock>,
    last_sweep_unix: AtomicI64,
}

impl MemoryTtlStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let last_sweep_unix = AtomicI64::new(clock.unix());
        MemoryTtlStore {
            entries: DashMap::new(),
            clock,
            last_sweep_unix,
        }
    }

    /// Entries held, live or not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sweep_if_due(&self, now: DateTime<Utc>) {
        let now_unix = now.timestamp();
        let last = self.last_sweep_unix.load(Ordering::Relaxed);
        if now_unix - last < SWEEP_INTERVAL_SECS {
            return;
        }
        // one writer sweeps, the rest carry on
        if self
            .last_sweep_unix
            .compare_exchange(last, now_unix, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expire_at > now);
        let swept = before.saturating_sub(self.entries.len());
        if swept > 0 {
            debug!(swept, "expired entries swept");
        }
    }
}

#[async_trait::async_trait]
impl TtlStore for MemoryTtlStore {
    async fn get(&self, key: &str) -> Result<Option<String>, TtlStoreError> {
        let now = self.clock.now();
        let live = match self.entries.get(key) {
            Some(entry) if entry.expire_at > now => Some(entry.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };
        if live.is_none() {
            self.entries.remove_if(key, |_, entry| entry.expire_at <= now);
        }
        Ok(live)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), TtlStoreError> {
        let ttl = i64::try_from(ttl_secs).map_err(|e| TtlStoreError::Store(e.to_string()))?;
        let now = self.clock.now();
        self.sweep_if_due(now);
        let entry = Entry {
            value: value.to_owned(),
            expire_at: now + Duration::seconds(ttl),
        };
        self.entries.insert(key.to_owned(), entry);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), TtlStoreError> {
        self.entries.remove(key);
        Ok(())
    }
}
