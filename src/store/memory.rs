//! In-process trace store.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::config::{ConfigError, MemoryStoreConfig};
use crate::store::{StoreError, TraceStore};

/// Stale order records tolerated beyond the live entry count before compaction.
const ORDER_SLACK: usize = 64;

struct Entry {
    payload: Bytes,
    /// Insertion sequence; matches exactly one record in the order queue.
    seq: u64,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| exp <= Instant::now())
    }
}

/// A process-local trace store.
///
/// Backed by a sharded concurrent map, so a lock is held only for the
/// duration of a single map access. Retention is unbounded unless a TTL or
/// a maximum entry count is configured.
///
/// With either limit set, an insertion-order queue sits beside the map.
/// Every TTL is the same length, so the queue front is always the next entry
/// to expire and the oldest entry to evict. Each `set` drains the front,
/// which keeps purging and eviction amortized O(1).
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
    /// `(seq, id)` in insertion order. Records whose seq no longer matches
    /// the map are stale and skipped.
    order: Mutex<VecDeque<(u64, String)>>,
    next_seq: AtomicU64,
    ttl: Option<Duration>,
    max_entries: Option<NonZeroUsize>,
}

impl MemoryStore {
    /// Create an unbounded store with no expiry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the retention policy from `config`.
    pub fn from_config(config: &MemoryStoreConfig) -> Result<Self, ConfigError> {
        let max_entries = match config.max_entries {
            Some(max) => Some(NonZeroUsize::new(max).ok_or_else(|| {
                ConfigError::Store("memory.max_entries must be greater than 0".into())
            })?),
            None => None,
        };

        Ok(Self {
            ttl: config.ttl_secs.map(Duration::from_secs),
            max_entries,
            ..Self::default()
        })
    }

    /// Expire entries after `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Keep at most `max` entries, evicting the oldest first.
    pub fn with_max_entries(mut self, max: NonZeroUsize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn tracks_order(&self) -> bool {
        self.ttl.is_some() || self.max_entries.is_some()
    }

    fn over_capacity(&self) -> bool {
        self.max_entries
            .is_some_and(|max| self.entries.len() > max.get())
    }

    /// Record the insert of `seq`, then drop expired entries and evict the
    /// oldest ones while over capacity. Under concurrent inserts the
    /// capacity bound is approximate.
    fn enforce_retention(&self, seq: u64, id: &str) {
        let mut order = self.order.lock().unwrap_or_else(PoisonError::into_inner);
        order.push_back((seq, id.to_string()));

        while let Some((front_seq, front_id)) = order.front() {
            let front_seq = *front_seq;
            let state = self
                .entries
                .get(front_id)
                .filter(|entry| entry.seq == front_seq)
                .map(|entry| entry.is_expired());

            match state {
                Some(expired) if expired || self.over_capacity() => {
                    self.entries
                        .remove_if(front_id, |_, entry| entry.seq == front_seq);
                    tracing::trace!(id = %front_id, expired, "Dropped trace");
                }
                Some(_) => break,
                None => {}
            }
            order.pop_front();
        }

        if order.len() > 2 * self.entries.len() + ORDER_SLACK {
            order.retain(|(seq, id)| {
                self.entries.get(id).is_some_and(|entry| entry.seq == *seq)
            });
        }
    }
}

#[async_trait]
impl TraceStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Bytes>, StoreError> {
        match self.entries.get(id) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.payload.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        self.entries.remove_if(id, |_, entry| entry.is_expired());
        Ok(None)
    }

    async fn set(&self, id: &str, payload: Bytes) -> Result<(), StoreError> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let entry = Entry {
            payload,
            seq,
            expires_at: self.ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.insert(id.to_string(), entry);

        if self.tracks_order() {
            self.enforce_retention(seq, id);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
