//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking, absolute
//! TTL expiration, key-scoped invalidation and audit reporting.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::audit::{AuditAction, AuditEvent, AuditEventType, AuditSink, NoopAuditSink};
use crate::cache::key::{entity_id, CacheKey};
use crate::cache::{
    CacheEntry, CacheStats, Clock, LruTracker, SystemClock, DEFAULT_MAX_ENTRIES, DEFAULT_TTL,
};

// == Cache Store ==
/// Bounded plaintext cache with LRU eviction and TTL expiry.
///
/// The store is a plain synchronous structure: `get` takes `&mut self`
/// because a hit updates recency. Hosts that share it across tasks wrap it
/// in a single lock (see `api::AppState`), which gives every operation the
/// one exclusion scope LRU bookkeeping needs.
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Absolute lifetime of an entry from its last write
    ttl_ms: u64,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

// == Builder ==
/// Collects construction parameters for a [`CacheStore`].
pub struct CacheStoreBuilder {
    max_entries: usize,
    ttl: Duration,
    audit: Option<Arc<dyn AuditSink>>,
    clock: Option<Arc<dyn Clock>>,
}

impl Default for CacheStoreBuilder {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: DEFAULT_TTL,
            audit: None,
            clock: None,
        }
    }
}

impl CacheStoreBuilder {
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Wires in an audit collaborator. Without one, events are dropped.
    pub fn audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    // == Build ==
    /// Creates the store and records `cache.initialized` with the effective
    /// configuration.
    pub fn build(self) -> CacheStore {
        // Saturate instead of truncating so a huge TTL stays effectively forever.
        let ttl_ms = u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX);
        let store = CacheStore {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(self.max_entries, ttl_ms),
            max_entries: self.max_entries,
            ttl_ms,
            audit: self.audit.unwrap_or_else(|| Arc::new(NoopAuditSink)),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        };

        info!(
            max_entries = store.max_entries,
            ttl_ms = store.ttl_ms,
            "Plaintext cache initialized"
        );
        store.emit(
            AuditEvent::cache(
                AuditEventType::CacheInitialized,
                "cache",
                AuditAction::Create,
                true,
            )
            .with_detail("max_size", store.max_entries)
            .with_detail("ttl_ms", store.ttl_ms),
        );

        store
    }
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the system clock and no audit sink.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the cache can hold
    /// * `ttl` - Lifetime of an entry, measured from its last write
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self::builder().max_entries(max_entries).ttl(ttl).build()
    }

    pub fn builder() -> CacheStoreBuilder {
        CacheStoreBuilder::default()
    }

    // == Get ==
    /// Retrieves a copy of the cached value.
    ///
    /// A hit refreshes recency. An entry found past its TTL is removed and
    /// reported as a miss.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let now = self.clock.now_ms();

        if let Some(entry) = self.entries.get_mut(key) {
            if !entry.is_expired(now, self.ttl_ms) {
                entry.touch(now);
                let value = entry.value.clone();
                self.lru.touch(key);
                self.stats.record_hit();
                self.emit(AuditEvent::cache(
                    AuditEventType::CacheHit,
                    key,
                    AuditAction::Read,
                    true,
                ));
                return Some(value);
            }

            self.remove_entry(key);
            self.stats.record_expirations(1);
            debug!(key, "Dropped expired entry on read");
            self.record_miss(key, "expired");
            return None;
        }

        self.record_miss(key, "absent");
        None
    }

    // == Set ==
    /// Stores a value, overwriting any previous entry under the same key.
    ///
    /// The write restarts the entry's TTL and makes it the most recently
    /// used. If the cache grows past its bound, least recently used entries
    /// are evicted until it fits.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let now = self.clock.now_ms();
        let entry = CacheEntry::new(key.clone(), value.into(), now);
        let size = entry.size;

        let overwrite = self.entries.insert(key.clone(), entry).is_some();
        self.lru.touch(&key);
        self.evict_overflow();
        self.stats.set_size(self.entries.len());

        self.emit(
            AuditEvent::cache(AuditEventType::CacheSet, key, AuditAction::Create, true)
                .with_detail("size", size)
                .with_detail("overwrite", overwrite),
        );
    }

    // == Get Or Insert ==
    /// Returns the cached value, or runs `decrypt` on a miss and caches its
    /// output. A failed `decrypt` leaves the cache untouched.
    pub fn get_or_insert_with<F, E>(&mut self, key: &str, decrypt: F) -> Result<String, E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = decrypt()?;
        self.set(key, value.clone());
        Ok(value)
    }

    // == Delete ==
    /// Removes a single entry. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        self.emit(AuditEvent::cache(
            AuditEventType::CacheDelete,
            key,
            AuditAction::Delete,
            removed,
        ));
        removed
    }

    // == Invalidate Entity ==
    /// Removes every entry whose key starts with the segments
    /// `namespace:id`. Returns the number of entries removed.
    pub fn invalidate_entity(&mut self, namespace: &str, id: &str) -> usize {
        let removed = self.remove_where(|key| key.is_entity(namespace, id));
        let resource_id = entity_id(namespace, id);

        info!(entity = %resource_id, removed, "Invalidated cached entity");
        self.emit(
            AuditEvent::cache(
                AuditEventType::InvalidateEntity,
                resource_id,
                AuditAction::Delete,
                true,
            )
            .with_detail("removed", removed),
        );
        removed
    }

    // == Invalidate Entity Type ==
    /// Removes every entry whose first key segment is `namespace`.
    pub fn invalidate_entity_type(&mut self, namespace: &str) -> usize {
        let removed = self.remove_where(|key| key.in_namespace(namespace));

        info!(namespace, removed, "Invalidated cached entity type");
        self.emit(
            AuditEvent::cache(
                AuditEventType::InvalidateEntityType,
                namespace,
                AuditAction::Delete,
                true,
            )
            .with_detail("removed", removed),
        );
        removed
    }

    // == Clear ==
    /// Removes all entries. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        self.stats.set_size(0);

        info!(removed, "Cache cleared");
        self.emit(
            AuditEvent::cache(AuditEventType::CacheClear, "*", AuditAction::Delete, true)
                .with_detail("removed", removed),
        );
        removed
    }

    // == Stats ==
    /// Returns a copy of the current statistics. Touches nothing.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_size(self.entries.len());
        stats
    }

    // == Purge Expired ==
    /// Removes all entries whose TTL has elapsed.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let ttl_ms = self.ttl_ms;
        let expired: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired(now, ttl_ms))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }
        self.stats.record_expirations(expired.len());
        expired.len()
    }

    /// True when `key` holds an unexpired entry. Does not affect recency.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now, self.ttl_ms))
    }

    /// Returns the current number of entries, expired ones included until
    /// they are observed or purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    // == Crate Internals ==
    /// Removes every entry whose parsed key satisfies `matches`.
    pub(crate) fn remove_where(&mut self, matches: impl Fn(&CacheKey) -> bool) -> usize {
        let doomed: Vec<String> = self
            .entries
            .keys()
            .filter(|key| matches(&CacheKey::parse(key)))
            .cloned()
            .collect();

        for key in &doomed {
            self.remove_entry(key);
        }
        doomed.len()
    }

    /// Copies `(key, size)` for every unexpired entry whose parsed key
    /// satisfies `matches`, sorted by key. Read-only.
    pub(crate) fn fresh_sizes_where(
        &self,
        matches: impl Fn(&CacheKey) -> bool,
    ) -> Vec<(String, usize)> {
        let now = self.clock.now_ms();
        let mut found: Vec<(String, usize)> = self
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now, self.ttl_ms))
            .filter(|entry| matches(&CacheKey::parse(&entry.key)))
            .map(|entry| (entry.key.clone(), entry.size))
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));
        found
    }

    /// Hands an event to the audit sink. Sink errors and panics are logged
    /// and dropped so they never change the outcome of a cache operation.
    pub(crate) fn emit(&self, event: AuditEvent) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.audit.record(&event)));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(
                    event_type = %event.event_type,
                    resource_id = %event.resource_id,
                    error = %e,
                    "Audit sink failed, event dropped"
                );
            }
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                warn!(
                    event_type = %event.event_type,
                    resource_id = %event.resource_id,
                    panic = %panic_msg,
                    "Audit sink panicked, event dropped"
                );
            }
        }
    }

    fn record_miss(&mut self, key: &str, reason: &str) {
        self.stats.record_miss();
        self.emit(
            AuditEvent::cache(AuditEventType::CacheMiss, key, AuditAction::Read, false)
                .with_detail("reason", reason),
        );
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.set_size(self.entries.len());
        }
        removed
    }

    fn evict_overflow(&mut self) {
        while self.entries.len() > self.max_entries {
            let Some(oldest) = self.lru.evict_oldest() else {
                break;
            };
            self.entries.remove(&oldest);
            self.stats.record_eviction();
            debug!(key = %oldest, "Evicted least recently used entry");
        }
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::builder().build()
    }
}

// Values are plaintext and must never reach logs through `{:?}`.
impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("len", &self.entries.len())
            .field("max_entries", &self.max_entries)
            .field("ttl_ms", &self.ttl_ms)
            .field("stats", &self.stats)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
