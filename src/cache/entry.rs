//! Cache Entry Module
//!
//! A single cached plaintext value with its timestamps.

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// Expiry is absolute from the last write: reads refresh `last_accessed_at`
/// but never extend the lifetime of the entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The full cache key
    pub key: String,
    /// The stored plaintext
    pub value: String,
    /// Write timestamp (Unix milliseconds)
    pub written_at: u64,
    /// Last write or read hit (Unix milliseconds)
    pub last_accessed_at: u64,
    /// Byte length of `value`
    pub size: usize,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry written at `now_ms`.
    pub fn new(key: String, value: String, now_ms: u64) -> Self {
        let size = value.len();
        Self {
            key,
            value,
            written_at: now_ms,
            last_accessed_at: now_ms,
            size,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: the entry is expired once `now >= written_at + ttl`,
    /// so it is already gone at the exact instant the TTL elapses.
    pub fn is_expired(&self, now_ms: u64, ttl_ms: u64) -> bool {
        now_ms >= self.written_at.saturating_add(ttl_ms)
    }

    // == Touch ==
    /// Records a read hit.
    pub fn touch(&mut self, now_ms: u64) {
        self.last_accessed_at = now_ms;
    }
}
