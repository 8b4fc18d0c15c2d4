//! Cache Module
//!
//! In-memory plaintext caching with TTL expiration, LRU eviction,
//! key-scoped invalidation and data-subject compliance operations.

use std::time::Duration;

mod clock;
mod compliance;
mod entry;
pub mod key;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use compliance::{ComplianceReporter, UserCacheEntry};
pub use entry::CacheEntry;
pub use key::{CacheKey, USER_NAMESPACE};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{CacheStore, CacheStoreBuilder};

// == Public Constants ==
/// Default entry bound
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Default lifetime of an entry, measured from its last write
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);
