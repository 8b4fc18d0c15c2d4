//! Decrypt Cache - a bounded, audit-integrated plaintext cache
//!
//! Holds previously decrypted plaintext so identical ciphertext references
//! are not decrypted twice. Entries are bounded by count (LRU eviction) and
//! by age (absolute TTL), can be invalidated by entity or entity type, and
//! support per-subject erasure and access reports. Every operation is
//! reported to an optional audit sink.

pub mod api;
pub mod audit;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use audit::{AuditEvent, AuditSink};
pub use cache::{CacheStore, ComplianceReporter};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
