//! Audit Module
//!
//! Event shapes and the optional sink the cache reports its operations to.

mod event;
mod sink;

pub use event::{AuditAction, AuditEvent, AuditEventType, CACHE_RESOURCE, USER_DATA_RESOURCE};
pub use sink::{AuditError, AuditSink, MemoryAuditSink, NoopAuditSink, TracingAuditSink};
