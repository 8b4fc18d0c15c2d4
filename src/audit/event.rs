//! Audit Event Module
//!
//! Value objects handed to an [`AuditSink`](super::AuditSink) for every
//! observable cache operation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Resource type reported for plain cache operations.
pub const CACHE_RESOURCE: &str = "cache";

/// Resource type reported for data-subject requests.
pub const USER_DATA_RESOURCE: &str = "user_data";

// == Event Type ==
/// Tag identifying what kind of operation produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuditEventType {
    #[serde(rename = "cache.initialized")]
    CacheInitialized,
    #[serde(rename = "cache.hit")]
    CacheHit,
    #[serde(rename = "cache.miss")]
    CacheMiss,
    #[serde(rename = "cache.set")]
    CacheSet,
    #[serde(rename = "cache.delete")]
    CacheDelete,
    #[serde(rename = "cache.invalidate_entity")]
    InvalidateEntity,
    #[serde(rename = "cache.invalidate_entity_type")]
    InvalidateEntityType,
    #[serde(rename = "cache.clear")]
    CacheClear,
    #[serde(rename = "gdpr.erasure")]
    GdprErasure,
    #[serde(rename = "gdpr.access_request")]
    GdprAccessRequest,
}

impl AuditEventType {
    /// Returns the dotted tag recorded in the audit trail.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::CacheInitialized => "cache.initialized",
            AuditEventType::CacheHit => "cache.hit",
            AuditEventType::CacheMiss => "cache.miss",
            AuditEventType::CacheSet => "cache.set",
            AuditEventType::CacheDelete => "cache.delete",
            AuditEventType::InvalidateEntity => "cache.invalidate_entity",
            AuditEventType::InvalidateEntityType => "cache.invalidate_entity_type",
            AuditEventType::CacheClear => "cache.clear",
            AuditEventType::GdprErasure => "gdpr.erasure",
            AuditEventType::GdprAccessRequest => "gdpr.access_request",
        }
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Action ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Read,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Read => "read",
            AuditAction::Delete => "delete",
        }
    }
}

// == Audit Event ==
/// A single audit record. Built per call and never retained by the cache.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event_type: AuditEventType,
    pub resource_type: String,
    pub resource_id: String,
    pub action: AuditAction,
    pub success: bool,
    pub details: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    // == Constructor ==
    /// Creates an event with empty details, stamped with the current UTC time.
    pub fn new(
        event_type: AuditEventType,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        action: AuditAction,
        success: bool,
    ) -> Self {
        Self {
            event_type,
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            action,
            success,
            details: Map::new(),
            timestamp: Utc::now(),
        }
    }

    /// Shorthand for an event about the cache itself.
    pub fn cache(
        event_type: AuditEventType,
        resource_id: impl Into<String>,
        action: AuditAction,
        success: bool,
    ) -> Self {
        Self::new(event_type, CACHE_RESOURCE, resource_id, action, success)
    }

    // == Detail ==
    /// Attaches one detail field, replacing any previous value under `key`.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}
