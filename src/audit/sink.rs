//! Audit Sink Module
//!
//! The capability the cache reports to, plus the implementations shipped
//! with the crate.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::info;

use super::event::{AuditEvent, AuditEventType};

// == Audit Error ==
/// Failure reported by a sink. The cache logs and discards these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// The backing audit trail cannot be reached
    #[error("Audit sink unavailable: {0}")]
    Unavailable(String),

    /// The sink refused the event
    #[error("Audit event rejected: {0}")]
    Rejected(String),
}

// == Audit Sink ==
/// Records discrete audit events.
///
/// Calls are fire-and-forget from the cache's point of view: an `Err` is
/// logged at the call site and never reaches the caller of a cache operation.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

impl<S: AuditSink + ?Sized> AuditSink for Arc<S> {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        (**self).record(event)
    }
}

// == No-op Sink ==
/// Sink used when no audit collaborator is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) -> Result<(), AuditError> {
        Ok(())
    }
}

// == Tracing Sink ==
/// Writes every event as a structured record on the `audit` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let details = serde_json::to_string(&event.details)
            .map_err(|e| AuditError::Rejected(e.to_string()))?;

        info!(
            target: "audit",
            event_type = event.event_type.as_str(),
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            action = event.action.as_str(),
            success = event.success,
            details = %details,
            timestamp = %event.timestamp.to_rfc3339(),
            "audit event"
        );
        Ok(())
    }
}

// == Memory Sink ==
/// Keeps every recorded event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the recorded events of one type.
    pub fn events_of(&self, event_type: AuditEventType) -> Vec<AuditEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Returns the recorded event tags in order.
    pub fn event_types(&self) -> Vec<AuditEventType> {
        self.events().iter().map(|e| e.event_type).collect()
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops everything recorded so far.
    pub fn reset(&self) {
        match self.events.lock() {
            Ok(mut events) => events.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let mut events = self
            .events
            .lock()
            .map_err(|_| AuditError::Unavailable("memory sink lock poisoned".to_string()))?;
        events.push(event.clone());
        Ok(())
    }
}
