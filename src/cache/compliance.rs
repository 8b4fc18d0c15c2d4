//! Compliance Module
//!
//! Data-subject operations over the `user:<subject_id>:...` key namespace:
//! erasure (Right to Erasure) and access reporting (Right of Access).

use serde::Serialize;
use tracing::info;

use crate::audit::{AuditAction, AuditEvent, AuditEventType, USER_DATA_RESOURCE};
use crate::cache::key::{entity_id, USER_NAMESPACE};
use crate::cache::CacheStore;

const ERASURE_BASIS: &str = "GDPR Article 17 - Right to Erasure";
const ACCESS_BASIS: &str = "GDPR Article 15 - Right of Access";

// == Report Entry ==
/// One cached item held about a data subject. Never carries the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCacheEntry {
    pub key: String,
    /// Byte length of the cached value
    pub size: usize,
}

// == Compliance Reporter ==
/// Subject-scoped erasure and access reporting.
pub trait ComplianceReporter {
    /// Removes everything cached under `user:<subject_id>`. Always succeeds
    /// and records exactly one `gdpr.erasure` event, even when nothing
    /// matched. Returns the number of entries removed.
    fn clear_user_data(&mut self, subject_id: &str) -> usize;

    /// Lists unexpired entries cached under `user:<subject_id>`, sorted by
    /// key. Does not touch recency or evict anything. Records one
    /// `gdpr.access_request` event.
    fn user_cache_report(&self, subject_id: &str) -> Vec<UserCacheEntry>;
}

impl ComplianceReporter for CacheStore {
    fn clear_user_data(&mut self, subject_id: &str) -> usize {
        let removed = self.remove_where(|key| key.is_entity(USER_NAMESPACE, subject_id));

        info!(subject = subject_id, removed, "Erased cached user data");
        self.emit(
            AuditEvent::new(
                AuditEventType::GdprErasure,
                USER_DATA_RESOURCE,
                entity_id(USER_NAMESPACE, subject_id),
                AuditAction::Delete,
                true,
            )
            .with_detail("legal_basis", ERASURE_BASIS)
            .with_detail("entries_removed", removed),
        );
        removed
    }

    fn user_cache_report(&self, subject_id: &str) -> Vec<UserCacheEntry> {
        let report: Vec<UserCacheEntry> = self
            .fresh_sizes_where(|key| key.is_entity(USER_NAMESPACE, subject_id))
            .into_iter()
            .map(|(key, size)| UserCacheEntry { key, size })
            .collect();

        self.emit(
            AuditEvent::new(
                AuditEventType::GdprAccessRequest,
                USER_DATA_RESOURCE,
                entity_id(USER_NAMESPACE, subject_id),
                AuditAction::Read,
                true,
            )
            .with_detail("legal_basis", ACCESS_BASIS)
            .with_detail("entries_found", report.len()),
        );
        report
    }
}
