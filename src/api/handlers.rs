//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::audit::{AuditSink, NoopAuditSink, TracingAuditSink};
use crate::cache::key::{entity_id, USER_NAMESPACE};
use crate::cache::{CacheStore, ComplianceReporter};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, RemovalResponse, SetRequest, SetResponse,
    StatsResponse, UserCacheReportResponse,
};

/// Application state shared across all handlers.
///
/// The one lock around the store is the exclusion scope for every cache
/// operation. Lookups take the write half because a hit updates recency;
/// stats and reports take the read half and hand back copies.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<RwLock<CacheStore>>,
}

impl AppState {
    /// Creates a new AppState with the given cache store.
    pub fn new(cache: CacheStore) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Audit events go to the `audit` tracing target when enabled and are
    /// dropped otherwise.
    pub fn from_config(config: &Config) -> Self {
        let sink: Arc<dyn AuditSink> = if config.audit_enabled {
            Arc::new(TracingAuditSink)
        } else {
            Arc::new(NoopAuditSink)
        };

        let cache = CacheStore::builder()
            .max_entries(config.max_entries)
            .ttl(config.ttl())
            .audit_sink(sink)
            .build();
        Self::new(cache)
    }
}

/// Handler for PUT /cache
///
/// Caches a freshly decrypted value.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    cache.set(req.key.as_str(), req.value);

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /cache/:key
///
/// Returns the cached plaintext, or 404 when absent or expired.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: a hit moves the key to most recently used
    let value = state.cache.write().await.get(&key);

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let removed = state.cache.write().await.delete(&key);

    if removed {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for DELETE /cache
///
/// Drops every cached entry.
pub async fn clear_handler(State(state): State<AppState>) -> Json<RemovalResponse> {
    let removed = state.cache.write().await.clear();
    Json(RemovalResponse::new("*", removed))
}

/// Handler for DELETE /entities/:namespace/:id
///
/// Called when an entity is updated or deleted upstream.
pub async fn invalidate_entity_handler(
    State(state): State<AppState>,
    Path((namespace, id)): Path<(String, String)>,
) -> Json<RemovalResponse> {
    let removed = state.cache.write().await.invalidate_entity(&namespace, &id);
    Json(RemovalResponse::new(entity_id(&namespace, &id), removed))
}

/// Handler for DELETE /entities/:namespace
pub async fn invalidate_entity_type_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Json<RemovalResponse> {
    let removed = state
        .cache
        .write()
        .await
        .invalidate_entity_type(&namespace);
    Json(RemovalResponse::new(namespace, removed))
}

/// Handler for GET /subjects/:subject_id/cache
///
/// Right of Access: lists what is cached about a subject, without values.
pub async fn user_report_handler(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> Json<UserCacheReportResponse> {
    let entries = state.cache.read().await.user_cache_report(&subject_id);
    Json(UserCacheReportResponse::new(subject_id, entries))
}

/// Handler for DELETE /subjects/:subject_id/cache
///
/// Right to Erasure: removes everything cached about a subject.
pub async fn erase_user_handler(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> Json<RemovalResponse> {
    let removed = state.cache.write().await.clear_user_data(&subject_id);
    Json(RemovalResponse::new(
        entity_id(USER_NAMESPACE, &subject_id),
        removed,
    ))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.read().await.stats();
    Json(StatsResponse::from(stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
