//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_handler, erase_user_handler, get_handler, health_handler,
    invalidate_entity_handler, invalidate_entity_type_handler, set_handler, stats_handler,
    user_report_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /cache` - Cache a decrypted value
/// - `DELETE /cache` - Drop every entry
/// - `GET /cache/:key` - Retrieve a cached value
/// - `DELETE /cache/:key` - Delete one entry
/// - `DELETE /entities/:namespace/:id` - Invalidate one entity
/// - `DELETE /entities/:namespace` - Invalidate an entity type
/// - `GET /subjects/:subject_id/cache` - Access report for a data subject
/// - `DELETE /subjects/:subject_id/cache` - Erase a data subject's entries
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cache", delete(clear_handler).put(set_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/entities/:namespace", delete(invalidate_entity_type_handler))
        .route("/entities/:namespace/:id", delete(invalidate_entity_handler))
        .route(
            "/subjects/:subject_id/cache",
            get(user_report_handler).delete(erase_user_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let cache = CacheStore::new(100, Duration::from_secs(300));
        create_router(AppState::new(cache))
    }

    async fn status_of(app: Router, method: &str, uri: &str) -> StatusCode {
        app.oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(status_of(create_test_app(), "GET", "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        assert_eq!(status_of(create_test_app(), "GET", "/stats").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_set_endpoint() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/cache")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"key":"cases:1:v1","value":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        assert_eq!(
            status_of(create_test_app(), "GET", "/cache/nonexistent").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_bulk_routes_succeed_when_empty() {
        for (method, uri) in [
            ("DELETE", "/cache"),
            ("DELETE", "/entities/cases"),
            ("DELETE", "/entities/cases/1"),
            ("GET", "/subjects/123/cache"),
            ("DELETE", "/subjects/123/cache"),
        ] {
            assert_eq!(
                status_of(create_test_app(), method, uri).await,
                StatusCode::OK,
                "{} {}",
                method,
                uri
            );
        }
    }
}
