//! API Module
//!
//! HTTP handlers and routing for the plaintext cache REST API.
//!
//! # Endpoints
//! - `PUT /cache`, `DELETE /cache` - Store a value, clear everything
//! - `GET /cache/:key`, `DELETE /cache/:key` - Read or delete one entry
//! - `DELETE /entities/:namespace[/:id]` - Entity-scoped invalidation
//! - `GET|DELETE /subjects/:subject_id/cache` - Access report and erasure
//! - `GET /stats`, `GET /health`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
