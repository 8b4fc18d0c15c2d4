//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: purges entries whose TTL has elapsed

mod cleanup;

pub use cleanup::spawn_cleanup_task;
