//! API Module
//!
//! Admin HTTP surface over the cache service.
//!
//! # Endpoints
//! - `GET /health` - Health check
//! - `GET /stats` - Cache statistics
//! - `DELETE /cache/keys/:key` - Invalidate a key
//! - `POST /cache/invalidate` - Invalidate by pattern

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
