//! Request and Response models for the admin API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

pub use requests::InvalidatePatternRequest;
pub use responses::{HealthResponse, InvalidateResponse, StatsResponse};
