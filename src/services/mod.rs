//! Service layer for business logic
//!
//! Aggregation logic behind the HTTP API.

mod aggregation_service;

pub use aggregation_service::*;
