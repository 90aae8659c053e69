pub mod aggregate;
pub mod error_code;
pub mod health;
pub mod helpers;
pub mod types;

pub use aggregate::{AggregateApi, aggregate_routes};
pub use error_code::ErrorCode;
pub use health::{AppStartTime, HealthService, health_routes};
pub use types::*;
