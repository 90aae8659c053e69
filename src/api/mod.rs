//! HTTP services and middleware

pub mod middleware;
pub mod services;

use actix_web::web;

/// Register every route; expects `Arc<SeaOrmStorage>`, `AggregationService`
/// and `AppStartTime` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(services::aggregate_routes())
        .service(services::health_routes());
}
