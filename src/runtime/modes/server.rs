//! Server mode
//!
//! Configures and starts the HTTP server with the aggregate and health routes.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::RequestTrace;
use crate::api::services::AppStartTime;
use crate::config::{CorsConfig, StaticConfig};
use crate::services::AggregationService;
use crate::storage::StorageFactory;

/// Build CORS middleware from configuration
fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "HEAD", "OPTIONS"])
        .allowed_header(actix_web::http::header::CONTENT_TYPE)
        .expose_headers(vec![crate::api::middleware::REQUEST_ID_HEADER])
        .max_age(cors_config.max_age);

    if cors_config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }
    cors
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let storage = StorageFactory::create(&config.database)
        .await
        .map_err(|e| {
            eprintln!("{}", e.format_colored());
            e
        })
        .context("Failed to open storage")?;

    let aggregation = web::Data::new(AggregationService::new(storage.clone()));
    let storage_data = web::Data::new(storage);
    let start_data = web::Data::new(app_start_time);
    let cors_config = config.cors.clone();

    if cors_config.allowed_origins.is_empty() {
        warn!("cors.allowed_origins is empty, cross-origin requests will be rejected");
    }

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Using {} worker(s)", cpu_count);
    info!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(storage_data.clone())
            .app_data(aggregation.clone())
            .app_data(start_data.clone())
            .wrap(build_cors_middleware(&cors_config))
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache")))
            .wrap(RequestTrace)
            .configure(crate::api::configure)
    })
    .workers(cpu_count)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}
