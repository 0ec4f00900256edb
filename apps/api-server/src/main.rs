//! # Scribe API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use scribe_core::ports::JobQueue;
use scribe_infra::InMemoryJobQueue;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::{AppState, Stores};
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Scribe API Server on {}:{}",
        config.host,
        config.port
    );

    let stores = Stores::connect(&config)
        .await
        .context("Failed to initialize stores")?;

    if let Err(e) = stores.search.ensure_schema().await {
        tracing::warn!(error = %e, "Failed to create search index, continuing");
    }

    let queue = Arc::new(InMemoryJobQueue::new(config.jobs.clone()));
    let service = stores.post_service(queue.clone());
    if let Err(e) = queue.start_worker(service.indexing_handler()).await {
        stores.close().await;
        return Err(e).context("Failed to start indexing workers");
    }

    let state = AppState::new(service);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port));

    let result = match server {
        Ok(server) => server.run().await.context("HTTP server failed"),
        Err(e) => Err(e).context("Failed to bind HTTP listener"),
    };

    tracing::info!("HTTP server stopped, draining indexing queue");
    if let Err(e) = queue.shutdown().await {
        tracing::warn!(error = %e, "Indexing queue did not drain cleanly");
    }
    stores.close().await;

    result
}
