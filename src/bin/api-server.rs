//! Ovotrix API Server
//!
//! HTTP API for flock management, daily production logging, genetic guide
//! lookups, and weekly indicator computation. The service is stateless per
//! request and can be horizontally scaled.

use dotenvy::dotenv;
use ovotrix::config;
use ovotrix::core::http::start_server;
use ovotrix::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let port = config::get_port();
    let env = config::get_environment();
    info!("Starting Ovotrix API Server");
    info!(environment = %env, "Environment");
    info!(port = port, "HTTP Server: http://0.0.0.0:{}", port);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port).await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("API server started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
            info!("API server stopped");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
