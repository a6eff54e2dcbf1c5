//! Stockcast API Server
//!
//! Serves sales import, forecast generation and forecast history over HTTP.

use dotenvy::dotenv;
use stockcast::config::{self, Config};
use stockcast::core::http::start_server;
use stockcast::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = Config::from_env();
    let port = config.port;

    info!("Starting Stockcast API Server");
    info!(environment = %config::get_environment(), "Environment");
    info!(
        port = port,
        ai_enabled = config.openai.is_some(),
        sparse_history_fallback = config.sparse_history_fallback,
        confidence_mode = ?config.confidence_mode,
        "HTTP Server: http://0.0.0.0:{}",
        port
    );

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(config).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
