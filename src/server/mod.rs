//! yardtrack HTTP server
//!
//! REST API over the yard store, with JWT-guarded CRUD routes and the
//! distance-prediction endpoint.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::JwtConfig;
use crate::prediction::{PredictionConfig, WorkerConfig};
use crate::store::{Store, StoreSnapshot};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JSON snapshot to seed the store from at startup
    pub data_file: Option<String>,
    pub jwt: JwtConfig,
    pub prediction: PredictionConfig,
    pub worker: WorkerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            data_file: std::env::var("DATA_FILE").ok().filter(|s| !s.is_empty()),
            jwt: JwtConfig::default(),
            prediction: PredictionConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();

    let store = match &config.data_file {
        Some(path) => Store::from_snapshot(StoreSnapshot::load(path)?)?,
        None => {
            warn!("No DATA_FILE configured, starting with an empty store");
            Store::new()
        }
    };

    let state = Arc::new(AppState::new(config.clone(), store)?);
    info!(
        trainer = %config.prediction.trainer,
        min_training_samples = config.prediction.min_training_samples,
        missing_coordinates = ?config.prediction.missing_coordinates,
        queue_capacity = config.worker.queue_capacity,
        max_concurrent_fits = config.worker.max_concurrent_fits,
        "Prediction pipeline ready"
    );
    let app = create_router(Arc::clone(&state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        address = %addr,
        started_at = %start_time.to_rfc3339(),
        "yardtrack server starting"
    );
    info!(url = %format!("http://{}/api", addr), "REST API available");
    info!(url = %format!("http://{}/api/health", addr), "Health endpoint available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl+c, shutting down");
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        if std::env::var("API_PORT").is_err() {
            assert_eq!(config.port, 8080);
        }
        assert!(config.worker.queue_capacity > 0);
    }
}
