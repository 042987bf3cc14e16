//! Application state management

use std::sync::Arc;
use chrono::{DateTime, Utc};

use crate::auth::{AuthService, TokenService};
use crate::error::Result;
use crate::prediction::PredictionService;
use crate::store::Store;

use super::ServerConfig;

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub store: Arc<Store>,
    pub auth: AuthService,
    pub predictions: PredictionService,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wires the services around `store`. Spawns the training worker, so it
    /// must run inside a tokio runtime. Fails if the JWT secret is unusable.
    pub fn new(config: ServerConfig, store: Store) -> Result<Self> {
        let store = Arc::new(store);
        let tokens = TokenService::new(&config.jwt)?;
        let auth = AuthService::new(Arc::clone(&store), tokens);
        let predictions =
            PredictionService::new(Arc::clone(&store), &config.prediction, config.worker.clone());

        Ok(Self {
            config,
            store,
            auth,
            predictions,
            started_at: Utc::now(),
        })
    }

    pub async fn system_status(&self) -> serde_json::Value {
        let worker = self.predictions.worker();
        serde_json::json!({
            "uptime_secs": Utc::now().signed_duration_since(self.started_at).num_seconds(),
            "store": self.store.stats().await,
            "training": {
                "trainer": worker.trainer_name(),
                "inflight": worker.inflight(),
                "total_jobs": worker.total_jobs(),
                "queue_depth": worker.queue_depth(),
                "missing_coordinates": self.config.prediction.missing_coordinates,
                "min_training_samples": self.config.prediction.min_training_samples,
            },
        })
    }
}
