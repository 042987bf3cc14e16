//! Prediction request orchestration

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::config::{PredictionConfig, TrainerKind};
use super::features::FeatureExtractor;
use super::sgd::SgdTrainer;
use super::trainer::{check_sample_count, OlsTrainer, Trainer};
use super::worker::{spawn_training_worker, TrainingWorkerHandle, WorkerConfig};
use crate::domain::Id;
use crate::error::Result;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub position_id: Id,
    pub marker_id: Id,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub position_id: Id,
    pub marker_id: Id,
    pub predicted_distance: f64,
    pub training_sample_count: usize,
}

pub fn build_trainer(config: &PredictionConfig) -> Arc<dyn Trainer> {
    match config.trainer {
        TrainerKind::Ols => Arc::new(OlsTrainer::new(config.min_training_samples)),
        TrainerKind::Sgd => Arc::new(SgdTrainer::new(config.min_training_samples, config.seed)),
    }
}

/// Resolves a position/marker pair, retrains on every stored measurement and
/// predicts the distance between them.
#[derive(Clone)]
pub struct PredictionService {
    store: Arc<Store>,
    extractor: FeatureExtractor,
    min_training_samples: usize,
    worker: TrainingWorkerHandle,
}

impl PredictionService {
    /// Spawns a training worker for the configured trainer. Must be called
    /// from within a tokio runtime.
    pub fn new(store: Arc<Store>, config: &PredictionConfig, worker_config: WorkerConfig) -> Self {
        Self::with_trainer(store, config, worker_config, build_trainer(config))
    }

    pub fn with_trainer(
        store: Arc<Store>,
        config: &PredictionConfig,
        worker_config: WorkerConfig,
        trainer: Arc<dyn Trainer>,
    ) -> Self {
        Self {
            store,
            extractor: FeatureExtractor::new(config.missing_coordinates),
            min_training_samples: config.min_training_samples,
            worker: spawn_training_worker(worker_config, trainer),
        }
    }

    pub fn worker(&self) -> &TrainingWorkerHandle {
        &self.worker
    }

    pub async fn predict_distance(&self, request: PredictionRequest) -> Result<PredictionResult> {
        let PredictionRequest {
            position_id,
            marker_id,
        } = request;

        let position = self.store.get_position(position_id).await?;
        let marker = self.store.get_fixed_marker(marker_id).await?;

        let rows = self.store.measurement_rows().await;
        let samples = self.extractor.samples(&rows);
        debug!(
            position_id,
            marker_id,
            complete_rows = rows.len(),
            samples = samples.len(),
            policy = ?self.extractor.policy(),
            "Extracted training samples"
        );

        // Too little data outranks an unanswerable query.
        check_sample_count(&samples, self.min_training_samples)?;
        let query = self.extractor.query(&position, &marker)?;
        let outcome = self.worker.fit_and_predict(samples, query).await?;

        info!(
            position_id,
            marker_id,
            trainer = %outcome.model.trainer,
            samples = outcome.model.sample_count,
            predicted_distance = outcome.predicted_distance,
            "Predicted distance"
        );

        Ok(PredictionResult {
            position_id,
            marker_id,
            predicted_distance: outcome.predicted_distance,
            training_sample_count: outcome.model.sample_count,
        })
    }
}
