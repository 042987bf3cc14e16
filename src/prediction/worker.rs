//! Training worker
//!
//! Fits are CPU-bound, so request handlers never run them inline. A handler
//! submits a job over a bounded channel and awaits a oneshot reply; a
//! dispatcher task pulls jobs off the queue and runs each fit on the blocking
//! pool, with a semaphore capping how many fits run at once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Semaphore};
use tracing::{debug, error, warn};

use super::features::{FeatureVector, TrainingSample};
use super::trainer::{FittedModel, Trainer};
use crate::error::{Result, YardError};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Bounded channel capacity for pending jobs.
    pub queue_capacity: usize,
    /// Maximum number of fits running on the blocking pool at once.
    pub max_concurrent_fits: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            queue_capacity: std::env::var("TRAINING_QUEUE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(256),
            max_concurrent_fits: std::env::var("TRAINING_MAX_CONCURRENT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(parallelism),
        }
    }
}

/// Result of one job: the model fitted for it and its prediction.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub model: FittedModel,
    pub predicted_distance: f64,
}

struct TrainingJob {
    samples: Vec<TrainingSample>,
    query: FeatureVector,
    reply: oneshot::Sender<Result<FitOutcome>>,
}

/// Cloneable handle for submitting fits.
#[derive(Clone)]
pub struct TrainingWorkerHandle {
    tx: mpsc::Sender<TrainingJob>,
    trainer_name: Arc<str>,
    inflight: Arc<AtomicU64>,
    total_jobs: Arc<AtomicU64>,
}

impl TrainingWorkerHandle {
    /// Fit on `samples`, predict for `query`, and wait for the answer.
    pub async fn fit_and_predict(
        &self,
        samples: Vec<TrainingSample>,
        query: FeatureVector,
    ) -> Result<FitOutcome> {
        let (reply, response) = oneshot::channel();
        let job = TrainingJob {
            samples,
            query,
            reply,
        };

        if self.tx.send(job).await.is_err() {
            return Err(YardError::Internal("training worker is not running".to_string()));
        }
        let _inflight = InflightGuard::enter(&self.inflight);
        self.total_jobs.fetch_add(1, Ordering::Relaxed);

        response
            .await
            .map_err(|_| YardError::Internal("training job was dropped".to_string()))?
    }

    pub fn trainer_name(&self) -> &str {
        &self.trainer_name
    }

    /// Jobs submitted and not yet answered.
    pub fn inflight(&self) -> u64 {
        self.inflight.load(Ordering::Relaxed)
    }

    pub fn total_jobs(&self) -> u64 {
        self.total_jobs.load(Ordering::Relaxed)
    }

    /// Jobs sitting in the channel, not yet picked up by the dispatcher.
    pub fn queue_depth(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}

/// Counts one waiting requester for as long as it lives, so a caller that is
/// cancelled mid-wait still gives its slot back.
struct InflightGuard<'a>(&'a AtomicU64);

impl<'a> InflightGuard<'a> {
    fn enter(counter: &'a AtomicU64) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(counter)
    }
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Spawn the dispatcher and return a handle for submitting jobs. Must be
/// called from within a tokio runtime.
pub fn spawn_training_worker(config: WorkerConfig, trainer: Arc<dyn Trainer>) -> TrainingWorkerHandle {
    let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
    let trainer_name: Arc<str> = Arc::from(trainer.name());
    let permits = Arc::new(Semaphore::new(config.max_concurrent_fits.max(1)));

    debug!(
        trainer = %trainer_name,
        queue_capacity = config.queue_capacity,
        max_concurrent_fits = config.max_concurrent_fits,
        "Starting training worker"
    );
    tokio::spawn(dispatch_loop(rx, trainer, permits));

    TrainingWorkerHandle {
        tx,
        trainer_name,
        inflight: Arc::new(AtomicU64::new(0)),
        total_jobs: Arc::new(AtomicU64::new(0)),
    }
}

async fn dispatch_loop(
    mut rx: mpsc::Receiver<TrainingJob>,
    trainer: Arc<dyn Trainer>,
    permits: Arc<Semaphore>,
) {
    while let Some(job) = rx.recv().await {
        let permit = match Arc::clone(&permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                let _ = job
                    .reply
                    .send(Err(YardError::Internal("training worker shut down".to_string())));
                return;
            }
        };

        let trainer = Arc::clone(&trainer);
        tokio::spawn(async move {
            let TrainingJob {
                samples,
                query,
                reply,
            } = job;

            let joined = tokio::task::spawn_blocking(move || run_job(trainer.as_ref(), &samples, &query)).await;
            drop(permit);

            let result = match joined {
                Ok(result) => result,
                Err(join_err) => {
                    error!(error = %join_err, "Training job panicked");
                    Err(YardError::Internal("training job failed".to_string()))
                }
            };
            if reply.send(result).is_err() {
                warn!("Training job finished after its requester went away");
            }
        });
    }
    debug!("Training worker channel closed, exiting dispatch loop");
}

fn run_job(trainer: &dyn Trainer, samples: &[TrainingSample], query: &FeatureVector) -> Result<FitOutcome> {
    let model = trainer.fit(samples)?;
    let predicted_distance = model.predict(query)?;
    if let Ok(r2) = model.score(samples) {
        debug!(trainer = %model.trainer, samples = samples.len(), r2, "Training fit quality");
    }
    Ok(FitOutcome {
        model,
        predicted_distance,
    })
}
