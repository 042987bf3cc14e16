//! Stochastic gradient descent trainer
//!
//! Squared-error SGD with an inverse-scaling learning rate. Features are
//! standardized and the label centered before descent, and the learned
//! coefficients are mapped back to raw coordinates afterwards, so marker grids
//! measured in metres or centimetres converge alike.

use ndarray::{Array1, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::features::{design_matrix, TrainingSample, FEATURE_COUNT};
use super::trainer::{check_sample_count, FittedModel, Trainer};
use crate::error::{Result, YardError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SgdConfig {
    pub eta0: f64,
    pub power_t: f64,
    /// L2 penalty
    pub alpha: f64,
    pub max_epochs: usize,
    pub tol: f64,
    pub seed: u64,
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self {
            eta0: 0.05,
            power_t: 0.25,
            alpha: 1e-5,
            max_epochs: 2000,
            tol: 1e-9,
            seed: 42,
        }
    }
}

impl SgdConfig {
    fn learning_rate(&self, t: usize) -> f64 {
        self.eta0 / (t as f64 + 1.0).powf(self.power_t)
    }
}

#[derive(Debug, Clone)]
pub struct SgdTrainer {
    min_samples: usize,
    config: SgdConfig,
}

impl SgdTrainer {
    pub fn new(min_samples: usize, seed: u64) -> Self {
        Self::with_config(
            min_samples,
            SgdConfig {
                seed,
                ..SgdConfig::default()
            },
        )
    }

    pub fn with_config(min_samples: usize, config: SgdConfig) -> Self {
        Self { min_samples, config }
    }
}

impl Trainer for SgdTrainer {
    fn name(&self) -> &str {
        "sgd"
    }

    fn fit(&self, samples: &[TrainingSample]) -> Result<FittedModel> {
        check_sample_count(samples, self.min_samples)?;
        let (x, y) = design_matrix(samples)?;
        let n = x.nrows();

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| YardError::Computation("empty design matrix".to_string()))?;
        // Constant columns keep unit scale and end up with a zero weight.
        let scale = x.std_axis(Axis(0), 0.0).mapv(|s| if s > 1e-12 { s } else { 1.0 });
        let x_std = (&x - &mean.view().insert_axis(Axis(0))) / &scale.view().insert_axis(Axis(0));
        let y_mean = y.mean().unwrap_or(0.0);
        let y_centered = &y - y_mean;

        let cfg = &self.config;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(cfg.seed);
        let mut w = Array1::<f64>::zeros(FEATURE_COUNT);
        let mut b = 0.0;
        let mut order: Vec<usize> = (0..n).collect();
        let mut prev_loss = f64::MAX;
        let mut t = 0usize;
        let mut epochs = 0usize;

        for epoch in 0..cfg.max_epochs {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;

            for &i in &order {
                let xi = x_std.row(i);
                let residual = xi.dot(&w) + b - y_centered[i];
                epoch_loss += residual * residual;

                let lr = cfg.learning_rate(t);
                for j in 0..FEATURE_COUNT {
                    w[j] -= lr * (residual * xi[j] + cfg.alpha * w[j]);
                }
                b -= lr * residual;
                t += 1;
            }

            epoch_loss /= n as f64;
            epochs = epoch + 1;
            if !epoch_loss.is_finite() {
                return Err(YardError::Computation("SGD diverged".to_string()));
            }
            if epoch > 0 && (prev_loss - epoch_loss).abs() < cfg.tol {
                break;
            }
            prev_loss = epoch_loss;
        }

        let weights = &w / &scale;
        let intercept = y_mean + b - weights.dot(&mean);

        debug!(
            samples = n,
            epochs,
            final_loss = prev_loss,
            seed = cfg.seed,
            "Fitted SGD model"
        );
        FittedModel::from_parts(&weights, intercept, self.name(), n)
    }
}
