//! Model trainers
//!
//! Every prediction request refits from scratch. Trainers are stateless
//! strategy objects behind [`Trainer`], so a caching implementation could be
//! substituted without touching the orchestration.

use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::features::{design_matrix, TrainingSample, FEATURE_COUNT};
use super::linear::solve_normal_equations;
use crate::error::{Result, YardError};

/// Coefficients of a fitted linear model over the four coordinate features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub weights: [f64; FEATURE_COUNT],
    pub intercept: f64,
    pub trainer: String,
    pub sample_count: usize,
}

impl FittedModel {
    pub(crate) fn from_parts(
        weights: &Array1<f64>,
        intercept: f64,
        trainer: &str,
        sample_count: usize,
    ) -> Result<Self> {
        if weights.len() != FEATURE_COUNT {
            return Err(YardError::Computation(format!(
                "expected {} coefficients, got {}",
                FEATURE_COUNT,
                weights.len()
            )));
        }
        if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(YardError::Computation(
                "fit produced non-finite coefficients".to_string(),
            ));
        }

        let mut fixed = [0.0; FEATURE_COUNT];
        for (slot, w) in fixed.iter_mut().zip(weights.iter()) {
            *slot = *w;
        }
        Ok(Self {
            weights: fixed,
            intercept,
            trainer: trainer.to_string(),
            sample_count,
        })
    }
}

pub trait Trainer: Send + Sync {
    fn name(&self) -> &str;

    fn fit(&self, samples: &[TrainingSample]) -> Result<FittedModel>;
}

/// Fails with `InsufficientTrainingData` below `required` samples. A minimum
/// below one is treated as one.
pub(crate) fn check_sample_count(samples: &[TrainingSample], required: usize) -> Result<()> {
    let required = required.max(1);
    if samples.len() < required {
        return Err(YardError::InsufficientTrainingData {
            required,
            available: samples.len(),
        });
    }
    Ok(())
}

/// Closed-form least squares on centered data.
#[derive(Debug, Clone)]
pub struct OlsTrainer {
    min_samples: usize,
}

impl OlsTrainer {
    pub fn new(min_samples: usize) -> Self {
        Self { min_samples }
    }
}

impl Trainer for OlsTrainer {
    fn name(&self) -> &str {
        "ols"
    }

    fn fit(&self, samples: &[TrainingSample]) -> Result<FittedModel> {
        check_sample_count(samples, self.min_samples)?;
        let (x, y) = design_matrix(samples)?;

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| YardError::Computation("empty design matrix".to_string()))?;
        let y_mean = y.mean().unwrap_or(0.0);
        let x_centered = &x - &x_mean.view().insert_axis(Axis(0));
        let y_centered = &y - y_mean;

        let xtx = x_centered.t().dot(&x_centered);
        let xty = x_centered.t().dot(&y_centered);

        let (weights, method) = solve_normal_equations(&xtx, &xty).ok_or_else(|| {
            YardError::Computation("normal equations could not be solved".to_string())
        })?;
        let intercept = y_mean - weights.dot(&x_mean);

        debug!(
            samples = samples.len(),
            method = ?method,
            intercept,
            "Fitted least-squares model"
        );
        FittedModel::from_parts(&weights, intercept, self.name(), samples.len())
    }
}
