//! Prediction configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::YardError;

/// What to do with a position or marker whose x/y is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingCoordinatePolicy {
    /// Drop the row from training; reject it as a query.
    #[default]
    Exclude,
    /// Substitute 0.0 for the missing value.
    Zero,
}

impl FromStr for MissingCoordinatePolicy {
    type Err = YardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclude" => Ok(Self::Exclude),
            "zero" => Ok(Self::Zero),
            other => Err(YardError::Config(format!(
                "unknown missing-coordinate policy '{}', expected exclude or zero",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainerKind {
    /// Closed-form ordinary least squares
    #[default]
    Ols,
    /// Seeded stochastic gradient descent
    Sgd,
}

impl FromStr for TrainerKind {
    type Err = YardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ols" => Ok(Self::Ols),
            "sgd" => Ok(Self::Sgd),
            other => Err(YardError::Config(format!(
                "unknown trainer '{}', expected ols or sgd",
                other
            ))),
        }
    }
}

impl fmt::Display for TrainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainerKind::Ols => write!(f, "ols"),
            TrainerKind::Sgd => write!(f, "sgd"),
        }
    }
}

/// Configuration for distance prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Minimum number of usable measurements before a fit is attempted
    pub min_training_samples: usize,

    /// Regression strategy
    pub trainer: TrainerKind,

    /// Shuffle seed for the SGD trainer
    pub seed: u64,

    pub missing_coordinates: MissingCoordinatePolicy,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            min_training_samples: std::env::var("PREDICTION_MIN_SAMPLES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            trainer: std::env::var("PREDICTION_TRAINER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            seed: std::env::var("PREDICTION_SEED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(42),
            missing_coordinates: std::env::var("PREDICTION_MISSING_COORDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }
}

impl PredictionConfig {
    pub fn with_trainer(mut self, trainer: TrainerKind) -> Self {
        self.trainer = trainer;
        self
    }

    pub fn with_missing_coordinates(mut self, policy: MissingCoordinatePolicy) -> Self {
        self.missing_coordinates = policy;
        self
    }

    pub fn with_min_training_samples(mut self, min: usize) -> Self {
        self.min_training_samples = min;
        self
    }
}
