//! Distance prediction
//!
//! Fits a linear model mapping `(position_x, position_y, marker_x, marker_y)`
//! to measured distance, retraining from the stored measurements on every
//! request, and evaluates it for one position/marker pair.
//!
//! ```text
//! store rows -> FeatureExtractor -> Trainer (on the worker) -> FittedModel::predict
//! ```

pub mod config;
pub mod features;
pub mod linear;
pub mod predictor;
pub mod service;
pub mod sgd;
pub mod trainer;
pub mod worker;

pub use config::{MissingCoordinatePolicy, PredictionConfig, TrainerKind};
pub use features::{
    Coordinates, FeatureExtractor, FeatureVector, MeasurementRow, TrainingSample,
};
pub use service::{build_trainer, PredictionRequest, PredictionResult, PredictionService};
pub use sgd::{SgdConfig, SgdTrainer};
pub use trainer::{FittedModel, OlsTrainer, Trainer};
pub use worker::{spawn_training_worker, FitOutcome, TrainingWorkerHandle, WorkerConfig};
