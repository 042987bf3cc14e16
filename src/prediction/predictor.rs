//! Single-point inference

use super::features::{design_matrix, FeatureVector, TrainingSample};
use super::trainer::FittedModel;
use crate::error::{Result, YardError};

impl FittedModel {
    /// Distance predicted for one query vector.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64> {
        if !features.is_finite() {
            return Err(YardError::InvalidNumericInput(
                "query features must be finite".to_string(),
            ));
        }

        let value = self
            .weights
            .iter()
            .zip(features.values())
            .fold(self.intercept, |acc, (w, x)| acc + w * x);

        if !value.is_finite() {
            return Err(YardError::Computation(
                "prediction is not a finite number".to_string(),
            ));
        }
        Ok(value)
    }

    /// Coefficient of determination (R²) over a sample set.
    pub fn score(&self, samples: &[TrainingSample]) -> Result<f64> {
        let (_, y) = design_matrix(samples)?;
        let y_mean = y.mean().unwrap_or(0.0);

        let mut ss_res = 0.0;
        for sample in samples {
            let residual = self.predict(&sample.features)? - sample.distance;
            ss_res += residual * residual;
        }
        let ss_tot = y.mapv(|v| (v - y_mean) * (v - y_mean)).sum();

        if ss_tot == 0.0 {
            return Ok(1.0);
        }
        Ok(1.0 - ss_res / ss_tot)
    }
}
