//! Feature extraction
//!
//! A training sample is the four coordinates of a measurement's position and
//! fixed marker, labelled with the measured distance:
//!
//! ```text
//! (position_x, position_y, marker_x, marker_y) -> distance
//! ```

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::config::MissingCoordinatePolicy;
use crate::domain::{FixedMarker, Id, Position};
use crate::error::{Result, YardError};

pub const FEATURE_COUNT: usize = 4;

/// Possibly-incomplete x/y pair as stored on a position or marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Coordinates {
    pub fn new(x: Option<f64>, y: Option<f64>) -> Self {
        Self { x, y }
    }

    pub fn of_position(position: &Position) -> Self {
        Self::new(position.x, position.y)
    }

    pub fn of_marker(marker: &FixedMarker) -> Self {
        Self::new(marker.x, marker.y)
    }

    fn resolve(&self, policy: MissingCoordinatePolicy) -> Option<(f64, f64)> {
        match (policy, self.x, self.y) {
            (_, Some(x), Some(y)) => Some((x, y)),
            (MissingCoordinatePolicy::Zero, x, y) => Some((x.unwrap_or(0.0), y.unwrap_or(0.0))),
            (MissingCoordinatePolicy::Exclude, _, _) => None,
        }
    }
}

/// A complete measurement joined to its position and marker coordinates.
/// `None` means the referenced row does not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRow {
    pub measurement_id: Id,
    pub distance: f64,
    pub position: Option<Coordinates>,
    pub marker: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(position: (f64, f64), marker: (f64, f64)) -> Self {
        Self([position.0, position.1, marker.0, marker.1])
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    pub fn to_array(&self) -> Array1<f64> {
        Array1::from_vec(self.0.to_vec())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub features: FeatureVector,
    pub distance: f64,
}

/// Turns joined measurement rows into training samples and query vectors
/// under one missing-coordinate policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor {
    policy: MissingCoordinatePolicy,
}

impl FeatureExtractor {
    pub fn new(policy: MissingCoordinatePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MissingCoordinatePolicy {
        self.policy
    }

    /// One sample per usable row, preserving row order. Rows whose position
    /// or marker no longer exists are always skipped.
    pub fn samples(&self, rows: &[MeasurementRow]) -> Vec<TrainingSample> {
        rows.iter()
            .filter_map(|row| {
                let Some(features) = row
                    .position
                    .zip(row.marker)
                    .and_then(|(position, marker)| self.vector(position, marker))
                else {
                    trace!(measurement_id = row.measurement_id, "Skipping measurement without usable coordinates");
                    return None;
                };
                Some(TrainingSample {
                    features,
                    distance: row.distance,
                })
            })
            .collect()
    }

    pub fn query(&self, position: &Position, marker: &FixedMarker) -> Result<FeatureVector> {
        let features = self
            .vector(Coordinates::of_position(position), Coordinates::of_marker(marker))
            .ok_or_else(|| {
                YardError::InvalidNumericInput(format!(
                    "position {} or fixed marker {} has no coordinates",
                    position.id, marker.id
                ))
            })?;
        if !features.is_finite() {
            return Err(YardError::InvalidNumericInput(
                "query coordinates must be finite".to_string(),
            ));
        }
        Ok(features)
    }

    fn vector(&self, position: Coordinates, marker: Coordinates) -> Option<FeatureVector> {
        Some(FeatureVector::new(
            position.resolve(self.policy)?,
            marker.resolve(self.policy)?,
        ))
    }
}

/// Stacks samples into an `n x 4` design matrix and label vector, rejecting
/// any non-finite value.
pub fn design_matrix(samples: &[TrainingSample]) -> Result<(Array2<f64>, Array1<f64>)> {
    let n = samples.len();
    let mut flat = Vec::with_capacity(n * FEATURE_COUNT);
    let mut labels = Vec::with_capacity(n);

    for (row, sample) in samples.iter().enumerate() {
        if !sample.features.is_finite() || !sample.distance.is_finite() {
            return Err(YardError::InvalidNumericInput(format!(
                "training sample {} contains a non-finite value",
                row
            )));
        }
        flat.extend_from_slice(sample.features.values());
        labels.push(sample.distance);
    }

    let x = Array2::from_shape_vec((n, FEATURE_COUNT), flat)?;
    Ok((x, Array1::from_vec(labels)))
}
