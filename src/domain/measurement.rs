use serde::{Deserialize, Serialize};

use super::Id;
use crate::error::{Result, YardError};

/// Recorded distance between a position and a fixed marker. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMeasurement {
    pub id: Id,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub position_id: Option<Id>,
    #[serde(default)]
    pub marker_id: Option<Id>,
}

impl DistanceMeasurement {
    /// Complete rows are the candidate training population.
    pub fn is_complete(&self) -> bool {
        self.distance.is_some() && self.position_id.is_some() && self.marker_id.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeasurementInput {
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub position_id: Option<Id>,
    #[serde(default)]
    pub marker_id: Option<Id>,
}

impl MeasurementInput {
    pub fn validate(&self) -> Result<()> {
        if let Some(d) = self.distance {
            if !d.is_finite() {
                return Err(YardError::InvalidNumericInput(
                    "distance must be a finite number".to_string(),
                ));
            }
            if d < 0.0 {
                return Err(YardError::Validation("distance cannot be negative".to_string()));
            }
        }
        Ok(())
    }
}
