use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{finite_coordinate, require_text, Id};
use crate::error::Result;

/// Stationary ArUco reference point with known yard coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedMarker {
    pub id: Id,
    pub aruco_code: String,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub yard_id: Option<Id>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixedMarkerInput {
    pub aruco_code: String,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub yard_id: Option<Id>,
}

impl FixedMarkerInput {
    pub fn validate(&self) -> Result<()> {
        require_text("aruco_code", &self.aruco_code, 50)?;
        finite_coordinate("x", self.x)?;
        finite_coordinate("y", self.y)
    }
}

/// ArUco tag mounted on a motorcycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobileMarker {
    pub id: Id,
    pub aruco_code: String,
    #[serde(default)]
    pub installed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub motorcycle_id: Option<Id>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MobileMarkerInput {
    pub aruco_code: String,
    #[serde(default)]
    pub installed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub motorcycle_id: Option<Id>,
}

impl MobileMarkerInput {
    pub fn validate(&self) -> Result<()> {
        require_text("aruco_code", &self.aruco_code, 50)
    }
}
