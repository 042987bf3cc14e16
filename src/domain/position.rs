use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{finite_coordinate, Id};
use crate::error::Result;

/// A timestamped coordinate reading for a tracked motorcycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: Id,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub motorcycle_id: Option<Id>,
    #[serde(default)]
    pub yard_id: Option<Id>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionInput {
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub motorcycle_id: Option<Id>,
    #[serde(default)]
    pub yard_id: Option<Id>,
}

impl PositionInput {
    pub fn validate(&self) -> Result<()> {
        finite_coordinate("x", self.x)?;
        finite_coordinate("y", self.y)
    }

    pub(crate) fn into_position(self, id: Id) -> Position {
        Position {
            id,
            recorded_at: self.recorded_at,
            x: self.x,
            y: self.y,
            motorcycle_id: self.motorcycle_id,
            yard_id: self.yard_id,
        }
    }
}
