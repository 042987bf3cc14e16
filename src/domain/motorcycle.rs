use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_text, Id};
use crate::error::{Result, YardError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motorcycle {
    pub id: Id,
    pub plate: String,
    pub model: String,
    pub status: String,
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,
}

/// Create/update payload. `id` is only meaningful on update, where it must
/// match the id in the path.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorcycleInput {
    #[serde(default)]
    pub id: Option<Id>,
    pub plate: String,
    pub model: String,
    pub status: String,
}

impl MotorcycleInput {
    pub fn validate(&self) -> Result<()> {
        require_text("plate", &self.plate, 7)?;
        require_text("model", &self.model, 50)?;
        require_text("status", &self.status, 65)
    }

    pub fn check_path_id(&self, path_id: Id) -> Result<()> {
        match self.id {
            Some(id) if id == path_id => Ok(()),
            _ => Err(YardError::Validation(format!(
                "body id must match path id {}",
                path_id
            ))),
        }
    }
}
