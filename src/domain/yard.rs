use serde::{Deserialize, Serialize};

use super::{optional_text, require_text, Id};
use crate::error::Result;

/// A physical storage/parking area holding tracked motorcycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Yard {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YardInput {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl YardInput {
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name, 100)?;
        optional_text("location", self.location.as_deref(), 100)?;
        optional_text("description", self.description.as_deref(), 255)
    }

    pub(crate) fn into_yard(self, id: Id) -> Yard {
        Yard {
            id,
            name: self.name,
            location: self.location,
            description: self.description,
        }
    }
}
