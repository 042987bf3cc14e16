use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{optional_text, require_text, Id};
use crate::error::{Result, YardError};

pub const DEFAULT_USER_STATUS: &str = "ativo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl FromStr for Role {
    type Err = YardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(YardError::Validation(format!(
                "role must be USER or ADMIN, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

/// Stored user record. Carries the password hash, so it is never returned
/// from the API directly; see [`UserView`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub status: String,
    pub role: Role,
    #[serde(default)]
    pub yard_id: Option<Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub status: String,
    pub role: Role,
    pub yard_id: Option<Id>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            status: user.status.clone(),
            role: user.role,
            yard_id: user.yard_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub status: Option<String>,
    pub role: String,
    #[serde(default)]
    pub yard_id: Option<Id>,
}

impl UserInput {
    /// Validates the payload and returns the parsed role.
    pub fn validate(&self) -> Result<Role> {
        require_text("name", &self.name, 100)?;
        require_text("email", &self.email, 100)?;
        if !self.email.contains('@') {
            return Err(YardError::Validation("email is not valid".to_string()));
        }
        require_text("password", &self.password, 255)?;
        optional_text("status", self.status.as_deref(), 20)?;
        self.role.parse()
    }

    pub fn normalized_email(&self) -> String {
        self.email.trim().to_string()
    }
}
