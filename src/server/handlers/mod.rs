//! Request handlers, one module per resource

pub mod auth;
pub mod markers;
pub mod measurements;
pub mod motorcycles;
pub mod positions;
pub mod system;
pub mod users;
pub mod yards;

use serde::Deserialize;

/// `?code=` query for ArUco code lookups.
#[derive(Debug, Deserialize)]
pub struct CodeQuery {
    pub code: String,
}
