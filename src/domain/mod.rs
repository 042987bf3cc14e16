//! Domain entities
//!
//! Plain data records for everything the yard tracks, plus the input
//! payloads accepted on create/update. Inputs validate themselves before
//! the store ever sees them.

mod marker;
mod measurement;
mod motorcycle;
mod position;
mod user;
mod yard;

pub use marker::{FixedMarker, FixedMarkerInput, MobileMarker, MobileMarkerInput};
pub use measurement::{DistanceMeasurement, MeasurementInput};
pub use motorcycle::{Motorcycle, MotorcycleInput};
pub use position::{Position, PositionInput};
pub use user::{Role, User, UserInput, UserView, DEFAULT_USER_STATUS};
pub use yard::{Yard, YardInput};

use crate::error::{Result, YardError};

/// Entity identifier, assigned by the store's per-table sequences.
pub type Id = i64;

pub(crate) fn require_text(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(YardError::Validation(format!("{} is required", field)));
    }
    check_length(field, value, max_len)
}

pub(crate) fn optional_text(field: &str, value: Option<&str>, max_len: usize) -> Result<()> {
    match value {
        Some(v) => check_length(field, v, max_len),
        None => Ok(()),
    }
}

fn check_length(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.chars().count() > max_len {
        return Err(YardError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(())
}

pub(crate) fn finite_coordinate(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() => Err(YardError::InvalidNumericInput(format!(
            "{} must be a finite number",
            field
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_rejects_blank() {
        assert!(require_text("name", "   ", 10).is_err());
        assert!(require_text("name", "Yard A", 10).is_ok());
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // "revisão" is 7 chars but 8 bytes
        assert!(require_text("status", "revisão", 7).is_ok());
    }

    #[test]
    fn test_finite_coordinate() {
        assert!(finite_coordinate("x", Some(f64::NAN)).is_err());
        assert!(finite_coordinate("x", Some(f64::INFINITY)).is_err());
        assert!(finite_coordinate("x", Some(1.5)).is_ok());
        assert!(finite_coordinate("x", None).is_ok());
    }
}
