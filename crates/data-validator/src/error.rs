//! Validation Error Types

use thiserror::Error;

/// Errors during sensor reading validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// One or more required fields absent, in wire order
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Numeric field is NaN or infinite
    #[error("{field} value {value} is not a finite number")]
    NonFinite { field: &'static str, value: f64 },

    /// Aircraft identifier present but blank
    #[error("aircraft_id must not be empty")]
    EmptyAircraftId,
}

impl ValidationError {
    /// Names of the fields that failed validation
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            ValidationError::MissingFields(fields) => fields.clone(),
            ValidationError::NonFinite { field, .. } => vec![field],
            ValidationError::EmptyAircraftId => vec!["aircraft_id"],
        }
    }
}
