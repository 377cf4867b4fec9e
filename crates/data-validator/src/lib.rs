//! Sensor Reading Validation
//!
//! Turns loosely-shaped readings from the transport layer into strongly
//! typed [`SensorReading`] records, reporting every missing field at once.

mod error;
mod reading;
mod validator;

pub use error::ValidationError;
pub use reading::{RawSensorReading, SensorReading, REQUIRED_FIELDS};
pub use validator::{ValidationConfig, Validator};
