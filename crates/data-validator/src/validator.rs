//! Reading Validator

use crate::error::ValidationError;
use crate::reading::{RawSensorReading, SensorReading, REQUIRED_FIELDS};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject NaN and infinite sensor values
    pub reject_non_finite: bool,
    /// Reject an aircraft_id made only of whitespace
    pub reject_blank_aircraft_id: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            reject_non_finite: true,
            reject_blank_aircraft_id: true,
        }
    }
}

/// Boundary validator for raw sensor readings
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Names of every absent required field, in wire order
    pub fn missing_fields(raw: &RawSensorReading) -> Vec<&'static str> {
        let present = [
            raw.aircraft_id.is_some(),
            raw.component_type.is_some(),
            raw.vibration_level.is_some(),
            raw.temperature.is_some(),
            raw.pressure.is_some(),
            raw.wear_level.is_some(),
            raw.oil_quality.is_some(),
            raw.rpm.is_some(),
            raw.fuel_flow.is_some(),
            raw.health_score.is_some(),
            raw.operating_hours.is_some(),
            raw.cycles.is_some(),
        ];

        REQUIRED_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Validate a raw reading into a typed one.
    ///
    /// Every missing field is reported at once; nothing is defaulted.
    pub fn validate(&self, raw: &RawSensorReading) -> Result<SensorReading, ValidationError> {
        let missing = Self::missing_fields(raw);
        if !missing.is_empty() {
            debug!(aircraft_id = raw.aircraft_label(), ?missing, "Reading rejected");
            return Err(ValidationError::MissingFields(missing));
        }

        let reading = match raw.clone() {
            RawSensorReading {
                aircraft_id: Some(aircraft_id),
                component_type: Some(component_type),
                vibration_level: Some(vibration_level),
                temperature: Some(temperature),
                pressure: Some(pressure),
                wear_level: Some(wear_level),
                oil_quality: Some(oil_quality),
                rpm: Some(rpm),
                fuel_flow: Some(fuel_flow),
                health_score: Some(health_score),
                operating_hours: Some(operating_hours),
                cycles: Some(cycles),
            } => SensorReading {
                aircraft_id,
                component_type,
                vibration_level,
                temperature,
                pressure,
                wear_level,
                oil_quality,
                rpm,
                fuel_flow,
                health_score,
                operating_hours,
                cycles,
            },
            // missing_fields() already covered every None
            _ => return Err(ValidationError::MissingFields(Self::missing_fields(raw))),
        };

        self.check(&reading)?;
        Ok(reading)
    }

    /// Value-level checks on an already complete reading
    pub fn check(&self, reading: &SensorReading) -> Result<(), ValidationError> {
        if self.config.reject_blank_aircraft_id && reading.aircraft_id.trim().is_empty() {
            return Err(ValidationError::EmptyAircraftId);
        }

        if self.config.reject_non_finite {
            if let Some((field, value)) = reading
                .numeric_fields()
                .into_iter()
                .find(|(_, v)| !v.is_finite())
            {
                return Err(ValidationError::NonFinite { field, value });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn complete() -> RawSensorReading {
        RawSensorReading {
            aircraft_id: Some("AC001".into()),
            component_type: Some("engine".into()),
            vibration_level: Some(8.5),
            temperature: Some(750.0),
            pressure: Some(35.0),
            wear_level: Some(85.0),
            oil_quality: Some(65.0),
            rpm: Some(4500.0),
            fuel_flow: Some(1200.0),
            health_score: Some(45.0),
            operating_hours: Some(8500.0),
            cycles: Some(4200.0),
        }
    }

    #[test]
    fn test_complete_reading() {
        let reading = Validator::default().validate(&complete()).unwrap();
        assert_eq!(reading.aircraft_id, "AC001");
        assert_eq!(reading.oil_quality, 65.0);
    }

    #[test]
    fn test_missing_oil_quality() {
        let raw = RawSensorReading {
            oil_quality: None,
            ..complete()
        };
        let err = Validator::default().validate(&raw).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["oil_quality"]));
    }

    #[test]
    fn test_lists_every_missing_field() {
        let raw = RawSensorReading {
            component_type: None,
            rpm: None,
            cycles: None,
            ..complete()
        };
        let err = Validator::default().validate(&raw).unwrap_err();
        assert_eq!(err.fields(), vec!["component_type", "rpm", "cycles"]);
    }

    #[test]
    fn test_empty_json_reports_all_fields() {
        let raw: RawSensorReading = serde_json::from_str("{}").unwrap();
        assert_eq!(Validator::missing_fields(&raw), REQUIRED_FIELDS.to_vec());
    }

    #[test]
    fn test_non_finite_rejected() {
        let raw = RawSensorReading {
            temperature: Some(f64::INFINITY),
            ..complete()
        };
        let err = Validator::default().validate(&raw).unwrap_err();
        assert!(matches!(err, ValidationError::NonFinite { field: "temperature", .. }));
    }

    #[test]
    fn test_blank_aircraft_id() {
        let raw = RawSensorReading {
            aircraft_id: Some("  ".into()),
            ..complete()
        };
        assert_eq!(
            Validator::default().validate(&raw).unwrap_err(),
            ValidationError::EmptyAircraftId
        );

        let lenient = Validator::new(ValidationConfig {
            reject_blank_aircraft_id: false,
            ..Default::default()
        });
        assert!(lenient.validate(&raw).is_ok());
    }

    proptest! {
        #[test]
        fn missing_mask_round_trips(mask in proptest::collection::vec(any::<bool>(), 12)) {
            let mut raw = complete();
            if mask[0] { raw.aircraft_id = None; }
            if mask[1] { raw.component_type = None; }
            if mask[2] { raw.vibration_level = None; }
            if mask[3] { raw.temperature = None; }
            if mask[4] { raw.pressure = None; }
            if mask[5] { raw.wear_level = None; }
            if mask[6] { raw.oil_quality = None; }
            if mask[7] { raw.rpm = None; }
            if mask[8] { raw.fuel_flow = None; }
            if mask[9] { raw.health_score = None; }
            if mask[10] { raw.operating_hours = None; }
            if mask[11] { raw.cycles = None; }

            let expected: Vec<&str> = REQUIRED_FIELDS
                .iter()
                .zip(&mask)
                .filter(|(_, m)| **m)
                .map(|(n, _)| *n)
                .collect();

            match Validator::default().validate(&raw) {
                Ok(_) => prop_assert!(expected.is_empty()),
                Err(e) => prop_assert_eq!(e, ValidationError::MissingFields(expected)),
            }
        }
    }
}
