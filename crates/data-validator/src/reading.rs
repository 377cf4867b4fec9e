//! Sensor Reading Types

use serde::{Deserialize, Serialize};

/// Wire names of every required field, in the order they are reported
pub const REQUIRED_FIELDS: [&str; 12] = [
    "aircraft_id",
    "component_type",
    "vibration_level",
    "temperature",
    "pressure",
    "wear_level",
    "oil_quality",
    "rpm",
    "fuel_flow",
    "health_score",
    "operating_hours",
    "cycles",
];

/// Reading as received from the transport layer, before validation.
///
/// Every field is optional so that a request with absent values still
/// deserializes and can be reported field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSensorReading {
    pub aircraft_id: Option<String>,
    pub component_type: Option<String>,
    pub vibration_level: Option<f64>,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub wear_level: Option<f64>,
    pub oil_quality: Option<f64>,
    pub rpm: Option<f64>,
    pub fuel_flow: Option<f64>,
    pub health_score: Option<f64>,
    pub operating_hours: Option<f64>,
    pub cycles: Option<f64>,
}

impl RawSensorReading {
    /// Aircraft identifier for error reporting
    pub fn aircraft_label(&self) -> &str {
        self.aircraft_id.as_deref().unwrap_or("unknown")
    }
}

impl From<SensorReading> for RawSensorReading {
    fn from(r: SensorReading) -> Self {
        Self {
            aircraft_id: Some(r.aircraft_id),
            component_type: Some(r.component_type),
            vibration_level: Some(r.vibration_level),
            temperature: Some(r.temperature),
            pressure: Some(r.pressure),
            wear_level: Some(r.wear_level),
            oil_quality: Some(r.oil_quality),
            rpm: Some(r.rpm),
            fuel_flow: Some(r.fuel_flow),
            health_score: Some(r.health_score),
            operating_hours: Some(r.operating_hours),
            cycles: Some(r.cycles),
        }
    }
}

/// Validated snapshot of one component's sensor values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Aircraft identifier (e.g. "AC001")
    pub aircraft_id: String,
    /// Component category; vocabulary is owned by the trained encoder
    pub component_type: String,
    /// Vibration level (mm/s)
    pub vibration_level: f64,
    /// Temperature (°C)
    pub temperature: f64,
    /// Pressure (PSI)
    pub pressure: f64,
    /// Wear level (%)
    pub wear_level: f64,
    /// Oil quality (%)
    pub oil_quality: f64,
    /// Rotational speed, zero for non-rotating components
    pub rpm: f64,
    /// Fuel flow (kg/h), zero for non-engine components
    pub fuel_flow: f64,
    /// Health score (0-100)
    pub health_score: f64,
    /// Cumulative operating hours
    pub operating_hours: f64,
    /// Cumulative cycles
    pub cycles: f64,
}

impl SensorReading {
    /// Numeric fields paired with their wire names
    pub fn numeric_fields(&self) -> [(&'static str, f64); 10] {
        [
            ("vibration_level", self.vibration_level),
            ("temperature", self.temperature),
            ("pressure", self.pressure),
            ("wear_level", self.wear_level),
            ("oil_quality", self.oil_quality),
            ("rpm", self.rpm),
            ("fuel_flow", self.fuel_flow),
            ("health_score", self.health_score),
            ("operating_hours", self.operating_hours),
            ("cycles", self.cycles),
        ]
    }
}
