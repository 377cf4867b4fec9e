//! Degradation Indicator Thresholds

use serde::{Deserialize, Serialize};

/// Cut-offs for the binary degradation indicators.
///
/// Defaults are the fixed serving constants. Artifacts that persist the
/// training-time percentiles override them field by field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureThresholds {
    /// `critical_vibration` when vibration is above this
    pub vibration: f64,
    /// `critical_temperature` when temperature is above this
    pub temperature: f64,
    /// `critical_wear` when wear level is above this
    pub wear_level: f64,
    /// `low_oil_quality` when oil quality is below this
    pub oil_quality: f64,
    /// `high_operating_hours` when hours are above this
    pub operating_hours: f64,
    /// `high_cycles` when cycles are above this
    pub cycles: f64,
}

impl Default for FeatureThresholds {
    fn default() -> Self {
        Self {
            vibration: 6.0,
            temperature: 600.0,
            wear_level: 75.0,
            oil_quality: 80.0,
            operating_hours: 7500.0,
            cycles: 3750.0,
        }
    }
}
