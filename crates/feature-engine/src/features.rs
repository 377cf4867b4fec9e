//! Feature Vector Assembly

use crate::encoder::{LabelEncoders, COMPONENT_TYPE_COLUMN};
use crate::thresholds::FeatureThresholds;
use crate::FeatureError;
use data_validator::SensorReading;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of known features
pub const FEATURE_DIMENSION: usize = 25;

/// Every known feature in canonical order
pub const FEATURE_NAMES: [&str; FEATURE_DIMENSION] = [
    "component_type_encoded",
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
    "vibration_temp_ratio",
    "pressure_wear_product",
    "health_wear_ratio",
    "vibration_squared",
    "temperature_squared",
    "wear_squared",
    "critical_vibration",
    "critical_temperature",
    "critical_wear",
    "low_oil_quality",
    "risk_score",
    "high_operating_hours",
    "high_cycles",
    "engine_specific",
];

/// Category that enables the `engine_specific` indicator
pub const ENGINE_CATEGORY: &str = "engine";

/// Weights of (vibration, temperature, wear, oil) in the risk score
pub const RISK_WEIGHTS: [f64; 4] = [0.3, 0.25, 0.25, 0.2];

/// Binary threshold indicators derived from a reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradationIndicators {
    pub critical_vibration: bool,
    pub critical_temperature: bool,
    pub critical_wear: bool,
    pub low_oil_quality: bool,
    pub high_operating_hours: bool,
    pub high_cycles: bool,
    pub engine_specific: bool,
}

impl DegradationIndicators {
    /// Evaluate every indicator against `thresholds`
    pub fn evaluate(reading: &SensorReading, thresholds: &FeatureThresholds) -> Self {
        Self {
            critical_vibration: reading.vibration_level > thresholds.vibration,
            critical_temperature: reading.temperature > thresholds.temperature,
            critical_wear: reading.wear_level > thresholds.wear_level,
            low_oil_quality: reading.oil_quality < thresholds.oil_quality,
            high_operating_hours: reading.operating_hours > thresholds.operating_hours,
            high_cycles: reading.cycles > thresholds.cycles,
            engine_specific: reading.component_type == ENGINE_CATEGORY && reading.rpm > 0.0,
        }
    }

    /// Weighted sum of the four degradation bits, in [0, 1]
    pub fn risk_score(&self) -> f64 {
        bit(self.critical_vibration) * RISK_WEIGHTS[0]
            + bit(self.critical_temperature) * RISK_WEIGHTS[1]
            + bit(self.critical_wear) * RISK_WEIGHTS[2]
            + bit(self.low_oil_quality) * RISK_WEIGHTS[3]
    }
}

fn bit(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// All derived features of one reading, with named access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineeredFeatures {
    /// Source reading
    pub reading: SensorReading,
    /// Index of the component category in the trained vocabulary
    pub component_type_encoded: usize,
    pub vibration_temp_ratio: f64,
    pub pressure_wear_product: f64,
    pub health_wear_ratio: f64,
    pub vibration_squared: f64,
    pub temperature_squared: f64,
    pub wear_squared: f64,
    pub indicators: DegradationIndicators,
    /// Continuous risk component in [0, 1]
    pub risk_score: f64,
}

impl EngineeredFeatures {
    /// Values in [`FEATURE_NAMES`] order
    pub fn canonical_values(&self) -> [f64; FEATURE_DIMENSION] {
        let r = &self.reading;
        let i = &self.indicators;
        [
            self.component_type_encoded as f64,
            r.vibration_level,
            r.temperature,
            r.pressure,
            r.wear_level,
            r.oil_quality,
            r.rpm,
            r.fuel_flow,
            r.health_score,
            r.operating_hours,
            r.cycles,
            self.vibration_temp_ratio,
            self.pressure_wear_product,
            self.health_wear_ratio,
            self.vibration_squared,
            self.temperature_squared,
            self.wear_squared,
            bit(i.critical_vibration),
            bit(i.critical_temperature),
            bit(i.critical_wear),
            bit(i.low_oil_quality),
            self.risk_score,
            bit(i.high_operating_hours),
            bit(i.high_cycles),
            bit(i.engine_specific),
        ]
    }

    /// Value of a single feature by name
    pub fn value(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.canonical_values()[idx])
    }

    /// Project onto a schema's column order
    pub fn to_vector(&self, schema: &FeatureSchema) -> FeatureVector {
        let canonical = self.canonical_values();
        FeatureVector {
            names: schema.names().collect(),
            values: schema.columns.iter().map(|&idx| canonical[idx]).collect(),
        }
    }
}

/// Column order a trained artifact expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    /// Indices into [`FEATURE_NAMES`]
    columns: Vec<usize>,
}

impl FeatureSchema {
    /// Resolve names against the known features; unknown or repeated names fail
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, FeatureError> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let idx = FEATURE_NAMES
                .iter()
                .position(|n| *n == name)
                .ok_or_else(|| FeatureError::UnknownFeature(name.to_string()))?;
            if columns.contains(&idx) {
                return Err(FeatureError::DuplicateFeature(name.to_string()));
            }
            columns.push(idx);
        }
        Ok(Self { columns })
    }

    /// Every known feature in canonical order
    pub fn canonical() -> Self {
        Self {
            columns: (0..FEATURE_DIMENSION).collect(),
        }
    }

    /// Column names in order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|&idx| FEATURE_NAMES[idx])
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Ordered feature columns presented to the classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    names: Vec<&'static str>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Column names
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Column values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value by column name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.values[idx])
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector has no columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Derives engineered features from validated readings
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    thresholds: FeatureThresholds,
}

impl FeatureEngineer {
    /// Create an engineer with the given indicator thresholds
    pub fn new(thresholds: FeatureThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use
    pub fn thresholds(&self) -> &FeatureThresholds {
        &self.thresholds
    }

    /// Derive every feature of `reading`; fails for unseen categories
    pub fn derive(
        &self,
        reading: &SensorReading,
        encoders: &LabelEncoders,
    ) -> Result<EngineeredFeatures, FeatureError> {
        let component_type_encoded =
            encoders.encode(COMPONENT_TYPE_COLUMN, &reading.component_type)?;

        let indicators = DegradationIndicators::evaluate(reading, &self.thresholds);
        let risk_score = indicators.risk_score();

        debug!(
            aircraft_id = %reading.aircraft_id,
            component = %reading.component_type,
            risk_score,
            "Derived features"
        );

        Ok(EngineeredFeatures {
            reading: reading.clone(),
            component_type_encoded,
            vibration_temp_ratio: reading.vibration_level / (reading.temperature + 1.0),
            pressure_wear_product: reading.pressure * reading.wear_level,
            health_wear_ratio: reading.health_score / (reading.wear_level + 1.0),
            vibration_squared: reading.vibration_level.powi(2),
            temperature_squared: reading.temperature.powi(2),
            wear_squared: reading.wear_level.powi(2),
            indicators,
            risk_score,
        })
    }
}
