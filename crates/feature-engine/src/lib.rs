//! Feature Engineering Engine
//!
//! Derives the fixed-schema feature vector consumed by the failure
//! classifier from a validated sensor reading.

mod encoder;
mod features;
mod thresholds;

pub use encoder::{CategoryEncoder, LabelEncoders, COMPONENT_TYPE_COLUMN};
pub use features::{
    DegradationIndicators, EngineeredFeatures, FeatureEngineer, FeatureSchema, FeatureVector,
    ENGINE_CATEGORY, FEATURE_DIMENSION, FEATURE_NAMES, RISK_WEIGHTS,
};
pub use thresholds::FeatureThresholds;

use thiserror::Error;

/// Errors during feature derivation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("Unknown {column} category '{value}'")]
    Encoding { column: String, value: String },
    #[error("No encoder for column '{0}'")]
    MissingEncoder(String),
    #[error("Unknown feature '{0}'")]
    UnknownFeature(String),
    #[error("Feature '{0}' listed more than once")]
    DuplicateFeature(String),
    #[error("Encoder codec error: {0}")]
    Codec(String),
}
