//! Failure-Risk Inference Engine
//!
//! Runs validated sensor readings through the loaded model artifact and
//! assembles the risk assessment around the classifier output.

mod artifact;
mod assessment;
mod batcher;
mod classifier;
mod engine;
mod onnx;
mod registry;
mod scaler;

pub use artifact::{
    ArtifactError, ArtifactPart, ArtifactPaths, FeatureImportance, ModelArtifact, ModelInfo,
    ModelMetadata, ModelMetrics, TOP_CONTRIBUTIONS,
};
pub use assessment::{BatchOutcome, BatchSummary, ErrorRecord, RiskAssessment};
pub use batcher::BatchConfig;
pub use classifier::{
    argmax_label, check_probabilities, ClassificationOutcome, Classifier, ClassifierModel,
    DecisionTree, ForestClassifier, LogisticClassifier, TreeNode, PROBABILITY_TOLERANCE,
};
pub use engine::InferenceEngine;
pub use onnx::OnnxClassifier;
pub use registry::ModelRegistry;
pub use scaler::StandardScaler;

use data_validator::ValidationError;
use feature_engine::FeatureError;
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model not loaded")]
    ModelNotLoaded,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error("Model load failed: {0}")]
    ArtifactLoad(#[from] ArtifactError),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Batch of {size} readings exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },
}

impl InferenceError {
    /// Fields reported missing, if this is a missing-field error
    pub fn missing_fields(&self) -> Vec<&'static str> {
        match self {
            InferenceError::Validation(ValidationError::MissingFields(fields)) => fields.clone(),
            _ => Vec::new(),
        }
    }

    /// Short machine-readable kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceError::ModelNotLoaded => "model_not_loaded",
            InferenceError::Validation(ValidationError::MissingFields(_)) => "missing_fields",
            InferenceError::Validation(_) => "invalid_reading",
            InferenceError::Feature(FeatureError::Encoding { .. }) => "encoding",
            InferenceError::Feature(_) => "feature",
            InferenceError::ArtifactLoad(_) => "artifact_load",
            InferenceError::InvalidInputShape { .. } => "invalid_input_shape",
            InferenceError::InferenceFailed(_) => "inference_failed",
            InferenceError::BatchTooLarge { .. } => "batch_too_large",
        }
    }

    /// Whether the caller sent something unusable, as opposed to a server fault
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            InferenceError::Validation(_)
                | InferenceError::Feature(FeatureError::Encoding { .. })
                | InferenceError::BatchTooLarge { .. }
        )
    }
}
