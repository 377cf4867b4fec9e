//! ONNX classifier backed by tract
//!
//! Loads binary classifiers exported to ONNX (e.g. scikit-learn models
//! converted without the ZipMap post-processor). Output 0 is the label
//! tensor and output 1 the `[1, 2]` probability tensor; single-output
//! models are read as probabilities only.

use crate::classifier::{argmax_label, check_probabilities, Classifier, ClassificationOutcome};
use crate::InferenceError;
use alerting::FailureLabel;
use std::fmt;
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::{debug, info};

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Classifier running an optimized tract plan
pub struct OnnxClassifier {
    model: TractModel,
    n_features: usize,
}

impl fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("n_features", &self.n_features)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    /// Load and optimize a model expecting `[1, n_features]` f32 input
    pub fn load(path: &Path, n_features: usize) -> TractResult<Self> {
        info!("Loading ONNX classifier from {:?}", path);
        let model = tract_onnx::onnx()
            .model_for_path(path)?
            .with_input_fact(0, f32::fact([1, n_features]).into())?
            .into_optimized()?
            .into_runnable()?;
        Ok(Self { model, n_features })
    }

    fn run(&self, features: &[f64]) -> Result<ClassificationOutcome, InferenceError> {
        if features.len() != self.n_features {
            return Err(InferenceError::InvalidInputShape {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let data: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.n_features), data)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
            .into();

        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let proba_output = outputs
            .get(1)
            .or_else(|| outputs.first())
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".into()))?;
        let proba: Vec<f32> = proba_output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(format!("probability output: {}", e)))?
            .iter()
            .copied()
            .collect();
        if proba.len() != 2 {
            return Err(InferenceError::InferenceFailed(format!(
                "expected 2 class probabilities, got {}",
                proba.len()
            )));
        }
        let probabilities = check_probabilities([widen(proba[0]), widen(proba[1])])?;

        let label = match outputs.len() {
            n if n >= 2 => outputs[0]
                .to_array_view::<i64>()
                .ok()
                .and_then(|view| view.iter().next().copied())
                .and_then(|class| usize::try_from(class).ok())
                .and_then(FailureLabel::from_class)
                .unwrap_or_else(|| argmax_label(probabilities)),
            _ => argmax_label(probabilities),
        };

        debug!("ONNX outcome {} {:?}", label, probabilities);
        Ok(ClassificationOutcome {
            label,
            probabilities,
        })
    }
}

/// f32 → f64 through the shortest decimal that round-trips the f32
///
/// `f64::from(0.9f32)` is 0.8999999762, which would fall below a 0.90 alert
/// threshold the exported model meant to reach.
fn widen(p: f32) -> f64 {
    p.to_string().parse().unwrap_or_else(|_| f64::from(p))
}

impl Classifier for OnnxClassifier {
    fn predict_label(&self, features: &[f64]) -> Result<FailureLabel, InferenceError> {
        Ok(self.run(features)?.label)
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        Ok(self.run(features)?.probabilities)
    }

    fn classify(&self, features: &[f64]) -> Result<ClassificationOutcome, InferenceError> {
        self.run(features)
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use alerting::{AlertClassifier, AlertConfig, AlertTier};

    #[test]
    fn test_widen_keeps_exported_decimals() {
        assert!(f64::from(0.9f32) < 0.9);
        assert_eq!(widen(0.9), 0.9);
        assert_eq!(widen(0.85), 0.85);
        assert_eq!(widen(0.1), 0.1);
        assert_eq!(widen(1.0), 1.0);
        assert_eq!(widen(0.0), 0.0);

        let alerts = AlertClassifier::new(AlertConfig::default());
        assert_eq!(alerts.classify(FailureLabel::Failure, widen(0.9)), AlertTier::Critical);
        assert_eq!(alerts.classify(FailureLabel::Failure, widen(0.85)), AlertTier::High);
        assert!(check_probabilities([widen(0.1), widen(0.9)]).is_ok());
    }

    #[test]
    fn test_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = OnnxClassifier::load(&dir.path().join("absent.onnx"), 25);
        assert!(result.is_err());
    }

    #[test]
    fn test_garbage_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classifier.onnx");
        std::fs::write(&path, b"not a protobuf").unwrap();
        assert!(OnnxClassifier::load(&path, 25).is_err());
    }
}
