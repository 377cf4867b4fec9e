//! Model Artifact Loading
//!
//! An artifact is four co-located files: classifier, scaler, encoders and
//! metadata. They are read and cross-checked together; a [`ModelArtifact`]
//! value only exists once every part has loaded.

use crate::classifier::{Classifier, ClassifierModel};
use crate::onnx::OnnxClassifier;
use crate::scaler::StandardScaler;
use feature_engine::{
    FeatureEngineer, FeatureSchema, FeatureThresholds, LabelEncoders, COMPONENT_TYPE_COLUMN,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Number of importance-ranked features echoed in each assessment
pub const TOP_CONTRIBUTIONS: usize = 5;

/// The four parts of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactPart {
    Classifier,
    Scaler,
    Encoders,
    Metadata,
}

impl fmt::Display for ArtifactPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArtifactPart::Classifier => "classifier",
            ArtifactPart::Scaler => "scaler",
            ArtifactPart::Encoders => "encoders",
            ArtifactPart::Metadata => "metadata",
        })
    }
}

/// Errors while loading or writing an artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to access {part} at {path:?}: {source}")]
    Io {
        part: ArtifactPart,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode {part}: {reason}")]
    Decode { part: ArtifactPart, reason: String },
    #[error("Inconsistent artifact: {0}")]
    Invalid(String),
}

/// Held-out evaluation metrics recorded at training time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub roc_auc: f64,
}

impl ModelMetrics {
    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("accuracy", self.accuracy),
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1_score", self.f1_score),
            ("roc_auc", self.roc_auc),
        ]
    }
}

/// Importance of one feature in the trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Metadata document stored next to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_type: String,
    pub training_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
    /// Column order of the classifier input
    pub feature_names: Vec<String>,
    pub metrics: ModelMetrics,
    pub confusion_matrix: [[u64; 2]; 2],
    /// Ranked most important first
    pub feature_importance: Vec<FeatureImportance>,
    pub model_parameters: serde_json::Map<String, serde_json::Value>,
    /// Indicator thresholds learned at training time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_thresholds: Option<FeatureThresholds>,
}

/// Summary served by the model-info endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub training_date: String,
    pub metrics: ModelMetrics,
    pub n_features: usize,
}

/// Where the four artifact files live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    /// `.onnx` files load through tract, anything else as a postcard blob
    pub classifier: String,
    pub scaler: String,
    pub encoders: String,
    pub metadata: String,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
            classifier: "classifier.bin".to_string(),
            scaler: "scaler.bin".to_string(),
            encoders: "encoders.bin".to_string(),
            metadata: "model_metadata.json".to_string(),
        }
    }
}

impl ArtifactPaths {
    /// Default file names under `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Default::default()
        }
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.dir.join(&self.classifier)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(&self.scaler)
    }

    pub fn encoders_path(&self) -> PathBuf {
        self.dir.join(&self.encoders)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(&self.metadata)
    }

    fn classifier_is_onnx(&self) -> bool {
        Path::new(&self.classifier)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"))
    }
}

fn read_part(part: ArtifactPart, path: &Path) -> Result<Vec<u8>, ArtifactError> {
    std::fs::read(path).map_err(|source| ArtifactError::Io {
        part,
        path: path.to_path_buf(),
        source,
    })
}

fn write_part(part: ArtifactPart, path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    std::fs::write(path, bytes).map_err(|source| ArtifactError::Io {
        part,
        path: path.to_path_buf(),
        source,
    })
}

/// Everything inference needs, immutable once built
pub struct ModelArtifact {
    classifier: Box<dyn Classifier>,
    scaler: StandardScaler,
    encoders: LabelEncoders,
    metadata: ModelMetadata,
    schema: FeatureSchema,
    engineer: FeatureEngineer,
}

impl fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("classifier", &self.classifier.kind())
            .field("model_type", &self.metadata.model_type)
            .field("training_date", &self.metadata.training_date)
            .field("n_features", &self.schema.len())
            .finish()
    }
}

impl ModelArtifact {
    /// Assemble an artifact from its parts, cross-checking them
    pub fn new(
        classifier: Box<dyn Classifier>,
        scaler: StandardScaler,
        encoders: LabelEncoders,
        metadata: ModelMetadata,
    ) -> Result<Self, ArtifactError> {
        let schema = FeatureSchema::from_names(&metadata.feature_names)
            .map_err(|e| ArtifactError::Invalid(format!("feature_names: {}", e)))?;
        let width = schema.len();

        if width == 0 {
            return Err(ArtifactError::Invalid("feature_names is empty".into()));
        }
        if let Some(n) = metadata.n_features {
            if n != width {
                return Err(ArtifactError::Invalid(format!(
                    "n_features is {} but {} feature names are listed",
                    n, width
                )));
            }
        }
        if scaler.len() != width {
            return Err(ArtifactError::Invalid(format!(
                "scaler covers {} columns, schema has {}",
                scaler.len(),
                width
            )));
        }
        if let Some(n) = classifier.n_features() {
            if n != width {
                return Err(ArtifactError::Invalid(format!(
                    "classifier expects {} features, schema has {}",
                    n, width
                )));
            }
        }
        encoders
            .get(COMPONENT_TYPE_COLUMN)
            .map_err(|e| ArtifactError::Invalid(e.to_string()))?;

        for (name, value) in metadata.metrics.named() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ArtifactError::Invalid(format!(
                    "metric {} = {} is outside [0, 1]",
                    name, value
                )));
            }
        }
        if let Some(missing) = metadata
            .feature_importance
            .iter()
            .find(|fi| !metadata.feature_names.contains(&fi.feature))
        {
            return Err(ArtifactError::Invalid(format!(
                "feature_importance lists '{}' which is not a model feature",
                missing.feature
            )));
        }

        let thresholds = match metadata.feature_thresholds {
            Some(t) => {
                info!("Using training-time indicator thresholds from metadata: {:?}", t);
                t
            }
            None => FeatureThresholds::default(),
        };

        Ok(Self {
            classifier,
            scaler,
            encoders,
            metadata,
            schema,
            engineer: FeatureEngineer::new(thresholds),
        })
    }

    /// Load all four parts from disk; any failure aborts the whole load
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        info!("Loading model artifact from {:?}", paths.dir);

        let metadata_bytes = read_part(ArtifactPart::Metadata, &paths.metadata_path())?;
        let metadata: ModelMetadata =
            serde_json::from_slice(&metadata_bytes).map_err(|e| ArtifactError::Decode {
                part: ArtifactPart::Metadata,
                reason: e.to_string(),
            })?;

        let encoders = LabelEncoders::from_bytes(&read_part(
            ArtifactPart::Encoders,
            &paths.encoders_path(),
        )?)
        .map_err(|e| ArtifactError::Decode {
            part: ArtifactPart::Encoders,
            reason: e.to_string(),
        })?;

        let scaler = StandardScaler::from_bytes(&read_part(ArtifactPart::Scaler, &paths.scaler_path())?)
            .map_err(|reason| ArtifactError::Decode {
                part: ArtifactPart::Scaler,
                reason,
            })?;

        let classifier: Box<dyn Classifier> = if paths.classifier_is_onnx() {
            let path = paths.classifier_path();
            if !path.is_file() {
                // Surface a missing file as I/O rather than a tract parse error
                read_part(ArtifactPart::Classifier, &path)?;
            }
            let model = OnnxClassifier::load(&path, metadata.feature_names.len()).map_err(|e| {
                ArtifactError::Decode {
                    part: ArtifactPart::Classifier,
                    reason: e.to_string(),
                }
            })?;
            Box::new(model)
        } else {
            let bytes = read_part(ArtifactPart::Classifier, &paths.classifier_path())?;
            Box::new(
                ClassifierModel::from_bytes(&bytes).map_err(|reason| ArtifactError::Decode {
                    part: ArtifactPart::Classifier,
                    reason,
                })?,
            )
        };

        let artifact = Self::new(classifier, scaler, encoders, metadata)?;
        info!(
            "Model loaded: {} ({}) trained {}, accuracy {:.2}%, precision {:.2}%",
            artifact.metadata.model_type,
            artifact.classifier.kind(),
            artifact.metadata.training_date,
            artifact.metadata.metrics.accuracy * 100.0,
            artifact.metadata.metrics.precision * 100.0
        );
        if artifact.metadata.feature_thresholds.is_none() {
            warn!("Metadata carries no indicator thresholds; serving with fixed defaults");
        }
        Ok(artifact)
    }

    /// Write a native-classifier artifact to disk
    pub fn write(
        paths: &ArtifactPaths,
        classifier: &ClassifierModel,
        scaler: &StandardScaler,
        encoders: &LabelEncoders,
        metadata: &ModelMetadata,
    ) -> Result<(), ArtifactError> {
        // Refuse to persist something that would not load back
        Self::new(
            Box::new(classifier.clone()),
            scaler.clone(),
            encoders.clone(),
            metadata.clone(),
        )?;

        std::fs::create_dir_all(&paths.dir).map_err(|source| ArtifactError::Io {
            part: ArtifactPart::Metadata,
            path: paths.dir.clone(),
            source,
        })?;

        let encode = |part, r: Result<Vec<u8>, String>| {
            r.map_err(|reason| ArtifactError::Decode { part, reason })
        };
        write_part(
            ArtifactPart::Classifier,
            &paths.classifier_path(),
            &encode(ArtifactPart::Classifier, classifier.to_bytes())?,
        )?;
        write_part(
            ArtifactPart::Scaler,
            &paths.scaler_path(),
            &encode(ArtifactPart::Scaler, scaler.to_bytes())?,
        )?;
        write_part(
            ArtifactPart::Encoders,
            &paths.encoders_path(),
            &encode(ArtifactPart::Encoders, encoders.to_bytes().map_err(|e| e.to_string()))?,
        )?;
        let json = serde_json::to_vec_pretty(metadata).map_err(|e| ArtifactError::Decode {
            part: ArtifactPart::Metadata,
            reason: e.to_string(),
        })?;
        write_part(ArtifactPart::Metadata, &paths.metadata_path(), &json)?;

        info!("Model artifact written to {:?}", paths.dir);
        Ok(())
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn encoders(&self) -> &LabelEncoders {
        &self.encoders
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Column order of the classifier input
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Feature engineer configured with this artifact's thresholds
    pub fn engineer(&self) -> &FeatureEngineer {
        &self.engineer
    }

    /// The most important features, at most [`TOP_CONTRIBUTIONS`]
    pub fn top_features(&self) -> impl Iterator<Item = &str> {
        self.metadata
            .feature_importance
            .iter()
            .take(TOP_CONTRIBUTIONS)
            .map(|fi| fi.feature.as_str())
    }

    /// Summary for the model-info endpoint
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            model_type: self.metadata.model_type.clone(),
            training_date: self.metadata.training_date.clone(),
            metrics: self.metadata.metrics.clone(),
            n_features: self.metadata.n_features.unwrap_or(self.schema.len()),
        }
    }
}
