//! Model Registry
//!
//! Holds the active artifact behind a lock that is only ever taken to clone
//! or replace an `Arc`. In-flight requests keep the snapshot they started
//! with across a reload.

use crate::artifact::{ArtifactPaths, ModelArtifact};
use crate::InferenceError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// Slot for the currently installed model artifact
#[derive(Debug, Default)]
pub struct ModelRegistry {
    slot: RwLock<Option<Arc<ModelArtifact>>>,
    generation: AtomicU64,
}

impl ModelRegistry {
    /// Registry with no artifact installed
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with `artifact` already installed
    pub fn with_artifact(artifact: ModelArtifact) -> Self {
        let registry = Self::empty();
        registry.install(artifact);
        registry
    }

    /// Atomically replace the artifact, returning the previous one
    pub fn install(&self, artifact: ModelArtifact) -> Option<Arc<ModelArtifact>> {
        self.swap(Arc::new(artifact))
    }

    fn swap(&self, artifact: Arc<ModelArtifact>) -> Option<Arc<ModelArtifact>> {
        let previous = {
            let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
            slot.replace(artifact)
        };
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Installed model artifact, generation {}", generation);
        previous
    }

    /// Snapshot of the installed artifact
    pub fn current(&self) -> Result<Arc<ModelArtifact>, InferenceError> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(InferenceError::ModelNotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of successful installs so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Load a fresh artifact and install it; on failure the slot is untouched
    pub fn load_from(&self, paths: &ArtifactPaths) -> Result<Arc<ModelArtifact>, InferenceError> {
        match ModelArtifact::load(paths) {
            Ok(artifact) => {
                let artifact = Arc::new(artifact);
                self.swap(Arc::clone(&artifact));
                Ok(artifact)
            }
            Err(e) => {
                warn!(
                    "Model load from {:?} failed, keeping current artifact (loaded: {}): {}",
                    paths.dir,
                    self.is_loaded(),
                    e
                );
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ModelMetadata, ModelMetrics};
    use crate::classifier::{ClassifierModel, LogisticClassifier};
    use crate::scaler::StandardScaler;
    use feature_engine::{CategoryEncoder, LabelEncoders, COMPONENT_TYPE_COLUMN, FEATURE_NAMES};

    fn artifact(model_type: &str) -> (ClassifierModel, StandardScaler, LabelEncoders, ModelMetadata) {
        let n = FEATURE_NAMES.len();
        (
            ClassifierModel::Logistic(LogisticClassifier::new(vec![0.0; n], 0.0)),
            StandardScaler::identity(n),
            LabelEncoders::new().with(COMPONENT_TYPE_COLUMN, CategoryEncoder::fit(["engine"])),
            ModelMetadata {
                model_type: model_type.into(),
                training_date: "2024-06-01".into(),
                n_features: None,
                feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                metrics: ModelMetrics {
                    accuracy: 0.9,
                    precision: 0.9,
                    recall: 0.9,
                    f1_score: 0.9,
                    roc_auc: 0.9,
                },
                confusion_matrix: [[1, 0], [0, 1]],
                feature_importance: Vec::new(),
                model_parameters: serde_json::Map::new(),
                feature_thresholds: None,
            },
        )
    }

    fn build(model_type: &str) -> ModelArtifact {
        let (c, s, e, m) = artifact(model_type);
        ModelArtifact::new(Box::new(c), s, e, m).unwrap()
    }

    #[test]
    fn test_empty_registry() {
        let registry = ModelRegistry::empty();
        assert!(!registry.is_loaded());
        assert!(matches!(registry.current(), Err(InferenceError::ModelNotLoaded)));
        assert_eq!(registry.generation(), 0);
    }

    #[test]
    fn test_install_swaps() {
        let registry = ModelRegistry::with_artifact(build("first"));
        let held = registry.current().unwrap();

        let previous = registry.install(build("second")).unwrap();
        assert_eq!(previous.metadata().model_type, "first");
        // An outstanding snapshot is unaffected by the swap
        assert_eq!(held.metadata().model_type, "first");
        assert_eq!(registry.current().unwrap().metadata().model_type, "second");
        assert_eq!(registry.generation(), 2);
    }

    #[test]
    fn test_failed_load_keeps_previous() {
        let registry = ModelRegistry::with_artifact(build("first"));
        let dir = tempfile::tempdir().unwrap();

        let result = registry.load_from(&ArtifactPaths::in_dir(dir.path()));
        assert!(matches!(result, Err(InferenceError::ArtifactLoad(_))));
        assert_eq!(registry.current().unwrap().metadata().model_type, "first");
        assert_eq!(registry.generation(), 1);
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let (c, s, e, m) = artifact("on_disk");
        ModelArtifact::write(&paths, &c, &s, &e, &m).unwrap();

        let registry = ModelRegistry::empty();
        let loaded = registry.load_from(&paths).unwrap();
        assert_eq!(loaded.metadata().model_type, "on_disk");
        assert!(registry.is_loaded());
    }

    #[test]
    fn test_load_returns_its_own_install() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let (c, s, e, m) = artifact("reloaded");
        ModelArtifact::write(&paths, &c, &s, &e, &m).unwrap();

        let registry = ModelRegistry::with_artifact(build("first"));
        let loaded = registry.load_from(&paths).unwrap();
        assert!(Arc::ptr_eq(&loaded, &registry.current().unwrap()));

        // A later swap does not change what the reload handed back
        let replaced = registry.install(build("racing")).unwrap();
        assert!(Arc::ptr_eq(&loaded, &replaced));
        assert_eq!(loaded.metadata().model_type, "reloaded");
        assert_eq!(registry.generation(), 3);
    }
}
