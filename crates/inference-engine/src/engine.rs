//! Inference Engine Implementation

use crate::artifact::ModelArtifact;
use crate::assessment::{BatchOutcome, ErrorRecord, RiskAssessment};
use crate::batcher::BatchConfig;
use crate::registry::ModelRegistry;
use crate::InferenceError;
use alerting::{
    round2, AlertClassifier, RecommendationGenerator, RiskFactorIdentifier, RiskScorer,
    TimeToFailureEstimator,
};
use chrono::{DateTime, Utc};
use data_validator::{RawSensorReading, SensorReading, Validator};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sensor-to-risk pipeline over the registry's current artifact
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    registry: Arc<ModelRegistry>,
    validator: Validator,
    alerts: AlertClassifier,
    batch: BatchConfig,
}

impl InferenceEngine {
    /// Create a new inference engine
    pub fn new(
        registry: Arc<ModelRegistry>,
        validator: Validator,
        alerts: AlertClassifier,
        batch: BatchConfig,
    ) -> Self {
        info!(
            "Creating inference engine: critical>={}, high>={}, parallel batches>={}",
            alerts.config().critical_threshold,
            alerts.config().high_threshold,
            batch.parallel_threshold
        );
        Self {
            registry,
            validator,
            alerts,
            batch,
        }
    }

    /// Engine with default settings over `registry`
    pub fn with_registry(registry: Arc<ModelRegistry>) -> Self {
        Self::new(
            registry,
            Validator::default(),
            AlertClassifier::default(),
            BatchConfig::default(),
        )
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn batch_config(&self) -> &BatchConfig {
        &self.batch
    }

    /// Assess one validated reading, stamped now
    pub fn predict_one(&self, reading: &SensorReading) -> Result<RiskAssessment, InferenceError> {
        self.predict_one_at(reading, Utc::now())
    }

    /// Assess one validated reading with an explicit timestamp
    pub fn predict_one_at(
        &self,
        reading: &SensorReading,
        timestamp: DateTime<Utc>,
    ) -> Result<RiskAssessment, InferenceError> {
        let artifact = self.registry.current()?;
        self.validator.check(reading)?;
        self.assess(&artifact, reading, timestamp)
    }

    /// Validate and assess one untyped reading, stamped now
    pub fn predict_raw(&self, raw: &RawSensorReading) -> Result<RiskAssessment, InferenceError> {
        self.predict_raw_at(raw, Utc::now())
    }

    /// Validate and assess one untyped reading with an explicit timestamp
    pub fn predict_raw_at(
        &self,
        raw: &RawSensorReading,
        timestamp: DateTime<Utc>,
    ) -> Result<RiskAssessment, InferenceError> {
        let artifact = self.registry.current()?;
        let reading = self.validator.validate(raw)?;
        self.assess(&artifact, &reading, timestamp)
    }

    /// Assess a batch; per-reading failures become [`ErrorRecord`]s in place
    pub fn predict_batch(
        &self,
        readings: &[RawSensorReading],
    ) -> Result<Vec<BatchOutcome>, InferenceError> {
        self.predict_batch_at(readings, Utc::now())
    }

    /// Batch variant of [`Self::predict_raw_at`]; every element shares `timestamp`
    pub fn predict_batch_at(
        &self,
        readings: &[RawSensorReading],
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<BatchOutcome>, InferenceError> {
        if readings.len() > self.batch.max_batch_size {
            return Err(InferenceError::BatchTooLarge {
                size: readings.len(),
                max: self.batch.max_batch_size,
            });
        }

        // One snapshot for the whole batch, even across a concurrent reload
        let artifact = self.registry.current()?;
        let start = Instant::now();

        let outcomes = self.batch.run(readings, |raw| {
            let result = self
                .validator
                .validate(raw)
                .map_err(InferenceError::from)
                .and_then(|reading| self.assess(&artifact, &reading, timestamp));

            match result {
                Ok(assessment) => BatchOutcome::Assessment(Box::new(assessment)),
                Err(e) => {
                    warn!(aircraft_id = raw.aircraft_label(), "Batch reading rejected: {}", e);
                    BatchOutcome::Error(ErrorRecord {
                        aircraft_id: raw.aircraft_label().to_string(),
                        error: e.to_string(),
                        missing_fields: e.missing_fields().into_iter().map(String::from).collect(),
                    })
                }
            }
        });

        debug!(
            "Batch of {} assessed in {}ms",
            readings.len(),
            start.elapsed().as_millis()
        );
        Ok(outcomes)
    }

    fn assess(
        &self,
        artifact: &ModelArtifact,
        reading: &SensorReading,
        timestamp: DateTime<Utc>,
    ) -> Result<RiskAssessment, InferenceError> {
        let features = artifact.engineer().derive(reading, artifact.encoders())?;
        let vector = features.to_vector(artifact.schema());
        let scaled = artifact.scaler().transform(vector.values())?;
        let outcome = artifact.classifier().classify(&scaled)?;

        let label = outcome.label;
        let confidence = AlertClassifier::confidence(label, outcome.probabilities);
        let alert_level = self.alerts.classify(label, confidence);
        let days_to_failure =
            TimeToFailureEstimator::estimate(label, reading.health_score, features.risk_score);

        let feature_contributions: BTreeMap<String, f64> = artifact
            .top_features()
            .filter_map(|name| features.value(name).map(|v| (name.to_string(), v)))
            .collect();

        debug!(
            aircraft_id = %reading.aircraft_id,
            prediction = %label,
            confidence,
            alert_level = %alert_level,
            "Assessed reading"
        );

        Ok(RiskAssessment {
            aircraft_id: reading.aircraft_id.clone(),
            component_type: reading.component_type.clone(),
            prediction: label,
            confidence: round2(confidence * 100.0),
            alert_level,
            days_to_failure,
            health_score: reading.health_score,
            risk_score: RiskScorer::score_pct(&features),
            top_risk_factors: RiskFactorIdentifier::identify(&features),
            feature_contributions,
            recommendation: RecommendationGenerator::generate(label, alert_level, days_to_failure),
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{FeatureImportance, ModelMetadata, ModelMetrics};
    use crate::classifier::{ClassifierModel, LogisticClassifier};
    use crate::scaler::StandardScaler;
    use alerting::{AlertTier, FailureLabel};
    use chrono::TimeZone;
    use data_validator::ValidationError;
    use feature_engine::{
        CategoryEncoder, FeatureError, LabelEncoders, COMPONENT_TYPE_COLUMN, FEATURE_NAMES,
    };
    use proptest::prelude::*;

    /// Logistic model driven only by the risk score column
    fn artifact() -> ModelArtifact {
        let n = FEATURE_NAMES.len();
        let risk_col = FEATURE_NAMES
            .iter()
            .position(|n| *n == "risk_score")
            .unwrap();
        let mut coefficients = vec![0.0; n];
        coefficients[risk_col] = 10.0;

        let importance = ["risk_score", "wear_level", "vibration_level", "temperature", "oil_quality", "rpm"];
        let metadata = ModelMetadata {
            model_type: "LogisticRegression".into(),
            training_date: "2024-06-01 12:00:00".into(),
            n_features: Some(n),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            metrics: ModelMetrics {
                accuracy: 0.93,
                precision: 0.88,
                recall: 0.81,
                f1_score: 0.84,
                roc_auc: 0.96,
            },
            confusion_matrix: [[1800, 40], [70, 90]],
            feature_importance: importance
                .iter()
                .map(|f| FeatureImportance {
                    feature: f.to_string(),
                    importance: 0.1,
                })
                .collect(),
            model_parameters: serde_json::Map::new(),
            feature_thresholds: None,
        };

        ModelArtifact::new(
            Box::new(ClassifierModel::Logistic(LogisticClassifier::new(coefficients, -5.0))),
            StandardScaler::identity(n),
            LabelEncoders::new().with(
                COMPONENT_TYPE_COLUMN,
                CategoryEncoder::fit(["engine", "landing_gear", "hydraulic_system", "avionics"]),
            ),
            metadata,
        )
        .unwrap()
    }

    fn engine() -> InferenceEngine {
        InferenceEngine::with_registry(Arc::new(ModelRegistry::with_artifact(artifact())))
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn degraded_engine() -> SensorReading {
        SensorReading {
            aircraft_id: "AC-1042".into(),
            component_type: "engine".into(),
            vibration_level: 8.5,
            temperature: 750.0,
            pressure: 35.0,
            wear_level: 85.0,
            oil_quality: 65.0,
            rpm: 4500.0,
            fuel_flow: 1200.0,
            health_score: 45.0,
            operating_hours: 8500.0,
            cycles: 4200.0,
        }
    }

    fn healthy_gear() -> SensorReading {
        SensorReading {
            aircraft_id: "AC-2001".into(),
            component_type: "landing_gear".into(),
            vibration_level: 2.0,
            temperature: 300.0,
            pressure: 40.0,
            wear_level: 20.0,
            oil_quality: 95.0,
            rpm: 0.0,
            fuel_flow: 0.0,
            health_score: 92.0,
            operating_hours: 1500.0,
            cycles: 800.0,
        }
    }

    #[test]
    fn test_degraded_engine_scenario() {
        let a = engine().predict_one_at(&degraded_engine(), stamp()).unwrap();

        assert_eq!(a.prediction, FailureLabel::Failure);
        assert_eq!(a.risk_score, 100.0);
        assert_eq!(a.days_to_failure, Some(1));
        assert_eq!(a.alert_level, AlertTier::Critical);
        assert!(a.confidence >= 90.0 && a.confidence <= 100.0);
        assert_eq!(a.health_score, 45.0);
        assert!(a.recommendation.contains("immediate inspection"));

        let factors: Vec<&str> = a.top_risk_factors.iter().map(|f| f.factor.as_str()).collect();
        assert_eq!(factors, vec!["High Vibration", "High Temperature", "Excessive Wear"]);

        assert_eq!(a.feature_contributions.len(), 5);
        assert_eq!(a.feature_contributions["wear_level"], 85.0);
        assert_eq!(a.feature_contributions["risk_score"], 1.0);
        assert!(!a.feature_contributions.contains_key("rpm"));
    }

    #[test]
    fn test_healthy_reading() {
        let a = engine().predict_one_at(&healthy_gear(), stamp()).unwrap();

        assert_eq!(a.prediction, FailureLabel::NoFailure);
        assert_eq!(a.alert_level, AlertTier::None);
        assert_eq!(a.days_to_failure, None);
        assert_eq!(a.risk_score, 0.0);
        assert!(a.top_risk_factors.is_empty());
        assert!(a.recommendation.contains("routine monitoring"));
    }

    #[test]
    fn test_unknown_component_type() {
        let mut reading = degraded_engine();
        reading.component_type = "rotor".into();

        match engine().predict_one(&reading) {
            Err(InferenceError::Feature(FeatureError::Encoding { column, value })) => {
                assert_eq!(column, "component_type");
                assert_eq!(value, "rotor");
            }
            other => panic!("expected encoding error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_oil_quality() {
        let mut raw = RawSensorReading::from(degraded_engine());
        raw.oil_quality = None;

        let err = engine().predict_raw(&raw).unwrap_err();
        assert!(matches!(
            &err,
            InferenceError::Validation(ValidationError::MissingFields(f)) if f == &vec!["oil_quality"]
        ));
        assert_eq!(err.missing_fields(), vec!["oil_quality"]);
        assert!(err.is_bad_request());
    }

    #[test]
    fn test_model_not_loaded() {
        let engine = InferenceEngine::with_registry(Arc::new(ModelRegistry::empty()));
        assert!(matches!(
            engine.predict_one(&healthy_gear()),
            Err(InferenceError::ModelNotLoaded)
        ));
        assert!(matches!(
            engine.predict_batch(&[RawSensorReading::from(healthy_gear())]),
            Err(InferenceError::ModelNotLoaded)
        ));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let mut rotor = RawSensorReading::from(degraded_engine());
        rotor.component_type = Some("rotor".into());
        rotor.aircraft_id = Some("AC-3300".into());

        let readings = vec![
            RawSensorReading::from(degraded_engine()),
            rotor,
            RawSensorReading::from(healthy_gear()),
        ];
        let out = engine().predict_batch_at(&readings, stamp()).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].assessment().unwrap().aircraft_id, "AC-1042");
        let err = out[1].error().unwrap();
        assert_eq!(err.aircraft_id, "AC-3300");
        assert!(err.error.contains("rotor"));
        assert!(err.missing_fields.is_empty());
        assert_eq!(out[2].assessment().unwrap().aircraft_id, "AC-2001");
    }

    #[test]
    fn test_batch_missing_id() {
        let mut raw = RawSensorReading::from(healthy_gear());
        raw.aircraft_id = None;
        raw.cycles = None;

        let out = engine().predict_batch_at(&[raw], stamp()).unwrap();
        let err = out[0].error().unwrap();
        assert_eq!(err.aircraft_id, "unknown");
        assert_eq!(err.missing_fields, vec!["aircraft_id", "cycles"]);
    }

    #[test]
    fn test_batch_too_large() {
        let registry = Arc::new(ModelRegistry::with_artifact(artifact()));
        let engine = InferenceEngine::new(
            registry,
            Validator::default(),
            AlertClassifier::default(),
            BatchConfig {
                max_batch_size: 2,
                ..Default::default()
            },
        );
        let readings = vec![RawSensorReading::from(healthy_gear()); 3];
        assert!(matches!(
            engine.predict_batch(&readings),
            Err(InferenceError::BatchTooLarge { size: 3, max: 2 })
        ));
    }

    #[test]
    fn test_parallel_batch_matches_sequential() {
        let registry = Arc::new(ModelRegistry::with_artifact(artifact()));
        let parallel = InferenceEngine::new(
            registry.clone(),
            Validator::default(),
            AlertClassifier::default(),
            BatchConfig {
                parallel_threshold: 2,
                max_workers: 4,
                max_batch_size: 1000,
            },
        );
        let sequential = InferenceEngine::new(
            registry,
            Validator::default(),
            AlertClassifier::default(),
            BatchConfig {
                parallel_threshold: usize::MAX,
                max_workers: 1,
                max_batch_size: 1000,
            },
        );

        let readings: Vec<RawSensorReading> = (0..37)
            .map(|i| {
                let mut r = if i % 3 == 0 { degraded_engine() } else { healthy_gear() };
                r.aircraft_id = format!("AC-{}", i);
                RawSensorReading::from(r)
            })
            .collect();

        let a = parallel.predict_batch_at(&readings, stamp()).unwrap();
        let b = sequential.predict_batch_at(&readings, stamp()).unwrap();
        assert_eq!(a, b);
        for (i, outcome) in a.iter().enumerate() {
            assert_eq!(outcome.assessment().unwrap().aircraft_id, format!("AC-{}", i));
        }
    }

    #[test]
    fn test_batch_sees_single_snapshot() {
        let registry = Arc::new(ModelRegistry::with_artifact(artifact()));
        let engine = InferenceEngine::with_registry(registry.clone());
        let before = registry.current().unwrap();
        let out = engine
            .predict_batch_at(&[RawSensorReading::from(healthy_gear())], stamp())
            .unwrap();
        assert_eq!(out.len(), 1);
        // Snapshots are shared, not copied
        assert!(Arc::ptr_eq(&before, &registry.current().unwrap()));
    }

    proptest! {
        #[test]
        fn prop_idempotent_and_consistent(
            vibration in 0.0f64..15.0,
            temperature in 100.0f64..900.0,
            wear in 0.0f64..100.0,
            oil in 30.0f64..100.0,
            health in 0.0f64..100.0,
            hours in 0.0f64..12000.0,
        ) {
            let engine = engine();
            let mut reading = degraded_engine();
            reading.vibration_level = vibration;
            reading.temperature = temperature;
            reading.wear_level = wear;
            reading.oil_quality = oil;
            reading.health_score = health;
            reading.operating_hours = hours;

            let a = engine.predict_one_at(&reading, stamp()).unwrap();
            let b = engine.predict_one_at(&reading, stamp()).unwrap();
            prop_assert_eq!(&a, &b);

            prop_assert!((0.0..=100.0).contains(&a.confidence));
            prop_assert!((0.0..=100.0).contains(&a.risk_score));
            prop_assert!(a.top_risk_factors.len() <= 3);
            match a.prediction {
                FailureLabel::NoFailure => {
                    prop_assert_eq!(a.days_to_failure, None);
                    prop_assert_eq!(a.alert_level, AlertTier::None);
                }
                FailureLabel::Failure => {
                    let days = a.days_to_failure.unwrap();
                    prop_assert!((1..=30).contains(&days));
                    prop_assert_ne!(a.alert_level, AlertTier::None);
                }
            }
        }
    }
}
