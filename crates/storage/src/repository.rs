//! Repository Implementation

use crate::StorageError;
use alerting::{AlertTier, FailureLabel, RiskFactor};
use chrono::{DateTime, Utc};
use inference_engine::RiskAssessment;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{debug, info};

/// Default number of retained predictions
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Stored prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub aircraft_id: String,
    pub component_type: String,
    pub prediction: FailureLabel,
    pub confidence: f64,
    pub alert_level: AlertTier,
    pub days_to_failure: Option<u32>,
    pub health_score: f64,
    pub risk_score: f64,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendation: String,
}

impl PredictionRecord {
    /// Record for an assessment; the id is assigned on insert
    pub fn from_assessment(assessment: &RiskAssessment) -> Self {
        Self {
            id: 0,
            timestamp: assessment.timestamp,
            aircraft_id: assessment.aircraft_id.clone(),
            component_type: assessment.component_type.clone(),
            prediction: assessment.prediction,
            confidence: assessment.confidence,
            alert_level: assessment.alert_level,
            days_to_failure: assessment.days_to_failure,
            health_score: assessment.health_score,
            risk_score: assessment.risk_score,
            risk_factors: assessment.top_risk_factors.clone(),
            recommendation: assessment.recommendation.clone(),
        }
    }
}

/// Optional filters for history queries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionFilter {
    pub alert_level: Option<AlertTier>,
    pub aircraft_id: Option<String>,
}

impl PredictionFilter {
    fn matches(&self, record: &PredictionRecord) -> bool {
        self.alert_level.map_or(true, |t| record.alert_level == t)
            && self
                .aircraft_id
                .as_deref()
                .map_or(true, |id| record.aircraft_id == id)
    }
}

struct History {
    records: VecDeque<PredictionRecord>,
    next_id: u64,
}

/// Repository for prediction history (in-memory, oldest evicted first)
pub struct Repository {
    history: Mutex<History>,
    capacity: usize,
}

impl Repository {
    /// Create a repository with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a repository retaining at most `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        info!("Creating in-memory prediction history (capacity {})", capacity);
        Self {
            history: Mutex::new(History {
                records: VecDeque::with_capacity(capacity.min(1024)),
                next_id: 1,
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, History>, StorageError> {
        self.history
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }

    /// Insert a prediction record, returning its id
    pub fn insert_prediction(&self, mut record: PredictionRecord) -> Result<u64, StorageError> {
        let mut history = self.lock()?;

        record.id = history.next_id;
        history.next_id += 1;

        // Enforce retention
        while history.records.len() >= self.capacity {
            history.records.pop_front();
        }

        let id = record.id;
        history.records.push_back(record);
        debug!("Inserted prediction with ID {}", id);
        Ok(id)
    }

    /// Record an assessment
    pub fn record(&self, assessment: &RiskAssessment) -> Result<u64, StorageError> {
        self.insert_prediction(PredictionRecord::from_assessment(assessment))
    }

    /// Newest-first predictions matching `filter`, at most `limit`
    pub fn get_predictions(
        &self,
        filter: &PredictionFilter,
        limit: usize,
    ) -> Result<Vec<PredictionRecord>, StorageError> {
        let history = self.lock()?;
        Ok(history
            .records
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .take(limit)
            .cloned()
            .collect())
    }

    /// Get total prediction count
    pub fn prediction_count(&self) -> usize {
        self.lock().map(|h| h.records.len()).unwrap_or(0)
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}
