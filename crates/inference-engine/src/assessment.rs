//! Assessment Output Types

use alerting::{AlertTier, FailureLabel, RiskFactor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full risk assessment of one reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub aircraft_id: String,
    pub component_type: String,
    pub prediction: FailureLabel,
    /// Probability of the predicted class as a percentage, 2 dp
    pub confidence: f64,
    pub alert_level: AlertTier,
    /// Absent when no failure is predicted
    pub days_to_failure: Option<u32>,
    pub health_score: f64,
    /// Weighted indicator score as a percentage, 2 dp
    pub risk_score: f64,
    pub top_risk_factors: Vec<RiskFactor>,
    /// Unscaled values of the most important features
    pub feature_contributions: BTreeMap<String, f64>,
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
}

/// Isolated failure of one reading within a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// The reading's id, or "unknown" when the id itself was missing
    pub aircraft_id: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
}

/// One element of a batch result, positionally aligned with the input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Assessment(Box<RiskAssessment>),
    Error(ErrorRecord),
}

impl BatchOutcome {
    pub fn assessment(&self) -> Option<&RiskAssessment> {
        match self {
            BatchOutcome::Assessment(a) => Some(a),
            BatchOutcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorRecord> {
        match self {
            BatchOutcome::Assessment(_) => None,
            BatchOutcome::Error(e) => Some(e),
        }
    }
}

/// Counts over a batch result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub failures_predicted: usize,
    pub critical_alerts: usize,
    pub high_alerts: usize,
    pub medium_alerts: usize,
    pub errors: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[BatchOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                BatchOutcome::Error(_) => summary.errors += 1,
                BatchOutcome::Assessment(a) => {
                    if a.prediction == FailureLabel::Failure {
                        summary.failures_predicted += 1;
                    }
                    match a.alert_level {
                        AlertTier::Critical => summary.critical_alerts += 1,
                        AlertTier::High => summary.high_alerts += 1,
                        AlertTier::Medium => summary.medium_alerts += 1,
                        AlertTier::None => {}
                    }
                }
            }
        }
        summary
    }
}
