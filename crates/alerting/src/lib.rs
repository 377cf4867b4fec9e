//! Alerting System
//!
//! Turns a classification outcome and its engineered features into the
//! operator-facing diagnostics: alert tier, risk score, contributing
//! factors, time-to-failure estimate and recommendation text.

mod priority;
mod recommendation;
mod risk;
mod tier;
mod ttf;

pub use priority::{HealthAssessment, HealthStatus, MaintenancePriority};
pub use recommendation::{RecommendationGenerator, Urgency};
pub use risk::{round2, FactorSeverity, RiskFactor, RiskFactorIdentifier, RiskScorer, MAX_RISK_FACTORS};
pub use tier::{AlertClassifier, AlertConfig, AlertTier};
pub use ttf::{TimeToFailureEstimator, HORIZON_DAYS};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary outcome of the failure classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureLabel {
    NoFailure,
    Failure,
}

impl FailureLabel {
    /// Label for a class index (1 = failure)
    pub fn from_class(class: usize) -> Option<Self> {
        match class {
            0 => Some(FailureLabel::NoFailure),
            1 => Some(FailureLabel::Failure),
            _ => None,
        }
    }

    /// Class index (1 = failure)
    pub fn class(&self) -> usize {
        match self {
            FailureLabel::NoFailure => 0,
            FailureLabel::Failure => 1,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureLabel::NoFailure => "no_failure",
            FailureLabel::Failure => "failure",
        }
    }
}

impl fmt::Display for FailureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
