//! Alert Tier Classification

use crate::FailureLabel;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Discrete severity of a predicted failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertTier {
    /// No failure predicted
    None,
    /// Failure predicted with modest confidence
    Medium,
    /// Failure predicted with high confidence
    High,
    /// Failure predicted with very high confidence
    Critical,
}

impl AlertTier {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertTier::None => "none",
            AlertTier::Medium => "medium",
            AlertTier::High => "high",
            AlertTier::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Confidence at or above which a failure is critical (default: 0.90)
    pub critical_threshold: f64,
    /// Confidence at or above which a failure is high (default: 0.85)
    pub high_threshold: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            critical_threshold: 0.90,
            high_threshold: 0.85,
        }
    }
}

/// Maps a classification outcome to an alert tier
#[derive(Debug, Clone, Default)]
pub struct AlertClassifier {
    config: AlertConfig,
}

impl AlertClassifier {
    /// Create a new classifier
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Probability of the predicted class
    pub fn confidence(label: FailureLabel, probabilities: [f64; 2]) -> f64 {
        match label {
            FailureLabel::Failure => probabilities[1],
            FailureLabel::NoFailure => probabilities[0],
        }
    }

    /// Tier for a label and its confidence (0.0 to 1.0)
    pub fn classify(&self, label: FailureLabel, confidence: f64) -> AlertTier {
        let tier = match label {
            FailureLabel::NoFailure => AlertTier::None,
            FailureLabel::Failure if confidence >= self.config.critical_threshold => {
                AlertTier::Critical
            }
            FailureLabel::Failure if confidence >= self.config.high_threshold => AlertTier::High,
            FailureLabel::Failure => AlertTier::Medium,
        };
        debug!("Alert tier {} for {} at confidence {:.4}", tier, label, confidence);
        tier
    }
}
