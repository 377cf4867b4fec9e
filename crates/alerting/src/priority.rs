//! Health Assessment and Maintenance Priority

use crate::recommendation::Urgency;
use crate::AlertTier;
use serde::{Deserialize, Serialize};

/// Coarse condition bucket for a health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

/// Condition summary derived from the reading's health score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAssessment {
    pub status: HealthStatus,
    pub score: f64,
    pub description: String,
}

impl HealthAssessment {
    /// Bucket a health score (0-100)
    pub fn assess(score: f64) -> Self {
        let (status, description) = if score >= 80.0 {
            (HealthStatus::Excellent, "Component is in excellent condition")
        } else if score >= 60.0 {
            (HealthStatus::Good, "Component is in good condition")
        } else if score >= 40.0 {
            (HealthStatus::Fair, "Component shows signs of wear")
        } else if score >= 20.0 {
            (HealthStatus::Poor, "Component requires attention")
        } else {
            (HealthStatus::Critical, "Component is in critical condition")
        };

        Self {
            status,
            score,
            description: description.to_string(),
        }
    }
}

/// Work-queue ranking of an assessment (1 = most pressing)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenancePriority {
    pub priority: u8,
    pub urgency: Urgency,
    /// Confidence percentage echoed from the assessment
    pub confidence: f64,
    pub days_to_failure: Option<u32>,
}

impl MaintenancePriority {
    /// Rank by alert tier
    pub fn from_tier(tier: AlertTier, confidence: f64, days_to_failure: Option<u32>) -> Self {
        let priority = match tier {
            AlertTier::Critical => 1,
            AlertTier::High => 2,
            AlertTier::Medium => 3,
            AlertTier::None => 4,
        };

        Self {
            priority,
            urgency: Urgency::from_tier(tier),
            confidence,
            days_to_failure,
        }
    }
}
