//! Maintenance Recommendations

use crate::{AlertTier, FailureLabel};
use serde::{Deserialize, Serialize};

/// How soon maintenance should happen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Immediate,
    Urgent,
    Scheduled,
    Routine,
}

impl Urgency {
    /// Urgency implied by an alert tier
    pub fn from_tier(tier: AlertTier) -> Self {
        match tier {
            AlertTier::Critical => Urgency::Immediate,
            AlertTier::High => Urgency::Urgent,
            AlertTier::Medium => Urgency::Scheduled,
            AlertTier::None => Urgency::Routine,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Immediate => "immediate",
            Urgency::Urgent => "urgent",
            Urgency::Scheduled => "scheduled",
            Urgency::Routine => "routine",
        }
    }
}

/// Produces advisory text for an assessment
pub struct RecommendationGenerator;

impl RecommendationGenerator {
    /// Advisory text keyed on label, tier and estimated days
    pub fn generate(label: FailureLabel, tier: AlertTier, days: Option<u32>) -> String {
        if label == FailureLabel::NoFailure {
            return "Component is operating normally. Continue routine monitoring.".to_string();
        }

        let window = match days {
            Some(1) => "within 1 day".to_string(),
            Some(d) => format!("within {} days", d),
            None => "soon".to_string(),
        };

        match Urgency::from_tier(tier) {
            Urgency::Immediate => format!(
                "CRITICAL: Schedule immediate inspection. Predicted failure {}. \
                 Consider grounding aircraft for maintenance.",
                window
            ),
            Urgency::Urgent => format!(
                "HIGH PRIORITY: Urgent maintenance required {}. Monitor closely for deterioration.",
                window
            ),
            Urgency::Scheduled | Urgency::Routine => format!(
                "MEDIUM PRIORITY: Plan scheduled maintenance {}. Increase monitoring frequency.",
                window
            ),
        }
    }
}
