//! Time-to-Failure Heuristic

use crate::FailureLabel;

/// Horizon of the estimate in days
pub const HORIZON_DAYS: u32 = 30;

/// Estimates days until failure from health and risk
pub struct TimeToFailureEstimator;

impl TimeToFailureEstimator {
    /// `floor(30 * health/100 * (1 - risk))` clamped to [1, 30].
    ///
    /// `None` when no failure is predicted: absence of an estimate, not zero.
    pub fn estimate(label: FailureLabel, health_score: f64, risk_score: f64) -> Option<u32> {
        if label != FailureLabel::Failure {
            return None;
        }

        let horizon = f64::from(HORIZON_DAYS);
        let days = (horizon * (health_score / 100.0) * (1.0 - risk_score)).floor();
        // NaN fails both comparisons and lands on the lower bound
        let days = if days >= horizon {
            HORIZON_DAYS
        } else if days >= 1.0 {
            days as u32
        } else {
            1
        };
        Some(days)
    }
}
