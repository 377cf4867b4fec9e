//! Risk Scoring and Contributing Factors

use feature_engine::EngineeredFeatures;
use serde::{Deserialize, Serialize};

/// Maximum number of factors reported per assessment
pub const MAX_RISK_FACTORS: usize = 3;

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Surfaces the continuous risk component as a percentage
pub struct RiskScorer;

impl RiskScorer {
    /// Risk score in [0, 100], rounded to 2 decimals
    pub fn score_pct(features: &EngineeredFeatures) -> f64 {
        round2(features.risk_score * 100.0)
    }
}

/// Severity attached to a contributing factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorSeverity {
    Medium,
    High,
}

/// One triggered degradation indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    /// Human-readable factor name
    pub factor: String,
    /// Raw sensor value that triggered it
    pub value: f64,
    pub severity: FactorSeverity,
}

/// Selects contributing factors from the degradation indicators
pub struct RiskFactorIdentifier;

impl RiskFactorIdentifier {
    /// First [`MAX_RISK_FACTORS`] triggered factors in checklist order:
    /// vibration, temperature, wear, oil quality, operating hours.
    pub fn identify(features: &EngineeredFeatures) -> Vec<RiskFactor> {
        let i = &features.indicators;
        let r = &features.reading;

        let checklist = [
            (i.critical_vibration, "High Vibration", r.vibration_level, FactorSeverity::High),
            (i.critical_temperature, "High Temperature", r.temperature, FactorSeverity::High),
            (i.critical_wear, "Excessive Wear", r.wear_level, FactorSeverity::High),
            (i.low_oil_quality, "Low Oil Quality", r.oil_quality, FactorSeverity::Medium),
            (i.high_operating_hours, "High Operating Hours", r.operating_hours, FactorSeverity::Medium),
        ];

        checklist
            .into_iter()
            .filter(|(triggered, ..)| *triggered)
            .take(MAX_RISK_FACTORS)
            .map(|(_, factor, value, severity)| RiskFactor {
                factor: factor.to_string(),
                value,
                severity,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_validator::SensorReading;
    use feature_engine::{CategoryEncoder, FeatureEngineer, LabelEncoders, COMPONENT_TYPE_COLUMN};

    fn derive(reading: SensorReading) -> EngineeredFeatures {
        let encoders = LabelEncoders::new().with(
            COMPONENT_TYPE_COLUMN,
            CategoryEncoder::fit(["engine", "landing_gear", "hydraulic_system"]),
        );
        FeatureEngineer::default().derive(&reading, &encoders).unwrap()
    }

    fn nominal() -> SensorReading {
        SensorReading {
            aircraft_id: "AC010".into(),
            component_type: "hydraulic_system".into(),
            vibration_level: 1.2,
            temperature: 60.0,
            pressure: 3000.0,
            wear_level: 15.0,
            oil_quality: 97.0,
            rpm: 0.0,
            fuel_flow: 0.0,
            health_score: 95.0,
            operating_hours: 400.0,
            cycles: 300.0,
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(87.456), 87.46);
        assert_eq!(round2(100.0), 100.0);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_score_pct() {
        let f = derive(SensorReading {
            vibration_level: 7.0,
            oil_quality: 70.0,
            ..nominal()
        });
        assert_eq!(RiskScorer::score_pct(&f), 50.0);
        assert_eq!(RiskScorer::score_pct(&derive(nominal())), 0.0);
    }

    #[test]
    fn test_no_factors_when_nominal() {
        assert!(RiskFactorIdentifier::identify(&derive(nominal())).is_empty());
    }

    #[test]
    fn test_checklist_order_caps_at_three() {
        let f = derive(SensorReading {
            vibration_level: 8.5,
            temperature: 750.0,
            wear_level: 85.0,
            oil_quality: 65.0,
            operating_hours: 8500.0,
            ..nominal()
        });
        let factors = RiskFactorIdentifier::identify(&f);

        assert_eq!(factors.len(), 3);
        assert_eq!(factors[0].factor, "High Vibration");
        assert_eq!(factors[0].value, 8.5);
        assert_eq!(factors[1].factor, "High Temperature");
        assert_eq!(factors[2].factor, "Excessive Wear");
        assert!(factors.iter().all(|f| f.severity == FactorSeverity::High));
    }

    #[test]
    fn test_medium_factors() {
        let f = derive(SensorReading {
            oil_quality: 72.0,
            operating_hours: 9100.0,
            ..nominal()
        });
        let factors = RiskFactorIdentifier::identify(&f);

        assert_eq!(factors.len(), 2);
        assert_eq!(factors[0].factor, "Low Oil Quality");
        assert_eq!(factors[0].severity, FactorSeverity::Medium);
        assert_eq!(factors[1].factor, "High Operating Hours");
        assert_eq!(factors[1].value, 9100.0);
    }

    #[test]
    fn test_cycles_never_a_factor() {
        let f = derive(SensorReading {
            cycles: 9000.0,
            ..nominal()
        });
        assert!(f.indicators.high_cycles);
        assert!(RiskFactorIdentifier::identify(&f).is_empty());
    }
}
