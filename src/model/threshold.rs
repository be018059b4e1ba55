//! Decision thresholds
//!
//! The risk tier boundary and the recommendation boundaries are set
//! independently and do not line up: 0.45 is "Low Risk" yet gets the
//! moderate recommendation.

use serde::{Deserialize, Serialize};

/// Threshold configuration applied to the positive-class probability.
/// All comparisons are strict greater-than.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Above this the patient is "High Risk"
    pub high_risk: f64,

    /// Above this the urgent recommendation applies
    pub urgent: f64,

    /// Above this (and not urgent) the lifestyle recommendation applies
    pub moderate: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high_risk: 0.5,
            urgent: 0.7,
            moderate: 0.4,
        }
    }
}

impl RiskThresholds {
    pub fn is_high_risk(&self, probability: f64) -> bool {
        probability > self.high_risk
    }

    pub fn is_urgent(&self, probability: f64) -> bool {
        probability > self.urgent
    }

    pub fn is_moderate(&self, probability: f64) -> bool {
        probability > self.moderate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_defaults() {
        let t = RiskThresholds::default();
        assert_eq!(t.high_risk, 0.5);
        assert_eq!(t.urgent, 0.7);
        assert_eq!(t.moderate, 0.4);
    }

    #[test]
    fn test_boundaries_are_strict() {
        let t = RiskThresholds::default();
        assert!(!t.is_high_risk(0.5));
        assert!(t.is_high_risk(0.5001));
        assert!(!t.is_urgent(0.7));
        assert!(!t.is_moderate(0.4));
    }
}
