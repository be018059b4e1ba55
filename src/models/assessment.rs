//! Risk assessment model

use serde::{Deserialize, Serialize};

use crate::model::{ProbabilityDistribution, RiskThresholds};
use super::clinical::ClinicalInput;
use super::wearable::{MockWearableData, StressIndicator};

pub const DISCLAIMER: &str = "This AI does not replace professional medical advice.";
pub const CONDITION: &str = "Hypertension / Cardiovascular Disease";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "High Risk")]
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low Risk"),
            Self::High => write!(f, "High Risk"),
        }
    }
}

/// Advisory tier, chosen independently of `RiskLevel`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Urgent,
    Lifestyle,
    Maintain,
}

impl Recommendation {
    /// First match wins, highest tier first
    pub fn for_probability(probability: f64, thresholds: &RiskThresholds) -> Self {
        if thresholds.is_urgent(probability) {
            Self::Urgent
        } else if thresholds.is_moderate(probability) {
            Self::Lifestyle
        } else {
            Self::Maintain
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Urgent => "Urgent: your cardiovascular risk is very high. Please consult a doctor immediately, within the next 48 hours.",
            Self::Lifestyle => "High stress levels detected – recommend daily meditation. Reduce salt intake, walk 30 mins daily and monitor BP regularly.",
            Self::Maintain => "Excellent lifestyle! Continue healthy habits.",
        }
    }
}

/// Response body of `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub risk_probability: f64,
    pub confidence: f64,
    pub recommendation: String,
    pub disclaimer: String,
    pub condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_wearable_data: Option<MockWearableData>,
}

impl RiskAssessment {
    /// Map a model distribution to a tier, recommendation and payload.
    /// Tiering uses the raw probability; only the reported numbers are rounded.
    pub fn from_distribution(
        input: &ClinicalInput,
        distribution: &ProbabilityDistribution,
        thresholds: &RiskThresholds,
        include_wearable: bool,
    ) -> Self {
        let probability = distribution.positive;
        let high_risk = thresholds.is_high_risk(probability);

        let risk_level = if high_risk { RiskLevel::High } else { RiskLevel::Low };
        let recommendation = Recommendation::for_probability(probability, thresholds);

        let mock_wearable_data = include_wearable.then(|| {
            let stress = if high_risk { StressIndicator::Elevated } else { StressIndicator::Normal };
            MockWearableData::with_heart_rate(input.thalach, stress)
        });

        Self {
            risk_level,
            risk_probability: round3(probability),
            confidence: round3(distribution.confidence()),
            recommendation: recommendation.message().to_string(),
            disclaimer: DISCLAIMER.to_string(),
            condition: CONDITION.to_string(),
            mock_wearable_data,
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
