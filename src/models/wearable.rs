//! Mock wearable telemetry

use serde::{Deserialize, Serialize};

pub const MOCK_DEVICE: &str = "HealthAI Mock Smartwatch";
pub const MOCK_RESTING_HEART_RATE: f64 = 72.0;
pub const MOCK_STEPS_TODAY: u32 = 8432;
pub const MOCK_SLEEP_HOURS: f64 = 7.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressIndicator {
    Normal,
    Elevated,
}

/// Placeholder smartwatch readings. Nothing here comes from a real device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockWearableData {
    pub device: String,
    pub heart_rate_bpm: f64,
    pub steps_today: u32,
    pub sleep_hours: f64,
    pub stress_indicator: StressIndicator,
    pub source: String,
}

impl MockWearableData {
    /// Static reading served by `GET /wearables/mock`
    pub fn sample() -> Self {
        Self::with_heart_rate(MOCK_RESTING_HEART_RATE, StressIndicator::Normal)
    }

    pub fn with_heart_rate(heart_rate_bpm: f64, stress_indicator: StressIndicator) -> Self {
        Self {
            device: MOCK_DEVICE.to_string(),
            heart_rate_bpm,
            steps_today: MOCK_STEPS_TODAY,
            sleep_hours: MOCK_SLEEP_HOURS,
            stress_indicator,
            source: "mock".to_string(),
        }
    }
}
