//! Model Module - Risk classifier gateway
//!
//! Owns the loaded classifier and the fixed decision thresholds.
//! The rest of the service only sees the `RiskModel` trait.

pub mod inference;
pub mod threshold;

// Re-export common types
pub use inference::{
    EngineStatus, InferenceError, OnnxRiskModel, ProbabilityDistribution, RiskModel,
};
pub use threshold::RiskThresholds;
