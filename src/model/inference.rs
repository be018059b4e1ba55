//! Inference Engine - ONNX Runtime Integration
//!
//! Loads the exported hypertension classifier once and scores fixed-order
//! feature vectors against it.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::tensor::TensorElementType;
use ort::value::{Tensor, ValueType};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::models::FEATURE_COUNT;

/// Allowed drift from 1.0 when summing float32 class probabilities
const DISTRIBUTION_TOLERANCE: f64 = 1e-3;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// Artifact missing or unreadable; fatal at startup
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("feature vector has {actual} values, model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("inference failed: {0}")]
    Runtime(String),

    #[error("model returned an invalid distribution: {0}")]
    InvalidOutput(String),
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Two-class output of the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityDistribution {
    pub negative: f64,
    pub positive: f64,
}

impl ProbabilityDistribution {
    /// Build a distribution from raw model scores `[negative, positive]`.
    pub fn from_scores(scores: &[f32]) -> Result<Self, InferenceError> {
        let [negative, positive] = scores else {
            return Err(InferenceError::InvalidOutput(format!(
                "expected 2 class probabilities, got {}",
                scores.len()
            )));
        };

        let (negative, positive) = (f64::from(*negative), f64::from(*positive));

        for p in [negative, positive] {
            if !(0.0..=1.0).contains(&p) {
                return Err(InferenceError::InvalidOutput(format!(
                    "probability {p} outside [0, 1]"
                )));
            }
        }

        if ((negative + positive) - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(InferenceError::InvalidOutput(format!(
                "probabilities sum to {}",
                negative + positive
            )));
        }

        Ok(Self { negative, positive })
    }

    /// Distribution for a known positive-class probability
    pub fn from_positive(positive: f64) -> Self {
        Self {
            negative: 1.0 - positive,
            positive,
        }
    }

    /// Probability of the predicted class
    pub fn confidence(&self) -> f64 {
        self.negative.max(self.positive)
    }
}

/// Engine status for the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model_path: String,
    pub inference_device: String,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
    pub loaded_at: Option<DateTime<Utc>>,
}

// ============================================================================
// RISK MODEL TRAIT
// ============================================================================

/// Scoring seam between the HTTP layer and the loaded classifier.
pub trait RiskModel: Send + Sync {
    /// Score an ordered feature vector. Pure with respect to the artifact.
    fn score_risk(&self, features: &[f32]) -> Result<ProbabilityDistribution, InferenceError>;

    fn status(&self) -> EngineStatus;
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

/// Classifier backed by an ONNX Runtime session.
///
/// `Session::run` needs `&mut`, so the session lives behind a mutex that is
/// held for a single inference only. Nothing reassigns the model after load.
pub struct OnnxRiskModel {
    session: Mutex<Session>,
    output_name: String,
    model_path: String,
    loaded_at: DateTime<Utc>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl std::fmt::Debug for OnnxRiskModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxRiskModel")
            .field("model_path", &self.model_path)
            .field("output_name", &self.output_name)
            .finish_non_exhaustive()
    }
}

impl OnnxRiskModel {
    /// Load the classifier from file.
    ///
    /// `output_name` selects the probability tensor; when the graph has no
    /// output by that name the last declared output is used. The input and
    /// the chosen output must both be float32 tensors of width 13 and 2, so
    /// an unusable export fails here rather than on every request.
    pub fn load(model_path: &Path, output_name: &str) -> Result<Self, InferenceError> {
        tracing::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(InferenceError::ModelUnavailable(format!(
                "Model not found: {}",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| InferenceError::ModelUnavailable(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::ModelUnavailable(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| InferenceError::ModelUnavailable(format!("Failed to load model: {}", e)))?;

        let [input] = session.inputs.as_slice() else {
            return Err(InferenceError::ModelUnavailable(format!(
                "Model must take exactly one input, found {}",
                session.inputs.len()
            )));
        };
        check_float_tensor("input", &input.name, &input.input_type, FEATURE_COUNT)?;

        let output = match session.outputs.iter().find(|o| o.name == output_name) {
            Some(output) => output,
            None => {
                let fallback = session.outputs.last()
                    .ok_or_else(|| InferenceError::ModelUnavailable("Model defines no outputs".to_string()))?;
                tracing::warn!("Output '{}' not found in model, using '{}'", output_name, fallback.name);
                fallback
            }
        };
        check_float_tensor("output", &output.name, &output.output_type, 2)?;
        let output_name = output.name.clone();

        tracing::info!("ONNX model loaded successfully (output: {})", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            model_path: model_path.display().to_string(),
            loaded_at: Utc::now(),
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        })
    }

    fn run(&self, features: &[f32]) -> Result<Vec<f32>, InferenceError> {
        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), features.to_vec())
            .map_err(|e| InferenceError::Runtime(format!("Array error: {}", e)))?;

        let input_tensor = Tensor::from_array(input_array)
            .map_err(|e| InferenceError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();

        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;

        let output = outputs.get(&self.output_name)
            .ok_or_else(|| InferenceError::InvalidOutput(format!("No output '{}'", self.output_name)))?;

        let (_, data) = output.try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::InvalidOutput(format!("Extract error: {}", e)))?;

        Ok(data.to_vec())
    }
}

/// Reject graphs the scorer cannot feed or read: the tensor must be float32
/// and its last dimension either `width` or dynamic.
fn check_float_tensor(
    kind: &str,
    name: &str,
    value_type: &ValueType,
    width: usize,
) -> Result<(), InferenceError> {
    if value_type.tensor_type() != Some(TensorElementType::Float32) {
        return Err(InferenceError::ModelUnavailable(format!(
            "Model {} '{}' must be a float32 tensor, found {:?}",
            kind, name, value_type
        )));
    }

    let last_dim = value_type.tensor_shape().and_then(|shape| shape.last().copied());
    match last_dim {
        Some(dim) if dim >= 0 && dim != width as i64 => Err(InferenceError::ModelUnavailable(format!(
            "Model {} '{}' has last dimension {}, expected {}",
            kind, name, dim, width
        ))),
        _ => Ok(()),
    }
}

impl RiskModel for OnnxRiskModel {
    fn score_risk(&self, features: &[f32]) -> Result<ProbabilityDistribution, InferenceError> {
        if features.len() != FEATURE_COUNT {
            return Err(InferenceError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: features.len(),
            });
        }

        let start_time = std::time::Instant::now();
        let scores = self.run(features)?;
        let distribution = ProbabilityDistribution::from_scores(&scores)?;

        // Track metrics
        let elapsed = start_time.elapsed().as_micros() as u64;
        self.latency_sum_us.fetch_add(elapsed, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        Ok(distribution)
    }

    fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_loaded: true,
            model_path: self.model_path.clone(),
            inference_device: "ONNX Runtime (CPU)".to_string(),
            avg_latency_ms: avg,
            inference_count: count,
            loaded_at: Some(self.loaded_at),
        }
    }
}

// ============================================================================
// TEST SUPPORT
// ============================================================================

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Model that always returns the same positive-class probability
    /// and records how often it was asked.
    pub struct FixedModel {
        positive: f64,
        pub calls: AtomicU64,
        pub last_features: Mutex<Option<Vec<f32>>>,
    }

    impl FixedModel {
        pub fn new(positive: f64) -> Self {
            Self {
                positive,
                calls: AtomicU64::new(0),
                last_features: Mutex::new(None),
            }
        }
    }

    impl RiskModel for FixedModel {
        fn score_risk(&self, features: &[f32]) -> Result<ProbabilityDistribution, InferenceError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            *self.last_features.lock() = Some(features.to_vec());
            Ok(ProbabilityDistribution::from_positive(self.positive))
        }

        fn status(&self) -> EngineStatus {
            EngineStatus {
                model_loaded: true,
                model_path: "<fixed>".to_string(),
                inference_device: "test".to_string(),
                avg_latency_ms: 0.0,
                inference_count: self.calls.load(Ordering::Relaxed),
                loaded_at: None,
            }
        }
    }

    /// Model whose runtime always rejects the input
    pub struct FailingModel;

    impl RiskModel for FailingModel {
        fn score_risk(&self, _features: &[f32]) -> Result<ProbabilityDistribution, InferenceError> {
            Err(InferenceError::Runtime("input tensor rank mismatch".to_string()))
        }

        fn status(&self) -> EngineStatus {
            EngineStatus {
                model_loaded: true,
                model_path: "<failing>".to_string(),
                inference_device: "test".to_string(),
                avg_latency_ms: 0.0,
                inference_count: 0,
                loaded_at: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_distribution_from_scores() {
        let dist = ProbabilityDistribution::from_scores(&[0.18, 0.82]).unwrap();
        assert!((dist.positive - 0.82).abs() < 1e-6);
        assert!((dist.negative - 0.18).abs() < 1e-6);
        assert!((dist.confidence() - 0.82).abs() < 1e-6);
    }

    #[test]
    fn test_distribution_rejects_wrong_arity() {
        let err = ProbabilityDistribution::from_scores(&[1.0]).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidOutput(_)));

        let err = ProbabilityDistribution::from_scores(&[0.2, 0.3, 0.5]).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidOutput(_)));
    }

    #[test]
    fn test_distribution_rejects_bad_values() {
        assert!(ProbabilityDistribution::from_scores(&[-0.1, 1.1]).is_err());
        assert!(ProbabilityDistribution::from_scores(&[0.3, 0.3]).is_err());
    }

    #[test]
    fn test_confidence_is_at_least_half() {
        for p in [0.0, 0.1, 0.35, 0.5, 0.62, 0.99, 1.0] {
            let c = ProbabilityDistribution::from_positive(p).confidence();
            assert!(c >= 0.5 && c <= 1.0, "confidence {c} for p={p}");
        }
    }

    #[test]
    fn test_load_missing_model() {
        let err = OnnxRiskModel::load(Path::new("/nonexistent/model.onnx"), "probabilities")
            .unwrap_err();
        assert!(matches!(err, InferenceError::ModelUnavailable(_)));
    }

    #[test]
    fn test_load_corrupt_model() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not an onnx graph").unwrap();

        let err = OnnxRiskModel::load(file.path(), "probabilities").unwrap_err();
        assert!(matches!(err, InferenceError::ModelUnavailable(_)));
    }

    /// Graphs under tests/fixtures compute softmax(input · W) with a single
    /// non-zero weight of 0.01 from `age` to the positive class.
    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
    }

    fn features_with_age(age: f32) -> [f32; FEATURE_COUNT] {
        let mut features = [0.0f32; FEATURE_COUNT];
        features[0] = age;
        features[7] = 150.0;
        features
    }

    #[test]
    fn test_score_risk_with_onnx_model() {
        let model = OnnxRiskModel::load(&fixture("classifier.onnx"), "probabilities").unwrap();
        assert_eq!(model.output_name, "probabilities");

        // logit 1.0 for the positive class
        let dist = model.score_risk(&features_with_age(100.0)).unwrap();
        let expected = 1.0 / (1.0 + (-1.0f64).exp());
        assert!((dist.positive - expected).abs() < 1e-5, "got {}", dist.positive);
        assert!((dist.negative - (1.0 - expected)).abs() < 1e-5);

        // Only age carries weight, so other columns must not move the score
        let dist = model.score_risk(&features_with_age(0.0)).unwrap();
        assert!((dist.positive - 0.5).abs() < 1e-6);

        let status = model.status();
        assert!(status.model_loaded);
        assert_eq!(status.inference_count, 2);
        assert!(status.loaded_at.is_some());
    }

    #[test]
    fn test_score_risk_is_deterministic() {
        let model = OnnxRiskModel::load(&fixture("classifier.onnx"), "probabilities").unwrap();
        let first = model.score_risk(&features_with_age(63.0)).unwrap();
        let second = model.score_risk(&features_with_age(63.0)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_score_risk_shape_mismatch() {
        let model = OnnxRiskModel::load(&fixture("classifier.onnx"), "probabilities").unwrap();

        let err = model.score_risk(&[0.0; 12]).unwrap_err();
        assert!(matches!(err, InferenceError::ShapeMismatch { expected: 13, actual: 12 }));

        let err = model.score_risk(&[0.0; 14]).unwrap_err();
        assert!(matches!(err, InferenceError::ShapeMismatch { expected: 13, actual: 14 }));

        assert_eq!(model.status().inference_count, 0);
    }

    #[test]
    fn test_unknown_output_falls_back_to_last() {
        let model = OnnxRiskModel::load(&fixture("classifier.onnx"), "output_probability").unwrap();
        assert_eq!(model.output_name, "probabilities");
        assert!(model.score_risk(&features_with_age(100.0)).is_ok());
    }

    #[test]
    fn test_load_rejects_non_float_output() {
        // Only declares the int64 label
        let err = OnnxRiskModel::load(&fixture("label_only.onnx"), "probabilities").unwrap_err();
        assert!(matches!(err, InferenceError::ModelUnavailable(_)), "{err}");
    }

    #[test]
    fn test_load_rejects_double_input() {
        let err = OnnxRiskModel::load(&fixture("double_input.onnx"), "probabilities").unwrap_err();
        assert!(matches!(err, InferenceError::ModelUnavailable(_)), "{err}");
    }

    #[test]
    fn test_load_rejects_wrong_input_width() {
        let err = OnnxRiskModel::load(&fixture("narrow_input.onnx"), "probabilities").unwrap_err();
        assert!(matches!(err, InferenceError::ModelUnavailable(_)), "{err}");
    }
}
