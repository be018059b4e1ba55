//! Clinical input model
//!
//! Thirteen numeric features in the column order the classifier was trained
//! on (UCI heart disease layout).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Number of features the classifier consumes
pub const FEATURE_COUNT: usize = 13;

/// Field names in feature-vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg",
    "thalach", "exang", "oldpeak", "slope", "ca", "thal",
];

/// Fixed-order input to the classifier
pub type FeatureVector = [f32; FEATURE_COUNT];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ClinicalInput {
    #[validate(range(min = 0.0, max = 120.0))]
    pub age: f64,
    /// 0 = female, 1 = male
    #[validate(range(min = 0.0, max = 1.0))]
    pub sex: f64,
    /// Chest pain type (0-3)
    #[validate(range(min = 0.0, max = 3.0))]
    pub cp: f64,
    /// Resting blood pressure, mmHg
    #[validate(range(min = 50.0, max = 250.0))]
    pub trestbps: f64,
    /// Serum cholesterol, mg/dl
    #[validate(range(min = 50.0, max = 700.0))]
    pub chol: f64,
    /// Fasting blood sugar > 120 mg/dl
    #[validate(range(min = 0.0, max = 1.0))]
    pub fbs: f64,
    #[validate(range(min = 0.0, max = 2.0))]
    pub restecg: f64,
    /// Maximum heart rate achieved
    #[validate(range(min = 40.0, max = 250.0))]
    pub thalach: f64,
    /// Exercise induced angina
    #[validate(range(min = 0.0, max = 1.0))]
    pub exang: f64,
    /// ST depression induced by exercise relative to rest
    #[validate(range(min = 0.0, max = 10.0))]
    pub oldpeak: f64,
    #[validate(range(min = 0.0, max = 2.0))]
    pub slope: f64,
    /// Major vessels colored by fluoroscopy
    #[validate(range(min = 0.0, max = 4.0))]
    pub ca: f64,
    #[validate(range(min = 0.0, max = 3.0))]
    pub thal: f64,
}

/// One rejected request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ClinicalInput {
    /// Decode a request body, checking every field for presence and type.
    ///
    /// All failing fields are reported, in feature order. Unknown keys are
    /// ignored. Numeric strings such as `"63"` are accepted; `null`, booleans
    /// and non-finite values are not.
    pub fn from_json(body: &Value) -> Result<Self, Vec<FieldError>> {
        let Some(object) = body.as_object() else {
            return Err(vec![FieldError::new("body", "expected a JSON object")]);
        };

        let mut values = [0.0f64; FEATURE_COUNT];
        let mut errors = Vec::new();

        for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
            match object.get(name) {
                None => errors.push(FieldError::new(name, "field required")),
                Some(value) => match coerce_number(value) {
                    Some(number) => *slot = number,
                    None => errors.push(FieldError::new(name, "value is not a valid number")),
                },
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self::from_features(values))
    }

    fn from_features(v: [f64; FEATURE_COUNT]) -> Self {
        Self {
            age: v[0],
            sex: v[1],
            cp: v[2],
            trestbps: v[3],
            chol: v[4],
            fbs: v[5],
            restecg: v[6],
            thalach: v[7],
            exang: v[8],
            oldpeak: v[9],
            slope: v[10],
            ca: v[11],
            thal: v[12],
        }
    }

    /// Project into the classifier's column order.
    pub fn to_features(&self) -> FeatureVector {
        [
            self.age,
            self.sex,
            self.cp,
            self.trestbps,
            self.chol,
            self.fbs,
            self.restecg,
            self.thalach,
            self.exang,
            self.oldpeak,
            self.slope,
            self.ca,
            self.thal,
        ]
        .map(|v| v as f32)
    }

    /// Apply clinical plausibility ranges.
    pub fn check_ranges(&self) -> Result<(), Vec<FieldError>> {
        let Err(report) = self.validate() else {
            return Ok(());
        };

        let mut errors: Vec<FieldError> = report
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e.message.as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("value out of range ({})", e.code));
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();

        // Keep feature order so responses are stable
        errors.sort_by_key(|e| FEATURE_NAMES.iter().position(|n| *n == e.field));
        Err(errors)
    }
}

/// JSON numbers, or strings holding a finite decimal number
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
