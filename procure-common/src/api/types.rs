//! Model service request/response types
//!
//! Every payload returned by the model service is decoded into one of these
//! types and validated here before any field is used downstream.
//!
//! The service stores CPV codes as integers, which drops the leading zero of
//! codes such as `03000000`, and sends them either as JSON integers or as
//! their decimal strings (`"3000000"`). Code fields therefore accept both, and
//! all-digit codes shorter than eight digits are left-padded back.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Maximum number of ranked candidates returned by a prediction
pub const TOP_N: usize = 5;

/// Length of a CPV code without its check digit
pub const CPV_CODE_LEN: usize = 8;

/// Contract value the form starts with before any edit
pub const DEFAULT_VALUE_EURO: f64 = 50_000.0;

/// Allowed difference between `confidence` and `top5[0].probability`
const PROBABILITY_TOLERANCE: f64 = 1e-9;

// ========================================
// Model Metadata
// ========================================

/// Response of `GET /model-info`
///
/// Loaded once at startup and never replaced afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_name: String,
    pub num_categories: u32,
    pub num_features: u32,
    /// Contracting authorities known to the model, in service order
    pub cae_names: Vec<String>,
    /// NUTS region codes known to the model, in service order
    pub nuts_codes: Vec<String>,
    /// Contract types known to the model (SERVICES, SUPPLIES, WORKS)
    pub contract_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Training algorithm, e.g. "Random Forest"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// CPV codes the model can emit
    #[serde(
        default,
        deserialize_with = "cpv_code_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub cpv_codes: Vec<String>,
}

// ========================================
// Prediction Request
// ========================================

/// Tender description submitted to `POST /predict`
///
/// Field names on the wire are the upper-case column names the model was
/// trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionForm {
    /// Contract value in EUR, never negative
    #[serde(rename = "VALUE_EURO")]
    pub value_euro: f64,

    /// Contracting authority name
    #[serde(rename = "CAE_NAME")]
    pub cae_name: String,

    /// NUTS region code of the contract location
    #[serde(rename = "NUTS")]
    pub nuts: String,

    #[serde(rename = "TYPE_OF_CONTRACT")]
    pub type_of_contract: String,
}

impl PredictionForm {
    pub fn new(
        value_euro: f64,
        cae_name: impl Into<String>,
        nuts: impl Into<String>,
        type_of_contract: impl Into<String>,
    ) -> Self {
        Self {
            value_euro,
            cae_name: cae_name.into(),
            nuts: nuts.into(),
            type_of_contract: type_of_contract.into(),
        }
    }

    /// Whether `value` is acceptable as a contract value
    pub fn is_valid_value(value: f64) -> bool {
        value.is_finite() && value >= 0.0
    }
}

impl Default for PredictionForm {
    fn default() -> Self {
        Self::new(DEFAULT_VALUE_EURO, "", "", "")
    }
}

// ========================================
// Prediction Response
// ========================================

/// One ranked candidate of a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCode {
    #[serde(deserialize_with = "cpv_code")]
    pub cpv: String,
    pub probability: f64,
}

/// Successful prediction payload (`result` of the predict envelope)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Best CPV code
    #[serde(deserialize_with = "cpv_code")]
    pub cpv: String,
    /// Probability assigned to `cpv`, in [0, 1]
    pub confidence: f64,
    /// Up to five candidates, highest probability first
    pub top5: Vec<RankedCode>,
}

/// Reasons a decoded prediction result is rejected at the boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResultViolation {
    #[error("prediction has an empty CPV code")]
    EmptyCode,

    #[error("confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),

    #[error("ranking is empty")]
    EmptyRanking,

    #[error("ranking has {0} entries, at most 5 allowed")]
    TooManyCandidates(usize),

    #[error("probability {probability} of CPV {cpv} outside [0, 1]")]
    ProbabilityOutOfRange { cpv: String, probability: f64 },

    #[error("ranking not in descending probability order at position {0}")]
    NotDescending(usize),

    #[error("first ranked candidate {cpv} ({probability}) does not match the prediction")]
    HeadMismatch { cpv: String, probability: f64 },
}

impl PredictionResult {
    /// Check the ranking invariants
    ///
    /// - `confidence` and every probability lie in [0, 1]
    /// - `top5` holds 1..=5 entries sorted by descending probability
    /// - `top5[0]` is the reported `cpv` with probability `confidence`
    pub fn validate(&self) -> Result<(), ResultViolation> {
        if self.cpv.is_empty() {
            return Err(ResultViolation::EmptyCode);
        }
        if !is_probability(self.confidence) {
            return Err(ResultViolation::ConfidenceOutOfRange(self.confidence));
        }
        if self.top5.is_empty() {
            return Err(ResultViolation::EmptyRanking);
        }
        if self.top5.len() > TOP_N {
            return Err(ResultViolation::TooManyCandidates(self.top5.len()));
        }

        for candidate in &self.top5 {
            if !is_probability(candidate.probability) {
                return Err(ResultViolation::ProbabilityOutOfRange {
                    cpv: candidate.cpv.clone(),
                    probability: candidate.probability,
                });
            }
        }

        if let Some(position) = self
            .top5
            .windows(2)
            .position(|pair| pair[0].probability < pair[1].probability)
        {
            return Err(ResultViolation::NotDescending(position + 1));
        }

        let head = &self.top5[0];
        if head.cpv != self.cpv || (head.probability - self.confidence).abs() > PROBABILITY_TOLERANCE {
            return Err(ResultViolation::HeadMismatch {
                cpv: head.cpv.clone(),
                probability: head.probability,
            });
        }

        Ok(())
    }
}

fn is_probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Envelope of `POST /predict`
///
/// `result` stays untyped here so that a malformed result can be told apart
/// from a malformed envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub success: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl PredictResponse {
    /// The service set `success: true` explicitly
    pub fn is_success(&self) -> bool {
        matches!(self.success, Some(Value::Bool(true)))
    }

    /// Server-supplied error text, if any
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().and_then(error_text)
    }
}

/// Error body returned with non-2xx statuses: `{"error": "..."}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<Value>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<String> {
        self.error.as_ref().and_then(error_text)
    }
}

/// Extract displayable text from an `error` field
///
/// Null, `false` and empty strings carry no message.
pub fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ========================================
// CPV code decoding
// ========================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Text(String),
    Number(u64),
}

impl RawCode {
    fn into_code(self) -> String {
        match self {
            RawCode::Text(s) => pad_code(s.trim()),
            RawCode::Number(n) => pad_code(&n.to_string()),
        }
    }
}

/// Restore leading zeros of a bare numeric code; anything else is kept as is
fn pad_code(code: &str) -> String {
    if !code.is_empty() && code.len() < CPV_CODE_LEN && code.bytes().all(|b| b.is_ascii_digit()) {
        format!("{:0>width$}", code, width = CPV_CODE_LEN)
    } else {
        code.to_string()
    }
}

fn cpv_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawCode::deserialize(deserializer).map(RawCode::into_code)
}

fn cpv_code_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawCode>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(RawCode::into_code).collect())
}
