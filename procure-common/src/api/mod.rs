//! Model service API types
//!
//! Wire shapes for the three resources the client consumes:
//! - `GET {api_base}/model-info`
//! - `POST {api_base}/predict`
//! - the static CPV description dictionary (decoded by the client crate)

pub mod types;

pub use types::{
    error_text, ErrorBody, ModelMetadata, PredictResponse, PredictionForm, PredictionResult,
    RankedCode, ResultViolation, CPV_CODE_LEN, DEFAULT_VALUE_EURO, TOP_N,
};
