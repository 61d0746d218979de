//! Model service and dictionary clients
//!
//! Stores and the health monitor never talk to `reqwest` directly. They go
//! through [`ModelApi`] and [`DictionarySource`], which keeps them testable
//! with in-process doubles.

use async_trait::async_trait;
use procure_common::api::{
    ErrorBody, ModelMetadata, PredictResponse, PredictionForm, PredictionResult,
};
use procure_common::config::DictionaryLocation;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("procure-ui/", env!("CARGO_PKG_VERSION"));

/// Model service client errors
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Service answered with a non-success status
    #[error("API error {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Api { status: u16, message: Option<String> },

    /// Service answered 2xx but did not report success
    #[error("Request rejected: {}", .message.as_deref().unwrap_or("no error message"))]
    Rejected { message: Option<String> },

    /// Failed to parse response JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// Response parsed but violates the expected shape
    #[error("Invalid response: {0}")]
    Invalid(String),

    /// Local resource could not be read
    #[error("I/O error: {0}")]
    Io(String),
}

impl ClientError {
    /// Error text supplied by the service in its payload
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } | ClientError::Rejected { message } => {
                message.as_deref()
            }
            _ => None,
        }
    }
}

/// Raw outcome of a liveness request
///
/// Classification into healthy/unhealthy belongs to the health monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct LivenessReply {
    pub status: u16,
    /// Response body when it was valid JSON
    pub body: Option<Value>,
}

impl LivenessReply {
    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Operations offered by the model service
#[async_trait]
pub trait ModelApi: Send + Sync {
    /// `GET /model-info`, decoded
    async fn model_info(&self) -> Result<ModelMetadata, ClientError>;

    /// `POST /predict`, decoded and validated
    async fn predict(&self, form: &PredictionForm) -> Result<PredictionResult, ClientError>;

    /// `GET /model-info`, undecoded, for health classification
    async fn liveness(&self) -> Result<LivenessReply, ClientError>;
}

fn build_http_client(timeout: Option<Duration>) -> Result<reqwest::Client, ClientError> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| ClientError::Network(e.to_string()))
}

/// Model service client over HTTP
pub struct HttpModelApi {
    http_client: reqwest::Client,
    api_base: String,
}

impl HttpModelApi {
    /// Create a client for `api_base` (e.g. `http://localhost:5000/api`)
    pub fn new(api_base: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Ok(Self {
            http_client: build_http_client(timeout)?,
            api_base,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    async fn get_model_info(&self) -> Result<(reqwest::StatusCode, Vec<u8>), ClientError> {
        let url = self.url("model-info");
        tracing::debug!(url = %url, "Requesting model info");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl ModelApi for HttpModelApi {
    async fn model_info(&self) -> Result<ModelMetadata, ClientError> {
        let (status, body) = self.get_model_info().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let metadata: ModelMetadata =
            serde_json::from_slice(&body).map_err(|e| ClientError::Parse(e.to_string()))?;

        tracing::info!(
            model = %metadata.model_name,
            categories = metadata.num_categories,
            features = metadata.num_features,
            "Model info loaded"
        );

        Ok(metadata)
    }

    async fn predict(&self, form: &PredictionForm) -> Result<PredictionResult, ClientError> {
        let url = self.url("predict");
        tracing::debug!(url = %url, nuts = %form.nuts, contract = %form.type_of_contract, "Submitting prediction");

        let response = self
            .http_client
            .post(&url)
            .json(form)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let envelope = serde_json::from_slice::<PredictResponse>(&body);

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: envelope.ok().and_then(|e| e.error_message()),
            });
        }

        let envelope = envelope.map_err(|e| ClientError::Parse(e.to_string()))?;
        if !envelope.is_success() {
            return Err(ClientError::Rejected {
                message: envelope.error_message(),
            });
        }

        let raw = envelope
            .result
            .ok_or_else(|| ClientError::Invalid("missing result object".to_string()))?;
        let result: PredictionResult =
            serde_json::from_value(raw).map_err(|e| ClientError::Invalid(e.to_string()))?;
        result
            .validate()
            .map_err(|v| ClientError::Invalid(v.to_string()))?;

        tracing::info!(cpv = %result.cpv, confidence = result.confidence, "Prediction received");
        Ok(result)
    }

    async fn liveness(&self) -> Result<LivenessReply, ClientError> {
        let (status, body) = self.get_model_info().await?;
        Ok(LivenessReply {
            status: status.as_u16(),
            body: serde_json::from_slice(&body).ok(),
        })
    }
}

/// Provider of the raw CPV description resource
#[async_trait]
pub trait DictionarySource: Send + Sync {
    /// Human-readable location for logs
    fn location(&self) -> String;

    /// Fetch the resource as untyped JSON
    async fn fetch(&self) -> Result<Value, ClientError>;
}

/// Dictionary served over HTTP (the static `/cpv.json` asset)
pub struct HttpDictionarySource {
    http_client: reqwest::Client,
    url: String,
}

impl HttpDictionarySource {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ClientError> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl DictionarySource for HttpDictionarySource {
    fn location(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Value, ClientError> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: None,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }
}

/// Dictionary read from a local JSON file
pub struct FileDictionarySource {
    path: PathBuf,
}

impl FileDictionarySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DictionarySource for FileDictionarySource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Value, ClientError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ClientError::Io(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Parse(e.to_string()))
    }
}

/// Build the dictionary source for a configured location
pub fn dictionary_source(
    location: &DictionaryLocation,
    timeout: Option<Duration>,
) -> Result<Arc<dyn DictionarySource>, ClientError> {
    Ok(match location {
        DictionaryLocation::Url(url) => Arc::new(HttpDictionarySource::new(url.clone(), timeout)?),
        DictionaryLocation::File(path) => Arc::new(FileDictionarySource::new(path.clone())),
    })
}
