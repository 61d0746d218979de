//! In-process doubles for unit tests

use crate::client::{ClientError, DictionarySource, LivenessReply, ModelApi};
use crate::router::Navigator;
use async_trait::async_trait;
use procure_common::api::{ModelMetadata, PredictionForm, PredictionResult, RankedCode};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub(crate) fn sample_metadata() -> ModelMetadata {
    ModelMetadata {
        model_name: "CPVClassifier".to_string(),
        num_categories: 15,
        num_features: 40,
        cae_names: vec!["Gmina Białystok".to_string(), "Urząd Miasta Warszawa".to_string()],
        nuts_codes: vec!["PL113".to_string(), "PL911".to_string()],
        contract_types: vec!["SERVICES".to_string(), "SUPPLIES".to_string(), "WORKS".to_string()],
        version: Some("1.0".to_string()),
        algorithm: Some("Random Forest".to_string()),
        cpv_codes: Vec::new(),
    }
}

pub(crate) fn sample_result() -> PredictionResult {
    PredictionResult {
        cpv: "75000000".to_string(),
        confidence: 0.83,
        top5: vec![
            RankedCode {
                cpv: "75000000".to_string(),
                probability: 0.83,
            },
            RankedCode {
                cpv: "85000000".to_string(),
                probability: 0.12,
            },
        ],
    }
}

/// Scriptable [`ModelApi`] that counts calls
pub(crate) struct FakeModelApi {
    model_info: Mutex<Result<ModelMetadata, ClientError>>,
    prediction: Mutex<Result<PredictionResult, ClientError>>,
    liveness: Mutex<Result<LivenessReply, ClientError>>,
    predict_gate: Mutex<Option<Arc<Notify>>>,
    submitted: Mutex<Vec<PredictionForm>>,
    model_info_calls: AtomicUsize,
    liveness_calls: AtomicUsize,
}

impl FakeModelApi {
    pub(crate) fn healthy() -> Self {
        Self {
            model_info: Mutex::new(Ok(sample_metadata())),
            prediction: Mutex::new(Ok(sample_result())),
            liveness: Mutex::new(Ok(LivenessReply {
                status: 200,
                body: Some(json!({ "model_name": "CPVClassifier" })),
            })),
            predict_gate: Mutex::new(None),
            submitted: Mutex::new(Vec::new()),
            model_info_calls: AtomicUsize::new(0),
            liveness_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_model_info(&self, value: Result<ModelMetadata, ClientError>) {
        *self.model_info.lock().unwrap() = value;
    }

    pub(crate) fn set_prediction(&self, value: Result<PredictionResult, ClientError>) {
        *self.prediction.lock().unwrap() = value;
    }

    pub(crate) fn set_liveness(&self, value: Result<LivenessReply, ClientError>) {
        *self.liveness.lock().unwrap() = value;
    }

    /// Hold every `predict` call until the returned handle is notified
    pub(crate) fn gate_predictions(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.predict_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub(crate) fn submitted(&self) -> Vec<PredictionForm> {
        self.submitted.lock().unwrap().clone()
    }

    pub(crate) fn model_info_calls(&self) -> usize {
        self.model_info_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn liveness_calls(&self) -> usize {
        self.liveness_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelApi for FakeModelApi {
    async fn model_info(&self) -> Result<ModelMetadata, ClientError> {
        self.model_info_calls.fetch_add(1, Ordering::SeqCst);
        self.model_info.lock().unwrap().clone()
    }

    async fn predict(&self, form: &PredictionForm) -> Result<PredictionResult, ClientError> {
        self.submitted.lock().unwrap().push(form.clone());
        let gate = self.predict_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.prediction.lock().unwrap().clone()
    }

    async fn liveness(&self) -> Result<LivenessReply, ClientError> {
        self.liveness_calls.fetch_add(1, Ordering::SeqCst);
        self.liveness.lock().unwrap().clone()
    }
}

/// [`DictionarySource`] returning a fixed payload
pub(crate) struct StaticDictionarySource {
    value: Result<Value, ClientError>,
    calls: AtomicUsize,
}

impl StaticDictionarySource {
    pub(crate) fn new(value: Result<Value, ClientError>) -> Self {
        Self {
            value,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DictionarySource for StaticDictionarySource {
    fn location(&self) -> String {
        "memory".to_string()
    }

    async fn fetch(&self) -> Result<Value, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.value.clone()
    }
}

/// [`Navigator`] that records pushed paths
#[derive(Default)]
pub(crate) struct RecordingNavigator {
    initial: String,
    pushed: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub(crate) fn at(path: &str) -> Self {
        Self {
            initial: path.to_string(),
            pushed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn pushed(&self) -> Vec<String> {
        self.pushed.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn push_path(&self, path: &str) {
        self.pushed.lock().unwrap().push(path.to_string());
    }

    fn current_path(&self) -> String {
        self.pushed
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_else(|| self.initial.clone())
    }
}
