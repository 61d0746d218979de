//! Stub model service for integration tests
//!
//! Serves `/api/model-info`, `/api/predict` and `/cpv.json` on an ephemeral
//! localhost port. Responses can be swapped while the server runs.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Canned response: status code plus JSON body
#[derive(Clone)]
pub struct Canned {
    pub status: StatusCode,
    pub body: Value,
}

impl Canned {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn error(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }
}

struct StubState {
    model_info: Mutex<Canned>,
    predict: Mutex<Canned>,
    dictionary: Mutex<Canned>,
    received: Mutex<Vec<Value>>,
    model_info_hits: AtomicUsize,
}

pub fn model_info_body() -> Value {
    json!({
        "model_name": "CPVClassifier",
        "num_categories": 15,
        "num_features": 40,
        "cae_names": ["Urząd Miasta Warszawa", "Szpital Miejski"],
        "nuts_codes": ["PL911", "PL113"],
        "contract_types": ["SERVICES", "SUPPLIES", "WORKS"],
        "version": "1.0",
        "algorithm": "Random Forest"
    })
}

pub fn prediction_body() -> Value {
    json!({
        "success": true,
        "result": {
            "cpv": "75000000",
            "confidence": 0.83,
            "top5": [
                { "cpv": "75000000", "probability": 0.83 },
                { "cpv": "85000000", "probability": 0.12 }
            ]
        }
    })
}

pub fn dictionary_body() -> Value {
    json!({
        "75000000-1": { "en": "Construction work", "pl": "Roboty budowlane" },
        "85000000-9": { "en": "Health and social work services", "pl": "Usługi zdrowotne i społeczne" }
    })
}

/// Running stub server
pub struct StubBackend {
    addr: SocketAddr,
    state: Arc<StubState>,
    task: JoinHandle<()>,
}

impl StubBackend {
    /// Start with a loaded model and a successful prediction
    pub async fn start() -> Self {
        let state = Arc::new(StubState {
            model_info: Mutex::new(Canned::ok(model_info_body())),
            predict: Mutex::new(Canned::ok(prediction_body())),
            dictionary: Mutex::new(Canned::ok(dictionary_body())),
            received: Mutex::new(Vec::new()),
            model_info_hits: AtomicUsize::new(0),
        });

        let router = Router::new()
            .route("/api/model-info", get(model_info))
            .route("/api/predict", post(predict))
            .route("/cpv.json", get(dictionary))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, state, task }
    }

    pub fn api_base(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn dictionary_url(&self) -> String {
        format!("http://{}/cpv.json", self.addr)
    }

    pub fn set_model_info(&self, canned: Canned) {
        *self.state.model_info.lock().unwrap() = canned;
    }

    pub fn set_predict(&self, canned: Canned) {
        *self.state.predict.lock().unwrap() = canned;
    }

    pub fn set_dictionary(&self, canned: Canned) {
        *self.state.dictionary.lock().unwrap() = canned;
    }

    /// Bodies posted to `/api/predict`, oldest first
    pub fn received(&self) -> Vec<Value> {
        self.state.received.lock().unwrap().clone()
    }

    pub fn model_info_hits(&self) -> usize {
        self.state.model_info_hits.load(Ordering::SeqCst)
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn reply(canned: &Canned) -> axum::response::Response {
    (canned.status, Json(canned.body.clone())).into_response()
}

async fn model_info(State(state): State<Arc<StubState>>) -> axum::response::Response {
    state.model_info_hits.fetch_add(1, Ordering::SeqCst);
    let canned = state.model_info.lock().unwrap().clone();
    reply(&canned)
}

async fn predict(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> axum::response::Response {
    state.received.lock().unwrap().push(body);
    let canned = state.predict.lock().unwrap().clone();
    reply(&canned)
}

async fn dictionary(State(state): State<Arc<StubState>>) -> axum::response::Response {
    let canned = state.dictionary.lock().unwrap().clone();
    reply(&canned)
}

/// Base URL nothing listens on
pub const UNREACHABLE_API_BASE: &str = "http://127.0.0.1:1/api";
