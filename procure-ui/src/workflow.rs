//! Prediction workflow
//!
//! Owns the tender form and the submit/result lifecycle:
//!
//! ```text
//! Idle -> Submitting -> Succeeded(result) | Failed(error) -> Submitting -> ...
//! ```
//!
//! At most one request is in flight. A submit while `Submitting` is ignored,
//! and the in-flight request is never retried. If the caller abandons a
//! submit before the reply arrives, the workflow leaves `Submitting` as
//! `Failed` so the form can be sent again.

use crate::client::{ClientError, ModelApi};
use procure_common::api::{ModelMetadata, PredictionForm, PredictionResult};
use procure_common::{Error, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Why a prediction failed
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionError {
    /// `error` field of the service payload, when one was sent
    pub server_message: Option<String>,
    /// Diagnostic description of the failure
    pub detail: String,
}

impl PredictionError {
    /// Text for the results area: server message, else the localized `fallback`
    pub fn message<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.server_message.as_deref().unwrap_or(fallback)
    }
}

impl From<ClientError> for PredictionError {
    fn from(err: ClientError) -> Self {
        Self {
            server_message: err.server_message().map(str::to_string),
            detail: err.to_string(),
        }
    }
}

/// Lifecycle state of the workflow
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Submitting,
    Succeeded(PredictionResult),
    Failed(PredictionError),
}

impl WorkflowState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, WorkflowState::Submitting)
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            WorkflowState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&PredictionError> {
        match self {
            WorkflowState::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Single-field change merged into the current form
#[derive(Debug, Clone, PartialEq)]
pub enum FormEdit {
    ValueEuro(f64),
    CaeName(String),
    Nuts(String),
    TypeOfContract(String),
}

impl FormEdit {
    /// Build an edit from a wire field name (`VALUE_EURO`, `CAE_NAME`, ...)
    pub fn parse(field: &str, value: &str) -> Result<Self> {
        match field.trim().to_ascii_uppercase().as_str() {
            "VALUE_EURO" => value
                .trim()
                .parse::<f64>()
                .map(FormEdit::ValueEuro)
                .map_err(|_| Error::InvalidInput(format!("VALUE_EURO must be a number, got '{}'", value))),
            "CAE_NAME" => Ok(FormEdit::CaeName(value.to_string())),
            "NUTS" => Ok(FormEdit::Nuts(value.to_string())),
            "TYPE_OF_CONTRACT" => Ok(FormEdit::TypeOfContract(value.to_string())),
            other => Err(Error::InvalidInput(format!("Unknown form field '{}'", other))),
        }
    }
}

/// Result of a [`PredictionWorkflow::submit`] call
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A request was already in flight; nothing was sent
    Ignored,
    Succeeded(PredictionResult),
    Failed(PredictionError),
}

/// Form and state as seen by the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSnapshot {
    pub form: PredictionForm,
    pub state: WorkflowState,
}

#[derive(Debug, Default)]
struct Inner {
    form: PredictionForm,
    state: WorkflowState,
}

/// Detail recorded when a submit is dropped before its reply arrives
pub const CANCELLED_DETAIL: &str = "request cancelled";

/// Moves the workflow out of `Submitting` if the submit future is dropped
/// while the request is in flight
struct InFlight {
    inner: Arc<RwLock<Inner>>,
    settled: bool,
}

impl InFlight {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        fn abandon(inner: &mut Inner) {
            if inner.state.is_submitting() {
                inner.state = WorkflowState::Failed(PredictionError {
                    server_message: None,
                    detail: CANCELLED_DETAIL.to_string(),
                });
            }
        }

        debug!("Prediction request abandoned");
        match self.inner.try_write() {
            Ok(mut inner) => abandon(&mut inner),
            Err(_) => {
                // A reader holds the lock; finish the reset once it is released
                if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                    let inner = Arc::clone(&self.inner);
                    runtime.spawn(async move { abandon(&mut *inner.write().await) });
                }
            }
        }
    }
}

/// Owner of the prediction form and result
pub struct PredictionWorkflow {
    api: Arc<dyn ModelApi>,
    inner: Arc<RwLock<Inner>>,
}

impl PredictionWorkflow {
    pub fn new(api: Arc<dyn ModelApi>) -> Self {
        Self {
            api,
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    pub async fn form(&self) -> PredictionForm {
        self.inner.read().await.form.clone()
    }

    pub async fn state(&self) -> WorkflowState {
        self.inner.read().await.state.clone()
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        let inner = self.inner.read().await;
        WorkflowSnapshot {
            form: inner.form.clone(),
            state: inner.state.clone(),
        }
    }

    /// Merge one field into the form
    ///
    /// A negative or non-finite contract value is rejected and the form is
    /// left unchanged.
    pub async fn edit(&self, edit: FormEdit) -> Result<()> {
        let mut inner = self.inner.write().await;
        match edit {
            FormEdit::ValueEuro(value) => {
                if !PredictionForm::is_valid_value(value) {
                    return Err(Error::InvalidInput(format!(
                        "VALUE_EURO must be a non-negative number, got {}",
                        value
                    )));
                }
                inner.form.value_euro = value;
            }
            FormEdit::CaeName(name) => inner.form.cae_name = name,
            FormEdit::Nuts(code) => inner.form.nuts = code,
            FormEdit::TypeOfContract(kind) => inner.form.type_of_contract = kind,
        }
        Ok(())
    }

    /// Replace the whole form
    pub async fn apply_preset(&self, form: PredictionForm) {
        self.inner.write().await.form = form;
    }

    /// Fill empty choice fields with the first option the model offers
    pub async fn seed_defaults(&self, metadata: &ModelMetadata) {
        let mut inner = self.inner.write().await;
        let form = &mut inner.form;

        fn seed(field: &mut String, options: &[String]) {
            if field.is_empty() {
                if let Some(first) = options.first() {
                    *field = first.clone();
                }
            }
        }

        seed(&mut form.cae_name, &metadata.cae_names);
        seed(&mut form.nuts, &metadata.nuts_codes);
        seed(&mut form.type_of_contract, &metadata.contract_types);
        debug!(
            cae = %form.cae_name,
            nuts = %form.nuts,
            contract = %form.type_of_contract,
            "Form defaults seeded"
        );
    }

    /// Submit the current form
    ///
    /// Entering `Submitting` clears the previous result or error.
    pub async fn submit(&self) -> SubmitOutcome {
        let form = {
            let mut inner = self.inner.write().await;
            if inner.state.is_submitting() {
                debug!("Prediction already in flight, submit ignored");
                return SubmitOutcome::Ignored;
            }
            inner.state = WorkflowState::Submitting;
            inner.form.clone()
        };
        let in_flight = InFlight {
            inner: Arc::clone(&self.inner),
            settled: false,
        };

        let outcome = self.api.predict(&form).await;

        let mut inner = self.inner.write().await;
        in_flight.settle();
        match outcome {
            Ok(result) => {
                info!(cpv = %result.cpv, confidence = result.confidence, "Prediction succeeded");
                inner.state = WorkflowState::Succeeded(result.clone());
                SubmitOutcome::Succeeded(result)
            }
            Err(e) => {
                warn!("Prediction failed: {}", e);
                let error = PredictionError::from(e);
                inner.state = WorkflowState::Failed(error.clone());
                SubmitOutcome::Failed(error)
            }
        }
    }
}
