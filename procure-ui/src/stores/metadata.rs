//! Model metadata store
//!
//! Fetches `/model-info` once. A failed load is kept as a non-fatal
//! [`MetadataLoadError`] for the informational banner; there is no retry.

use crate::client::{ClientError, ModelApi};
use procure_common::api::ModelMetadata;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Why model metadata is unavailable
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataLoadError {
    /// `error` field of the service payload, when one was sent
    pub server_message: Option<String>,
    /// Diagnostic description of the failure
    pub detail: String,
}

impl MetadataLoadError {
    /// Text for the banner: server message, else the localized `fallback`
    pub fn message<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.server_message.as_deref().unwrap_or(fallback)
    }
}

impl From<ClientError> for MetadataLoadError {
    fn from(err: ClientError) -> Self {
        Self {
            server_message: err.server_message().map(str::to_string),
            detail: err.to_string(),
        }
    }
}

/// Load state of the model metadata
#[derive(Debug, Clone)]
pub enum MetadataState {
    /// Request not yet completed
    Pending,
    Ready(Arc<ModelMetadata>),
    Failed(MetadataLoadError),
}

/// Owner of the model metadata
pub struct MetadataStore {
    api: Arc<dyn ModelApi>,
    state: RwLock<MetadataState>,
}

impl MetadataStore {
    pub fn new(api: Arc<dyn ModelApi>) -> Self {
        Self {
            api,
            state: RwLock::new(MetadataState::Pending),
        }
    }

    /// Fetch model metadata
    ///
    /// Returns the metadata on success. Once loaded, the metadata is never
    /// replaced and further calls return it without a request.
    pub async fn load(&self) -> Option<Arc<ModelMetadata>> {
        if let Some(existing) = self.metadata().await {
            return Some(existing);
        }

        match self.api.model_info().await {
            Ok(metadata) => {
                let mut state = self.state.write().await;
                if let MetadataState::Ready(existing) = &*state {
                    return Some(Arc::clone(existing));
                }
                let metadata = Arc::new(metadata);
                info!(
                    "Model metadata ready: {} ({} CAE, {} NUTS, {} contract types)",
                    metadata.model_name,
                    metadata.cae_names.len(),
                    metadata.nuts_codes.len(),
                    metadata.contract_types.len()
                );
                *state = MetadataState::Ready(Arc::clone(&metadata));
                Some(metadata)
            }
            Err(e) => {
                warn!("Model metadata not loaded: {}", e);
                let mut state = self.state.write().await;
                if !matches!(*state, MetadataState::Ready(_)) {
                    *state = MetadataState::Failed(e.into());
                }
                None
            }
        }
    }

    pub async fn snapshot(&self) -> MetadataState {
        self.state.read().await.clone()
    }

    pub async fn metadata(&self) -> Option<Arc<ModelMetadata>> {
        match &*self.state.read().await {
            MetadataState::Ready(metadata) => Some(Arc::clone(metadata)),
            _ => None,
        }
    }
}
