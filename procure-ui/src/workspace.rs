//! Workspace controller
//!
//! Composes the stores, the health monitor, the prediction workflow and the
//! view router. Startup loads run as independent tasks; nothing waits on
//! them unless a caller asks to.

use crate::client::{DictionarySource, ModelApi};
use crate::health::{HealthHandle, HealthMonitor, HealthStatus};
use crate::render;
use crate::resolver;
use crate::resources::{Lang, Resources};
use crate::router::{Navigator, View, ViewRouter};
use crate::stores::{CpvDictionary, DictionaryStore, MetadataState, MetadataStore};
use crate::workflow::{FormEdit, PredictionWorkflow, SubmitOutcome, WorkflowSnapshot};
use procure_common::config::DEFAULT_HEALTH_INTERVAL_MS;
use procure_common::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Construction options
#[derive(Debug, Clone)]
pub struct WorkspaceOptions {
    pub lang: Lang,
    /// Shown on the docs view
    pub api_base: String,
    pub health_interval: Duration,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            lang: Lang::default(),
            api_base: procure_common::config::DEFAULT_API_BASE.to_string(),
            health_interval: Duration::from_millis(DEFAULT_HEALTH_INTERVAL_MS),
        }
    }
}

/// Plain data the renderer draws from
#[derive(Debug, Clone)]
pub struct WorkspaceSnapshot {
    pub lang: Lang,
    pub view: View,
    pub api_base: String,
    pub metadata: MetadataState,
    pub dictionary: Arc<CpvDictionary>,
    pub health: HealthStatus,
    pub workflow: WorkflowSnapshot,
}

/// Controller for one interactive session
pub struct Workspace<N: Navigator> {
    resources: Arc<Resources>,
    lang: Lang,
    api_base: String,
    health_interval: Duration,
    metadata: Arc<MetadataStore>,
    dictionary: Arc<DictionaryStore>,
    health: Arc<HealthMonitor>,
    health_task: Option<HealthHandle>,
    workflow: Arc<PredictionWorkflow>,
    router: ViewRouter<N>,
    startup: Vec<JoinHandle<()>>,
    started: bool,
}

impl<N: Navigator> Workspace<N> {
    pub fn new(
        api: Arc<dyn ModelApi>,
        dictionary_source: Arc<dyn DictionarySource>,
        navigator: N,
        resources: Arc<Resources>,
        options: WorkspaceOptions,
    ) -> Self {
        Self {
            resources,
            lang: options.lang,
            api_base: options.api_base,
            health_interval: options.health_interval,
            metadata: Arc::new(MetadataStore::new(Arc::clone(&api))),
            dictionary: Arc::new(DictionaryStore::new(dictionary_source)),
            health: Arc::new(HealthMonitor::new(Arc::clone(&api))),
            health_task: None,
            workflow: Arc::new(PredictionWorkflow::new(api)),
            router: ViewRouter::new(navigator),
            startup: Vec::new(),
            started: false,
        }
    }

    /// Issue the startup loads and begin health polling
    ///
    /// Must be called from within a tokio runtime. Later calls do nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!(view = %self.router.view(), lang = %self.lang, "Workspace starting");

        let metadata = Arc::clone(&self.metadata);
        let workflow = Arc::clone(&self.workflow);
        self.startup.push(tokio::spawn(async move {
            if let Some(metadata) = metadata.load().await {
                workflow.seed_defaults(&metadata).await;
            }
        }));

        let dictionary = Arc::clone(&self.dictionary);
        self.startup.push(tokio::spawn(async move {
            dictionary.load().await;
        }));

        self.activate_health();
    }

    /// Wait until the metadata and dictionary loads have settled
    pub async fn wait_for_startup(&mut self) {
        for task in self.startup.drain(..) {
            if let Err(e) = task.await {
                warn!("Startup task ended abnormally: {}", e);
            }
        }
    }

    /// Load metadata and check health once, without background polling
    ///
    /// For one-shot commands that never call [`start`](Self::start).
    pub async fn load_and_check(&self) -> HealthStatus {
        let (_, status) = tokio::join!(self.metadata.load(), self.health.check_once());
        status
    }

    fn activate_health(&mut self) {
        if let Some(previous) = self.health_task.take() {
            previous.cancel();
        }
        debug!(view = %self.router.view(), "Health polling (re)started");
        self.health_task = Some(self.health.start(self.health_interval));
    }

    pub fn view(&self) -> View {
        self.router.view()
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    pub fn set_lang(&mut self, lang: Lang) {
        self.lang = lang;
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn health(&self) -> &Arc<HealthMonitor> {
        &self.health
    }

    pub fn workflow(&self) -> &Arc<PredictionWorkflow> {
        &self.workflow
    }

    pub fn navigator(&self) -> &N {
        self.router.navigator()
    }

    /// Show `view`; health polling restarts when the active view changes
    pub fn navigate(&mut self, view: View) -> bool {
        let changed = self.router.navigate(view);
        if changed && self.started {
            self.activate_health();
        }
        changed
    }

    /// History back; returns whether the active view changed
    pub fn back(&mut self) -> bool {
        if !self.router.navigator().back() {
            return false;
        }
        self.after_traversal()
    }

    /// History forward; returns whether the active view changed
    pub fn forward(&mut self) -> bool {
        if !self.router.navigator().forward() {
            return false;
        }
        self.after_traversal()
    }

    fn after_traversal(&mut self) -> bool {
        let changed = self.router.sync_with_location();
        if changed && self.started {
            self.activate_health();
        }
        changed
    }

    pub async fn edit(&self, edit: FormEdit) -> Result<()> {
        self.workflow.edit(edit).await
    }

    /// Replace the form with preset `id`
    pub async fn apply_preset(&self, id: u8) -> Result<()> {
        let preset = self
            .resources
            .preset(id)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown preset {}", id)))?;
        self.workflow.apply_preset(preset.form.clone()).await;
        Ok(())
    }

    pub async fn submit(&self) -> SubmitOutcome {
        self.workflow.submit().await
    }

    /// Submit without waiting for the outcome
    pub fn submit_in_background(&self) -> JoinHandle<SubmitOutcome> {
        let workflow = Arc::clone(&self.workflow);
        tokio::spawn(async move { workflow.submit().await })
    }

    /// Description of `code` in the current language
    pub async fn describe(&self, code: &str) -> String {
        let dictionary = self.dictionary.snapshot().await;
        resolver::resolve_for(code, self.lang, &dictionary)
    }

    pub async fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            lang: self.lang,
            view: self.router.view(),
            api_base: self.api_base.clone(),
            metadata: self.metadata.snapshot().await,
            dictionary: self.dictionary.snapshot().await,
            health: self.health.status(),
            workflow: self.workflow.snapshot().await,
        }
    }

    /// Text of the active view
    pub async fn render(&self) -> String {
        let snapshot = self.snapshot().await;
        render::render(&snapshot, &self.resources)
    }

    /// Stop health polling and wait for the task to exit
    pub async fn shutdown(&mut self) {
        if let Some(handle) = self.health_task.take() {
            handle.stop().await;
        }
        for task in self.startup.drain(..) {
            task.abort();
        }
        info!("Workspace stopped");
    }
}
