//! Model service health monitor
//!
//! Polls the liveness signal (`GET /model-info`) on a fixed interval and
//! publishes a tri-state [`HealthStatus`] through a `watch` channel.
//!
//! Polling is a cancellable task: [`HealthMonitor::start`] returns a
//! [`HealthHandle`], and cancelling or dropping the handle ends the task. A
//! poll still in flight at that point is abandoned without publishing.

use crate::client::{ClientError, LivenessReply, ModelApi};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Latest known health of the model service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    /// No poll has completed yet
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    /// Classify the outcome of one liveness request
    ///
    /// Healthy requires a 2xx status, a non-empty `model_name` and no `error`.
    pub fn classify(outcome: &Result<LivenessReply, ClientError>) -> Self {
        match outcome {
            Ok(reply) if reply.is_success_status() => match &reply.body {
                Some(body) if reports_loaded_model(body) => HealthStatus::Healthy,
                _ => HealthStatus::Unhealthy,
            },
            _ => HealthStatus::Unhealthy,
        }
    }
}

fn reports_loaded_model(body: &Value) -> bool {
    let has_name = matches!(body.get("model_name"), Some(Value::String(name)) if !name.is_empty());
    let has_error = body.get("error").is_some_and(is_truthy);
    has_name && !has_error
}

/// Whether a JSON value carries content (null, false, 0 and "" do not)
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Owner of the health status
pub struct HealthMonitor {
    api: Arc<dyn ModelApi>,
    status: watch::Sender<HealthStatus>,
}

impl HealthMonitor {
    pub fn new(api: Arc<dyn ModelApi>) -> Self {
        let (status, _) = watch::channel(HealthStatus::Unknown);
        Self { api, status }
    }

    pub fn status(&self) -> HealthStatus {
        *self.status.borrow()
    }

    /// Receiver notified on every published status
    pub fn subscribe(&self) -> watch::Receiver<HealthStatus> {
        self.status.subscribe()
    }

    /// Run a single poll and publish its result
    pub async fn check_once(&self) -> HealthStatus {
        let outcome = self.api.liveness().await;
        self.publish(&outcome)
    }

    fn publish(&self, outcome: &Result<LivenessReply, ClientError>) -> HealthStatus {
        let status = HealthStatus::classify(outcome);
        if let Err(e) = outcome {
            debug!("Health poll failed: {}", e);
        }
        let previous = self.status.send_replace(status);
        if previous != status {
            debug!("Health status {:?} -> {:?}", previous, status);
        }
        status
    }

    /// Start polling: once immediately, then every `interval`
    pub fn start(self: &Arc<Self>, interval: Duration) -> HealthHandle {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let monitor = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!("Health polling started ({:?} interval)", interval);

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    outcome = monitor.api.liveness() => {
                        monitor.publish(&outcome);
                    }
                }
            }

            debug!("Health polling stopped");
        });

        HealthHandle {
            token,
            task: Some(task),
        }
    }
}

/// Cancellation handle of a running health poll task
///
/// Dropping the handle cancels the task.
pub struct HealthHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl HealthHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel and wait until the task has exited
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for HealthHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeModelApi;
    use serde_json::json;

    fn canned_reply(status: u16, body: Value) -> Result<LivenessReply, ClientError> {
        Ok(LivenessReply {
            status,
            body: Some(body),
        })
    }

    #[test]
    fn test_classify_examples() {
        assert_eq!(
            HealthStatus::classify(&canned_reply(200, json!({ "model_name": "CPVClassifier" }))),
            HealthStatus::Healthy
        );
        assert_eq!(HealthStatus::classify(&canned_reply(200, json!({}))), HealthStatus::Unhealthy);
        assert_eq!(
            HealthStatus::classify(&canned_reply(200, json!({ "error": "x" }))),
            HealthStatus::Unhealthy
        );
    }

    #[test]
    fn test_classify_edge_cases() {
        assert_eq!(
            HealthStatus::classify(&canned_reply(500, json!({ "model_name": "CPVClassifier" }))),
            HealthStatus::Unhealthy
        );
        assert_eq!(
            HealthStatus::classify(&canned_reply(200, json!({ "model_name": "" }))),
            HealthStatus::Unhealthy
        );
        assert_eq!(
            HealthStatus::classify(&canned_reply(200, json!({ "model_name": "CPVClassifier", "error": "Model nie został wczytany" }))),
            HealthStatus::Unhealthy
        );
        assert_eq!(
            HealthStatus::classify(&canned_reply(200, json!({ "model_name": "CPVClassifier", "error": null }))),
            HealthStatus::Healthy
        );
        assert_eq!(
            HealthStatus::classify(&Ok(LivenessReply { status: 200, body: None })),
            HealthStatus::Unhealthy
        );
        assert_eq!(
            HealthStatus::classify(&Err(ClientError::Network("refused".to_string()))),
            HealthStatus::Unhealthy
        );
    }

    #[tokio::test]
    async fn test_check_once_publishes() {
        let api = Arc::new(FakeModelApi::healthy());
        let monitor = HealthMonitor::new(api.clone());
        let mut rx = monitor.subscribe();

        assert_eq!(monitor.status(), HealthStatus::Unknown);
        assert_eq!(monitor.check_once().await, HealthStatus::Healthy);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), HealthStatus::Healthy);

        api.set_liveness(Err(ClientError::Network("refused".to_string())));
        assert_eq!(monitor.check_once().await, HealthStatus::Unhealthy);
        assert_eq!(monitor.status(), HealthStatus::Unhealthy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_immediately_then_on_interval() {
        let api = Arc::new(FakeModelApi::healthy());
        let monitor = Arc::new(HealthMonitor::new(api.clone()));

        let handle = monitor.start(Duration::from_secs(5));
        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(api.liveness_calls(), 1);
        assert_eq!(monitor.status(), HealthStatus::Healthy);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(api.liveness_calls(), 3);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_polling() {
        let api = Arc::new(FakeModelApi::healthy());
        let monitor = Arc::new(HealthMonitor::new(api.clone()));

        let handle = monitor.start(Duration::from_secs(5));
        time::sleep(Duration::from_millis(10)).await;
        handle.stop().await;

        let calls = api.liveness_calls();
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.liveness_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_polling() {
        let api = Arc::new(FakeModelApi::healthy());
        let monitor = Arc::new(HealthMonitor::new(api.clone()));

        let handle = monitor.start(Duration::from_secs(5));
        time::sleep(Duration::from_millis(10)).await;
        assert!(!handle.is_cancelled());
        drop(handle);

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.liveness_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_never_returns_to_unknown() {
        let api = Arc::new(FakeModelApi::healthy());
        api.set_liveness(canned_reply(503, json!({ "error": "Model nie został wczytany" })));
        let monitor = Arc::new(HealthMonitor::new(api.clone()));
        let handle = monitor.start(Duration::from_secs(1));

        for _ in 0..5 {
            time::sleep(Duration::from_millis(1100)).await;
            assert_eq!(monitor.status(), HealthStatus::Unhealthy);
        }

        api.set_liveness(canned_reply(200, json!({ "model_name": "CPVClassifier" })));
        time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(monitor.status(), HealthStatus::Healthy);

        handle.stop().await;
    }
}
