//! procure-ui library - ProcureAI CPV prediction workspace
//!
//! Client-side controller for the CPV classifier service: model metadata,
//! the CPV description dictionary, health polling, the prediction form and
//! view routing, rendered as terminal text.

pub mod client;
pub mod health;
pub mod render;
pub mod resolver;
pub mod resources;
pub mod router;
pub mod shell;
pub mod stores;
pub mod workflow;
pub mod workspace;

#[cfg(test)]
mod test_support;

pub use client::{ClientError, DictionarySource, HttpModelApi, ModelApi};
pub use health::{HealthHandle, HealthMonitor, HealthStatus};
pub use resources::{Lang, Resources};
pub use router::{MemoryHistory, Navigator, View, ViewRouter};
pub use workflow::{FormEdit, PredictionWorkflow, SubmitOutcome, WorkflowState};
pub use workspace::{Workspace, WorkspaceOptions, WorkspaceSnapshot};
