//! Text rendering of the three views
//!
//! Pure functions of a [`WorkspaceSnapshot`]; no I/O.

use crate::health::HealthStatus;
use crate::resolver::resolve_for;
use crate::resources::{Messages, Resources};
use crate::router::View;
use crate::stores::MetadataState;
use crate::workflow::WorkflowState;
use crate::workspace::WorkspaceSnapshot;
use procure_common::api::{ModelMetadata, PredictionForm, PredictionResult};

const DEFAULT_MODEL_NAME: &str = "CPVClassifier";
const DEFAULT_MODEL_VERSION: &str = "1.0";
const DEFAULT_CATEGORIES: u32 = 15;
const DEFAULT_FEATURES: u32 = 40;

/// Probability in `[0, 1]` as a percentage with two decimals
pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// Confidence band of the top prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        let percent = confidence * 100.0;
        if percent >= 70.0 {
            ConfidenceLevel::High
        } else if percent >= 40.0 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn label(self, messages: &Messages) -> &'static str {
        match self {
            ConfidenceLevel::High => messages.confidence_high,
            ConfidenceLevel::Medium => messages.confidence_medium,
            ConfidenceLevel::Low => messages.confidence_low,
        }
    }
}

/// Render the active view
pub fn render(snapshot: &WorkspaceSnapshot, resources: &Resources) -> String {
    match snapshot.view {
        View::Predictor => render_predictor(snapshot, resources),
        View::Docs => render_docs(snapshot, resources),
        View::Status => render_status(snapshot, resources),
    }
}

pub fn render_predictor(snapshot: &WorkspaceSnapshot, resources: &Resources) -> String {
    let m = resources.messages(snapshot.lang);
    let mut out = Vec::new();

    out.push(format!("== {} ==", m.hero_title));
    out.push(m.hero_lead.to_string());

    match &snapshot.metadata {
        MetadataState::Ready(meta) => out.push(format!(
            "{}: {}  |  {}: {}  |  {}: {}",
            m.model_label,
            meta.model_name,
            m.categories_label,
            meta.num_categories,
            m.features_label,
            meta.num_features
        )),
        MetadataState::Failed(error) => out.push(format!("! {}", error.message(m.metadata_failed))),
        MetadataState::Pending => {}
    }

    out.push(String::new());
    out.push(format!("-- {} --", m.form_title));
    let metadata = match &snapshot.metadata {
        MetadataState::Ready(meta) => Some(meta.as_ref()),
        _ => None,
    };
    push_form(&mut out, m, &snapshot.workflow.form, metadata);

    let presets = resources
        .presets()
        .iter()
        .zip(m.preset_labels.iter())
        .map(|(preset, label)| format!("[{}] {}", preset.id, label))
        .collect::<Vec<_>>()
        .join("  ");
    out.push(format!("{} {}", m.presets_title, presets));

    let state = &snapshot.workflow.state;
    let button = if state.is_submitting() {
        m.submit_loading
    } else {
        m.submit_idle
    };
    out.push(format!("< {} >", button));

    out.push(String::new());
    out.push(format!("-- {} --", m.result_title));
    match state {
        WorkflowState::Failed(error) => out.push(format!("❌ {}", error.message(m.prediction_failed))),
        WorkflowState::Submitting => {
            out.push(m.loading_title.to_string());
            out.push(m.loading_subtitle.to_string());
        }
        WorkflowState::Succeeded(result) => push_result(&mut out, snapshot, m, result),
        WorkflowState::Idle => {
            out.push(m.placeholder_title.to_string());
            out.push(m.placeholder_subtitle.to_string());
        }
    }

    out.join("\n")
}

fn push_form(out: &mut Vec<String>, m: &Messages, form: &PredictionForm, metadata: Option<&ModelMetadata>) {
    out.push(format!("{}: {}", m.value_label, form.value_euro));

    let fields: [(&str, &str, Option<&[String]>); 3] = [
        (m.cae_label, &form.cae_name, metadata.map(|meta| meta.cae_names.as_slice())),
        (m.nuts_label, &form.nuts, metadata.map(|meta| meta.nuts_codes.as_slice())),
        (m.type_label, &form.type_of_contract, metadata.map(|meta| meta.contract_types.as_slice())),
    ];
    for (label, value, options) in fields {
        out.push(format!("{}: {}", label, value));
        if let Some(options) = options.filter(|o| !o.is_empty()) {
            out.push(format!("    ({})", options.join(" | ")));
        }
    }
}

fn push_result(out: &mut Vec<String>, snapshot: &WorkspaceSnapshot, m: &Messages, result: &PredictionResult) {
    let describe = |code: &str| resolve_for(code, snapshot.lang, &snapshot.dictionary);
    let level = ConfidenceLevel::from_confidence(result.confidence);

    out.push(format!("{}: CPV {}", m.top_result, result.cpv));
    out.push(format!("    {}", describe(&result.cpv)));
    out.push(format!(
        "{}: {} ({})",
        m.confidence,
        format_percent(result.confidence),
        level.label(m)
    ));

    out.push(String::new());
    out.push(m.table_title.to_string());
    out.push(format!("{:>3}  {:<10}  {:>10}", m.th_index, m.th_cpv, m.th_prob));
    for (index, row) in result.top5.iter().enumerate() {
        out.push(format!(
            "{:>3}  {:<10}  {:>10}  {}",
            index + 1,
            row.cpv,
            format_percent(row.probability),
            describe(&row.cpv)
        ));
    }

    let form = &snapshot.workflow.form;
    out.push(String::new());
    out.push(format!("{}:", m.details_summary));
    out.push(format!(
        "    VALUE_EURO={} CAE_NAME={} NUTS={} TYPE_OF_CONTRACT={}",
        form.value_euro, form.cae_name, form.nuts, form.type_of_contract
    ));
}

pub fn render_docs(snapshot: &WorkspaceSnapshot, resources: &Resources) -> String {
    let m = resources.messages(snapshot.lang);
    let base = &snapshot.api_base;

    let lines = [
        format!("== {} ==", m.docs_title),
        m.docs_lead.to_string(),
        String::new(),
        format!("Base URL: {}", base),
        String::new(),
        format!("GET  {}/model-info", base),
        "  -> {\"model_name\": \"CPVClassifier\", \"num_categories\": 15, \"num_features\": 40, \
         \"cae_names\": [...], \"nuts_codes\": [...], \"contract_types\": [...]}"
            .to_string(),
        String::new(),
        format!("POST {}/predict", base),
        "  <- {\"VALUE_EURO\": 50000, \"CAE_NAME\": \"Urząd Miasta Warszawa\", \"NUTS\": \"PL911\", \
         \"TYPE_OF_CONTRACT\": \"SERVICES\"}"
            .to_string(),
        "  -> {\"success\": true, \"result\": {\"cpv\": \"75000000\", \"confidence\": 0.83, \
         \"top5\": [{\"cpv\": \"75000000\", \"probability\": 0.83}, ...]}}"
            .to_string(),
    ];
    lines.join("\n")
}

pub fn render_status(snapshot: &WorkspaceSnapshot, resources: &Resources) -> String {
    let m = resources.messages(snapshot.lang);

    let pill = match snapshot.health {
        HealthStatus::Healthy => format!("● {}", m.status_healthy),
        HealthStatus::Unhealthy => format!("● {}", m.status_unavailable),
        HealthStatus::Unknown => format!("○ {}", m.status_checking),
    };

    let (name, version, categories, features) = match &snapshot.metadata {
        MetadataState::Ready(meta) => (
            meta.model_name.as_str(),
            meta.version.as_deref().unwrap_or(DEFAULT_MODEL_VERSION),
            meta.num_categories,
            meta.num_features,
        ),
        _ => (
            DEFAULT_MODEL_NAME,
            DEFAULT_MODEL_VERSION,
            DEFAULT_CATEGORIES,
            DEFAULT_FEATURES,
        ),
    };

    let mut lines = vec![
        format!("== {} ==", m.status_title),
        format!("Live status: {}", pill),
        format!("{}: {} v{}", m.model_label, name, version),
        format!("{}: ~120 ms", m.status_prediction_time),
        format!("{}: {}", m.categories_label, categories),
        format!("{}: {}", m.features_label, features),
    ];

    if let MetadataState::Ready(meta) = &snapshot.metadata {
        if let Some(algorithm) = &meta.algorithm {
            lines.push(format!("{}: {}", m.algorithm_label, algorithm));
        }
        if !meta.cpv_codes.is_empty() {
            lines.push(format!("{}: {}", m.codes_label, meta.cpv_codes.len()));
        }
    }
    lines.join("\n")
}
