//! HTTP client tests against the stub model service

mod helpers;

use axum::http::StatusCode;
use helpers::{Canned, StubBackend, UNREACHABLE_API_BASE};
use procure_common::api::PredictionForm;
use procure_common::config::DictionaryLocation;
use procure_ui::client::{dictionary_source, ClientError, HttpModelApi, ModelApi};
use procure_ui::HealthStatus;
use serde_json::json;

fn scenario_form() -> PredictionForm {
    PredictionForm::new(50000.0, "A", "PL911", "SERVICES")
}

#[tokio::test]
async fn test_model_info_decodes() {
    let stub = StubBackend::start().await;
    let api = HttpModelApi::new(stub.api_base(), None).unwrap();

    let metadata = api.model_info().await.unwrap();

    assert_eq!(metadata.model_name, "CPVClassifier");
    assert_eq!(metadata.num_categories, 15);
    assert_eq!(metadata.num_features, 40);
    assert_eq!(metadata.contract_types, vec!["SERVICES", "SUPPLIES", "WORKS"]);
    assert_eq!(metadata.version.as_deref(), Some("1.0"));
}

#[tokio::test]
async fn test_model_info_error_carries_server_message() {
    let stub = StubBackend::start().await;
    stub.set_model_info(Canned::error(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({ "error": "Model nie został wczytany" }),
    ));
    let api = HttpModelApi::new(stub.api_base(), None).unwrap();

    let err = api.model_info().await.unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 503, .. }));
    assert_eq!(err.server_message(), Some("Model nie został wczytany"));
}

#[tokio::test]
async fn test_predict_scenario() {
    let stub = StubBackend::start().await;
    let api = HttpModelApi::new(format!("{}/", stub.api_base()), None).unwrap();

    let result = api.predict(&scenario_form()).await.unwrap();

    assert_eq!(result.cpv, "75000000");
    assert_eq!(result.confidence, 0.83);
    assert_eq!(result.top5.len(), 2);
    assert_eq!(result.top5[0].cpv, "75000000");

    let received = stub.received();
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0],
        json!({ "VALUE_EURO": 50000.0, "CAE_NAME": "A", "NUTS": "PL911", "TYPE_OF_CONTRACT": "SERVICES" })
    );
}

#[tokio::test]
async fn test_predict_pads_numeric_codes() {
    let stub = StubBackend::start().await;
    stub.set_predict(Canned::ok(json!({
        "success": true,
        "result": {
            "cpv": 3000000,
            "confidence": 0.6,
            "top5": [
                { "cpv": 3000000, "probability": 0.6 },
                { "cpv": 45000000, "probability": 0.3 }
            ]
        }
    })));
    let api = HttpModelApi::new(stub.api_base(), None).unwrap();

    let result = api.predict(&scenario_form()).await.unwrap();

    assert_eq!(result.cpv, "03000000");
    assert_eq!(result.top5[1].cpv, "45000000");
}

#[tokio::test]
async fn test_predict_server_error() {
    let stub = StubBackend::start().await;
    stub.set_predict(Canned::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Model nie został wczytany" }),
    ));
    let api = HttpModelApi::new(stub.api_base(), None).unwrap();

    let err = api.predict(&scenario_form()).await.unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 500, .. }));
    assert_eq!(err.server_message(), Some("Model nie został wczytany"));
}

#[tokio::test]
async fn test_predict_rejected() {
    let stub = StubBackend::start().await;
    stub.set_predict(Canned::ok(json!({ "success": false, "error": "Brakuje pola: NUTS" })));
    let api = HttpModelApi::new(stub.api_base(), None).unwrap();

    let err = api.predict(&scenario_form()).await.unwrap_err();

    assert!(matches!(err, ClientError::Rejected { .. }));
    assert_eq!(err.server_message(), Some("Brakuje pola: NUTS"));
}

#[tokio::test]
async fn test_predict_rejects_unsorted_ranking() {
    let stub = StubBackend::start().await;
    stub.set_predict(Canned::ok(json!({
        "success": true,
        "result": {
            "cpv": "75000000",
            "confidence": 0.5,
            "top5": [
                { "cpv": "75000000", "probability": 0.5 },
                { "cpv": "85000000", "probability": 0.7 }
            ]
        }
    })));
    let api = HttpModelApi::new(stub.api_base(), None).unwrap();

    let err = api.predict(&scenario_form()).await.unwrap_err();

    assert!(matches!(err, ClientError::Invalid(_)));
    assert_eq!(err.server_message(), None);
}

#[tokio::test]
async fn test_liveness_classification() {
    let stub = StubBackend::start().await;
    let api = HttpModelApi::new(stub.api_base(), None).unwrap();

    assert_eq!(HealthStatus::classify(&api.liveness().await), HealthStatus::Healthy);

    stub.set_model_info(Canned::error(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({ "error": "Model nie został wczytany" }),
    ));
    assert_eq!(HealthStatus::classify(&api.liveness().await), HealthStatus::Unhealthy);

    stub.set_model_info(Canned::ok(json!({})));
    assert_eq!(HealthStatus::classify(&api.liveness().await), HealthStatus::Unhealthy);
    assert_eq!(stub.model_info_hits(), 3);
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let api = HttpModelApi::new(UNREACHABLE_API_BASE, None).unwrap();

    assert!(matches!(api.model_info().await, Err(ClientError::Network(_))));
    assert!(matches!(api.predict(&scenario_form()).await, Err(ClientError::Network(_))));
    assert_eq!(HealthStatus::classify(&api.liveness().await), HealthStatus::Unhealthy);
}

#[tokio::test]
async fn test_http_dictionary_source() {
    let stub = StubBackend::start().await;
    let source = dictionary_source(&DictionaryLocation::parse(&stub.dictionary_url()), None).unwrap();

    let value = source.fetch().await.unwrap();

    assert_eq!(value["75000000-1"]["pl"], "Roboty budowlane");
    assert_eq!(source.location(), stub.dictionary_url());
}
