use std::sync::Arc;

use catalog_sync::{
    BatchRequest, BatchTransport, ItemId, Orchestrator, OrchestratorConfig, PanelKind,
    SyncPhase,
};
use catalog_sync_http::{HttpTransport, HttpTransportConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(server: &MockServer) -> HttpTransport {
    HttpTransport::new(HttpTransportConfig {
        auth_token: Some("test-token".into()),
        ..HttpTransportConfig::new(format!("{}/sync", server.uri()))
    })
    .unwrap()
}

#[tokio::test]
async fn posts_envelope_with_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sync"))
        .and(body_partial_json(json!({
            "action": "phase-sync",
            "authToken": "test-token",
            "phase": "products",
            "offset": 40,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"nextOffset": 80, "totalItems": 100, "hasMore": true}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = transport_for(&server)
        .submit(&BatchRequest::phase_sync(&SyncPhase::Products, 40))
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.next_offset, Some(80));
    assert!(response.has_more);
}

#[tokio::test]
async fn application_failure_is_not_a_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "data": {"message": "quota exceeded", "details": {"limit": 500}}
        })))
        .mount(&server)
        .await;

    let response = transport_for(&server)
        .submit(&BatchRequest::import_one(&ItemId::new("7")))
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(response.message.as_deref(), Some("quota exceeded"));
    assert_eq!(response.details, Some(json!({"limit": 500})));
}

#[tokio::test]
async fn non_success_status_carries_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sync"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .submit(&BatchRequest::fetch_selection())
        .await
        .unwrap_err();

    assert_eq!(err.status, Some(403));
    assert_eq!(err.message, "forbidden");
}

#[tokio::test]
async fn empty_error_body_uses_reason_phrase() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sync"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .submit(&BatchRequest::fix_hierarchy())
        .await
        .unwrap_err();

    assert_eq!(err.status, Some(502));
    assert_eq!(err.message, "Bad Gateway");
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .submit(&BatchRequest::order_sync(0))
        .await
        .unwrap_err();

    assert_eq!(err.status, None);
    assert!(err.message.starts_with("invalid response"));
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let transport =
        HttpTransport::new(HttpTransportConfig::new("http://127.0.0.1:1/sync")).unwrap();

    let err = transport
        .submit(&BatchRequest::customer_sync(0))
        .await
        .unwrap_err();

    assert_eq!(err.status, None);
}

#[tokio::test]
async fn category_sync_runs_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sync"))
        .and(body_partial_json(json!({"phase": "categories", "offset": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "nextOffset": 2,
                "totalItems": 3,
                "hasMore": true,
                "batchLogs": ["Category Shoes created", "Category Hats skipped"],
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/sync"))
        .and(body_partial_json(json!({"phase": "categories", "offset": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"nextOffset": 3, "totalItems": 3, "hasMore": false}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(
        Arc::new(transport_for(&server)),
        OrchestratorConfig::default(),
    );

    let report = orchestrator.category_sync().await.completed().unwrap();
    assert_eq!(report.requests, 2);

    let surface = &orchestrator.panel(PanelKind::Categories).surface;
    assert_eq!(surface.progress(), 100);
    assert_eq!(surface.status(), "Categories sync complete");
    assert_eq!(surface.log()[2].text, "Categories: processed 3 of 3");
}
