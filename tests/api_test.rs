use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt; // for `oneshot`

use cfntoolkit::api::router;
use cfntoolkit::api::state::AppState;
use cfntoolkit::aws::Backends;
use cfntoolkit::callback::{CallbackError, ResponseSink};
use cfntoolkit::config::Config;
use cfntoolkit::handlers::{Dispatcher, HandlerSettings, ResourceHandlers, ResultEnvelope};
use cfntoolkit::observability::Metrics;

/// Sink that keeps envelopes instead of PUTting them
#[derive(Default)]
struct RecordingSink {
    delivered: Mutex<Vec<(String, ResultEnvelope)>>,
}

#[async_trait]
impl ResponseSink for RecordingSink {
    async fn deliver(&self, url: &str, envelope: &ResultEnvelope) -> Result<(), CallbackError> {
        if url.contains("unreachable") {
            return Err(CallbackError::Timeout);
        }
        self.delivered
            .lock()
            .await
            .push((url.to_string(), envelope.clone()));
        Ok(())
    }
}

/// Creates a minimal config for testing, with a small event limit
fn create_test_config() -> Config {
    let config_toml = r#"
[server]
bind_addr = "127.0.0.1:8080"
max_event_bytes = 2048

[backend]
provider = "memory"

[password]
default_entropy = 48
    "#;

    toml::from_str(config_toml).expect("Failed to parse test config")
}

fn build_test_app() -> (Router, Arc<RecordingSink>) {
    let config = create_test_config();
    let metrics = Arc::new(Metrics::new());
    let handlers = ResourceHandlers::new(
        &Backends::in_memory(),
        HandlerSettings {
            default_entropy: config.password.default_entropy,
            max_random_bytes: config.password.max_random_bytes,
        },
    );
    let sink = Arc::new(RecordingSink::default());
    let dispatcher = Dispatcher::new(handlers, sink.clone(), metrics.clone());

    (router(AppState::new(config, dispatcher, metrics)), sink)
}

fn lifecycle_event(resource_type: &str, properties: Value) -> Value {
    json!({
        "RequestType": "Create",
        "ResourceType": resource_type,
        "ResourceProperties": properties,
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/demo/1",
        "RequestId": "req-42",
        "LogicalResourceId": "Password",
        "ResponseURL": "https://callbacks.example.com/req-42",
    })
}

/// Helper to build a POST /events request
fn post_event_request(body: String) -> Request<Body> {
    Request::builder()
        .uri("/events")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_post_event_success() {
    let (app, sink) = build_test_app();

    let event = lifecycle_event("Custom::GeneratePassword", json!({ "Chars": "ab", "Entropy": 16 }));
    let response = app.oneshot(post_event_request(event.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["Status"], "SUCCESS");
    assert_eq!(body["Delivered"], true);
    assert!(body.get("DeliveryError").is_none());
    assert_eq!(body["Data"]["PlaintextPassword"].as_str().unwrap().len(), 16);

    let delivered = sink.delivered.lock().await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, "https://callbacks.example.com/req-42");
    assert_eq!(delivered[0].1.request_id, "req-42");
}

#[tokio::test]
async fn test_post_event_handler_failure_is_still_ok() {
    let (app, sink) = build_test_app();

    let event = lifecycle_event("Custom::HashPassword", json!({ "PlaintextPassword": "x" }));
    let response = app.oneshot(post_event_request(event.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["Status"], "FAILED");
    assert_eq!(body["Reason"], "Scheme must be specified");
    assert_eq!(sink.delivered.lock().await.len(), 1);
}

#[tokio::test]
async fn test_post_event_reports_delivery_failure() {
    let (app, _sink) = build_test_app();

    let mut event = lifecycle_event("Custom::SecureRandom", json!({ "Size": 8 }));
    event["ResponseURL"] = json!("https://unreachable.example.com/");
    let response = app.oneshot(post_event_request(event.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["Status"], "SUCCESS");
    assert_eq!(body["Delivered"], false);
    assert_eq!(body["DeliveryError"], "Connection timeout");
}

#[tokio::test]
async fn test_post_event_invalid_json() {
    let (app, sink) = build_test_app();

    let response = app
        .oneshot(post_event_request("{ not json".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["code"], "MALFORMED_JSON");
    assert!(sink.delivered.lock().await.is_empty());
}

#[tokio::test]
async fn test_post_event_missing_fields() {
    let (app, _sink) = build_test_app();

    let body = json!({ "RequestType": "Create", "ResourceType": "Custom::SecureRandom" });
    let response = app.oneshot(post_event_request(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_EVENT");
}

#[tokio::test]
async fn test_post_event_wrong_content_type() {
    let (app, _sink) = build_test_app();

    let event = lifecycle_event("Custom::SecureRandom", json!({ "Size": 8 }));
    let request = Request::builder()
        .uri("/events")
        .method("POST")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(event.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(json_body(response).await["code"], "UNSUPPORTED_MEDIA_TYPE");
}

#[tokio::test]
async fn test_post_event_payload_too_large() {
    let (app, sink) = build_test_app();

    let event = lifecycle_event("Custom::SecureRandom", json!({ "Size": 8, "Padding": "x".repeat(4096) }));
    let response = app.oneshot(post_event_request(event.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(sink.delivered.lock().await.is_empty());
}

#[tokio::test]
async fn test_health() {
    let (app, _sink) = build_test_app();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn test_metrics_count_events() {
    let (app, _sink) = build_test_app();

    let ok = lifecycle_event("Custom::SecureRandom", json!({ "Size": 8 }));
    let bad = lifecycle_event("Custom::SecureRandom", json!({ "Size": 0 }));
    for event in [ok, bad] {
        let response = app
            .clone()
            .oneshot(post_event_request(event.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let body = json_body(app.oneshot(request).await.unwrap()).await;
    assert_eq!(body["events_received"], 2);
    assert_eq!(body["events_succeeded"], 1);
    assert_eq!(body["events_failed"], 1);
    assert_eq!(body["callbacks_delivered"], 2);
}
