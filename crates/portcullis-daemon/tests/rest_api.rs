//! REST surface tests against the in-process stack

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use portcullis_channel::{ChannelConfig, CommandTransport, GateChannel, InProcessTransport};
use portcullis_daemon::api::create_router;
use portcullis_daemon::api::rest::state::AppState;
use portcullis_invitation::InvitationVerifier;
use portcullis_pipeline::mocks::MockRecognizer;
use portcullis_pipeline::{AccessPipeline, PipelineConfig};
use portcullis_recognition::RecognitionClient;
use portcullis_registry::{AuthorizationResolver, InMemoryRegistry, VehicleStore};
use portcullis_types::{EntryStatus, OwnerInfo, RegistryEntry, RegistryEntryId};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower::ServiceExt;

struct TestStack {
    app: Router,
    registry: Arc<InMemoryRegistry>,
    control_rx: broadcast::Receiver<Vec<u8>>,
}

async fn stack(recognizer: MockRecognizer) -> TestStack {
    let registry = Arc::new(InMemoryRegistry::new());
    let transport = Arc::new(InProcessTransport::new());
    let channel_config = ChannelConfig::default();
    let control_rx = transport
        .subscribe(&channel_config.control_topic)
        .await
        .unwrap();
    let channel = Arc::new(
        GateChannel::connect(transport, channel_config)
            .await
            .unwrap(),
    );

    let pipeline = Arc::new(AccessPipeline::new(
        Arc::new(recognizer),
        AuthorizationResolver::new(registry.clone()),
        channel.clone(),
        registry.clone(),
        PipelineConfig::default(),
    ));
    let verifier = Arc::new(InvitationVerifier::new(registry.clone()));
    // Nothing listens here; only the health proxy would dial it.
    let recognition = Arc::new(RecognitionClient::new("http://127.0.0.1:1").unwrap());

    let state = AppState::new(pipeline, registry.clone(), verifier, recognition, channel);
    TestStack {
        app: create_router(state, 10 * 1024 * 1024, true),
        registry,
        control_rx,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn scan_request(image: &[u8]) -> Request<Body> {
    let boundary = "portcullis-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; \
             filename=\"capture.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/v1/access/scan")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn register_vehicle(registry: &InMemoryRegistry, plate: &str) {
    registry
        .upsert_entry(RegistryEntry {
            id: RegistryEntryId::generate(),
            normalized_plate: plate.into(),
            owner: OwnerInfo {
                name: "Resident One".into(),
                unit: "A-12".into(),
            },
            status: EntryStatus::Active,
            created_at: Utc::now(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let stack = stack(MockRecognizer::empty()).await;

    let response = stack
        .app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn vehicle_create_list_delete_roundtrip() {
    let stack = stack(MockRecognizer::empty()).await;

    let response = stack
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/vehicles",
            json!({"plate": "b 1234 xyz", "owner_name": "Resident One", "unit": "A-12"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["normalized_plate"], "B1234XYZ");
    let id = created["id"].as_str().unwrap().to_string();

    let response = stack
        .app
        .clone()
        .oneshot(Request::get("/api/v1/vehicles").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = stack
        .app
        .clone()
        .oneshot(
            Request::delete(format!("/api/v1/vehicles/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A second delete is a miss.
    let response = stack
        .app
        .oneshot(
            Request::delete(format!("/api/v1/vehicles/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scan_authorizes_registered_vehicle_and_audits() {
    let mut stack = stack(MockRecognizer::single("B 1234 XYZ", 0.95)).await;
    register_vehicle(&stack.registry, "B1234XYZ").await;

    let response = stack
        .app
        .clone()
        .oneshot(scan_request(&[0xFF, 0xD8, 0xFF]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let decision = body_json(response).await;
    assert_eq!(decision["authorized"], true);
    assert_eq!(decision["plate"], "B1234XYZ");
    assert_eq!(decision["gate_action"], "opened");

    // The open command reached the control topic.
    let payload = stack.control_rx.recv().await.unwrap();
    let envelope: Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(envelope["command"], "OPEN_GATE");

    let response = stack
        .app
        .oneshot(
            Request::get("/api/v1/access/attempts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let attempts = body_json(response).await;
    assert_eq!(attempts["total"], 1);
    assert_eq!(attempts["attempts"][0]["authorized"], true);
}

#[tokio::test]
async fn scan_without_image_part_is_a_bad_request() {
    let stack = stack(MockRecognizer::empty()).await;

    let boundary = "portcullis-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhi\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/access/scan")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = stack.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn visitor_invitation_lifecycle_over_rest() {
    let stack = stack(MockRecognizer::empty()).await;

    let response = stack
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/visitors",
            json!({
                "visitor_name": "Alex Visitor",
                "host_unit": "A-12",
                "valid_until": Utc::now() + Duration::hours(4),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let invitation = body_json(response).await;
    assert_eq!(invitation["status"], "pending");
    let token = invitation["qr_token"].as_str().unwrap().to_string();

    let response = stack
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/visitors/verify",
            json!({"qr_token": token}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let verified = body_json(response).await;
    assert_eq!(verified["valid"], true);
    assert_eq!(verified["invitation"]["status"], "used");

    // One-time use: the same token conflicts on replay.
    let response = stack
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/visitors/verify",
            json!({"qr_token": token}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = stack
        .app
        .oneshot(Request::get("/api/v1/visitors").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed[0]["derived_status"], "used");
}

#[tokio::test]
async fn verify_with_unknown_token_is_not_found() {
    let stack = stack(MockRecognizer::empty()).await;

    let response = stack
        .app
        .oneshot(json_request(
            "POST",
            "/api/v1/visitors/verify",
            json!({"qr_token": "no-such-token"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invitation_with_past_window_is_rejected() {
    let stack = stack(MockRecognizer::empty()).await;

    let response = stack
        .app
        .oneshot(json_request(
            "POST",
            "/api/v1/visitors",
            json!({
                "visitor_name": "Alex Visitor",
                "host_unit": "A-12",
                "valid_until": Utc::now() - Duration::hours(1),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn manual_open_publishes_with_override_duration() {
    let mut stack = stack(MockRecognizer::empty()).await;

    let response = stack
        .app
        .oneshot(json_request(
            "POST",
            "/api/v1/gate/open",
            json!({"triggered_by": "guard-1", "reason": "delivery", "duration_ms": 8000}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ack = body_json(response).await;
    assert_eq!(ack["command"], "OPEN_GATE");

    let payload = stack.control_rx.recv().await.unwrap();
    let envelope: Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(envelope["command"], "OPEN_GATE");
    assert_eq!(envelope["data"]["duration"], 8000);
    assert_eq!(
        envelope["data"]["correlation_id"],
        ack["correlation_id"]
    );
}

#[tokio::test]
async fn recognition_health_proxy_reports_outage() {
    let stack = stack(MockRecognizer::empty()).await;

    let response = stack
        .app
        .oneshot(
            Request::get("/api/v1/recognition/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
