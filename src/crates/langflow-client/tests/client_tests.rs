//! End-to-end tests against a fake Langflow server
//!
//! Each test starts an axum server on an ephemeral port that replays scripted
//! responses and records the requests it receives.

use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use langflow_client::{
    AgentBackend, LangflowClient, LangflowConfig, LangflowError, RetryPolicy, RunRequest,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct FakeLangflow {
    responses: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    requests: Arc<Mutex<Vec<(Option<String>, RunRequest)>>>,
}

impl FakeLangflow {
    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn run_flow(
    State(fake): State<FakeLangflow>,
    headers: HeaderMap,
    Json(body): Json<RunRequest>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    fake.requests.lock().unwrap().push((auth, body));

    let next = fake.responses.lock().unwrap().pop_front();
    match next {
        Some((status, body)) => (status, Json(body)),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "no scripted response"})),
        ),
    }
}

async fn spawn_fake(responses: Vec<(StatusCode, Value)>) -> (String, FakeLangflow) {
    let fake = FakeLangflow::default();
    fake.responses.lock().unwrap().extend(responses);

    let app = Router::new()
        .route("/api/v1/run/:flow", post(run_flow))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api/v1/run/hr-leave", addr), fake)
}

fn message(text: &str) -> Value {
    json!({
        "session_id": "ignored",
        "outputs": [{
            "inputs": {"input_value": "ignored"},
            "outputs": [{"results": {"message": {"text": text}}}]
        }]
    })
}

fn client_for(url: &str, max_attempts: usize) -> LangflowClient {
    LangflowClient::new(LangflowConfig::new(url, "sk-test-key"))
        .unwrap()
        .with_retry_policy(
            RetryPolicy::new(max_attempts)
                .with_initial_interval(0.01)
                .with_jitter(false),
        )
}

#[tokio::test]
async fn test_structured_reply_round_trip() {
    let structured = json!({
        "conversational_response": "Your request for 3 vacation days is noted.",
        "query_flag": false,
        "data": {
            "employee_id": "EMP12345",
            "employee_name": "Jordan Lee",
            "leave_balance": 15,
            "leave_type": "vacation",
            "start_date": "2024-07-01",
            "end_date": "2024-07-03",
            "days_requested": 3
        }
    })
    .to_string();
    let (url, fake) = spawn_fake(vec![(StatusCode::OK, message(&structured))]).await;

    let reply = client_for(&url, 1)
        .query("I want to take 3 days off next week for vacation", "session-42")
        .await
        .unwrap();

    assert!(reply.structured);
    assert_eq!(reply.response, "Your request for 3 vacation days is noted.");
    assert_eq!(reply.data.days_requested, Some(3));
    assert_eq!(reply.data.employee_name.as_deref(), Some("Jordan Lee"));

    let requests = fake.requests.lock().unwrap();
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test-key"));
    assert_eq!(
        body,
        &RunRequest {
            output_type: "chat".into(),
            input_type: "chat".into(),
            input_value: "I want to take 3 days off next week for vacation".into(),
            session_id: "session-42".into(),
        }
    );
}

#[tokio::test]
async fn test_plain_text_reply_uses_fallback() {
    let (url, _fake) = spawn_fake(vec![(
        StatusCode::OK,
        message("Logged 2 days of sick leave from 2024-03-04 to 2024-03-05."),
    )])
    .await;

    let reply = client_for(&url, 1).run("I'm ill", "s").await.unwrap();

    assert!(!reply.structured);
    assert_eq!(reply.response, reply.text);
    assert_eq!(reply.data.days_requested, Some(2));
    assert_eq!(reply.data.leave_type.as_deref(), Some("sick"));
    assert_eq!(reply.data.start_date.as_deref(), Some("2024-03-04"));
}

#[tokio::test]
async fn test_authentication_failure_is_not_retried() {
    let (url, fake) = spawn_fake(vec![(
        StatusCode::UNAUTHORIZED,
        json!({"detail": "Invalid API key"}),
    )])
    .await;

    let err = client_for(&url, 3).run("hi", "s").await.unwrap_err();

    assert!(err.is_auth_error());
    assert!(err.to_string().contains("Invalid API key"));
    assert_eq!(fake.request_count(), 1);
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let (url, fake) = spawn_fake(vec![
        (StatusCode::SERVICE_UNAVAILABLE, json!({"detail": "warming up"})),
        (StatusCode::OK, message("You have 12 days of leave remaining.")),
    ])
    .await;

    let reply = client_for(&url, 3).run("balance?", "s").await.unwrap();

    assert_eq!(reply.response, "You have 12 days of leave remaining.");
    assert_eq!(fake.request_count(), 2);
}

#[tokio::test]
async fn test_rate_limit_exhausts_attempts() {
    let (url, fake) = spawn_fake(vec![
        (StatusCode::TOO_MANY_REQUESTS, json!({"detail": "slow down"})),
        (StatusCode::TOO_MANY_REQUESTS, json!({"detail": "slow down"})),
        (StatusCode::OK, message("too late")),
    ])
    .await;

    let err = client_for(&url, 2).run("hi", "s").await.unwrap_err();

    assert!(matches!(err, LangflowError::RateLimited(_)));
    assert_eq!(fake.request_count(), 2);
}

#[tokio::test]
async fn test_client_error_status_is_reported() {
    let (url, fake) = spawn_fake(vec![(
        StatusCode::BAD_REQUEST,
        json!({"detail": "flow not found"}),
    )])
    .await;

    let err = client_for(&url, 3).run("hi", "s").await.unwrap_err();

    assert!(matches!(err, LangflowError::Status { status: 400, .. }));
    assert_eq!(fake.request_count(), 1);
}

#[tokio::test]
async fn test_unexpected_body_shape() {
    let (url, _fake) = spawn_fake(vec![(StatusCode::OK, json!({"outputs": []}))]).await;

    let err = client_for(&url, 1).run("hi", "s").await.unwrap_err();
    assert!(matches!(err, LangflowError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{}/api/v1/run/hr-leave", addr);
    let err = client_for(&url, 1).run("hi", "s").await.unwrap_err();

    assert!(matches!(err, LangflowError::Http(_)));
    assert!(err.is_retryable());
}
