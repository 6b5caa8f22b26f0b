use crate::gateway_harness::{GatewayTestServer, SYSTEM, UnavailableClassifier};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

async fn upstream_replying(status: u16, body: Value) -> MockServer {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&upstream)
        .await;
    upstream
}

fn chat_bodies(requests: &[Request]) -> Vec<Value> {
    requests
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .map(|r| serde_json::from_slice(&r.body).expect("upstream body should be json"))
        .collect()
}

async fn post_chat(server: &GatewayTestServer, body: Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(server.url("/chat"))
        .json(&body)
        .send()
        .await
        .expect("chat request should complete");
    let status = response.status();
    let json = response.json().await.expect("chat response should be json");
    (status, json)
}

#[tokio::test]
async fn upstream_success_returns_first_choice() {
    let upstream = upstream_replying(200, json!({"choices":[{"message":{"content":"Hello"}}]})).await;
    let server = GatewayTestServer::start(&upstream.uri()).await;

    let (status, body) = post_chat(&server, json!({"message": "I feel a bit sad today"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"reply": "Hello"}));

    let sent = chat_bodies(&upstream.received_requests().await.unwrap());
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["model"], "test-model");
    assert_eq!(sent[0]["messages"][0], json!({"role": "system", "content": SYSTEM}));
    assert_eq!(
        sent[0]["messages"][1],
        json!({"role": "user", "content": "I feel a bit sad today (emotion detected: sadness)"})
    );
}

#[tokio::test]
async fn upstream_500_is_reported_as_200_with_generic_reply() {
    let upstream = upstream_replying(500, json!({"error": "boom"})).await;
    let server = GatewayTestServer::start(&upstream.uri()).await;

    let (status, body) = post_chat(&server, json!({"message": "hello"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"reply": "Sorry, something went wrong."}));
}

#[tokio::test]
async fn unreachable_upstream_reply_hides_error_detail() {
    let server = GatewayTestServer::start("http://127.0.0.1:9").await;

    let (status, body) = post_chat(&server, json!({"message": "hello"})).await;

    assert_eq!(status, StatusCode::OK);
    let reply = body["reply"].as_str().unwrap();
    assert!(reply.starts_with("Sorry"));
    assert!(!reply.contains("127.0.0.1"));
    assert!(!reply.to_lowercase().contains("error"));
}

#[tokio::test]
async fn crisis_message_never_reaches_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;
    let server =
        GatewayTestServer::start_with(&upstream.uri(), Arc::new(UnavailableClassifier)).await;

    let (status, body) = post_chat(&server, json!({"message": "I want to kill myself"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"reply": "I'm here dont worry."}));
    assert_eq!(server.relay.store().session_count(), 0);
}

#[tokio::test]
async fn missing_message_is_treated_as_empty() {
    let upstream = upstream_replying(200, json!({"choices":[{"message":{"content":"I'm listening."}}]})).await;
    let server = GatewayTestServer::start(&upstream.uri()).await;

    let (status, body) = post_chat(&server, json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "I'm listening.");
    let sent = chat_bodies(&upstream.received_requests().await.unwrap());
    assert_eq!(sent[0]["messages"][1]["content"], " (emotion detected: neutral)");
}

#[tokio::test]
async fn malformed_json_still_gets_a_reply() {
    let upstream = upstream_replying(200, json!({"choices":[{"message":{"content":"ok"}}]})).await;
    let server = GatewayTestServer::start(&upstream.uri()).await;

    let response = reqwest::Client::new()
        .post(server.url("/chat"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"reply": "ok"}));
}

#[tokio::test]
async fn classifier_outage_falls_back_to_neutral() {
    let upstream = upstream_replying(200, json!({"choices":[{"message":{"content":"ok"}}]})).await;
    let server =
        GatewayTestServer::start_with(&upstream.uri(), Arc::new(UnavailableClassifier)).await;

    let (_, body) = post_chat(&server, json!({"message": "I am furious"})).await;

    assert_eq!(body["reply"], "ok");
    let sent = chat_bodies(&upstream.received_requests().await.unwrap());
    assert_eq!(
        sent[0]["messages"][1]["content"],
        "I am furious (emotion detected: neutral)"
    );
}

#[tokio::test]
async fn index_serves_chat_page() {
    let upstream = MockServer::start().await;
    let server = GatewayTestServer::start(&upstream.uri()).await;

    let response = reqwest::get(server.url("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("<title>Test Chat</title>"));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let upstream = MockServer::start().await;
    let server = GatewayTestServer::start(&upstream.uri()).await;

    let huge = "a".repeat(70_000);
    let response = reqwest::Client::new()
        .post(server.url("/chat"))
        .json(&json!({"message": huge}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
