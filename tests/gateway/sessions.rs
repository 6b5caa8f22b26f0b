use crate::gateway_harness::{GatewayTestServer, relay_for};
use calmline::conversation::{DEFAULT_SESSION, Role};
use calmline::emotion::LexiconClassifier;
use calmline::relay::UNREACHABLE_REPLY;
use reqwest::StatusCode;
use std::sync::Arc;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn slow_upstream() -> MockServer {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(20))
                .set_body_json(json!({"choices":[{"message":{"content":"noted"}}]})),
        )
        .mount(&upstream)
        .await;
    upstream
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_append_every_turn_exactly_once() {
    let upstream = slow_upstream().await;
    let server = GatewayTestServer::start(&upstream.uri()).await;
    let client = reqwest::Client::new();

    let requests: Vec<_> = (0..12)
        .map(|i| {
            let client = client.clone();
            let url = server.url("/chat");
            tokio::spawn(async move {
                client
                    .post(url)
                    .json(&json!({"message": format!("message {i}")}))
                    .send()
                    .await
                    .expect("chat request should complete")
                    .json::<Value>()
                    .await
                    .expect("reply should be json")
            })
        })
        .collect();

    for request in requests {
        let body = request.await.unwrap();
        assert_eq!(body["reply"], "noted");
    }

    let history = server
        .relay
        .store()
        .snapshot(DEFAULT_SESSION)
        .await
        .expect("default session should exist");
    assert_eq!(history.len(), 1 + 12 * 2);
    assert_eq!(history[0].role(), Role::System);
    for pair in history[1..].chunks(2) {
        assert_eq!(pair[0].role(), Role::User);
        assert_eq!(pair[1].role(), Role::Assistant);
        assert_eq!(pair[1].content(), "noted");
    }
}

#[tokio::test]
async fn session_header_and_body_keep_histories_apart() {
    let upstream = slow_upstream().await;
    let server = GatewayTestServer::start(&upstream.uri()).await;
    let client = reqwest::Client::new();

    client
        .post(server.url("/chat"))
        .header("X-Session-Id", "alice")
        .json(&json!({"message": "hello from alice"}))
        .send()
        .await
        .unwrap();
    client
        .post(server.url("/chat"))
        .json(&json!({"message": "hello from bob", "session_id": "bob"}))
        .send()
        .await
        .unwrap();
    // Body wins over header.
    client
        .post(server.url("/chat"))
        .header("X-Session-Id", "alice")
        .json(&json!({"message": "bob again", "session_id": "bob"}))
        .send()
        .await
        .unwrap();

    let store = server.relay.store();
    let alice = store.snapshot("alice").await.unwrap();
    let bob = store.snapshot("bob").await.unwrap();

    assert_eq!(alice.len(), 3);
    assert_eq!(bob.len(), 5);
    assert!(bob[3].content().starts_with("bob again"));
    assert!(store.snapshot(DEFAULT_SESSION).await.is_none());

    let health: Value = reqwest::get(server.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health, json!({"status": "ok", "sessions": 2}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn queued_default_session_turns_all_get_json_replies() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(1500))
                .set_body_json(json!({"choices":[{"message":{"content":"ok"}}]})),
        )
        .mount(&upstream)
        .await;
    let relay = relay_for(&upstream.uri(), Arc::new(LexiconClassifier::new()), 2)
        .with_turn_timeout(Duration::from_secs(2));
    let server = GatewayTestServer::start_relay(relay).await;
    let client = reqwest::Client::new();

    let requests: Vec<_> = (0..3)
        .map(|i| {
            let client = client.clone();
            let url = server.url("/chat");
            tokio::spawn(async move {
                let response = client
                    .post(url)
                    .json(&json!({"message": format!("m{i}")}))
                    .send()
                    .await
                    .expect("chat request should complete");
                let status = response.status();
                let body: Value = response.json().await.expect("reply should be json");
                (status, body)
            })
        })
        .collect();

    let mut answered = 0;
    for request in requests {
        let (status, body) = request.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        let reply = body["reply"].as_str().expect("reply should be a string");
        match reply {
            "ok" => answered += 1,
            other => assert_eq!(other, UNREACHABLE_REPLY),
        }
    }
    assert!(answered >= 1);

    let history = server
        .relay
        .store()
        .snapshot(DEFAULT_SESSION)
        .await
        .expect("default session should exist");
    assert_eq!(history[0].role(), Role::System);
    let assistants = history.iter().filter(|m| m.role() == Role::Assistant).count();
    assert_eq!(assistants, answered);
    for (i, message) in history.iter().enumerate().skip(1) {
        if message.role() == Role::Assistant {
            assert_eq!(history[i - 1].role(), Role::User);
        }
    }
}
