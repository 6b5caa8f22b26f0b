use async_trait::async_trait;
use calmline::config::CompletionConfig;
use calmline::conversation::ConversationStore;
use calmline::emotion::{EmotionClassifier, EmotionLabel, LexiconClassifier};
use calmline::error::ClassifierError;
use calmline::gateway::{AppState, serve_with_listener};
use calmline::providers::OpenRouterClient;
use calmline::relay::ChatRelay;
use calmline::safety::CrisisFilter;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

pub const SYSTEM: &str = "You are a calm, supportive listener.";

/// Classifier that is always down.
pub struct UnavailableClassifier;

#[async_trait]
impl EmotionClassifier for UnavailableClassifier {
    async fn classify(&self, _text: &str) -> Result<EmotionLabel, ClassifierError> {
        Err(ClassifierError::Request("model not loaded".into()))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

pub struct GatewayTestServer {
    pub port: u16,
    pub relay: Arc<ChatRelay>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

/// Relay wired to `upstream_url` with the harness system prompt.
pub fn relay_for(
    upstream_url: &str,
    classifier: Arc<dyn EmotionClassifier>,
    completion_timeout_secs: u64,
) -> ChatRelay {
    let settings = CompletionConfig {
        base_url: upstream_url.to_string(),
        timeout_secs: completion_timeout_secs,
        ..CompletionConfig::default()
    };
    ChatRelay::new(
        CrisisFilter::default(),
        classifier,
        Arc::new(OpenRouterClient::new(Some("sk-or-test"), &settings)),
        Arc::new(ConversationStore::new(SYSTEM, None)),
        "test-model",
    )
}

impl GatewayTestServer {
    /// Gateway whose completion client points at `upstream_url`.
    pub async fn start(upstream_url: &str) -> Self {
        Self::start_with(upstream_url, Arc::new(LexiconClassifier::new())).await
    }

    pub async fn start_with(upstream_url: &str, classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self::start_relay(relay_for(upstream_url, classifier, 5)).await
    }

    pub async fn start_relay(relay: ChatRelay) -> Self {
        let relay = Arc::new(relay);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let state = AppState::new(Arc::clone(&relay), "Test Chat").expect("state should build");
        let handle = tokio::spawn(async move { serve_with_listener(listener, state).await });

        wait_until_gateway_ready(port).await;

        Self {
            port,
            relay,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("reqwest client should be built");

    for _ in 0..80 {
        let health = client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await;
        if matches!(health, Ok(resp) if resp.status() == StatusCode::OK) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("gateway did not become ready on port {port}");
}
