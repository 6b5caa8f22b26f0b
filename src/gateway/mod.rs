//! Axum-based HTTP gateway: the chat page, the `/chat` relay endpoint and a
//! health probe, with body-size and request-time limits.

mod handlers;

use handlers::{handle_chat, handle_health, handle_index};

use crate::config::Config;
use crate::prompt::PageRenderer;
use crate::relay::ChatRelay;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB)
pub const MAX_BODY_SIZE: usize = 65_536;
/// Budget for the page and health routes. `/chat` is bounded by the relay
/// itself so that it always answers with a JSON reply.
pub const PAGE_TIMEOUT_SECS: u64 = 10;
/// Optional header naming the conversation session
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ChatRelay>,
    pub index_html: Arc<str>,
}

impl AppState {
    pub fn new(relay: Arc<ChatRelay>, page_title: &str) -> Result<Self> {
        let index_html = PageRenderer::new()?.render_index(page_title)?;
        Ok(Self {
            relay,
            index_html: Arc::from(index_html),
        })
    }
}

/// `POST /chat` body. Both fields are optional; a missing message is empty.
#[derive(Debug, Default, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// `POST /chat` response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
}

pub fn build_router(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(PAGE_TIMEOUT_SECS),
        ));

    Router::new()
        .route("/chat", post(handle_chat))
        .merge(pages)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
}

/// Build the relay from config and serve until Ctrl-C.
pub async fn run_gateway(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.gateway.host, config.gateway.port)
        .parse()
        .context("invalid gateway host/port")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let relay = Arc::new(ChatRelay::from_config(&config)?);
    let state = AppState::new(relay, &config.gateway.page_title)?;
    serve_with_listener(listener, state).await
}

/// Serve a pre-built state from a pre-bound listener.
pub async fn serve_with_listener(listener: tokio::net::TcpListener, state: AppState) -> Result<()> {
    let local = listener.local_addr()?;

    let warm = Arc::clone(&state.relay);
    tokio::spawn(async move {
        if let Err(error) = warm.completion().warmup().await {
            tracing::debug!(%error, "completion warmup failed");
        }
    });

    tracing::info!(
        addr = %local,
        model = state.relay.model(),
        turn_budget_secs = state.relay.turn_budget().as_secs(),
        "gateway listening (GET /, POST /chat, GET /health)"
    );

    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
