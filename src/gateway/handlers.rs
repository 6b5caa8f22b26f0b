use axum::{
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    response::{Html, IntoResponse, Json},
};
use tracing::Instrument;

use super::{AppState, ChatBody, ChatReply, SESSION_HEADER};
use crate::conversation::ConversationStore;

/// GET /: chat page
pub(super) async fn handle_index(State(state): State<AppState>) -> impl IntoResponse {
    Html(state.index_html.to_string())
}

/// GET /health: liveness plus the number of live sessions
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": state.relay.store().session_count(),
    }))
}

/// POST /chat: one relay turn. Always 200 with `{"reply": ...}`.
pub(super) async fn handle_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Json<ChatReply> {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!(%rejection, "unparseable chat body, treating message as empty");
            ChatBody::default()
        }
    };

    let header_session = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok());
    let session_id =
        ConversationStore::normalize_id(body.session_id.as_deref().or(header_session));
    let message = body.message.unwrap_or_default();

    let span = tracing::info_span!(
        "chat",
        request_id = %uuid::Uuid::new_v4(),
        session = %session_id,
    );
    let reply = state
        .relay
        .handle(&session_id, &message)
        .instrument(span)
        .await;

    Json(ChatReply {
        reply: reply.into_text(),
    })
}
