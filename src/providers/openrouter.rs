use crate::config::{CompletionConfig, Config};
use crate::conversation::Message;
use crate::error::CompletionError;
use crate::providers::{build_provider_client_with_timeout, sanitize_api_error, traits::CompletionClient};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// OpenRouter-style `/chat/completions` client.
pub struct OpenRouterClient {
    /// Pre-computed `"Bearer <key>"` header value (avoids `format!` per request).
    cached_auth_header: Option<String>,
    /// Pre-computed chat completions URL.
    cached_chat_url: String,
    cached_auth_url: String,
    referer: String,
    title: String,
    timeout_secs: u64,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenRouterClient {
    /// A missing key is not an error here: the request goes out without
    /// `Authorization`, the remote side rejects it and the caller sees a
    /// non-success status.
    pub fn new(api_key: Option<&str>, settings: &CompletionConfig) -> Self {
        let base_url = settings.base_url.trim_end_matches('/');
        let cached_chat_url = if base_url.ends_with("/chat/completions") {
            base_url.to_string()
        } else {
            format!("{base_url}/chat/completions")
        };
        let api_root = base_url.trim_end_matches("/chat/completions");

        Self {
            cached_auth_header: api_key.map(|k| format!("Bearer {k}")),
            cached_chat_url,
            cached_auth_url: format!("{api_root}/auth/key"),
            referer: settings.referer.clone(),
            title: settings.title.clone(),
            timeout_secs: settings.timeout_secs,
            client: build_provider_client_with_timeout(settings.timeout_secs),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_key.as_deref(), &config.completion)
    }

    pub fn chat_url(&self) -> &str {
        &self.cached_chat_url
    }

    fn apply_auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.cached_auth_header {
            Some(value) => req.header("Authorization", value),
            None => req,
        }
    }

    fn map_send_error(&self, error: &reqwest::Error) -> CompletionError {
        if error.is_timeout() {
            CompletionError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            CompletionError::Transport(sanitize_api_error(&error.to_string()))
        }
    }

    fn extract_text(response: ChatResponse) -> Result<String, CompletionError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::Decode("response had no choices".into()))?;
        choice
            .message
            .content
            .ok_or_else(|| CompletionError::Decode("first choice had no message content".into()))
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
    ) -> Result<String, CompletionError> {
        let request = ChatRequest { model, messages };

        let response = self
            .apply_auth_header(self.client.post(&self.cached_chat_url))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: sanitize_api_error(&body),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.map_send_error(&e)
            } else {
                CompletionError::Decode(e.to_string())
            }
        })?;
        Self::extract_text(parsed)
    }

    async fn warmup(&self) -> anyhow::Result<()> {
        // Establish TLS + connection pool so the first chat turn is not a cold start.
        self.apply_auth_header(self.client.get(&self.cached_auth_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}
