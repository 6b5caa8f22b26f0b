use crate::conversation::Message;
use crate::error::CompletionError;
use async_trait::async_trait;

/// A remote chat-completion backend.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the full ordered history and return the first choice's text.
    async fn complete(&self, messages: &[Message], model: &str)
    -> Result<String, CompletionError>;

    /// Warm up the HTTP connection pool (TLS handshake, DNS).
    /// Default implementation is a no-op.
    async fn warmup(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Provider name for logs.
    fn name(&self) -> &str;
}
