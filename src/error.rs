use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `Calmline`.
///
/// Failures while assembling the relay. Per-turn failures never surface
/// here: the relay maps [`CompletionError`] and [`ClassifierError`] to an
/// opaque reply and logs the detail. Startup and CLI code wraps these in
/// `anyhow::Result` for context chains.
#[derive(Debug, Error)]
pub enum RelayError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Prompt / Template ───────────────────────────────────────────────
    #[error("prompt: {0}")]
    Prompt(#[from] PromptError),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config file {path}: {message}")]
    Load { path: String, message: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ─── Completion API errors ──────────────────────────────────────────────────

/// Failure of a single chat-completion call.
///
/// Only [`CompletionError::Status`] is distinguished in what the user sees;
/// the other kinds share one opaque reply.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl CompletionError {
    /// Stable short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "upstream_status",
            Self::Timeout { .. } => "timeout",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
        }
    }
}

// ─── Classifier errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier request failed: {0}")]
    Request(String),

    #[error("classifier returned HTTP {0}")]
    Status(u16),

    #[error("classifier returned no labels")]
    Empty,
}

// ─── Prompt / Template errors ───────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("template render failed: {0}")]
    Render(String),

    #[error("prompt file unreadable: {0}")]
    Read(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, RelayError>;
