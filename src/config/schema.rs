use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Top-level config ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was loaded from (computed, not serialized)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
    /// Completion API key (`Authorization: Bearer <key>`)
    pub api_key: Option<String>,
    /// Completion model identifier sent as `model`
    pub model: Option<String>,
    /// Max tracing level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub safety: SafetyConfig,

    #[serde(default)]
    pub prompt: PromptConfig,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            api_key: None,
            model: None,
            log_level: default_log_level(),
            gateway: GatewayConfig::default(),
            completion: CompletionConfig::default(),
            classifier: ClassifierConfig::default(),
            history: HistoryConfig::default(),
            safety: SafetyConfig::default(),
            prompt: PromptConfig::default(),
        }
    }
}

impl Config {
    /// Reject values that would only fail later at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.completion.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "completion.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.classifier.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "classifier.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.history.max_turns == Some(0) {
            return Err(ConfigError::Validation(
                "history.max_turns must be greater than 0 when set".into(),
            ));
        }
        if self.history.max_sessions == 0 {
            return Err(ConfigError::Validation(
                "history.max_sessions must be greater than 0".into(),
            ));
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Validation(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }
        Ok(())
    }

    /// Model identifier sent upstream. Empty when unset; the remote API
    /// reports that at call time.
    pub fn model_id(&self) -> &str {
        self.model.as_deref().unwrap_or("")
    }
}

// ── Gateway ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Gateway port (default: 5000)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Title shown on the index page
    #[serde(default = "default_page_title")]
    pub page_title: String,
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    5000
}

fn default_page_title() -> String {
    "AI Psychology Chatbot".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            page_title: default_page_title(),
        }
    }
}

// ── Completion API ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Base URL; `/chat/completions` is appended
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,
    /// Upper bound on a single completion call
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
    /// Sent as `HTTP-Referer`
    #[serde(default = "default_referer")]
    pub referer: String,
    /// Sent as `X-Title`
    #[serde(default = "default_page_title")]
    pub title: String,
}

fn default_completion_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}

fn default_completion_timeout_secs() -> u64 {
    60
}

fn default_referer() -> String {
    "https://ai-psychology.local".into()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_completion_base_url(),
            timeout_secs: default_completion_timeout_secs(),
            referer: default_referer(),
            title: default_page_title(),
        }
    }
}

// ── Emotion classifier ───────────────────────────────────────────

/// Emotion classifier backend.
///
/// `huggingface` runs `j-hartmann/emotion-english-distilroberta-base`, the
/// reference model whose labels the lexicon imitates. `lexicon` is the
/// default so the relay works offline and without a token; set
/// `backend = "huggingface"` (or `CALMLINE_CLASSIFIER=huggingface`) for
/// model-grade labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// Local keyword lexicon, no network
    #[default]
    Lexicon,
    /// Hugging Face inference API (reference behaviour)
    HuggingFace,
}

impl std::str::FromStr for ClassifierBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexicon" => Ok(Self::Lexicon),
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            other => Err(ConfigError::Validation(format!(
                "unknown classifier backend '{other}' (expected lexicon or huggingface)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub backend: ClassifierBackend,
    /// Hugging Face model id
    #[serde(default = "default_classifier_model")]
    pub model: String,
    #[serde(default = "default_classifier_base_url")]
    pub base_url: String,
    /// Hugging Face token (`HF_API_TOKEN`)
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_classifier_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_classifier_model() -> String {
    "j-hartmann/emotion-english-distilroberta-base".into()
}

fn default_classifier_base_url() -> String {
    "https://api-inference.huggingface.co".into()
}

fn default_classifier_timeout_secs() -> u64 {
    10
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::default(),
            model: default_classifier_model(),
            base_url: default_classifier_base_url(),
            api_token: None,
            timeout_secs: default_classifier_timeout_secs(),
        }
    }
}

// ── History retention ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Keep at most this many non-system messages per session (unbounded when unset)
    #[serde(default)]
    pub max_turns: Option<usize>,
    /// Append the assistant's reply to the session after a successful call
    #[serde(default = "default_true")]
    pub record_assistant_replies: bool,
    /// Live sessions kept in memory; the least recently used is evicted beyond this
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_sessions() -> usize {
    1024
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_turns: None,
            record_assistant_replies: true,
            max_sessions: default_max_sessions(),
        }
    }
}

// ── Crisis safety ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Added to the built-in crisis keywords, never replacing them
    #[serde(default)]
    pub extra_keywords: Vec<String>,
    /// Fixed reply returned when a crisis keyword matches
    #[serde(default = "default_safe_reply")]
    pub safe_reply: String,
}

pub const DEFAULT_SAFE_REPLY: &str = "I'm here dont worry.";

fn default_safe_reply() -> String {
    DEFAULT_SAFE_REPLY.into()
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            extra_keywords: Vec::new(),
            safe_reply: default_safe_reply(),
        }
    }
}

// ── Prompt ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    /// File replacing the built-in system prompt
    #[serde(default)]
    pub system_prompt_path: Option<PathBuf>,
}
