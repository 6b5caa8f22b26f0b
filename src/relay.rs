//! Per-request orchestration: crisis screen, emotion tagging, history
//! append, completion call.
//!
//! Every outcome is a [`RelayReply`]; nothing here returns an error to the
//! HTTP layer. Failure detail is logged and replaced with fixed text.

use crate::config::{ClassifierConfig, CompletionConfig, Config};
use crate::conversation::ConversationStore;
use crate::emotion::{self, EmotionClassifier, EmotionLabel};
use crate::error::{CompletionError, Result};
use crate::prompt;
use crate::providers::{CompletionClient, OpenRouterClient};
use crate::safety::CrisisFilter;
use std::sync::Arc;
use std::time::Duration;

/// Reply for a non-success upstream status.
pub const UPSTREAM_FAILURE_REPLY: &str = "Sorry, something went wrong.";
/// Reply for timeouts, transport and decode failures.
pub const UNREACHABLE_REPLY: &str =
    "Sorry, I couldn't reach the assistant right now. Please try again.";

/// Slack on top of the completion timeout for a whole turn, which also
/// covers waiting for the session lock.
pub const TURN_SLACK_SECS: u64 = 5;

/// Log tag for a turn that ran out of budget.
pub const TURN_TIMEOUT_KIND: &str = "turn_timeout";

/// Budget for one turn from lock wait to recorded reply.
pub fn turn_timeout(settings: &CompletionConfig) -> Duration {
    Duration::from_secs(settings.timeout_secs + TURN_SLACK_SECS)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayReply {
    /// Crisis keyword matched; nothing else ran.
    Crisis(String),
    /// Model reply.
    Answer(String),
    /// Upstream call failed; `message` is safe to show.
    Failed { kind: &'static str, message: String },
}

impl RelayReply {
    pub fn text(&self) -> &str {
        match self {
            Self::Crisis(text) | Self::Answer(text) => text,
            Self::Failed { message, .. } => message,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Crisis(text) | Self::Answer(text) => text,
            Self::Failed { message, .. } => message,
        }
    }

    fn from_error(error: &CompletionError) -> Self {
        let message = match error {
            CompletionError::Status { .. } => UPSTREAM_FAILURE_REPLY,
            CompletionError::Timeout { .. }
            | CompletionError::Transport(_)
            | CompletionError::Decode(_) => UNREACHABLE_REPLY,
        };
        Self::Failed {
            kind: error.kind(),
            message: message.to_string(),
        }
    }
}

/// User turn content: the raw text with the label appended.
pub fn annotate(text: &str, label: &EmotionLabel) -> String {
    format!("{text} (emotion detected: {label})")
}

pub struct ChatRelay {
    crisis: CrisisFilter,
    classifier: Arc<dyn EmotionClassifier>,
    completion: Arc<dyn CompletionClient>,
    store: Arc<ConversationStore>,
    model: String,
    record_assistant_replies: bool,
    classify_timeout: Duration,
    turn_timeout: Duration,
}

impl ChatRelay {
    pub fn new(
        crisis: CrisisFilter,
        classifier: Arc<dyn EmotionClassifier>,
        completion: Arc<dyn CompletionClient>,
        store: Arc<ConversationStore>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            crisis,
            classifier,
            completion,
            store,
            model: model.into(),
            record_assistant_replies: true,
            classify_timeout: Duration::from_secs(ClassifierConfig::default().timeout_secs),
            turn_timeout: turn_timeout(&CompletionConfig::default()),
        }
    }

    /// Upper bound on classification; past it the label is neutral.
    pub fn with_classify_timeout(mut self, budget: Duration) -> Self {
        self.classify_timeout = budget;
        self
    }

    /// Upper bound on waiting for the session plus the completion call.
    pub fn with_turn_timeout(mut self, budget: Duration) -> Self {
        self.turn_timeout = budget;
        self
    }

    /// Whether successful replies are appended as assistant turns.
    pub fn with_assistant_replies(mut self, record: bool) -> Self {
        self.record_assistant_replies = record;
        self
    }

    /// Assemble the production relay from config.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let system_prompt = prompt::load_system_prompt(&config.prompt)?;
        let store = Arc::new(
            ConversationStore::new(system_prompt, config.history.max_turns)
                .with_max_sessions(config.history.max_sessions),
        );
        let classifier: Arc<dyn EmotionClassifier> =
            Arc::from(emotion::create_classifier(&config.classifier));

        if config.api_key.is_none() {
            tracing::warn!("no completion API key configured; upstream calls will be rejected");
        }
        let completion: Arc<dyn CompletionClient> = Arc::new(OpenRouterClient::from_config(config));

        Ok(Self::new(
            CrisisFilter::from_config(&config.safety),
            classifier,
            completion,
            store,
            config.model_id(),
        )
        .with_assistant_replies(config.history.record_assistant_replies)
        .with_classify_timeout(Duration::from_secs(config.classifier.timeout_secs))
        .with_turn_timeout(turn_timeout(&config.completion)))
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn completion(&self) -> &dyn CompletionClient {
        self.completion.as_ref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Longest a non-crisis turn can take end to end.
    pub fn turn_budget(&self) -> Duration {
        self.classify_timeout + self.turn_timeout
    }

    /// Run one chat turn for `session_id`.
    pub async fn handle(&self, session_id: &str, message: &str) -> RelayReply {
        if let Some(keyword) = self.crisis.matched_keyword(message) {
            tracing::warn!(session = session_id, keyword, "crisis keyword matched, diverting");
            return RelayReply::Crisis(self.crisis.safe_reply().to_string());
        }

        let classify = emotion::classify_or_neutral(self.classifier.as_ref(), message);
        let label = match tokio::time::timeout(self.classify_timeout, classify).await {
            Ok(label) => label,
            Err(_) => {
                tracing::warn!(
                    session = session_id,
                    classifier = self.classifier.name(),
                    "emotion classification timed out, using neutral"
                );
                EmotionLabel::neutral()
            }
        };
        tracing::debug!(session = session_id, emotion = %label, "classified message");

        let content = annotate(message, &label);
        match tokio::time::timeout(self.turn_timeout, self.run_turn(session_id, content)).await {
            Ok(reply) => reply,
            Err(_) => {
                tracing::error!(
                    session = session_id,
                    budget_secs = self.turn_timeout.as_secs_f64(),
                    kind = TURN_TIMEOUT_KIND,
                    "turn exceeded its budget"
                );
                RelayReply::Failed {
                    kind: TURN_TIMEOUT_KIND,
                    message: UNREACHABLE_REPLY.to_string(),
                }
            }
        }
    }

    /// Lock the session, append the user turn and call upstream. Dropped
    /// before the lock is won, nothing is appended; dropped during the call,
    /// the user turn stays without a reply, as after any failed call.
    async fn run_turn(&self, session_id: &str, content: String) -> RelayReply {
        // Held until the reply is recorded so turns of one session never interleave.
        let handle = self.store.session(session_id);
        let mut conversation = handle.lock().await;
        conversation.append_user(content);

        match self
            .completion
            .complete(conversation.messages(), &self.model)
            .await
        {
            Ok(reply) => {
                if self.record_assistant_replies {
                    conversation.append_assistant(reply.clone());
                }
                tracing::info!(
                    session = session_id,
                    history = conversation.len(),
                    "reply delivered"
                );
                RelayReply::Answer(reply)
            }
            Err(error) => {
                tracing::error!(
                    session = session_id,
                    provider = self.completion.name(),
                    kind = error.kind(),
                    %error,
                    "completion failed"
                );
                RelayReply::from_error(&error)
            }
        }
    }
}
