use crate::error::ClassifierError;
use async_trait::async_trait;
use std::fmt;

/// Label used when the input is empty or the classifier fails.
pub const NEUTRAL: &str = "neutral";

/// Opaque emotion tag. Whatever the backend returns is carried through
/// unchecked and spliced into the user turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmotionLabel(String);

impl EmotionLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn neutral() -> Self {
        Self(NEUTRAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Single highest-confidence label for `text`.
    async fn classify(&self, text: &str) -> Result<EmotionLabel, ClassifierError>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

/// Classify with the documented fallback: blank input skips the backend,
/// and any backend failure degrades to [`NEUTRAL`].
pub async fn classify_or_neutral(classifier: &dyn EmotionClassifier, text: &str) -> EmotionLabel {
    if text.trim().is_empty() {
        return EmotionLabel::neutral();
    }

    match classifier.classify(text).await {
        Ok(label) => label,
        Err(error) => {
            tracing::warn!(
                classifier = classifier.name(),
                %error,
                "emotion classification failed, using neutral"
            );
            EmotionLabel::neutral()
        }
    }
}
