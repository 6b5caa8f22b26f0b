pub mod huggingface;
pub mod lexicon;
pub mod traits;

pub use huggingface::HuggingFaceClassifier;
pub use lexicon::LexiconClassifier;
pub use traits::{EmotionClassifier, EmotionLabel, NEUTRAL, classify_or_neutral};

use crate::config::{ClassifierBackend, ClassifierConfig};

/// Build the classifier selected by `config.backend`.
pub fn create_classifier(config: &ClassifierConfig) -> Box<dyn EmotionClassifier> {
    match config.backend {
        ClassifierBackend::Lexicon => Box::new(LexiconClassifier::new()),
        ClassifierBackend::HuggingFace => {
            if config.api_token.is_none() {
                tracing::warn!(
                    model = %config.model,
                    "no HF_API_TOKEN set; anonymous inference requests are heavily rate-limited"
                );
            }
            Box::new(HuggingFaceClassifier::from_config(config))
        }
    }
}
