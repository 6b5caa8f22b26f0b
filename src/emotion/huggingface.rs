use super::traits::{EmotionClassifier, EmotionLabel};
use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use crate::providers::{build_provider_client_with_timeout, sanitize_api_error};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Text-classification model served by the Hugging Face inference API.
pub struct HuggingFaceClassifier {
    model: String,
    /// Pre-computed `{base}/models/{model}` URL.
    cached_url: String,
    cached_auth_header: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// The API nests scores per input (`[[...]]`) for pipelines and returns a
/// flat list for some deployments.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassifyResponse {
    fn best(self) -> Option<LabelScore> {
        let scores = match self {
            Self::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
            Self::Flat(scores) => scores,
        };
        scores
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

impl HuggingFaceClassifier {
    pub fn new(base_url: &str, model: &str, api_token: Option<&str>, timeout_secs: u64) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            model: model.to_string(),
            cached_url: format!("{base_url}/models/{model}"),
            cached_auth_header: api_token.map(|t| format!("Bearer {t}")),
            client: build_provider_client_with_timeout(timeout_secs),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(
            &config.base_url,
            &config.model,
            config.api_token.as_deref(),
            config.timeout_secs,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmotionClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<EmotionLabel, ClassifierError> {
        let mut request = self
            .client
            .post(&self.cached_url)
            .json(&ClassifyRequest { inputs: text });
        if let Some(auth) = &self.cached_auth_header {
            request = request.header("Authorization", auth);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClassifierError::Request(sanitize_api_error(&e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(
                status = status.as_u16(),
                body = %sanitize_api_error(&body),
                "classifier error body"
            );
            return Err(ClassifierError::Status(status.as_u16()));
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Request(e.to_string()))?;

        parsed
            .best()
            .map(|best| EmotionLabel::new(best.label))
            .ok_or(ClassifierError::Empty)
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}
