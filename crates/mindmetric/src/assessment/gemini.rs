use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::summary::{build_prompt, SummaryError, SummaryGenerator, SummaryRequest};
use crate::config::TextGenerationConfig;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Summary generator backed by the Gemini `generateContent` endpoint.
///
/// Uses a blocking client; call it from a blocking context, never directly
/// from an async task.
pub struct GeminiSummaryGenerator {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiSummaryGenerator {
    pub fn from_config(config: &TextGenerationConfig) -> Result<Self, SummaryError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| SummaryError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl std::fmt::Debug for GeminiSummaryGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSummaryGenerator")
            .field("model", &self.model)
            .field("configured", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl SummaryGenerator for GeminiSummaryGenerator {
    fn generate(&self, request: &SummaryRequest<'_>) -> Result<String, SummaryError> {
        let api_key = self.api_key.as_deref().ok_or(SummaryError::NotConfigured)?;

        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(request) }] }]
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .map_err(|err| SummaryError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SummaryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response
            .json()
            .map_err(|err| SummaryError::Malformed(err.to_string()))?;
        payload.text().ok_or(SummaryError::Empty)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any are non-blank.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}
