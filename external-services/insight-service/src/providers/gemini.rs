//! Google Generative Language provider
//!
//! Calls `models/{model}:generateContent` and returns the first candidate's text.

use crate::error::{InsightError, InsightResult};
use crate::providers::{check_status, SummaryGenerator};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(client: reqwest::Client, api_key: SecretString, model: String, base_url: Option<String>) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

pub(crate) fn extract_text(body: &str) -> InsightResult<String> {
    let response: GenerateResponse = serde_json::from_str(body)?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        Err(InsightError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[async_trait]
impl SummaryGenerator for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> InsightResult<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        extract_text(&body)
    }
}
