//! OpenAI-compatible chat completions provider
//!
//! Works with any endpoint that accepts `POST {base_url}/chat/completions`,
//! including self-hosted gateways.

use crate::error::{InsightError, InsightResult};
use crate::providers::{check_status, SummaryGenerator};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(client: reqwest::Client, api_key: SecretString, model: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

pub(crate) fn extract_text(body: &str) -> InsightResult<String> {
    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(InsightError::EmptyResponse)
}

#[async_trait]
impl SummaryGenerator for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    async fn generate(&self, prompt: &str) -> InsightResult<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }]
            }))
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        extract_text(&body)
    }
}
