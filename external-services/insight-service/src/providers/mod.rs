pub mod gemini;
pub mod openai;

use crate::config::{InsightConfig, ProviderKind};
use crate::error::{InsightError, InsightResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Trait for text-generation providers
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Send the prompt and return the generated text verbatim
    async fn generate(&self, prompt: &str) -> InsightResult<String>;
}

/// Create a provider instance based on configuration.
///
/// Returns `Ok(None)` when no API key is configured.
pub fn create_generator(config: &InsightConfig) -> InsightResult<Option<Arc<dyn SummaryGenerator>>> {
    let Some(api_key) = config.api_key.clone() else {
        return Ok(None);
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| InsightError::Config(format!("failed to build HTTP client: {e}")))?;

    let generator: Arc<dyn SummaryGenerator> = match config.provider {
        ProviderKind::Gemini => Arc::new(gemini::GeminiProvider::new(
            client,
            api_key,
            config.model.clone(),
            config.base_url.clone(),
        )),
        ProviderKind::OpenaiCompatible => {
            let base_url = config.base_url.clone().ok_or_else(|| {
                InsightError::Config("base_url is required for the openai-compatible provider".to_string())
            })?;
            Arc::new(openai::OpenAiCompatibleProvider::new(
                client,
                api_key,
                config.model.clone(),
                base_url,
            ))
        }
    };

    Ok(Some(generator))
}

/// Map a non-success response into an error, keeping a bounded body excerpt
pub(crate) async fn check_status(response: reqwest::Response) -> InsightResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(InsightError::Upstream {
        status: status.as_u16(),
        body: body.chars().take(512).collect(),
    })
}
