use secrecy::SecretString;
use serde::Deserialize;

/// Which text-generation API to call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Google Generative Language `generateContent`
    #[default]
    Gemini,
    /// Any `/chat/completions` compatible endpoint
    OpenaiCompatible,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub provider: ProviderKind,
    /// Generation is disabled when unset
    pub api_key: Option<SecretString>,
    pub model: String,
    /// Overrides the provider's public endpoint
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            base_url: None,
            timeout_secs: 30,
        }
    }
}
