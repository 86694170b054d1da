use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Provider response contained no text")]
    EmptyResponse,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Request URLs may carry credentials, so they never reach error text
impl From<reqwest::Error> for InsightError {
    fn from(err: reqwest::Error) -> Self {
        InsightError::Network(err.without_url())
    }
}

impl InsightError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, InsightError::Network(e) if e.is_timeout())
    }
}

pub type InsightResult<T> = Result<T, InsightError>;
