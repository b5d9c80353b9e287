use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// A hosted language model that turns one prompt into one reply.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Name clients use to prefer this provider, e.g. `"gemini"`.
    fn key(&self) -> &'static str;

    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Http(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider returned no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            // The URL may carry a port or model id that looks like a status code.
            ProviderError::Http(e.without_url().to_string())
        }
    }
}

impl ProviderError {
    /// Builds a status error from a failed response, keeping a short body snippet.
    pub async fn from_response(resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        ProviderError::Status {
            status,
            body: body.chars().take(256).collect(),
        }
    }
}

/// User-facing category of a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RateLimited,
    ModelNotFound,
    InvalidCredential,
    Unavailable,
}

pub const UNAVAILABLE_MESSAGE: &str =
    "I'm having trouble connecting to the AI cloud. Please check your internet or API key.";

impl FailureKind {
    pub fn message(self, model: &str) -> String {
        match self {
            FailureKind::RateLimited => "AI Quota exceeded. Please try again in a minute.".into(),
            FailureKind::ModelNotFound => {
                format!("AI Model not found on this API key. (Using: {model})")
            }
            FailureKind::InvalidCredential => "Invalid API Key configuration.".into(),
            FailureKind::Unavailable => UNAVAILABLE_MESSAGE.into(),
        }
    }
}

/// Sorts a failure by its status code, then by markers in the response text.
pub fn classify(err: &ProviderError) -> FailureKind {
    match err {
        ProviderError::Status { status: 429, .. } => FailureKind::RateLimited,
        ProviderError::Status { status: 404, .. } => FailureKind::ModelNotFound,
        ProviderError::Status { status: 401 | 403, .. } => FailureKind::InvalidCredential,
        ProviderError::Status { body, .. } => classify_text(body),
        ProviderError::Timeout | ProviderError::EmptyResponse => FailureKind::Unavailable,
        ProviderError::Http(detail) => classify_text(detail),
    }
}

fn classify_text(text: &str) -> FailureKind {
    let text = text.to_lowercase();

    if contains_any(&text, &["quota", "rate limit", "rate_limit", "resource_exhausted"]) {
        FailureKind::RateLimited
    } else if contains_any(&text, &["not found", "not_found", "does not exist"]) {
        FailureKind::ModelNotFound
    } else if contains_any(&text, &["api_key", "api key", "unauthorized", "permission_denied"]) {
        FailureKind::InvalidCredential
    } else {
        FailureKind::Unavailable
    }
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| text.contains(m))
}

/// HTTP client shared by the provider clients, bounded by `timeout`.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ProviderError::from)
}
