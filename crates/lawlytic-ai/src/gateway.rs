//! The LLM gateway boundary.
//!
//! A gateway turns a prompt into raw model text and nothing more: no retries,
//! no validation. Faults are classified here so callers branch on
//! [`FaultKind`] instead of sniffing error strings.

use async_trait::async_trait;
use thiserror::Error;

/// Raw text returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Coarse fault classes that drive retry behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Provider rate limit or quota exhaustion; needs a longer wait.
    RateLimited,
    /// The provider answered but the payload was unusable.
    MalformedResponse,
    /// Network failure or a non-success status unrelated to rate limiting.
    Transport,
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl GatewayError {
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::RateLimited(_) => FaultKind::RateLimited,
            Self::MalformedResponse(_) => FaultKind::MalformedResponse,
            Self::Server { .. } | Self::Http(_) => FaultKind::Transport,
        }
    }
}

/// Asynchronous text generation capability.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Generation, GatewayError>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(
            GatewayError::RateLimited("429".into()).kind(),
            FaultKind::RateLimited
        );
        assert_eq!(
            GatewayError::MalformedResponse("no text".into()).kind(),
            FaultKind::MalformedResponse
        );
        assert_eq!(
            GatewayError::Server {
                status: 503,
                body: "unavailable".into()
            }
            .kind(),
            FaultKind::Transport
        );
    }
}
