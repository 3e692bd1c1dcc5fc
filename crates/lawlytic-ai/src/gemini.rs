//! HTTP gateway for Google's Generative Language API.

use std::time::Duration;

use async_trait::async_trait;
use lawlytic_core::defaults;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gateway::{GatewayError, Generation, LlmGateway};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini `generateContent` client.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [PartIn<'a>; 1],
}

#[derive(Serialize)]
struct PartIn<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Deserialize)]
struct PartOut {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    status: String,
}

impl GeminiClient {
    /// Create a client for `model` against the public endpoint, with the
    /// default request timeout.
    pub fn new(api_key: String, model: String) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_http_client(defaults::LLM_REQUEST_TIMEOUT)?,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model,
        })
    }

    /// Replace the whole-request timeout. A request that exceeds it fails as
    /// a transport fault.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, GatewayError> {
        self.client = build_http_client(timeout)?;
        Ok(self)
    }

    /// Point the client at a different host, e.g. a proxy or a test server.
    ///
    /// `base_url` should be like `http://localhost:8080` (no trailing slash).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl LlmGateway for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Generation, GatewayError> {
        let request = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [PartIn { text: prompt }],
            }],
        };

        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "calling generateContent");
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), body));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::MalformedResponse(format!("decode response: {e}")))?;
        let text = first_candidate_text(parsed)
            .ok_or_else(|| GatewayError::MalformedResponse("no candidate text".into()))?;
        Ok(Generation { text })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn build_http_client(timeout: Duration) -> Result<reqwest::Client, GatewayError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Map a non-success response onto the gateway fault taxonomy.
fn classify_failure(status: u16, body: String) -> GatewayError {
    let api_status = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.status)
        .unwrap_or_default();
    let rate_limited = status == 429
        || api_status == "RESOURCE_EXHAUSTED"
        || body.to_ascii_lowercase().contains("quota");
    if rate_limited {
        GatewayError::RateLimited(format!("{status}: {body}"))
    } else {
        GatewayError::Server { status, body }
    }
}

fn first_candidate_text(resp: GenerateResponse) -> Option<String> {
    let content = resp.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    (!text.is_empty()).then_some(text)
}
