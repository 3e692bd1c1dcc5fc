//! Batch analyzer: one LLM request per batch of clauses.
//!
//! The analyzer's output always has exactly one [`ClauseAnalysis`] per input
//! clause. Malformed or short responses are retried; when the attempts run
//! out, the whole batch is filled with Gray fallback analyses instead of
//! returning an error. Everything downstream relies on that length.

use std::sync::Arc;
use std::time::Duration;

use lawlytic_core::analysis::AI_PROCESSING_ERROR;
use lawlytic_core::{ClauseAnalysis, defaults};
use tracing::{debug, warn};

use crate::gateway::{FaultKind, GatewayError, LlmGateway};
use crate::prompts::{batch_prompt, strip_code_fences};

/// Retry and prompt-size settings for [`BatchAnalyzer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total LLM attempts per batch. Zero is treated as one.
    pub max_retries: u32,
    /// Time unit the backoff schedule is expressed in.
    pub backoff_unit: Duration,
    /// Characters of each clause included in the prompt.
    pub clause_chars: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: defaults::MAX_RETRIES,
            backoff_unit: defaults::BACKOFF_UNIT,
            clause_chars: defaults::CLAUSE_PROMPT_CHARS,
        }
    }
}

impl RetryPolicy {
    /// Wait after 0-based `attempt` failed with `kind`.
    ///
    /// - rate limited: `5 + 2^attempt` units
    /// - anything else: `1 + attempt` units
    pub fn backoff(&self, kind: FaultKind, attempt: u32) -> Duration {
        let units = match kind {
            FaultKind::RateLimited => 5u32.saturating_add(2u32.saturating_pow(attempt)),
            FaultKind::MalformedResponse | FaultKind::Transport => attempt.saturating_add(1),
        };
        self.backoff_unit.saturating_mul(units)
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Produces one analysis per clause for a single batch.
#[derive(Clone)]
pub struct BatchAnalyzer {
    gateway: Arc<dyn LlmGateway>,
    policy: RetryPolicy,
}

impl BatchAnalyzer {
    pub fn new(gateway: Arc<dyn LlmGateway>, policy: RetryPolicy) -> Self {
        Self { gateway, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Analyse `batch`, returning exactly `batch.len()` analyses in order.
    ///
    /// `original_text` is left empty; the assembler fills it in.
    pub async fn analyze<S: AsRef<str>>(&self, batch: &[S]) -> Vec<ClauseAnalysis> {
        if batch.is_empty() {
            return Vec::new();
        }

        let prompt = batch_prompt(batch, self.policy.clause_chars);
        let attempts = self.policy.attempts();

        for attempt in 0..attempts {
            match self.attempt(&prompt, batch.len()).await {
                Ok(analyses) => {
                    debug!(attempt = attempt + 1, clauses = batch.len(), "batch analysed");
                    return analyses;
                }
                Err(e) => {
                    let kind = e.kind();
                    warn!(
                        attempt = attempt + 1,
                        attempts,
                        clauses = batch.len(),
                        kind = ?kind,
                        error = %e,
                        "batch analysis attempt failed"
                    );
                    if attempt + 1 < attempts {
                        tokio::time::sleep(self.policy.backoff(kind, attempt)).await;
                    }
                }
            }
        }

        warn!(
            attempts,
            clauses = batch.len(),
            model = self.gateway.model_name(),
            "batch analysis failed after all attempts, using fallback analyses"
        );
        vec![ClauseAnalysis::fallback(AI_PROCESSING_ERROR); batch.len()]
    }

    async fn attempt(&self, prompt: &str, expected: usize) -> Result<Vec<ClauseAnalysis>, GatewayError> {
        let generation = self.gateway.generate(prompt).await?;
        parse_batch_response(&generation.text, expected)
    }
}

/// Parse a model response into exactly `expected` analyses.
///
/// Code fences are stripped first. A non-array payload or an array of the
/// wrong length is a [`GatewayError::MalformedResponse`].
pub fn parse_batch_response(
    raw: &str,
    expected: usize,
) -> Result<Vec<ClauseAnalysis>, GatewayError> {
    let cleaned = strip_code_fences(raw);
    let analyses: Vec<ClauseAnalysis> = serde_json::from_str(&cleaned).map_err(|e| {
        GatewayError::MalformedResponse(format!(
            "expected a JSON array of analyses: {e}; raw: {}",
            lawlytic_core::truncate_chars(&cleaned, 200)
        ))
    })?;
    if analyses.len() != expected {
        return Err(GatewayError::MalformedResponse(format!(
            "length mismatch: got {}, expected {expected}",
            analyses.len()
        )));
    }
    Ok(analyses)
}
