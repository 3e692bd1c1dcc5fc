//! Scripted gateway for deterministic pipeline tests.
//!
//! A script maps `(prompt, call_index)` to a response or a fault. The gateway
//! records every call with its (tokio) instant and tracks how many calls were
//! in flight at once, so tests can assert on retries, pacing, and the
//! concurrency bound.
//!
//! ```rust,ignore
//! let gateway = ScriptedGateway::echoing("Green").with_latency(Duration::from_millis(50));
//! let analyzer = BatchAnalyzer::new(Arc::new(gateway.clone()), RetryPolicy::default());
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::gateway::{GatewayError, Generation, LlmGateway};

type Script = dyn Fn(&str, usize) -> Result<String, GatewayError> + Send + Sync;
type Latency = dyn Fn(&str, usize) -> Duration + Send + Sync;

#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
    pub at: Instant,
}

#[derive(Default)]
struct CallLog {
    calls: Vec<MockCall>,
    in_flight: usize,
    peak_in_flight: usize,
}

#[derive(Clone)]
pub struct ScriptedGateway {
    script: Arc<Script>,
    latency: Arc<Latency>,
    log: Arc<Mutex<CallLog>>,
}

impl ScriptedGateway {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&str, usize) -> Result<String, GatewayError> + Send + Sync + 'static,
    {
        Self {
            script: Arc::new(script),
            latency: Arc::new(no_latency),
            log: Arc::new(Mutex::new(CallLog::default())),
        }
    }

    /// Always answer with `text`.
    pub fn always(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_, _| Ok(text.clone()))
    }

    /// Answer every batch prompt with one well-formed analysis per numbered clause.
    pub fn echoing(risk_level: &'static str) -> Self {
        Self::new(move |prompt, _| Ok(analyses_json(count_numbered_clauses(prompt), risk_level)))
    }

    /// Simulated model latency per call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Arc::new(move |_: &str, _: usize| latency);
        self
    }

    /// Simulated latency chosen per call from `(prompt, call_index)`.
    pub fn with_latency_by<F>(mut self, latency: F) -> Self
    where
        F: Fn(&str, usize) -> Duration + Send + Sync + 'static,
    {
        self.latency = Arc::new(latency);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.log.lock().unwrap().calls.len()
    }

    /// Highest number of calls observed in flight at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.log.lock().unwrap().peak_in_flight
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn generate(&self, prompt: &str) -> Result<Generation, GatewayError> {
        let index = {
            let mut log = self.log.lock().unwrap();
            log.calls.push(MockCall {
                prompt: prompt.to_string(),
                at: Instant::now(),
            });
            log.in_flight += 1;
            log.peak_in_flight = log.peak_in_flight.max(log.in_flight);
            log.calls.len() - 1
        };

        let latency = (self.latency)(prompt, index);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let result = (self.script)(prompt, index);

        self.log.lock().unwrap().in_flight -= 1;
        result.map(Generation::new)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn no_latency(_: &str, _: usize) -> Duration {
    Duration::ZERO
}

/// Number of `N. ` lines in a batch prompt.
pub fn count_numbered_clauses(prompt: &str) -> usize {
    prompt
        .lines()
        .filter(|line| {
            let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
            digits > 0 && line[digits..].starts_with(". ")
        })
        .count()
}

/// A JSON array of `n` analyses, all at `risk_level`.
pub fn analyses_json(n: usize, risk_level: &str) -> String {
    let items: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "risk_level": risk_level,
                "plain_english": format!("Explanation {}", i + 1),
                "emoji_summary": "📄",
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}
