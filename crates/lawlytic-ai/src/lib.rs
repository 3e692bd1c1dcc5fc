//! AI layer: the LLM gateway and the clause analysis pipeline built on it.
//!
//! Data flow: clauses → [`ClauseScheduler`] (batches, admission gate, pacing)
//! → [`BatchAnalyzer`] per batch (prompt, parse, retry, fallback) →
//! [`assemble`] (realign with clause text).

pub mod analyzer;
pub mod assembler;
pub mod assistant;
pub mod gateway;
pub mod gemini;
pub mod prompts;
pub mod scheduler;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use analyzer::{BatchAnalyzer, RetryPolicy};
pub use assembler::assemble;
pub use assistant::{answer_question, extract_timeline};
pub use gateway::{FaultKind, Generation, GatewayError, LlmGateway};
pub use gemini::GeminiClient;
pub use scheduler::{ClauseScheduler, SchedulerConfig, bounded_map};
