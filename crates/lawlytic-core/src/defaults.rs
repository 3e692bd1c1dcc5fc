//! Default tunables for the analysis pipeline.
//!
//! Batch size and concurrency are tuned for the Gemini free tier (15 requests
//! per minute). They are provider/plan dependent; every consumer takes them as
//! configuration and falls back to these values.

use std::time::Duration;

/// Clauses per LLM request.
pub const BATCH_SIZE: usize = 10;

/// Batch requests allowed in flight at once.
pub const MAX_CONCURRENCY: usize = 12;

/// LLM attempts per batch before falling back to placeholder analyses.
pub const MAX_RETRIES: u32 = 2;

/// Delay each admitted batch waits before calling the model.
pub const PACING: Duration = Duration::from_secs(1);

/// Unit used by the retry backoff schedule.
pub const BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Clause prefix (in characters) included in a batch prompt.
pub const CLAUSE_PROMPT_CHARS: usize = 500;

/// Document prefix (in characters) included in a timeline prompt.
pub const TIMELINE_PROMPT_CHARS: usize = 15_000;

/// Lines at or below this many characters are not treated as clauses.
pub const MIN_CLAUSE_CHARS: usize = 25;

/// Generative model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Upper bound on a single external text-extraction command.
pub const EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound on one LLM HTTP request, connection through response body.
pub const LLM_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
