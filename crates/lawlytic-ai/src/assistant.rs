//! Single-shot generative tasks on a stored document: Q&A and timelines.
//!
//! Both mask gateway faults: chat answers with a fixed apology, timeline
//! extraction yields an empty list. Neither retries.

use lawlytic_core::{TimelineEvent, defaults};
use tracing::{info, warn};

use crate::gateway::LlmGateway;
use crate::prompts::{chat_prompt, strip_code_fences, timeline_prompt};

/// Reply used when the model could not be reached or answered unusably.
pub const CHAT_ERROR_REPLY: &str = "Sorry, I encountered an error while trying to find an answer.";

/// Answer `question` using only `context` (the document text).
pub async fn answer_question(gateway: &dyn LlmGateway, context: &str, question: &str) -> String {
    match gateway.generate(&chat_prompt(context, question)).await {
        Ok(generation) => generation.text.trim().to_string(),
        Err(e) => {
            warn!(error = %e, kind = ?e.kind(), "chat answer failed");
            CHAT_ERROR_REPLY.to_string()
        }
    }
}

/// Extract dated events from `text`, sorted by date.
///
/// Dates are compared as strings, which orders ISO dates correctly; events
/// with the same date keep the model's order.
pub async fn extract_timeline(gateway: &dyn LlmGateway, text: &str) -> Vec<TimelineEvent> {
    let prompt = timeline_prompt(text, defaults::TIMELINE_PROMPT_CHARS);
    let generation = match gateway.generate(&prompt).await {
        Ok(g) => g,
        Err(e) => {
            warn!(error = %e, kind = ?e.kind(), "timeline generation failed");
            return Vec::new();
        }
    };

    match parse_timeline(&generation.text) {
        Ok(events) => {
            info!(events = events.len(), "timeline extracted");
            events
        }
        Err(e) => {
            warn!(error = %e, "timeline response was not a JSON array of events");
            Vec::new()
        }
    }
}

fn parse_timeline(raw: &str) -> Result<Vec<TimelineEvent>, serde_json::Error> {
    let mut events: Vec<TimelineEvent> = serde_json::from_str(&strip_code_fences(raw))?;
    events.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(events)
}
