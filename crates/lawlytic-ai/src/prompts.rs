//! Prompt templates and response clean-up.

use std::fmt::Write;

use lawlytic_core::truncate_chars;

// ── Prompt templates ──

/// Prompt asking for exactly `clauses.len()` analyses as a JSON array.
///
/// Each clause is cut to `clause_chars` characters to bound prompt size.
pub fn batch_prompt<S: AsRef<str>>(clauses: &[S], clause_chars: usize) -> String {
    let n = clauses.len();
    let mut numbered = String::new();
    for (i, clause) in clauses.iter().enumerate() {
        let _ = writeln!(
            numbered,
            "{}. {}",
            i + 1,
            truncate_chars(clause.as_ref(), clause_chars)
        );
    }

    format!(
        "You are a legal analyst AI called LawLytic.\n\
         Analyze EACH of the following {n} legal clauses.\n\
         \n\
         Clauses:\n\
         ---\n\
         {numbered}\
         ---\n\
         \n\
         For each clause provide:\n\
         - \"risk_level\": \"Red\" (high risk), \"Orange\" (moderate risk), \"Green\" (standard/safe), \
         or \"Gray\" if you cannot determine the risk\n\
         - \"plain_english\": a simple, friendly one-sentence explanation\n\
         - \"emoji_summary\": 1-3 emojis summarizing the point\n\
         \n\
         CRITICAL: Return ONLY a JSON array with EXACTLY {n} objects, one per clause, in the same order. \
         No markdown fences, no explanation."
    )
}

/// Prompt answering `question` strictly from `context`.
pub fn chat_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful AI assistant for LawLytic. Answer the user's question based only on \
         the provided context from a legal document. Be friendly and clear.\n\
         \n\
         If the answer is not in the text, state that the document does not seem to provide \
         that information.\n\
         \n\
         Document context:\n\
         ---\n\
         {context}\n\
         ---\n\
         \n\
         User's question: \"{question}\"\n\
         \n\
         Answer:"
    )
}

/// Prompt extracting dated events, with the document cut to `max_chars` characters.
pub fn timeline_prompt(text: &str, max_chars: usize) -> String {
    let text = truncate_chars(text, max_chars);
    format!(
        "You are an AI agent specializing in legal case analysis. Read the following document \
         text and extract key events to build a timeline: filing dates, hearings, motions, \
         evidence submission, communications, deadlines, contract signings, incidents or disputes.\n\
         \n\
         Document text:\n\
         ---\n\
         {text}\n\
         ---\n\
         \n\
         Return ONLY a JSON array of objects with the keys \"date\", \"event\" and \"parties\".\n\
         - \"date\": as specific as possible, e.g. \"2024-08-15\"\n\
         - \"event\": a brief, clear description\n\
         - \"parties\": the key people or groups involved, e.g. \"Plaintiff, Defendant\"\n\
         \n\
         Example:\n\
         [{{\"date\": \"2023-01-20\", \"event\": \"Initial complaint filed.\", \"parties\": \"InnovateTech vs. Quantum Corp\"}}]"
    )
}

// ── Response clean-up ──

/// Remove markdown code-fence markers models wrap JSON in.
pub fn strip_code_fences(raw: &str) -> String {
    raw.trim().replace("```json", "").replace("```", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_prompt_numbers_and_counts_clauses() {
        let clauses = ["First clause text.", "Second clause text."];
        let prompt = batch_prompt(&clauses, 500);
        assert!(prompt.contains("1. First clause text.\n2. Second clause text.\n"));
        assert!(prompt.contains("EXACTLY 2 objects"));
        assert!(prompt.contains("following 2 legal clauses"));
    }

    #[test]
    fn batch_prompt_truncates_clauses() {
        let long = "x".repeat(800);
        let prompt = batch_prompt(&[long], 500);
        assert!(prompt.contains(&format!("1. {}\n", "x".repeat(500))));
        assert!(!prompt.contains(&"x".repeat(501)));
    }

    #[test]
    fn timeline_prompt_truncates_text() {
        let text = "y".repeat(20_000);
        let prompt = timeline_prompt(&text, 15_000);
        assert!(prompt.contains(&"y".repeat(15_000)));
        assert!(!prompt.contains(&"y".repeat(15_001)));
    }

    #[test]
    fn chat_prompt_embeds_question() {
        let prompt = chat_prompt("Rent is due monthly.", "When is rent due?");
        assert!(prompt.contains("Rent is due monthly."));
        assert!(prompt.contains("\"When is rent due?\""));
    }

    #[test]
    fn strips_json_fences() {
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("  ```\n[]\n```  "), "[]");
        assert_eq!(strip_code_fences("[3]"), "[3]");
    }
}
