//! Clause extraction and batching.
//!
//! A clause is one trimmed line of document text. Extraction keeps document
//! order and never reorders or deduplicates, so a clause is identified by its
//! index alone.
//!
//! # Filtering rules
//!
//! - Lines are split on `\n` and trimmed.
//! - Lines of [`MIN_CLAUSE_CHARS`] characters or fewer are dropped (headings,
//!   page furniture, signature blanks).
//! - Lines made only of digits are dropped (page numbers, exhibit counters).

use crate::defaults::MIN_CLAUSE_CHARS;

/// Split extracted document text into the ordered clause sequence.
pub fn extract_clauses(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| is_clause(line))
        .map(str::to_string)
        .collect()
}

fn is_clause(line: &str) -> bool {
    line.chars().count() > MIN_CLAUSE_CHARS && !line.chars().all(|c| c.is_ascii_digit())
}

/// Partition clauses into contiguous batches of `batch_size`.
///
/// The final batch may be shorter. Concatenating the batches in order yields
/// the input exactly. A `batch_size` of zero is treated as one.
pub fn partition<T>(clauses: &[T], batch_size: usize) -> Vec<&[T]> {
    clauses.chunks(batch_size.max(1)).collect()
}

/// First `max_chars` characters of `s`, on a char boundary.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
