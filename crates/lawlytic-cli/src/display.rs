//! Vertical card display for analysed documents.
//!
//! Renders a stored document as grouped, human-readable sections, plus compact
//! listings for summaries, clause analyses, and timelines.

use lawlytic_core::{
    ClauseAnalysis, DocumentRecord, DocumentSummary, RiskLevel, TimelineEvent, truncate_chars,
};

const MAX_LIST_ITEMS: usize = 10;
const CLAUSE_PREVIEW_CHARS: usize = 72;

// ── Public API ──

/// Print a stored document as a card. With `all_clauses`, every clause is
/// listed; otherwise only the flagged (Red/Orange) ones, capped.
pub fn print_document_card(record: &DocumentRecord, all_clauses: bool) {
    println!("=== {} ===", record.file_name);
    if let Some(summary) = &record.summary {
        println!("{summary}");
    }
    println!();

    println!("Identity");
    println!("  {:<26} {}", "id", record.id);
    println!("  {:<26} {}", "owner", record.owner_id);
    println!("  {:<26} {}", "created_at", record.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if let Some(blob) = &record.blob_ref {
        println!("  {:<26} {}", "original", blob);
    }
    println!("  {:<26} {}", "text_chars", record.full_text.chars().count());
    println!();

    println!("Risk");
    println!("  {:<26} {}", "clauses", record.analysis.len());
    println!("  {:<26} {}", "red", record.risk_counts.red);
    println!("  {:<26} {}", "orange", record.risk_counts.orange);
    println!("  {:<26} {}", "green", record.risk_counts.green);
    let unrated = record.analysis.len().saturating_sub(record.risk_counts.total());
    if unrated > 0 {
        println!("  {:<26} {}", "gray", unrated);
    }
    println!();

    if all_clauses {
        println!("Clauses");
        print_analysis(&record.analysis, None);
    } else {
        let flagged: Vec<ClauseAnalysis> = record
            .analysis
            .iter()
            .filter(|a| matches!(a.risk_level, RiskLevel::Red | RiskLevel::Orange))
            .cloned()
            .collect();
        if !flagged.is_empty() {
            println!("Flagged Clauses");
            print_analysis(&flagged, Some(MAX_LIST_ITEMS));
        }
    }

    if let Some(events) = &record.timeline {
        println!("Timeline");
        print_timeline(events);
    }
}

/// Print clause analyses, one block per clause, up to `limit` entries.
pub fn print_analysis(analysis: &[ClauseAnalysis], limit: Option<usize>) {
    let show = limit.map_or(analysis.len(), |l| analysis.len().min(l));
    for (i, entry) in analysis.iter().take(show).enumerate() {
        println!(
            "  {:>3}. {} {:<7} {}",
            i + 1,
            entry.emoji_summary,
            entry.risk_level.as_str(),
            shorten(&entry.original_text, CLAUSE_PREVIEW_CHARS)
        );
        if !entry.plain_english.is_empty() {
            println!("        {}", entry.plain_english);
        }
    }
    if analysis.len() > show {
        println!("  ... and {} more", analysis.len() - show);
    }
    println!();
}

/// Print one line per document summary.
pub fn print_summaries(summaries: &[DocumentSummary]) {
    if summaries.is_empty() {
        println!("No documents.");
        return;
    }
    println!(
        "{:<37} {:<19} {:>7} {:>4} {:>4} {:>4}  file",
        "id", "created", "clauses", "red", "org", "grn"
    );
    for s in summaries {
        println!(
            "{:<37} {:<19} {:>7} {:>4} {:>4} {:>4}  {}",
            s.id,
            s.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            s.clause_count,
            s.risk_counts.red,
            s.risk_counts.orange,
            s.risk_counts.green,
            s.file_name
        );
    }
}

/// Print events in the order given.
pub fn print_timeline(events: &[TimelineEvent]) {
    if events.is_empty() {
        println!("  (no dated events found)");
        println!();
        return;
    }
    for event in events {
        println!("  {:<12} {}", event.date, event.event);
        if let Some(parties) = event.parties.as_deref().filter(|p| !p.is_empty()) {
            println!("  {:<12} parties: {}", "", parties);
        }
    }
    println!();
}

// ── Helpers ──

/// Single-line preview of at most `max` characters.
fn shorten(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max {
        format!("{}...", truncate_chars(&flat, max.saturating_sub(3)))
    } else {
        flat
    }
}
