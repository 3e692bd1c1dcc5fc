//! Realign analyses with the clause sequence they came from.

use lawlytic_core::analysis::PROCESSING_INCOMPLETE;
use lawlytic_core::ClauseAnalysis;
use tracing::warn;

/// Pair the i-th analysis with the i-th clause and fill in `original_text`.
///
/// The output always has `clauses.len()` entries. Clauses with no matching
/// analysis get a Gray "Processing incomplete" fallback; surplus analyses
/// are dropped. Pure: the inputs are not modified.
pub fn assemble<S: AsRef<str>>(clauses: &[S], analyses: &[ClauseAnalysis]) -> Vec<ClauseAnalysis> {
    if analyses.len() != clauses.len() {
        warn!(
            clauses = clauses.len(),
            analyses = analyses.len(),
            "analysis count does not match clause count"
        );
    }

    clauses
        .iter()
        .enumerate()
        .map(|(i, clause)| {
            let analysis = analyses
                .get(i)
                .cloned()
                .unwrap_or_else(|| ClauseAnalysis::fallback(PROCESSING_INCOMPLETE));
            analysis.with_original_text(clause.as_ref())
        })
        .collect()
}
