//! The persisted document record and the views derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{ClauseAnalysis, RiskCounts, null_as_empty};

/// One dated event in a document's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// As specific as the document allows, ideally `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub event: String,
    #[serde(default)]
    pub parties: Option<String>,
}

/// A fully analysed document.
///
/// Created once when an upload completes; only `timeline` and `summary` are
/// changed afterwards, through [`RecordPatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub owner_id: String,
    pub file_name: String,
    /// Reference into blob storage for the original upload, when it was stored.
    pub blob_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub full_text: String,
    /// One entry per extracted clause, in document order.
    pub analysis: Vec<ClauseAnalysis>,
    pub risk_counts: RiskCounts,
    pub summary: Option<String>,
    pub timeline: Option<Vec<TimelineEvent>>,
}

/// List view of a record, without text or analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub clause_count: usize,
    pub risk_counts: RiskCounts,
    pub summary: Option<String>,
}

/// Fields that may change on an existing record. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub summary: Option<String>,
    pub timeline: Option<Vec<TimelineEvent>>,
}

impl RecordPatch {
    pub fn timeline(events: Vec<TimelineEvent>) -> Self {
        Self {
            timeline: Some(events),
            ..Self::default()
        }
    }
}

impl DocumentRecord {
    pub fn to_summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            file_name: self.file_name.clone(),
            created_at: self.created_at,
            clause_count: self.analysis.len(),
            risk_counts: self.risk_counts,
            summary: self.summary.clone(),
        }
    }

    pub fn apply(&mut self, patch: RecordPatch) {
        if let Some(summary) = patch.summary {
            self.summary = Some(summary);
        }
        if let Some(timeline) = patch.timeline {
            self.timeline = Some(timeline);
        }
    }

    /// Clause texts joined one per line, in document order.
    pub fn clause_text(&self) -> String {
        self.analysis
            .iter()
            .map(|a| a.original_text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Short human summary derived from risk counts.
pub fn describe_counts(clauses: usize, counts: &RiskCounts) -> String {
    let unrated = clauses.saturating_sub(counts.total());
    let mut s = format!(
        "{clauses} clauses reviewed: {} high risk, {} moderate risk, {} standard",
        counts.red, counts.orange, counts.green
    );
    if unrated > 0 {
        s.push_str(&format!(", {unrated} unrated"));
    }
    s.push('.');
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RiskLevel;
    use chrono::TimeZone;

    fn record() -> DocumentRecord {
        let analysis = vec![
            ClauseAnalysis {
                risk_level: RiskLevel::Red,
                plain_english: "Unlimited liability.".into(),
                emoji_summary: "🔥".into(),
                original_text: "The Supplier shall be liable for all losses.".into(),
            },
            ClauseAnalysis::fallback("AI processing error")
                .with_original_text("Governing law is England and Wales."),
        ];
        let risk_counts = RiskCounts::tally(&analysis);
        DocumentRecord {
            id: "doc_1".into(),
            owner_id: "user-1".into(),
            file_name: "msa.txt".into(),
            blob_ref: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            full_text: "full".into(),
            analysis,
            risk_counts,
            summary: None,
            timeline: None,
        }
    }

    #[test]
    fn summary_view() {
        let s = record().to_summary();
        assert_eq!(s.id, "doc_1");
        assert_eq!(s.clause_count, 2);
        assert_eq!(s.risk_counts.red, 1);
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut r = record();
        r.summary = Some("keep".into());
        r.apply(RecordPatch::timeline(vec![TimelineEvent {
            date: "2026-01-01".into(),
            event: "Signed".into(),
            parties: None,
        }]));
        assert_eq!(r.summary.as_deref(), Some("keep"));
        assert_eq!(r.timeline.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn clause_text_joins_in_order() {
        assert_eq!(
            record().clause_text(),
            "The Supplier shall be liable for all losses.\nGoverning law is England and Wales."
        );
    }

    #[test]
    fn record_json_roundtrip() {
        let r = record();
        let json = serde_json::to_string(&r).unwrap();
        let parsed: DocumentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, r);
    }

    #[test]
    fn timeline_event_tolerates_null_parties() {
        let json = r#"{"date": "2024-08-15", "event": "Hearing", "parties": null}"#;
        let e: TimelineEvent = serde_json::from_str(json).unwrap();
        assert!(e.parties.is_none());
    }

    #[test]
    fn timeline_event_tolerates_null_date_and_event() {
        let json = r#"{"date": null, "event": null, "parties": "Landlord"}"#;
        let e: TimelineEvent = serde_json::from_str(json).unwrap();
        assert!(e.date.is_empty());
        assert!(e.event.is_empty());
        assert_eq!(e.parties.as_deref(), Some("Landlord"));
    }

    #[test]
    fn describe_counts_mentions_unrated() {
        let counts = RiskCounts {
            red: 1,
            orange: 2,
            green: 3,
        };
        assert_eq!(
            describe_counts(6, &counts),
            "6 clauses reviewed: 1 high risk, 2 moderate risk, 3 standard."
        );
        assert_eq!(
            describe_counts(8, &counts),
            "8 clauses reviewed: 1 high risk, 2 moderate risk, 3 standard, 2 unrated."
        );
    }
}
