pub mod analysis;
pub mod clauses;
pub mod defaults;
pub mod record;

pub use analysis::{ClauseAnalysis, RiskCounts, RiskLevel};
pub use clauses::{extract_clauses, partition, truncate_chars};
pub use record::{DocumentRecord, DocumentSummary, RecordPatch, TimelineEvent, describe_counts};
