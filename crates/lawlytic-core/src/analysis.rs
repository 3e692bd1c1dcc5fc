//! Per-clause risk analysis types shared by the pipeline, the store, and the CLI.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Reason recorded when the model never produced a usable batch.
pub const AI_PROCESSING_ERROR: &str = "AI processing error";

/// Reason recorded when a clause had no analysis to pair with.
pub const PROCESSING_INCOMPLETE: &str = "Processing incomplete";

const FALLBACK_EMOJI: &str = "⚠️";

/// Categorical risk assigned to a clause.
///
/// `Gray` doubles as "could not be determined": the model uses it for clauses
/// it cannot judge, and every synthesized fallback carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum RiskLevel {
    /// High risk.
    Red,
    /// Moderate risk.
    Orange,
    /// Standard / safe.
    Green,
    /// Unknown or not analysed.
    #[default]
    Gray,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Orange => "Orange",
            Self::Green => "Green",
            Self::Gray => "Gray",
        }
    }

    /// Parse a model-supplied label. Case and surrounding whitespace are
    /// ignored; anything unrecognised becomes `Gray`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "red" | "high" => Self::Red,
            "orange" | "amber" | "moderate" | "medium" => Self::Orange,
            "green" | "low" | "safe" | "standard" => Self::Green,
            _ => Self::Gray,
        }
    }
}

impl From<Option<String>> for RiskLevel {
    fn from(label: Option<String>) -> Self {
        label.as_deref().map_or(Self::Gray, Self::from_label)
    }
}

/// Deserialize a string field, reading JSON `null` as empty.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk analysis for a single clause.
///
/// The model fills in everything except `original_text`, which the result
/// assembler copies from the clause sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseAnalysis {
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub plain_english: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub emoji_summary: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub original_text: String,
}

impl ClauseAnalysis {
    /// Placeholder analysis used when no real result is available.
    pub fn fallback(reason: &str) -> Self {
        Self {
            risk_level: RiskLevel::Gray,
            plain_english: format!("Analysis failed: {reason}"),
            emoji_summary: FALLBACK_EMOJI.to_string(),
            original_text: String::new(),
        }
    }

    /// Whether this entry is a synthesized placeholder rather than model output.
    pub fn is_fallback(&self) -> bool {
        self.risk_level == RiskLevel::Gray
            && self.emoji_summary == FALLBACK_EMOJI
            && self.plain_english.starts_with("Analysis failed: ")
    }

    /// Return a copy with `original_text` set.
    pub fn with_original_text(mut self, text: impl Into<String>) -> Self {
        self.original_text = text.into();
        self
    }
}

/// Count of analysed clauses per actionable risk level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    pub red: usize,
    pub orange: usize,
    pub green: usize,
}

impl RiskCounts {
    pub fn tally(analyses: &[ClauseAnalysis]) -> Self {
        analyses
            .iter()
            .fold(Self::default(), |mut counts, a| {
                match a.risk_level {
                    RiskLevel::Red => counts.red += 1,
                    RiskLevel::Orange => counts.orange += 1,
                    RiskLevel::Green => counts.green += 1,
                    RiskLevel::Gray => {}
                }
                counts
            })
    }

    pub fn total(&self) -> usize {
        self.red + self.orange + self.green
    }
}
