//! Risk Assessment Scoring Engine — deterministic, rule-based.
//!
//! Converts (likelihood, severity) ratings into a score, risk level, display
//! color and recommended action, and aggregates scored records into per-level
//! counts and percentages for reports and live counters.
//!
//! No DB, no network; pure computation + in-memory state.

pub mod adapter;
pub mod assessment;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod statistics;
pub mod stream;
pub mod tier;
pub mod types;

pub use assessment::Assessment;
pub use classifier::Classifier;
pub use config::{Config, RatingRange};
pub use error::EngineError;
pub use statistics::{GroupBy, UNCLASSIFIED_GROUP};
pub use tier::{CoarseLevel, RiskLevel, Tier};
pub use types::{
  InboundRecord, LevelBreakdown, LevelStat, RiskClassification, RiskInput, RiskRecord,
  RiskStatisticsSummary,
};

/// Classify a rating pair against the canonical tier table.
pub fn classify(likelihood: i64, severity: i64) -> Result<RiskClassification, EngineError> {
  Classifier::with_defaults().classify(likelihood, severity)
}

/// Summarize records against the canonical tier table.
pub fn summarize(
  records: &[RiskRecord],
  group_by: Option<GroupBy>,
) -> Result<RiskStatisticsSummary, EngineError> {
  statistics::summarize(records, group_by, &Classifier::with_defaults())
}
