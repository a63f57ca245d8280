//! Core types for the risk engine (JSON contracts + internal models).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::tier::{CoarseLevel, RiskLevel};

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the form collaborator sends)
// ---------------------------------------------------------------------------

/// One raw assessment entry as submitted by the form layer. Unknown fields are
/// silently ignored; ratings stay untyped until the adapter coerces them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InboundRecord {
  pub process: String,
  pub work_description: String,
  pub hazard_type: String,
  pub hazard_description: String,
  pub cause: String,
  pub legal_basis: String,
  pub current_measures: String,
  pub planned_measures: String,
  pub responsible: String,
  #[serde(alias = "possibility")]
  pub likelihood: Option<Value>,
  pub severity: Option<Value>,
  #[serde(alias = "residual_possibility")]
  pub residual_likelihood: Option<Value>,
  pub residual_severity: Option<Value>,
  /// Level carried by a previously stored record; must agree with the ratings.
  pub level: Option<String>,
  pub improvement_date: Option<String>,
  pub completion_date: Option<String>,
  pub created_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Validated (likelihood, severity) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RiskInput {
  pub likelihood: u32,
  pub severity: u32,
}

impl RiskInput {
  pub fn new(likelihood: u32, severity: u32) -> Self {
    Self {
      likelihood,
      severity,
    }
  }

  pub fn score(self) -> u32 {
    self.likelihood * self.severity
  }
}

/// Result of scoring a [`RiskInput`]. `level`, `color` and `action` always come
/// from the tier that contains `score`; only the classifier builds these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskClassification {
  pub score: u32,
  pub level: RiskLevel,
  pub color: String,
  pub action: String,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One assessed hazard/work-item entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
  pub id: String,
  #[serde(default)]
  pub process: String,
  #[serde(default)]
  pub work_description: String,
  #[serde(default)]
  pub hazard_type: String,
  #[serde(default)]
  pub hazard_description: String,
  #[serde(default)]
  pub cause: String,
  #[serde(default)]
  pub legal_basis: String,
  #[serde(default)]
  pub current_measures: String,
  #[serde(default)]
  pub planned_measures: String,
  #[serde(default)]
  pub responsible: String,
  pub input: RiskInput,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub classification: Option<RiskClassification>,
  /// Re-rating after the planned reduction measures.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub residual: Option<RiskInput>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub residual_classification: Option<RiskClassification>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub improvement_date: Option<NaiveDate>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub completion_date: Option<NaiveDate>,
  pub created_at: DateTime<Utc>,
}

impl RiskRecord {
  /// Bare record with no context text and no classification attached yet.
  pub fn unscored(input: RiskInput, created_at: DateTime<Utc>) -> Self {
    Self {
      id: crate::fingerprint::record_id("", "", "", &created_at),
      process: String::new(),
      work_description: String::new(),
      hazard_type: String::new(),
      hazard_description: String::new(),
      cause: String::new(),
      legal_basis: String::new(),
      current_measures: String::new(),
      planned_measures: String::new(),
      responsible: String::new(),
      input,
      classification: None,
      residual: None,
      residual_classification: None,
      improvement_date: None,
      completion_date: None,
      created_at,
    }
  }

  pub fn level(&self) -> Option<RiskLevel> {
    self.classification.as_ref().map(|c| c.level)
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what reporting/UI collaborators consume)
// ---------------------------------------------------------------------------

/// Count and share of one level within a population.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LevelStat {
  pub count: u64,
  /// `ratio * 100`, rounded to one decimal for display.
  pub percent: f64,
  /// Unrounded `count / total` in `0..=1`; 0 when the population is empty.
  pub ratio: f64,
}

/// Per-level counts over one population of records.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LevelBreakdown {
  pub total: u64,
  pub by_level: BTreeMap<RiskLevel, LevelStat>,
}

/// Read-only view recomputed from a record collection on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskStatisticsSummary {
  pub total: u64,
  pub by_level: BTreeMap<RiskLevel, LevelStat>,
  /// The same counts merged into the 3-tier view.
  pub coarse: BTreeMap<CoarseLevel, LevelStat>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub by_group: Option<BTreeMap<String, LevelBreakdown>>,
  /// Levels of the residual ratings, over records that carry one.
  pub residual: LevelBreakdown,
  /// Records whose residual score is strictly below the initial score.
  pub reduced: u64,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}

/// Final line emitted once stdin is exhausted.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryOutput {
  pub summary: RiskStatisticsSummary,
}
