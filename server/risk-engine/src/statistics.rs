//! Aggregate statistics over a collection of records: per-level counts and
//! percentages, the coarse 3-tier view, optional grouping, residual risk.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::classifier::Classifier;
use crate::error::EngineError;
use crate::tier::{CoarseLevel, RiskLevel};
use crate::types::*;

/// Bucket for records whose grouping key is missing or blank.
pub const UNCLASSIFIED_GROUP: &str = "unclassified";

/// Record field used to partition the per-level breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupBy {
  HazardType,
  Process,
  Responsible,
}

impl GroupBy {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::HazardType => "hazard-type",
      Self::Process => "process",
      Self::Responsible => "responsible",
    }
  }

  /// Trimmed grouping key of `record`, or [`UNCLASSIFIED_GROUP`] when blank.
  pub fn key(self, record: &RiskRecord) -> &str {
    let value = match self {
      Self::HazardType => &record.hazard_type,
      Self::Process => &record.process,
      Self::Responsible => &record.responsible,
    };
    match value.trim() {
      "" => UNCLASSIFIED_GROUP,
      key => key,
    }
  }
}

impl FromStr for GroupBy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
      "hazard-type" | "hazard" => Ok(Self::HazardType),
      "process" => Ok(Self::Process),
      "responsible" | "manager" => Ok(Self::Responsible),
      other => Err(format!(
        "unknown group key {:?} (expected hazard-type|process|responsible)",
        other
      )),
    }
  }
}

impl fmt::Display for GroupBy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Summarize `records` against the classifier's tier table.
///
/// - Every level of the table is present, zero-filled when unused.
/// - Every record is bucketed by classifying its ratings. A stored
///   classification that disagrees with them, or an out-of-domain rating,
///   fails the whole call.
/// - An empty collection yields `total = 0` and all-zero stats.
pub fn summarize(
  records: &[RiskRecord],
  group_by: Option<GroupBy>,
  classifier: &Classifier,
) -> Result<RiskStatisticsSummary, EngineError> {
  let levels = classifier.levels();
  let mut counts = zeroed(&levels);
  let mut groups: BTreeMap<String, BTreeMap<RiskLevel, u64>> = BTreeMap::new();
  let mut residual_counts = zeroed(&levels);
  let mut residual_total = 0u64;
  let mut reduced = 0u64;

  for record in records {
    let initial = resolve(
      "classification",
      record.classification.as_ref(),
      &record.input,
      classifier,
    )?;
    bump(&mut counts, initial.level)?;

    if let Some(g) = group_by {
      let bucket = groups
        .entry(g.key(record).to_string())
        .or_insert_with(|| zeroed(&levels));
      bump(bucket, initial.level)?;
    }

    if let Some(input) = &record.residual {
      let after = resolve(
        "residual_classification",
        record.residual_classification.as_ref(),
        input,
        classifier,
      )?;
      bump(&mut residual_counts, after.level)?;
      residual_total += 1;
      if after.score < initial.score {
        reduced += 1;
      }
    }
  }

  let total = records.len() as u64;

  let mut coarse: BTreeMap<CoarseLevel, u64> = CoarseLevel::ALL.iter().map(|&c| (c, 0)).collect();
  for (level, count) in &counts {
    *coarse.entry(level.coarse()).or_insert(0) += count;
  }

  let by_group = group_by.map(|_| {
    groups
      .into_iter()
      .map(|(key, counts)| {
        let total = counts.values().sum();
        let breakdown = LevelBreakdown {
          total,
          by_level: stats(&counts, total),
        };
        (key, breakdown)
      })
      .collect()
  });

  Ok(RiskStatisticsSummary {
    total,
    by_level: stats(&counts, total),
    coarse: stats(&coarse, total),
    by_group,
    residual: LevelBreakdown {
      total: residual_total,
      by_level: stats(&residual_counts, residual_total),
    },
    reduced,
  })
}

/// Classify `input`; a stored classification must match the fresh one.
pub(crate) fn resolve(
  field: &str,
  stored: Option<&RiskClassification>,
  input: &RiskInput,
  classifier: &Classifier,
) -> Result<RiskClassification, EngineError> {
  let fresh = classifier.classify_input(input)?;
  match stored {
    Some(c) if *c != fresh => Err(EngineError::validation(
      field,
      &format!(
        "stored {} (score {}) disagrees with ratings {}x{} ({}, score {})",
        c.level, c.score, input.likelihood, input.severity, fresh.level, fresh.score
      ),
    )),
    _ => Ok(fresh),
  }
}

/// Count `level` in a tally zero-filled from the tier table.
fn bump(tally: &mut BTreeMap<RiskLevel, u64>, level: RiskLevel) -> Result<(), EngineError> {
  match tally.get_mut(&level) {
    Some(count) => {
      *count += 1;
      Ok(())
    }
    None => Err(EngineError::config(format!("level {} is not in the tier table", level))),
  }
}

fn zeroed(levels: &[RiskLevel]) -> BTreeMap<RiskLevel, u64> {
  levels.iter().map(|&l| (l, 0)).collect()
}

fn stats<K: Ord + Copy>(counts: &BTreeMap<K, u64>, total: u64) -> BTreeMap<K, LevelStat> {
  counts
    .iter()
    .map(|(&key, &count)| (key, level_stat(count, total)))
    .collect()
}

fn level_stat(count: u64, total: u64) -> LevelStat {
  let ratio = if total == 0 {
    0.0
  } else {
    count as f64 / total as f64
  };
  LevelStat {
    count,
    percent: (ratio * 1000.0).round() / 10.0,
    ratio,
  }
}
