//! Risk tiers: the ordered level set, the score bands, and the coarse 3-tier view.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Five-tier risk level, ordered most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
  VeryHigh,
  High,
  Medium,
  Low,
  VeryLow,
}

impl RiskLevel {
  pub const ALL: [RiskLevel; 5] = [
    Self::VeryHigh,
    Self::High,
    Self::Medium,
    Self::Low,
    Self::VeryLow,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::VeryHigh => "very-high",
      Self::High => "high",
      Self::Medium => "medium",
      Self::Low => "low",
      Self::VeryLow => "very-low",
    }
  }

  /// Accepts kebab, snake, spaced or run-together spellings in any case.
  pub fn from_str_loose(s: &str) -> Option<Self> {
    let key: String = s
      .trim()
      .chars()
      .filter(|c| !matches!(c, '-' | '_' | ' '))
      .collect::<String>()
      .to_ascii_lowercase();
    match key.as_str() {
      "veryhigh" => Some(Self::VeryHigh),
      "high" => Some(Self::High),
      "medium" => Some(Self::Medium),
      "low" => Some(Self::Low),
      "verylow" => Some(Self::VeryLow),
      _ => None,
    }
  }

  /// Merge into the 3-tier view used for live alerting.
  pub fn coarse(self) -> CoarseLevel {
    match self {
      Self::VeryHigh | Self::High => CoarseLevel::High,
      Self::Medium => CoarseLevel::Medium,
      Self::Low | Self::VeryLow => CoarseLevel::Low,
    }
  }
}

impl fmt::Display for RiskLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// 3-tier view derived from [`RiskLevel`]; never classified independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoarseLevel {
  High,
  Medium,
  Low,
}

impl CoarseLevel {
  pub const ALL: [CoarseLevel; 3] = [Self::High, Self::Medium, Self::Low];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::High => "high",
      Self::Medium => "medium",
      Self::Low => "low",
    }
  }
}

impl fmt::Display for CoarseLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One inclusive score band of the tier table with its presentation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
  pub level: RiskLevel,
  pub min: u32,
  pub max: u32,
  pub color: String,
  pub action: String,
}

impl Tier {
  pub fn new(level: RiskLevel, min: u32, max: u32, color: &str, action: &str) -> Self {
    Self {
      level,
      min,
      max,
      color: color.to_string(),
      action: action.to_string(),
    }
  }

  pub fn contains(&self, score: u32) -> bool {
    self.min <= score && score <= self.max
  }
}

/// Canonical five-band table over the 1..=20 score range (likelihood 1-5 x severity 1-4).
pub fn default_tiers() -> Vec<Tier> {
  vec![
    Tier::new(RiskLevel::VeryHigh, 16, 20, "#ff4444", "stop work immediately"),
    Tier::new(RiskLevel::High, 12, 15, "#ff8888", "improve immediately"),
    Tier::new(RiskLevel::Medium, 6, 11, "#ffaa44", "plan improvement"),
    Tier::new(RiskLevel::Low, 3, 5, "#44ff88", "monitor"),
    Tier::new(RiskLevel::VeryLow, 1, 2, "#88ff88", "maintain current state"),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn coarse_merges_outer_bands() {
    assert_eq!(RiskLevel::VeryHigh.coarse(), CoarseLevel::High);
    assert_eq!(RiskLevel::High.coarse(), CoarseLevel::High);
    assert_eq!(RiskLevel::Medium.coarse(), CoarseLevel::Medium);
    assert_eq!(RiskLevel::Low.coarse(), CoarseLevel::Low);
    assert_eq!(RiskLevel::VeryLow.coarse(), CoarseLevel::Low);
  }

  #[test]
  fn loose_parsing_accepts_common_spellings() {
    assert_eq!(RiskLevel::from_str_loose("very-high"), Some(RiskLevel::VeryHigh));
    assert_eq!(RiskLevel::from_str_loose("VERY_LOW"), Some(RiskLevel::VeryLow));
    assert_eq!(RiskLevel::from_str_loose(" Very High "), Some(RiskLevel::VeryHigh));
    assert_eq!(RiskLevel::from_str_loose("medium"), Some(RiskLevel::Medium));
    assert_eq!(RiskLevel::from_str_loose("extreme"), None);
  }

  #[test]
  fn level_serializes_kebab_case() {
    let json = serde_json::to_string(&RiskLevel::VeryHigh).unwrap();
    assert_eq!(json, "\"very-high\"");
    let back: RiskLevel = serde_json::from_str("\"very-low\"").unwrap();
    assert_eq!(back, RiskLevel::VeryLow);
  }

  #[test]
  fn default_table_is_ordered_and_contiguous() {
    let tiers = default_tiers();
    assert_eq!(tiers.len(), RiskLevel::ALL.len());
    for pair in tiers.windows(2) {
      assert_eq!(pair[1].max + 1, pair[0].min);
    }
    assert_eq!(tiers.first().map(|t| t.max), Some(20));
    assert_eq!(tiers.last().map(|t| t.min), Some(1));
  }

  #[test]
  fn tier_bounds_are_inclusive() {
    let tier = Tier::new(RiskLevel::Medium, 6, 11, "#ffaa44", "plan improvement");
    assert!(tier.contains(6));
    assert!(tier.contains(11));
    assert!(!tier.contains(5));
    assert!(!tier.contains(12));
  }
}
