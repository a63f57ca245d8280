//! Engine configuration with sane defaults: rating domains, tier table, strictness.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::EngineError;
use crate::tier::{default_tiers, Tier};

/// Inclusive integer domain for one rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRange {
  pub min: u32,
  pub max: u32,
}

impl RatingRange {
  pub const fn new(min: u32, max: u32) -> Self {
    Self { min, max }
  }

  pub fn contains(self, value: i64) -> bool {
    i64::from(self.min) <= value && value <= i64::from(self.max)
  }
}

/// Rating domains and the tier table consumed by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Likelihood domain (1..=5).
  pub likelihood: RatingRange,
  /// Severity domain (1..=4).
  pub severity: RatingRange,
  /// Score bands; must partition the full score range with no gaps or overlaps.
  pub tiers: Vec<Tier>,
  /// Reject missing or non-numeric ratings instead of substituting the domain minimum.
  pub strict: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      likelihood: RatingRange::new(1, 5),
      severity: RatingRange::new(1, 4),
      tiers: default_tiers(),
      strict: true,
    }
  }
}

impl Config {
  /// Read a TOML config file and validate it.
  pub fn load(path: &Path) -> Result<Self, EngineError> {
    let raw = std::fs::read_to_string(path)?;
    Self::from_toml(&raw)
  }

  pub fn from_toml(raw: &str) -> Result<Self, EngineError> {
    let config: Config = toml::from_str(raw)?;
    config.validate()?;
    Ok(config)
  }

  /// Lowest and highest reachable score. Fails when the product overflows `u32`.
  pub fn score_range(&self) -> Result<(u32, u32), EngineError> {
    let product = |l: u32, s: u32| {
      l.checked_mul(s).ok_or_else(|| {
        EngineError::config(format!("score {} x {} does not fit in u32", l, s))
      })
    };
    Ok((
      product(self.likelihood.min, self.severity.min)?,
      product(self.likelihood.max, self.severity.max)?,
    ))
  }

  /// Check domains and that the tiers partition `score_range()` exactly.
  pub fn validate(&self) -> Result<(), EngineError> {
    for (name, range) in [("likelihood", self.likelihood), ("severity", self.severity)] {
      if range.min == 0 {
        return Err(EngineError::config(format!("{}: min must be at least 1", name)));
      }
      if range.min > range.max {
        return Err(EngineError::config(format!(
          "{}: min {} exceeds max {}",
          name, range.min, range.max
        )));
      }
    }

    if self.tiers.is_empty() {
      return Err(EngineError::config("tiers must not be empty"));
    }

    let mut seen = HashSet::new();
    for tier in &self.tiers {
      if !seen.insert(tier.level) {
        return Err(EngineError::config(format!("tier {} defined twice", tier.level)));
      }
      if tier.min > tier.max {
        return Err(EngineError::config(format!(
          "tier {}: min {} exceeds max {}",
          tier.level, tier.min, tier.max
        )));
      }
    }

    let mut bands: Vec<&Tier> = self.tiers.iter().collect();
    bands.sort_by_key(|t| t.min);

    // Walk in u64 so `max + 1` cannot wrap at u32::MAX.
    let (lo, hi) = self.score_range()?;
    let mut expected = u64::from(lo);
    for tier in &bands {
      let min = u64::from(tier.min);
      if min > expected {
        return Err(EngineError::config(format!(
          "tiers leave scores {}..={} uncovered",
          expected,
          min - 1
        )));
      }
      if min < expected {
        return Err(EngineError::config(format!(
          "tier {} overlaps or starts below score {}",
          tier.level, expected
        )));
      }
      expected = u64::from(tier.max) + 1;
    }
    if expected != u64::from(hi) + 1 {
      return Err(EngineError::config(format!(
        "tiers must end at max score {}, last band ends at {}",
        hi,
        expected - 1
      )));
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tier::RiskLevel;

  #[test]
  fn default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.score_range().unwrap(), (1, 20));
  }

  #[test]
  fn gap_between_tiers_is_rejected() {
    let mut config = Config::default();
    config.tiers[2].min = 7; // medium now 7..=11, score 6 uncovered
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("uncovered"), "{}", err);
  }

  #[test]
  fn overlapping_tiers_are_rejected() {
    let mut config = Config::default();
    config.tiers[1].min = 11; // high 11..=15 overlaps medium
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("overlaps"), "{}", err);
  }

  #[test]
  fn table_must_reach_max_score() {
    let mut config = Config::default();
    config.likelihood.max = 6; // max score now 24
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("24"), "{}", err);
  }

  #[test]
  fn duplicate_level_is_rejected() {
    let mut config = Config::default();
    config.tiers[0].level = RiskLevel::High;
    assert!(config.validate().is_err());
  }

  #[test]
  fn oversized_domain_is_a_config_error() {
    let input = "[likelihood]\nmin = 1\nmax = 100000\n[severity]\nmin = 1\nmax = 100000\n";
    let err = Config::from_toml(input).unwrap_err();
    assert!(matches!(err, EngineError::Config(_)), "{}", err);
    assert!(err.to_string().contains("does not fit"), "{}", err);
  }

  #[test]
  fn tier_ending_at_u32_max_does_not_wrap() {
    let mut config = Config::default();
    config.tiers[0].max = u32::MAX;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("must end at max score 20"), "{}", err);
  }

  #[test]
  fn zero_minimum_is_rejected() {
    let config = Config {
      severity: RatingRange::new(0, 4),
      ..Config::default()
    };
    assert!(config.validate().is_err());
  }

  #[test]
  fn toml_overrides_keep_defaults_for_missing_keys() {
    let config = Config::from_toml("strict = false\n").unwrap();
    assert!(!config.strict);
    assert_eq!(config.likelihood, RatingRange::new(1, 5));
    assert_eq!(config.tiers.len(), 5);
  }

  #[test]
  fn toml_three_tier_table() {
    let input = r#"
[[tiers]]
level = "high"
min = 12
max = 20
color = "red"
action = "improve immediately"

[[tiers]]
level = "medium"
min = 6
max = 11
color = "orange"
action = "improve"

[[tiers]]
level = "low"
min = 1
max = 5
color = "green"
action = "monitor"
"#;
    let config = Config::from_toml(input).unwrap();
    assert_eq!(config.tiers.len(), 3);
    assert!(config.strict);
  }

  #[test]
  fn toml_with_gap_fails_validation() {
    let input = r#"
[[tiers]]
level = "high"
min = 12
max = 20
color = "red"
action = "improve immediately"

[[tiers]]
level = "low"
min = 1
max = 5
color = "green"
action = "monitor"
"#;
    assert!(matches!(Config::from_toml(input), Err(EngineError::Config(_))));
  }
}
