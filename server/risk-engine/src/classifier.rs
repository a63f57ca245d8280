//! Pure classification: (likelihood, severity) -> score, level, color, action.

use crate::config::{Config, RatingRange};
use crate::error::EngineError;
use crate::tier::{RiskLevel, Tier};
use crate::types::{RiskClassification, RiskInput};

/// Scores ratings against a validated, exhaustive tier table.
#[derive(Debug, Clone)]
pub struct Classifier {
  config: Config,
}

impl Classifier {
  /// Validate `config` and build a classifier over it.
  pub fn new(mut config: Config) -> Result<Self, EngineError> {
    config.validate()?;
    // Highest band first; bands are disjoint so the scan order only fixes determinism.
    config.tiers.sort_by(|a, b| b.min.cmp(&a.min));
    Ok(Self { config })
  }

  /// Classifier over the canonical five-band table.
  pub fn with_defaults() -> Self {
    Self {
      config: Config::default(),
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Tiers, highest band first.
  pub fn tiers(&self) -> &[Tier] {
    &self.config.tiers
  }

  /// Levels defined by the tier table, most severe first.
  pub fn levels(&self) -> Vec<RiskLevel> {
    let mut levels: Vec<RiskLevel> = self.config.tiers.iter().map(|t| t.level).collect();
    levels.sort();
    levels
  }

  /// Score and classify a rating pair. Out-of-domain ratings are rejected, never clamped.
  pub fn classify(&self, likelihood: i64, severity: i64) -> Result<RiskClassification, EngineError> {
    let likelihood = check_rating("likelihood", likelihood, self.config.likelihood)?;
    let severity = check_rating("severity", severity, self.config.severity)?;
    let score = likelihood
      .checked_mul(severity)
      .ok_or_else(|| EngineError::validation("score", "rating product overflows"))?;
    self.classify_score(score)
  }

  pub fn classify_input(&self, input: &RiskInput) -> Result<RiskClassification, EngineError> {
    self.classify(i64::from(input.likelihood), i64::from(input.severity))
  }

  /// Re-derive level, color and action from a stored score.
  pub fn classify_score(&self, score: u32) -> Result<RiskClassification, EngineError> {
    let tier = self
      .config
      .tiers
      .iter()
      .find(|t| t.contains(score))
      .ok_or_else(|| {
        let lo = self.config.tiers.iter().map(|t| t.min).min().unwrap_or(0);
        let hi = self.config.tiers.iter().map(|t| t.max).max().unwrap_or(0);
        EngineError::validation(
          "score",
          &format!("{} is outside the tier table range {}..={}", score, lo, hi),
        )
      })?;

    Ok(RiskClassification {
      score,
      level: tier.level,
      color: tier.color.clone(),
      action: tier.action.clone(),
    })
  }
}

impl Default for Classifier {
  fn default() -> Self {
    Self::with_defaults()
  }
}

fn check_rating(field: &str, value: i64, range: RatingRange) -> Result<u32, EngineError> {
  if value < i64::from(range.min) {
    return Err(EngineError::validation(
      field,
      &format!("{} is below minimum {}", value, range.min),
    ));
  }
  if value > i64::from(range.max) {
    return Err(EngineError::validation(
      field,
      &format!("{} is above maximum {}", value, range.max),
    ));
  }
  u32::try_from(value)
    .map_err(|_| EngineError::validation(field, &format!("{} is not a valid rating", value)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tier::default_tiers;

  #[test]
  fn canonical_scenarios() {
    let c = Classifier::with_defaults();
    let cases = [
      (5, 4, 20, RiskLevel::VeryHigh, "stop work immediately"),
      (3, 4, 12, RiskLevel::High, "improve immediately"),
      (2, 3, 6, RiskLevel::Medium, "plan improvement"),
      (1, 3, 3, RiskLevel::Low, "monitor"),
      (1, 1, 1, RiskLevel::VeryLow, "maintain current state"),
    ];
    for (l, s, score, level, action) in cases {
      let out = c.classify(l, s).unwrap();
      assert_eq!(out.score, score);
      assert_eq!(out.level, level);
      assert_eq!(out.action, action);
    }
  }

  #[test]
  fn score_is_product_over_whole_domain() {
    let c = Classifier::with_defaults();
    for l in 1..=5 {
      for s in 1..=4 {
        assert_eq!(c.classify(l, s).unwrap().score, (l * s) as u32);
      }
    }
  }

  #[test]
  fn exactly_one_tier_matches_every_score() {
    let c = Classifier::with_defaults();
    let (lo, hi) = c.config().score_range().unwrap();
    for score in lo..=hi {
      let matches = c.tiers().iter().filter(|t| t.contains(score)).count();
      assert_eq!(matches, 1, "score {}", score);
    }
  }

  #[test]
  fn band_edges() {
    let c = Classifier::with_defaults();
    let expect = [
      (2, RiskLevel::VeryLow),
      (3, RiskLevel::Low),
      (5, RiskLevel::Low),
      (6, RiskLevel::Medium),
      (11, RiskLevel::Medium),
      (12, RiskLevel::High),
      (15, RiskLevel::High),
      (16, RiskLevel::VeryHigh),
    ];
    for (score, level) in expect {
      assert_eq!(c.classify_score(score).unwrap().level, level, "score {}", score);
    }
  }

  #[test]
  fn color_and_action_follow_level() {
    let c = Classifier::with_defaults();
    for l in 1..=5 {
      for s in 1..=4 {
        let out = c.classify(l, s).unwrap();
        let tier = default_tiers().into_iter().find(|t| t.level == out.level).unwrap();
        assert_eq!(out.color, tier.color);
        assert_eq!(out.action, tier.action);
      }
    }
  }

  #[test]
  fn classify_is_repeatable() {
    let c = Classifier::with_defaults();
    assert_eq!(c.classify(4, 3).unwrap(), c.classify(4, 3).unwrap());
  }

  #[test]
  fn likelihood_above_domain_is_rejected() {
    let c = Classifier::with_defaults();
    let err = c.classify(6, 2).unwrap_err();
    assert_eq!(err.field(), Some("likelihood"));
    assert!(err.to_string().contains("above maximum 5"), "{}", err);
  }

  #[test]
  fn severity_below_domain_is_rejected() {
    let c = Classifier::with_defaults();
    let err = c.classify(3, 0).unwrap_err();
    assert_eq!(err.field(), Some("severity"));
    assert!(err.to_string().contains("below minimum 1"), "{}", err);
  }

  #[test]
  fn negative_rating_is_rejected_not_wrapped() {
    let c = Classifier::with_defaults();
    assert!(c.classify(-3, -4).is_err());
  }

  #[test]
  fn score_outside_table_is_rejected() {
    let c = Classifier::with_defaults();
    let err = c.classify_score(21).unwrap_err();
    assert_eq!(err.field(), Some("score"));
    assert!(c.classify_score(0).is_err());
  }

  #[test]
  fn new_rejects_invalid_table() {
    let mut config = Config::default();
    config.tiers.pop();
    assert!(Classifier::new(config).is_err());
  }

  #[test]
  fn levels_follow_table() {
    let c = Classifier::with_defaults();
    assert_eq!(c.levels(), RiskLevel::ALL.to_vec());
  }
}
