//! Boundary adapter: turn raw form submissions into scored RiskRecords.
//!
//! The form layer sends ratings as numbers, numeric strings or nothing at all.
//! Coercion happens here and only here, so the classifier keeps a strict contract.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::warn;

use crate::classifier::Classifier;
use crate::config::RatingRange;
use crate::error::EngineError;
use crate::fingerprint;
use crate::tier::RiskLevel;
use crate::types::*;

/// Coerce a raw rating value into an integer.
///
/// Integers and integral numeric strings pass through untouched (range checks
/// belong to the classifier). Missing or non-numeric values fail in strict mode;
/// otherwise they become `range.min` and the substitution is logged.
pub fn coerce_rating(
  field: &str,
  raw: Option<&Value>,
  range: RatingRange,
  strict: bool,
) -> Result<i64, EngineError> {
  let reason = match raw {
    None | Some(Value::Null) => "missing".to_string(),
    Some(Value::Number(n)) => match integral(n) {
      Some(v) => return Ok(v),
      None => format!("expected an integer, got {}", n),
    },
    Some(Value::String(s)) if s.trim().is_empty() => "missing".to_string(),
    Some(Value::String(s)) => match s.trim().parse::<i64>() {
      Ok(v) => return Ok(v),
      Err(_) => format!("expected an integer, got {:?}", s),
    },
    Some(other) => format!("expected an integer, got {}", other),
  };

  if strict {
    return Err(EngineError::validation(field, &reason));
  }

  let substitute = i64::from(range.min);
  let shown = raw
    .map(serde_json::Value::to_string)
    .unwrap_or_else(|| "null".to_string());
  warn!(
    field,
    raw = %shown,
    substitute,
    "rating coerced to domain minimum"
  );
  Ok(substitute)
}

fn integral(n: &serde_json::Number) -> Option<i64> {
  if let Some(v) = n.as_i64() {
    return Some(v);
  }
  match n.as_f64() {
    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(f as i64),
    _ => None,
  }
}

/// Validate, coerce and classify an inbound entry into a RiskRecord.
///
/// `now` stamps entries that arrive without `created_at`.
pub fn normalize(
  raw: &InboundRecord,
  classifier: &Classifier,
  now: DateTime<Utc>,
) -> Result<RiskRecord, EngineError> {
  // Validate required strings are non-empty
  if raw.work_description.trim().is_empty() {
    return Err(EngineError::validation("work_description", "must not be empty"));
  }
  if raw.hazard_description.trim().is_empty() {
    return Err(EngineError::validation("hazard_description", "must not be empty"));
  }

  let (input, classification) = rate(
    classifier,
    ("likelihood", raw.likelihood.as_ref()),
    ("severity", raw.severity.as_ref()),
  )?;

  // A stored level must agree with the ratings it was derived from.
  if let Some(stored) = raw.level.as_deref().filter(|s| !s.trim().is_empty()) {
    let level = RiskLevel::from_str_loose(stored)
      .ok_or_else(|| EngineError::validation("level", &format!("unknown level {:?}", stored)))?;
    if level != classification.level {
      return Err(EngineError::validation(
        "level",
        &format!(
          "{} disagrees with score {} ({})",
          level, classification.score, classification.level
        ),
      ));
    }
  }

  let present = |v: &Option<Value>| !matches!(v, None | Some(Value::Null));
  let has_residual = present(&raw.residual_likelihood) || present(&raw.residual_severity);
  let (residual, residual_classification) = if has_residual {
    let (input, classification) = rate(
      classifier,
      ("residual_likelihood", raw.residual_likelihood.as_ref()),
      ("residual_severity", raw.residual_severity.as_ref()),
    )?;
    (Some(input), Some(classification))
  } else {
    (None, None)
  };

  let created_at = match raw.created_at.as_deref().filter(|s| !s.trim().is_empty()) {
    Some(ts) => DateTime::parse_from_rfc3339(ts.trim())
      .map_err(|e| EngineError::validation("created_at", &format!("invalid RFC3339: {}", e)))?
      .with_timezone(&Utc),
    None => now,
  };

  let improvement_date = parse_date("improvement_date", raw.improvement_date.as_deref())?;
  let completion_date = parse_date("completion_date", raw.completion_date.as_deref())?;

  let process = raw.process.trim().to_string();
  let work_description = raw.work_description.trim().to_string();
  let hazard_description = raw.hazard_description.trim().to_string();
  let id = fingerprint::record_id(&process, &work_description, &hazard_description, &created_at);

  Ok(RiskRecord {
    id,
    process,
    work_description,
    hazard_type: raw.hazard_type.trim().to_string(),
    hazard_description,
    cause: raw.cause.trim().to_string(),
    legal_basis: raw.legal_basis.trim().to_string(),
    current_measures: raw.current_measures.trim().to_string(),
    planned_measures: raw.planned_measures.trim().to_string(),
    responsible: raw.responsible.trim().to_string(),
    input,
    classification: Some(classification),
    residual,
    residual_classification,
    improvement_date,
    completion_date,
    created_at,
  })
}

fn rate(
  classifier: &Classifier,
  likelihood: (&str, Option<&Value>),
  severity: (&str, Option<&Value>),
) -> Result<(RiskInput, RiskClassification), EngineError> {
  let config = classifier.config();
  let l = coerce_rating(likelihood.0, likelihood.1, config.likelihood, config.strict)?;
  let s = coerce_rating(severity.0, severity.1, config.severity, config.strict)?;

  // Re-label domain errors with the caller's field names (e.g. residual_*).
  let classification = classifier.classify(l, s).map_err(|e| match e {
    EngineError::Validation { field, reason } if field == "likelihood" => {
      EngineError::validation(likelihood.0, &reason)
    }
    EngineError::Validation { field, reason } if field == "severity" => {
      EngineError::validation(severity.0, &reason)
    }
    other => other,
  })?;

  let input = RiskInput::new(to_rating(likelihood.0, l)?, to_rating(severity.0, s)?);
  Ok((input, classification))
}

fn to_rating(field: &str, value: i64) -> Result<u32, EngineError> {
  u32::try_from(value)
    .map_err(|_| EngineError::validation(field, &format!("{} is not a valid rating", value)))
}

fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, EngineError> {
  match raw.map(str::trim).filter(|s| !s.is_empty()) {
    Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
      .map(Some)
      .map_err(|e| EngineError::validation(field, &format!("expected YYYY-MM-DD: {}", e))),
    None => Ok(None),
  }
}
