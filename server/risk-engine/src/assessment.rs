//! Session-owned record collection: the one place entries are scored and kept.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::adapter;
use crate::classifier::Classifier;
use crate::config::Config;
use crate::error::EngineError;
use crate::statistics::{self, GroupBy};
use crate::types::*;

/// One assessment session. Holds the classifier and the records entered so far.
pub struct Assessment {
  classifier: Classifier,
  records: Vec<RiskRecord>,
}

impl Assessment {
  pub fn new(config: Config) -> Result<Self, EngineError> {
    Ok(Self::with_classifier(Classifier::new(config)?))
  }

  pub fn with_defaults() -> Self {
    Self::with_classifier(Classifier::with_defaults())
  }

  pub fn with_classifier(classifier: Classifier) -> Self {
    Self {
      classifier,
      records: Vec::new(),
    }
  }

  pub fn classifier(&self) -> &Classifier {
    &self.classifier
  }

  /// Adapt, score and store one inbound entry.
  pub fn add(&mut self, raw: &InboundRecord, now: DateTime<Utc>) -> Result<&RiskRecord, EngineError> {
    let record = adapter::normalize(raw, &self.classifier, now)?;
    Ok(self.insert(record))
  }

  /// Store an already-built record, attaching (or checking) its classification.
  pub fn push(&mut self, mut record: RiskRecord) -> Result<&RiskRecord, EngineError> {
    let initial = statistics::resolve(
      "classification",
      record.classification.as_ref(),
      &record.input,
      &self.classifier,
    )?;
    record.classification = Some(initial);

    record.residual_classification = match &record.residual {
      Some(residual) => Some(statistics::resolve(
        "residual_classification",
        record.residual_classification.as_ref(),
        residual,
        &self.classifier,
      )?),
      None => None,
    };

    Ok(self.insert(record))
  }

  fn insert(&mut self, record: RiskRecord) -> &RiskRecord {
    debug!(
      id = %record.id,
      score = record.input.score(),
      level = ?record.level(),
      "record added"
    );
    let idx = self.records.len();
    self.records.push(record);
    &self.records[idx]
  }

  /// Remove the first record with `id`.
  pub fn remove(&mut self, id: &str) -> Option<RiskRecord> {
    let idx = self.records.iter().position(|r| r.id == id)?;
    debug!(id, "record removed");
    Some(self.records.remove(idx))
  }

  pub fn get(&self, id: &str) -> Option<&RiskRecord> {
    self.records.iter().find(|r| r.id == id)
  }

  pub fn records(&self) -> &[RiskRecord] {
    &self.records
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Statistics over the current records; recomputed on every call.
  pub fn summary(&self, group_by: Option<GroupBy>) -> Result<RiskStatisticsSummary, EngineError> {
    statistics::summarize(&self.records, group_by, &self.classifier)
  }
}

impl Default for Assessment {
  fn default() -> Self {
    Self::with_defaults()
  }
}
