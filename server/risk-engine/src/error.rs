//! Structured error types for the risk engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  /// A rating, score or required field failed validation.
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  /// The configured domains or tier table are unusable.
  #[error("config: {0}")]
  Config(String),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("toml: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn config(msg: impl Into<String>) -> Self {
    Self::Config(msg.into())
  }

  /// Field name for validation failures, if any.
  pub fn field(&self) -> Option<&str> {
    match self {
      Self::Validation { field, .. } => Some(field),
      _ => None,
    }
  }
}
