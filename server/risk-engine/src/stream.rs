//! JSON-lines driver behind the binary: entries in, scored records or errors
//! out, one summary line once input is exhausted.

use chrono::{DateTime, Utc};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::info;

use crate::assessment::Assessment;
use crate::config::Config;
use crate::error::EngineError;
use crate::statistics::GroupBy;
use crate::types::{ErrorOutput, InboundRecord, SummaryOutput};

/// Output switches for [`run`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamOptions {
  /// Add a per-level breakdown grouped by this record field.
  pub group_by: Option<GroupBy>,
  /// Only write the final summary line.
  pub summary_only: bool,
}

/// Line counts from one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamReport {
  pub accepted: usize,
  pub rejected: usize,
}

/// Config from `path` (or defaults); `lenient` forces non-strict coercion.
pub fn resolve_config(path: Option<&Path>, lenient: bool) -> Result<Config, EngineError> {
  let mut config = match path {
    Some(path) => Config::load(path)?,
    None => Config::default(),
  };
  if lenient {
    config.strict = false;
  }
  Ok(config)
}

/// Process every line of `input`, writing JSON lines to `out`.
///
/// Invalid lines produce an [`ErrorOutput`] and processing continues. `clock`
/// stamps entries that arrive without `created_at`.
pub fn run<R, W, C>(
  assessment: &mut Assessment,
  input: R,
  mut out: W,
  options: &StreamOptions,
  mut clock: C,
) -> Result<StreamReport, EngineError>
where
  R: BufRead,
  W: Write,
  C: FnMut() -> DateTime<Utc>,
{
  let mut report = StreamReport::default();

  for line in input.lines() {
    let line = line?;

    // Skip blank lines.
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    // Parse inbound record.
    let raw: InboundRecord = match serde_json::from_str(trimmed) {
      Ok(v) => v,
      Err(e) => {
        report.rejected += 1;
        write_line(&mut out, &ErrorOutput::new(format!("json parse: {}", e)))?;
        continue;
      }
    };

    match assessment.add(&raw, clock()) {
      Ok(record) => {
        report.accepted += 1;
        if !options.summary_only {
          write_line(&mut out, record)?;
        }
      }
      Err(e) => {
        report.rejected += 1;
        let err = match &e {
          EngineError::Validation { field, reason } => {
            ErrorOutput::new(reason.clone()).with_field(field.clone())
          }
          _ => ErrorOutput::new(e.to_string()),
        };
        write_line(&mut out, &err)?;
      }
    }
  }

  let summary = assessment.summary(options.group_by)?;
  write_line(&mut out, &SummaryOutput { summary })?;
  out.flush()?;

  info!(accepted = report.accepted, rejected = report.rejected, "input exhausted");
  Ok(report)
}

fn write_line<W: Write, T: serde::Serialize + ?Sized>(out: &mut W, value: &T) -> Result<(), EngineError> {
  serde_json::to_writer(&mut *out, value)?;
  writeln!(out)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap()
  }

  #[test]
  fn blank_lines_are_skipped() {
    let mut session = Assessment::with_defaults();
    let mut out = Vec::new();
    let report = run(&mut session, "\n   \n".as_bytes(), &mut out, &StreamOptions::default(), clock).unwrap();
    assert_eq!(report, StreamReport::default());

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("{\"summary\":"));
  }

  #[test]
  fn lenient_flag_overrides_defaults() {
    assert!(resolve_config(None, false).unwrap().strict);
    assert!(!resolve_config(None, true).unwrap().strict);
  }
}
