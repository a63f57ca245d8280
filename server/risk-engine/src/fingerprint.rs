//! Stable ids for assessment records.

use chrono::{DateTime, SecondsFormat, Utc};

/// Compute a stable record id.
///
/// Key components: process + work description + hazard description + creation time.
/// Uses blake3 so the same entry gets the same id across runs.
pub fn record_id(
  process: &str,
  work_description: &str,
  hazard_description: &str,
  created_at: &DateTime<Utc>,
) -> String {
  let mut hasher = blake3::Hasher::new();
  hasher.update(process.as_bytes());
  hasher.update(b"|");
  hasher.update(work_description.as_bytes());
  hasher.update(b"|");
  hasher.update(hazard_description.as_bytes());
  hasher.update(b"|");
  hasher.update(
    created_at
      .to_rfc3339_opts(SecondsFormat::Secs, true)
      .as_bytes(),
  );

  let hex = hasher.finalize().to_hex();
  format!("ra-{}", &hex[..16])
}
