//! Binary entrypoint: read JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is an InboundRecord. Output lines are either:
//! - A scored RiskRecord (unless `--summary-only`)
//! - An ErrorOutput (when input validation fails)
//!
//! After the last input line a single `{"summary": ...}` line is written.
//! Logs go to stderr so stdout stays machine-readable.

use chrono::Utc;
use clap::Parser;
use risk_engine::stream::{self, StreamOptions};
use risk_engine::{Assessment, EngineError, GroupBy};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "risk-engine", version, about = "Score risk assessment entries and summarize them")]
struct Args {
  /// TOML file overriding rating domains and the tier table.
  #[arg(long)]
  config: Option<PathBuf>,
  /// Add a per-level breakdown grouped by this record field.
  #[arg(long)]
  group_by: Option<GroupBy>,
  /// Substitute the domain minimum for missing or non-numeric ratings.
  #[arg(long, default_value_t = false)]
  lenient: bool,
  /// Only write the final summary line.
  #[arg(long, default_value_t = false)]
  summary_only: bool,
}

fn main() {
  let args = Args::parse();
  init_tracing();

  if let Err(e) = run(&args) {
    error!(error = %e, "risk-engine failed");
    let _ = writeln!(io::stderr(), "risk-engine error: {}", e);
    std::process::exit(1);
  }
}

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .with_target(false)
    .init();
}

fn run(args: &Args) -> Result<(), EngineError> {
  let config = stream::resolve_config(args.config.as_deref(), args.lenient)?;
  let mut assessment = Assessment::new(config)?;
  let options = StreamOptions {
    group_by: args.group_by,
    summary_only: args.summary_only,
  };

  let stdin = io::stdin();
  let stdout = io::stdout();
  let out = io::BufWriter::new(stdout.lock());
  stream::run(&mut assessment, stdin.lock(), out, &options, Utc::now)?;
  Ok(())
}
