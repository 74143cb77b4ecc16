//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// An isolated log destination for one audited process
pub struct AuditHome {
  _root: TempDir,
  pub log_dir: PathBuf,
}

impl AuditHome {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let log_dir = root.path().join("logs");
    Ok(Self { _root: root, log_dir })
  }

  /// Timestamped transcripts currently in the log dir, sorted by name
  pub fn transcripts(&self) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(&self.log_dir).context("log dir missing")? {
      let path = entry?.path();
      let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
      if name.starts_with("secaudit_") && name.ends_with(".log") {
        found.push(path);
      }
    }
    found.sort();
    Ok(found)
  }

  pub fn latest(&self) -> PathBuf {
    self.log_dir.join("latest.log")
  }
}

/// Run the secaudit binary against the given home
///
/// Does not bail on non-zero exit: findings legitimately produce codes 1 and 2,
/// so callers assert on `output.status` themselves.
pub fn run_secaudit(home: &AuditHome, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_secaudit");

  Command::new(bin)
    .args(args)
    .env("SECAUDIT_LOG_DIR", &home.log_dir)
    .output()
    .context("Failed to run secaudit")
}
