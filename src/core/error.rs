//! Error types for secaudit with exit codes
//!
//! Findings (WARN/CRIT transcript events) are not errors. This module covers the
//! things that can actually fail: transcript I/O, subprocess plumbing, tool output
//! parsing, and check resolution. Only transcript I/O is fatal to a run.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Exit codes for secaudit
///
/// 0..=2 are the severity band derived from run totals; 3 is reserved for
/// infrastructure failures so automation can tell "host has findings" apart
/// from "the audit itself broke".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// No findings above info
  Clean = 0,
  /// At least one WARN, no CRIT
  Warnings = 1,
  /// At least one CRIT
  Critical = 2,
  /// The run infrastructure failed (transcript could not be written)
  Fatal = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for secaudit
#[derive(Debug)]
pub enum AuditError {
  /// Transcript or other I/O failure
  Io(io::Error),

  /// Log destination could not be prepared
  LogSetup { path: PathBuf, source: io::Error },

  /// A subprocess could not be started
  Spawn { command: String, source: io::Error },

  /// A subprocess outlived its deadline and was killed
  CommandTimeout { command: String, limit: Duration },

  /// Tool output was not the JSON we expected
  Json(serde_json::Error),

  /// A registered check has no implementation behind its locator
  UnresolvedCheck { locator: String },
}

impl AuditError {
  /// Contextual help for errors that end the run
  pub fn help_message(&self) -> Option<String> {
    match self {
      AuditError::Io(_) => {
        Some("The transcript could not be written. Check SECAUDIT_LOG_DIR and its permissions.".to_string())
      }
      AuditError::LogSetup { path, .. } => Some(format!(
        "Pick a writable log directory via SECAUDIT_LOG_DIR (current target: {}).",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for AuditError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AuditError::Io(e) => write!(f, "I/O error: {}", e),
      AuditError::LogSetup { path, source } => {
        write!(f, "Cannot prepare log destination {}: {}", path.display(), source)
      }
      AuditError::Spawn { command, source } => {
        write!(f, "Failed to run '{}': {}", command, source)
      }
      AuditError::CommandTimeout { command, limit } => {
        write!(f, "'{}' did not finish within {}s and was killed", command, limit.as_secs())
      }
      AuditError::Json(e) => write!(f, "JSON error: {}", e),
      AuditError::UnresolvedCheck { locator } => {
        write!(f, "No check implementation registered for '{}'", locator)
      }
    }
  }
}

impl std::error::Error for AuditError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      AuditError::Io(e) => Some(e),
      AuditError::LogSetup { source, .. } => Some(source),
      AuditError::Spawn { source, .. } => Some(source),
      AuditError::Json(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for AuditError {
  fn from(err: io::Error) -> Self {
    AuditError::Io(err)
  }
}

impl From<serde_json::Error> for AuditError {
  fn from(err: serde_json::Error) -> Self {
    AuditError::Json(err)
  }
}

/// Result type alias for secaudit
pub type AuditResult<T> = Result<T, AuditError>;

/// Pretty-print a fatal error to stderr with help text
pub fn print_error(error: &AuditError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
