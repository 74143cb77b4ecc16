//! Run configuration, resolved from the environment exactly once at startup

use std::env;
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Environment variable overriding the log directory
pub const ENV_LOG_DIR: &str = "SECAUDIT_LOG_DIR";

/// Environment variable enabling debug traces for failed checks
pub const ENV_DEBUG: &str = "SECAUDIT_DEBUG";

/// Settings for one audit run
///
/// Resolved once in `from_env` and passed by reference afterwards; nothing
/// re-reads the environment mid-run.
#[derive(Debug, Clone)]
pub struct RunConfig {
  /// Directory receiving timestamped transcripts and the `latest.log` alias
  pub log_dir: PathBuf,
  /// Install root, shown in the run banner
  pub base_dir: PathBuf,
  /// Emit `[DEBUG]` traces when a check fails
  pub debug: bool,
  /// Style the interactive surface with ANSI colors
  pub color: bool,
}

impl RunConfig {
  pub fn from_env() -> Self {
    let base_dir = install_root();
    let log_dir = resolve_log_dir(env::var_os(ENV_LOG_DIR), &base_dir);
    RunConfig {
      log_dir,
      base_dir,
      debug: debug_enabled(env::var(ENV_DEBUG).ok().as_deref()),
      color: std::io::stdout().is_terminal(),
    }
  }
}

/// Directory containing the running executable, or `.` when the executable
/// path cannot be resolved
fn install_root() -> PathBuf {
  env::current_exe()
    .ok()
    .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
    .unwrap_or_else(|| PathBuf::from("."))
}

fn resolve_log_dir(raw: Option<OsString>, base_dir: &Path) -> PathBuf {
  match raw {
    Some(dir) if !dir.is_empty() => PathBuf::from(dir),
    _ => base_dir.join("logs"),
  }
}

/// Anything except unset, empty, `0` or `false` switches debugging on
fn debug_enabled(raw: Option<&str>) -> bool {
  match raw {
    None => false,
    Some(v) => {
      let v = v.trim();
      !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false")
    }
  }
}
