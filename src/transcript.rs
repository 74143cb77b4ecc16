//! Duplicated run transcript: interactive console plus a persisted log file
//!
//! Every logical line goes to both surfaces in the same call: stdout gets ANSI
//! styling when enabled, the file always gets the plain text. Writes flush
//! immediately so an interrupted run still leaves a complete record up to the
//! failure point. The file handle closes exactly once, when the value drops.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;

const RULE_WIDTH: usize = 50;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Severity of a single finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  /// Observation, never affects the exit code
  Info,
  /// Should be addressed, exit code 1 territory
  Warn,
  /// Must be addressed, exit code 2 territory
  Crit,
}

impl Severity {
  /// Bracketed line prefix, identical on both surfaces
  pub fn tag(self) -> &'static str {
    match self {
      Severity::Info => "[INFO]",
      Severity::Warn => "[WARN]",
      Severity::Crit => "[CRIT]",
    }
  }

  /// Console tint for the tag
  fn style(self) -> anstyle::Style {
    let color = match self {
      Severity::Info => anstyle::AnsiColor::Blue,
      Severity::Warn => anstyle::AnsiColor::Yellow,
      Severity::Crit => anstyle::AnsiColor::Red,
    };
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(color)))
  }
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Severity::Info => write!(f, "INFO"),
      Severity::Warn => write!(f, "WARN"),
      Severity::Crit => write!(f, "CRIT"),
    }
  }
}

/// Tee sink for one audit run
pub struct Transcript {
  file: File,
  color: bool,
  debug: bool,
}

impl Transcript {
  /// Open the persisted copy in append mode
  pub fn open(path: &Path, color: bool, debug: bool) -> io::Result<Self> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Transcript { file, color, debug })
  }

  /// One line to both surfaces: styled variant to the console when styling is
  /// on, plain text to the file, each flushed before returning
  fn emit(&mut self, plain: &str, styled: Option<&str>) -> io::Result<()> {
    let mut out = io::stdout().lock();
    match styled {
      Some(s) if self.color => writeln!(out, "{}", s)?,
      _ => writeln!(out, "{}", plain)?,
    }
    out.flush()?;
    writeln!(self.file, "{}", plain)?;
    self.file.flush()
  }

  /// Run header: framed title, destination paths, start timestamp
  pub fn banner(&mut self, title: &str, base_dir: &Path, log_file: &Path) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    self.emit(&rule, None)?;
    self.emit(title, None)?;
    self.emit(&format!("Base dir: {}", base_dir.display()), None)?;
    self.emit(&format!("Log file: {}", log_file.display()), None)?;
    self.emit(&rule, None)?;
    self.emit("", None)?;
    self.emit(&format!("Starting run at: {}", timestamp()), None)?;
    self.emit("", None)
  }

  /// Visual break before a check starts
  pub fn separator(&mut self, label: &str) -> io::Result<()> {
    self.emit("", None)?;
    self.emit(&format!("▶ Running check: {}", label), None)?;
    self.emit(&"-".repeat(RULE_WIDTH), None)
  }

  /// Bold sub-heading inside a check
  pub fn section(&mut self, title: &str) -> io::Result<()> {
    let line = format!("== {} ==", title);
    let bold = anstyle::Style::new().bold();
    let styled = format!("{}{}{}", bold.render(), line, bold.render_reset());
    self.emit(&line, Some(&styled))
  }

  /// Tagged finding line; only the tag is tinted on the console
  pub fn event(&mut self, severity: Severity, msg: &str) -> io::Result<()> {
    let plain = format!("{} {}", severity.tag(), msg);
    let style = severity.style();
    let styled = format!("{}{}{} {}", style.render(), severity.tag(), style.render_reset(), msg);
    self.emit(&plain, Some(&styled))
  }

  /// Per-check tally line
  pub fn check_summary(&mut self, label: &str, warn: u32, crit: u32) -> io::Result<()> {
    self.emit(&format!("Summary ({}): WARN={}, CRIT={}", label, warn, crit), None)
  }

  /// Run footer with accumulated totals and finish timestamp
  pub fn overall_summary(&mut self, total_warn: u32, total_crit: u32) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    self.emit("", None)?;
    self.emit(&rule, None)?;
    self.emit("Overall summary:", None)?;
    self.emit(&format!("  Checks with WARN : {}", total_warn), None)?;
    self.emit(&format!("  Checks with CRIT : {}", total_crit), None)?;
    self.emit(&format!("  Finished at: {}", timestamp()), None)?;
    self.emit(&rule, None)
  }

  /// Failure detail plus its cause chain; no-op unless debugging is on
  pub fn debug_trace(&mut self, title: &str, error: &(dyn std::error::Error + 'static)) -> io::Result<()> {
    if !self.debug {
      return Ok(());
    }
    self.emit(&format!("[DEBUG] {}: {}", title, error), None)?;
    let mut cause = error.source();
    while let Some(err) = cause {
      self.emit(&format!("[DEBUG]   caused by: {}", err), None)?;
      cause = err.source();
    }
    Ok(())
  }
}

/// Severity counter scoped to exactly one check invocation
///
/// Lent to the check as its only reporting surface. Warn and crit events bump
/// the matching count; info never does. The orchestrator reads the final
/// tallies after the check returns, whether it succeeded or failed.
pub struct CheckContext<'t> {
  label: String,
  warn_count: u32,
  crit_count: u32,
  transcript: &'t mut Transcript,
}

impl<'t> CheckContext<'t> {
  pub fn new(label: &str, transcript: &'t mut Transcript) -> Self {
    CheckContext {
      label: label.to_string(),
      warn_count: 0,
      crit_count: 0,
      transcript,
    }
  }

  pub fn section(&mut self, title: &str) -> io::Result<()> {
    self.transcript.section(title)
  }

  pub fn info(&mut self, msg: impl AsRef<str>) -> io::Result<()> {
    self.transcript.event(Severity::Info, msg.as_ref())
  }

  pub fn warn(&mut self, msg: impl AsRef<str>) -> io::Result<()> {
    self.transcript.event(Severity::Warn, msg.as_ref())?;
    self.warn_count += 1;
    Ok(())
  }

  pub fn crit(&mut self, msg: impl AsRef<str>) -> io::Result<()> {
    self.transcript.event(Severity::Crit, msg.as_ref())?;
    self.crit_count += 1;
    Ok(())
  }

  /// Final `(warn, crit)` tallies for this check
  pub fn counts(&self) -> (u32, u32) {
    (self.warn_count, self.crit_count)
  }

  /// Debug detail for a failure of this check
  pub fn trace_failure(&mut self, error: &(dyn std::error::Error + 'static)) -> io::Result<()> {
    let title = format!("{} check", self.label);
    self.transcript.debug_trace(&title, error)
  }
}

fn timestamp() -> String {
  Local::now().format(TIMESTAMP_FORMAT).to_string()
}
