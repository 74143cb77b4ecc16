//! Executes one audit run end to end
//!
//! A failing check never stops the run. Its error becomes a WARN finding on
//! that check's own tally and the loop moves on, so the transcript always ends
//! with totals covering every registered check. Only transcript I/O aborts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::checks::{self, CheckDescriptor, CheckFn};
use crate::core::config::RunConfig;
use crate::core::error::{AuditError, AuditResult, ExitCode};
use crate::transcript::{CheckContext, Transcript};

const BANNER_TITLE: &str = "Host Security Audit";
const FILE_STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
const LATEST_NAME: &str = "latest.log";

/// Findings accumulated over the whole run, summed from each check's final
/// tally (events, not checks)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunTotals {
  pub total_warn: u32,
  pub total_crit: u32,
}

impl RunTotals {
  /// Process exit code derived from the worst severity present
  pub fn exit_code(&self) -> ExitCode {
    if self.total_crit > 0 {
      ExitCode::Critical
    } else if self.total_warn > 0 {
      ExitCode::Warnings
    } else {
      ExitCode::Clean
    }
  }

  fn absorb(&mut self, warn: u32, crit: u32) {
    self.total_warn += warn;
    self.total_crit += crit;
  }
}

/// Run the built-in registry
pub fn run(config: &RunConfig) -> AuditResult<RunTotals> {
  run_with(checks::DEFAULT_CHECKS, config)
}

/// Run the given checks in order against one shared transcript
pub fn run_with(descriptors: &[CheckDescriptor], config: &RunConfig) -> AuditResult<RunTotals> {
  let log_file = prepare_log_file(config)?;
  let mut transcript = Transcript::open(&log_file, config.color, config.debug)
    .map_err(|source| AuditError::LogSetup { path: log_file.clone(), source })?;

  transcript.banner(BANNER_TITLE, &config.base_dir, &log_file)?;
  let totals = run_checks(&mut transcript, descriptors, checks::resolve)?;
  transcript.overall_summary(totals.total_warn, totals.total_crit)?;
  Ok(totals)
}

fn run_checks(
  transcript: &mut Transcript,
  descriptors: &[CheckDescriptor],
  resolve: fn(&str) -> Option<CheckFn>,
) -> AuditResult<RunTotals> {
  let mut totals = RunTotals::default();

  for descriptor in descriptors {
    transcript.separator(descriptor.label)?;
    let mut ctx = CheckContext::new(descriptor.label, transcript);
    let outcome = match resolve(descriptor.locator) {
      Some(check) => check(&mut ctx),
      None => Err(AuditError::UnresolvedCheck {
        locator: descriptor.locator.to_string(),
      }),
    };
    if let Err(err) = outcome {
      ctx.warn(format!("Check '{}' failed: {}", descriptor.label, err))?;
      ctx.trace_failure(&err)?;
    }
    let (warn, crit) = ctx.counts();
    transcript.check_summary(descriptor.label, warn, crit)?;
    totals.absorb(warn, crit);
  }

  Ok(totals)
}

/// Create the log directory, pick the timestamped transcript path and repoint
/// the `latest.log` alias at it
fn prepare_log_file(config: &RunConfig) -> AuditResult<PathBuf> {
  fs::create_dir_all(&config.log_dir).map_err(|source| AuditError::LogSetup {
    path: config.log_dir.clone(),
    source,
  })?;
  let name = format!("secaudit_{}.log", Local::now().format(FILE_STAMP_FORMAT));
  point_latest(&config.log_dir, &name)?;
  Ok(config.log_dir.join(name))
}

fn point_latest(log_dir: &Path, file_name: &str) -> AuditResult<()> {
  let latest = log_dir.join(LATEST_NAME);
  if fs::symlink_metadata(&latest).is_ok() {
    fs::remove_file(&latest).map_err(|source| AuditError::LogSetup {
      path: latest.clone(),
      source,
    })?;
  }
  link_latest(&latest, file_name).map_err(|source| AuditError::LogSetup { path: latest, source })
}

/// Relative symlink within the log directory; a plain file naming the
/// transcript where symlinks are unavailable
#[cfg(unix)]
fn link_latest(latest: &Path, file_name: &str) -> io::Result<()> {
  match std::os::unix::fs::symlink(file_name, latest) {
    Ok(()) => Ok(()),
    Err(_) => fs::write(latest, file_name),
  }
}

#[cfg(not(unix))]
fn link_latest(latest: &Path, file_name: &str) -> io::Result<()> {
  fs::write(latest, file_name)
}
