//! Subprocess plumbing for checks
//!
//! Checks shell out to host tooling (ss, ufw, docker, kubectl, ...) with
//! captured output; nothing inherits the console. The deadline variant kills
//! children that hang on a wedged daemon, with both pipes drained on
//! background threads so a chatty child cannot stall the poll loop.

use std::env;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::core::error::{AuditError, AuditResult};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Captured result of a finished subprocess
#[derive(Debug)]
pub struct CommandOutput {
  pub exit_code: i32,
  pub stdout: String,
  pub stderr: String,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.exit_code == 0
  }

  /// Stdout lines that contain more than whitespace, in order
  pub fn stdout_lines(&self) -> Vec<&str> {
    self.stdout.lines().filter(|l| !l.trim().is_empty()).collect()
  }
}

/// Run a command to completion and capture everything
pub fn run_command(program: &str, args: &[&str]) -> AuditResult<CommandOutput> {
  let rendered = render(program, args);
  let output = Command::new(program)
    .args(args)
    .stdin(Stdio::null())
    .output()
    .map_err(|source| AuditError::Spawn {
      command: rendered,
      source,
    })?;

  Ok(CommandOutput {
    exit_code: output.status.code().unwrap_or(-1),
    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
  })
}

/// Run a command with a hard deadline; the child is killed at the limit
pub fn run_command_with_timeout(program: &str, args: &[&str], limit: Duration) -> AuditResult<CommandOutput> {
  let rendered = render(program, args);
  let mut child = Command::new(program)
    .args(args)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .map_err(|source| AuditError::Spawn {
      command: rendered.clone(),
      source,
    })?;

  let stdout = drain(child.stdout.take());
  let stderr = drain(child.stderr.take());

  let deadline = Instant::now() + limit;
  let status = loop {
    match child.try_wait() {
      Ok(Some(status)) => break status,
      Ok(None) => {
        if Instant::now() >= deadline {
          let _ = child.kill();
          let _ = child.wait();
          return Err(AuditError::CommandTimeout { command: rendered, limit });
        }
        thread::sleep(POLL_INTERVAL);
      }
      Err(source) => {
        let _ = child.kill();
        let _ = child.wait();
        return Err(AuditError::Io(source));
      }
    }
  };

  Ok(CommandOutput {
    exit_code: status.code().unwrap_or(-1),
    stdout: stdout.join().unwrap_or_default(),
    stderr: stderr.join().unwrap_or_default(),
  })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
  thread::spawn(move || {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
      let _ = pipe.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
  })
}

/// Whether `name` resolves to an executable on PATH
pub fn command_exists(name: &str) -> bool {
  let Some(paths) = env::var_os("PATH") else {
    return false;
  };
  env::split_paths(&paths).any(|dir| is_executable(&dir.join(name)))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
  use std::os::unix::fs::PermissionsExt;
  path
    .metadata()
    .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
    .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
  path.is_file()
}

fn render(program: &str, args: &[&str]) -> String {
  if args.is_empty() {
    program.to_string()
  } else {
    format!("{} {}", program, args.join(" "))
  }
}
