//! Tests for a full audit run against the host

use crate::helpers::*;
use anyhow::{Context, Result};

const CHECK_LABELS: [&str; 9] = [
  "OS",
  "updates",
  "filesystem",
  "network/firewall",
  "logging/audit",
  "SSH",
  "sudo/users",
  "Docker",
  "Kubernetes",
];

#[test]
fn test_run_writes_complete_transcript() -> Result<()> {
  let home = AuditHome::new()?;

  let output = run_secaudit(&home, &[])?;
  let code = output.status.code().context("no exit code")?;
  assert!((0..=2).contains(&code), "unexpected exit code {}", code);

  let transcripts = home.transcripts()?;
  assert_eq!(transcripts.len(), 1);
  let contents = std::fs::read_to_string(&transcripts[0])?;

  assert!(contents.starts_with(&"=".repeat(50)));
  assert!(contents.contains("Host Security Audit"));
  assert!(contents.contains("Starting run at: "));
  let mut cursor = 0;
  for label in CHECK_LABELS {
    let pos = contents
      .find(&format!("▶ Running check: {}", label))
      .with_context(|| format!("missing separator for {}", label))?;
    assert!(pos >= cursor, "check '{}' ran out of registry order", label);
    cursor = pos;
    assert!(
      contents.contains(&format!("Summary ({}): WARN=", label)),
      "missing summary for {}",
      label
    );
  }
  assert!(contents.contains("Overall summary:"));
  assert!(contents.contains("  Finished at: "));
  assert!(!contents.contains('\u{1b}'), "transcript file must stay plain");

  Ok(())
}

#[test]
fn test_exit_code_matches_recorded_totals() -> Result<()> {
  let home = AuditHome::new()?;

  let output = run_secaudit(&home, &[])?;
  let code = output.status.code().context("no exit code")?;

  let contents = std::fs::read_to_string(&home.transcripts()?[0])?;
  let warn = extract_total(&contents, "Checks with WARN")?;
  let crit = extract_total(&contents, "Checks with CRIT")?;

  let expected = if crit > 0 {
    2
  } else if warn > 0 {
    1
  } else {
    0
  };
  assert_eq!(code, expected);

  Ok(())
}

#[test]
fn test_stdout_mirrors_transcript_when_piped() -> Result<()> {
  let home = AuditHome::new()?;

  let output = run_secaudit(&home, &[])?;

  let stdout = String::from_utf8_lossy(&output.stdout);
  let contents = std::fs::read_to_string(&home.transcripts()?[0])?;
  assert_eq!(stdout, contents);

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_latest_aliases_newest_transcript() -> Result<()> {
  let home = AuditHome::new()?;

  run_secaudit(&home, &[])?;

  let target = std::fs::read_link(home.latest())?;
  assert!(target.is_relative());
  let name = target.to_string_lossy();
  assert!(name.starts_with("secaudit_") && name.ends_with(".log"));
  assert!(home.log_dir.join(&target).exists());

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_second_run_repoints_latest() -> Result<()> {
  let home = AuditHome::new()?;

  run_secaudit(&home, &[])?;
  let first = home.transcripts()?;
  assert_eq!(first.len(), 1);

  // File stamps have one-second granularity; cross it so the second run
  // gets its own transcript instead of appending to the first.
  std::thread::sleep(std::time::Duration::from_millis(1100));
  run_secaudit(&home, &[])?;

  let transcripts = home.transcripts()?;
  assert_eq!(transcripts.len(), 2);
  let newest = transcripts.last().context("no transcripts")?;
  assert_ne!(newest, &first[0]);

  let target = std::fs::read_link(home.latest())?;
  assert_eq!(Some(target.as_os_str()), newest.file_name());

  Ok(())
}

#[test]
fn test_unpreparable_log_dir_exits_fatal() -> Result<()> {
  let root = tempfile::TempDir::new()?;
  let blocker = root.path().join("not-a-dir");
  std::fs::write(&blocker, "occupied")?;

  let bin = env!("CARGO_BIN_EXE_secaudit");
  let output = std::process::Command::new(bin)
    .env("SECAUDIT_LOG_DIR", &blocker)
    .output()?;

  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("Cannot prepare log destination"));
  assert!(stderr.contains("SECAUDIT_LOG_DIR"));

  Ok(())
}

fn extract_total(contents: &str, key: &str) -> Result<u32> {
  let line = contents
    .lines()
    .map(str::trim_start)
    .find(|l| l.starts_with(key))
    .with_context(|| format!("missing '{}' line", key))?;
  let (_, value) = line.rsplit_once(':').context("malformed totals line")?;
  Ok(value.trim().parse()?)
}
