//! Tests for the `--list-checks` flag

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_list_checks_prints_registry_in_order() -> Result<()> {
  let home = AuditHome::new()?;

  let output = run_secaudit(&home, &["--list-checks"])?;
  assert_eq!(output.status.code(), Some(0));

  let stdout = String::from_utf8_lossy(&output.stdout);
  let lines: Vec<&str> = stdout.lines().collect();
  assert_eq!(
    lines,
    vec![
      "OS: checks::os",
      "updates: checks::updates",
      "filesystem: checks::filesystem",
      "network/firewall: checks::network",
      "logging/audit: checks::logging",
      "SSH: checks::ssh",
      "sudo/users: checks::sudo",
      "Docker: checks::docker",
      "Kubernetes: checks::kubernetes",
    ]
  );

  Ok(())
}

#[test]
fn test_list_checks_writes_no_transcript() -> Result<()> {
  let home = AuditHome::new()?;

  run_secaudit(&home, &["--list-checks"])?;

  assert!(!home.log_dir.exists());
  Ok(())
}
