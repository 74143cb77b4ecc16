//! Host identity and OS baseline

use std::fs;
use std::path::Path;

use crate::core::error::AuditResult;
use crate::transcript::CheckContext;

pub fn run(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.section("Host & OS")?;

  let hostname = read_proc("/proc/sys/kernel/hostname").unwrap_or_else(|| "unknown".to_string());
  let kernel = read_proc("/proc/sys/kernel/osrelease").unwrap_or_else(|| "unknown".to_string());
  let os_name = fs::read_to_string("/etc/os-release")
    .ok()
    .and_then(|data| os_pretty_name(&data))
    .unwrap_or_else(|| std::env::consts::OS.to_string());

  ctx.info(format!("Hostname: {}", hostname))?;
  ctx.info(format!("OS:       {}", os_name))?;
  ctx.info(format!("Kernel:   {}", kernel))?;

  let reboot_flag = Path::new("/var/run/reboot-required");
  if reboot_flag.exists() {
    ctx.warn(format!("System indicates a reboot is required ({}).", reboot_flag.display()))?;
  }

  Ok(())
}

fn read_proc(path: &str) -> Option<String> {
  fs::read_to_string(path)
    .ok()
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
}

/// `PRETTY_NAME` from os-release data, falling back to `NAME`
fn os_pretty_name(data: &str) -> Option<String> {
  let mut name = None;
  let mut pretty = None;
  for line in data.lines() {
    let Some((key, value)) = line.split_once('=') else {
      continue;
    };
    let value = value.trim().trim_matches('"').to_string();
    match key {
      "PRETTY_NAME" => pretty = Some(value),
      "NAME" => name = Some(value),
      _ => {}
    }
  }
  pretty.filter(|v| !v.is_empty()).or(name.filter(|v| !v.is_empty()))
}
