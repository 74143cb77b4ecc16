//! World-writable directories and SUID/SGID binaries

use std::path::Path;

use crate::core::error::AuditResult;
use crate::exec;
use crate::transcript::CheckContext;

const LIST_LIMIT: usize = 30;

pub fn run(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.section("Filesystem & permissions")?;
  world_writable(ctx)?;
  suid_sgid(ctx)
}

fn world_writable(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.info("Scanning for world-writable dirs without sticky bit under /tmp /var/tmp /home...")?;
  if !exec::command_exists("find") {
    ctx.warn("find not available; skipping world-writable directory scan.")?;
    return Ok(());
  }

  let targets = existing_paths(&["/tmp", "/var/tmp", "/home"]);
  if targets.is_empty() {
    ctx.info("Target directories missing; skipping scan.")?;
    return Ok(());
  }

  let mut args = targets;
  args.extend(["-xdev", "-type", "d", "-perm", "-0002", "!", "-perm", "-1000"]);
  let result = match exec::run_command("find", &args) {
    Ok(result) => result,
    Err(err) => {
      ctx.warn(format!("Failed to run find for world-writable dirs: {}", err))?;
      return Ok(());
    }
  };

  let lines = result.stdout_lines();
  if lines.is_empty() {
    ctx.info("No obvious world-writable dirs without sticky bit in target paths.")?;
  } else {
    ctx.warn("World-writable dirs without sticky bit (first 30):")?;
    for line in lines.iter().take(LIST_LIMIT) {
      ctx.info(format!("  {}", line))?;
    }
  }
  Ok(())
}

fn suid_sgid(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.info("Scanning for SUID/SGID binaries in /bin /sbin /usr/bin /usr/sbin...")?;
  if !exec::command_exists("find") {
    ctx.warn("find not available; skipping SUID/SGID scan.")?;
    return Ok(());
  }

  let targets = existing_paths(&["/bin", "/sbin", "/usr/bin", "/usr/sbin"]);
  if targets.is_empty() {
    ctx.info("Standard binary directories missing; skipping scan.")?;
    return Ok(());
  }

  let mut args = targets;
  args.extend(["-xdev", "(", "-perm", "-4000", "-o", "-perm", "-2000", ")", "-type", "f"]);
  let result = match exec::run_command("find", &args) {
    Ok(result) => result,
    Err(err) => {
      ctx.warn(format!("Failed to run find for SUID/SGID binaries: {}", err))?;
      return Ok(());
    }
  };

  let binaries = result.stdout_lines();
  ctx.info(format!("Found {} SUID/SGID binaries in standard paths.", binaries.len()))?;

  let custom = custom_prefixed(&binaries);
  if !custom.is_empty() {
    ctx.warn("SUID/SGID binaries in /usr/local or /opt (review carefully):")?;
    for line in custom.iter().take(LIST_LIMIT) {
      ctx.info(format!("  {}", line))?;
    }
  }
  Ok(())
}

fn existing_paths(candidates: &[&'static str]) -> Vec<&'static str> {
  candidates
    .iter()
    .copied()
    .filter(|p| Path::new(p).exists())
    .collect()
}

/// Binaries under the add-on prefixes, where a setuid bit is least expected
fn custom_prefixed<'a>(binaries: &[&'a str]) -> Vec<&'a str> {
  binaries
    .iter()
    .copied()
    .filter(|l| l.starts_with("/usr/local") || l.starts_with("/opt"))
    .collect()
}
