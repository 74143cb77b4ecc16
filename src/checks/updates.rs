//! Pending package updates, graded by the distribution's security metadata

use crate::core::error::AuditResult;
use crate::exec;
use crate::transcript::CheckContext;

const LIST_LIMIT: usize = 20;

pub fn run(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.section("Package updates")?;

  if exec::command_exists("apt-get") {
    apt_updates(ctx)
  } else if exec::command_exists("dnf") {
    dnf_updates(ctx)
  } else if exec::command_exists("yum") {
    ctx.info("Detected yum-based system.")?;
    ctx.warn("Please review 'yum check-update' output manually for pending updates.")?;
    Ok(())
  } else {
    ctx.warn("Unknown/no package manager detected; cannot assess updates.")?;
    Ok(())
  }
}

fn apt_updates(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.info("Detected apt-based system.")?;

  if exec::command_exists("unattended-upgrades") {
    ctx.info("unattended-upgrades installed (automatic security updates available).")?;
  }

  if !exec::command_exists("apt") {
    return Ok(());
  }

  ctx.info("Checking for upgradable packages (apt list --upgradable)...")?;
  let result = match exec::run_command("apt", &["list", "--upgradable"]) {
    Ok(result) => result,
    Err(err) => {
      ctx.warn(format!("Failed to list apt upgrades: {}", err))?;
      return Ok(());
    }
  };

  let upgradable = apt_upgradable_lines(&result.stdout);
  if upgradable.is_empty() {
    ctx.info("No upgradable packages found (or unable to list).")?;
  } else {
    ctx.warn("Packages available for upgrade (showing first 20):")?;
    for line in upgradable {
      ctx.info(format!("  {}", line))?;
    }
  }
  Ok(())
}

fn dnf_updates(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.info("Detected dnf-based system.")?;
  ctx.info("Checking for security updates (dnf updateinfo list security)...")?;
  let result = match exec::run_command("dnf", &["updateinfo", "list", "security"]) {
    Ok(result) => result,
    Err(err) => {
      ctx.warn(format!("Failed to query dnf updateinfo: {}", err))?;
      return Ok(());
    }
  };

  let lines = result.stdout_lines();
  if has_flagged_advisories(&lines) {
    ctx.crit("Important/Critical security updates are pending:")?;
    for line in lines.iter().take(LIST_LIMIT) {
      ctx.info(format!("  {}", line))?;
    }
  } else if !lines.is_empty() {
    ctx.warn("Security updates are available (none flagged as Important/Critical in first lines).")?;
    for line in lines.iter().take(LIST_LIMIT) {
      ctx.info(format!("  {}", line))?;
    }
  } else {
    ctx.info("No security updates reported by dnf updateinfo.")?;
  }
  Ok(())
}

/// The 20 entries after apt's `Listing...` header, blanks dropped
fn apt_upgradable_lines(stdout: &str) -> Vec<&str> {
  stdout
    .lines()
    .skip(1)
    .take(LIST_LIMIT)
    .filter(|l| !l.trim().is_empty())
    .collect()
}

fn has_flagged_advisories(lines: &[&str]) -> bool {
  lines.iter().any(|l| l.contains("Important/") || l.contains("Critical/"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_apt_lines_skip_header_and_blanks() {
    let stdout = "Listing... Done\nvim/stable 2:9.0 amd64 [upgradable from: 2:8.2]\n\ncurl/stable 8.5 amd64 [upgradable from: 8.4]\n";
    let lines = apt_upgradable_lines(stdout);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("vim/"));
    assert!(lines[1].starts_with("curl/"));
  }

  #[test]
  fn test_apt_lines_capped_at_twenty() {
    let mut stdout = String::from("Listing... Done\n");
    for i in 0..40 {
      stdout.push_str(&format!("pkg{}/stable 1.{} amd64\n", i, i));
    }
    assert_eq!(apt_upgradable_lines(&stdout).len(), 20);
  }

  #[test]
  fn test_apt_lines_empty_listing() {
    assert!(apt_upgradable_lines("Listing... Done\n").is_empty());
    assert!(apt_upgradable_lines("").is_empty());
  }

  #[test]
  fn test_flagged_advisories() {
    let flagged = vec!["FEDORA-2024-1 Important/Sec. kernel-6.8"];
    let routine = vec!["FEDORA-2024-2 Moderate/Sec. curl-8.5"];
    assert!(has_flagged_advisories(&flagged));
    assert!(has_flagged_advisories(&["ADV Critical/Sec. openssl-3"]));
    assert!(!has_flagged_advisories(&routine));
    assert!(!has_flagged_advisories(&[]));
  }
}
