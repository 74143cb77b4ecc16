//! UID 0 accounts, locked passwords and sudoers NOPASSWD rules

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::error::AuditResult;
use crate::transcript::CheckContext;

/// Active (non-comment) lines mentioning NOPASSWD anywhere
static NOPASSWD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^[^#].*NOPASSWD").expect("valid regex"));

pub fn run(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.section("Users & sudo")?;

  let passwd = fs::read_to_string("/etc/passwd")?;
  let uid0 = uid_zero_accounts(&passwd);
  ctx.info(format!("UID 0 accounts: {}", join_or_none(&uid0)))?;
  if uid0.iter().any(|name| name != "root") {
    ctx.crit("Non-root account(s) with UID 0 detected - high risk.")?;
  }

  match fs::read_to_string("/etc/shadow") {
    Ok(shadow) => {
      let locked = locked_accounts(&shadow);
      ctx.info(format!("Locked/disabled accounts (shadow): {}", join_or_none(&locked)))?;
    }
    Err(err) if err.kind() == ErrorKind::NotFound => {
      ctx.warn("/etc/shadow not found; password state checks incomplete.")?;
    }
    Err(err) if err.kind() == ErrorKind::PermissionDenied => {
      ctx.warn("/etc/shadow not readable; password state checks incomplete.")?;
    }
    Err(err) => return Err(err.into()),
  }

  scan_sudo_file(ctx, Path::new("/etc/sudoers"))?;

  let sudoers_d = Path::new("/etc/sudoers.d");
  if sudoers_d.is_dir() {
    let mut paths = Vec::new();
    for entry in fs::read_dir(sudoers_d)? {
      paths.push(entry?.path());
    }
    paths.sort();
    for path in paths {
      if path.is_file() {
        scan_sudo_file(ctx, &path)?;
      }
    }
  }

  Ok(())
}

fn scan_sudo_file(ctx: &mut CheckContext<'_>, path: &Path) -> AuditResult<()> {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
    Err(err) if err.kind() == ErrorKind::PermissionDenied => {
      ctx.warn(format!("{} not readable; cannot assess sudo rules.", path.display()))?;
      return Ok(());
    }
    Err(err) => return Err(err.into()),
  };

  let hits = nopasswd_lines(&content);
  if hits.is_empty() {
    return Ok(());
  }

  ctx.warn(format!("NOPASSWD entries in {}:", path.display()))?;
  for line in &hits {
    ctx.info(format!("  {}", line))?;
    if line.contains("NOPASSWD: ALL") {
      ctx.crit(format!(
        "Very broad NOPASSWD rule detected in {} (ALL=(ALL) NOPASSWD: ALL).",
        path.display()
      ))?;
    }
  }
  Ok(())
}

fn uid_zero_accounts(passwd: &str) -> Vec<String> {
  let mut accounts = Vec::new();
  for line in passwd.lines() {
    let mut fields = line.split(':');
    let Some(name) = fields.next() else {
      continue;
    };
    let _password = fields.next();
    let uid = fields.next().and_then(|u| u.parse::<u32>().ok());
    if uid == Some(0) {
      accounts.push(name.to_string());
    }
  }
  accounts
}

fn locked_accounts(shadow: &str) -> Vec<String> {
  let mut locked = Vec::new();
  for line in shadow.lines() {
    let mut fields = line.split(':');
    let (Some(name), Some(password)) = (fields.next(), fields.next()) else {
      continue;
    };
    if password.starts_with('!') || password.starts_with('*') {
      locked.push(name.to_string());
    }
  }
  locked
}

fn nopasswd_lines(content: &str) -> Vec<String> {
  content
    .lines()
    .filter(|l| NOPASSWD_RE.is_match(l))
    .map(|l| l.trim().to_string())
    .collect()
}

fn join_or_none(names: &[String]) -> String {
  if names.is_empty() {
    "(none)".to_string()
  } else {
    names.join(" ")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_uid_zero_accounts() {
    let passwd = "root:x:0:0:root:/root:/bin/bash\n\
                  daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin\n\
                  toor:x:0:0:backup root:/root:/bin/sh\n\
                  broken line without colons\n";
    assert_eq!(uid_zero_accounts(passwd), vec!["root", "toor"]);
  }

  #[test]
  fn test_locked_accounts() {
    let shadow = "root:$6$salt$hash:19000:0:99999:7:::\n\
                  daemon:*:19000:0:99999:7:::\n\
                  backup:!$6$old$hash:19000:0:99999:7:::\n\
                  short\n";
    assert_eq!(locked_accounts(shadow), vec!["daemon", "backup"]);
  }

  #[test]
  fn test_nopasswd_lines_skip_comments() {
    let sudoers = "# deploy ALL=(ALL) NOPASSWD: ALL\n\
                   root ALL=(ALL:ALL) ALL\n\
                   deploy ALL=(ALL) NOPASSWD: /usr/bin/systemctl restart app\n";
    let hits = nopasswd_lines(sudoers);
    assert_eq!(hits, vec!["deploy ALL=(ALL) NOPASSWD: /usr/bin/systemctl restart app"]);
  }

  #[test]
  fn test_nopasswd_lines_case_insensitive() {
    let sudoers = "ops ALL=(ALL) nopasswd: /sbin/reboot\n";
    assert_eq!(nopasswd_lines(sudoers).len(), 1);
  }

  #[test]
  fn test_broad_rule_detection() {
    let line = "deploy ALL=(ALL) NOPASSWD: ALL";
    assert!(line.contains("NOPASSWD: ALL"));
    let narrow = "deploy ALL=(ALL) NOPASSWD: /usr/bin/true";
    assert!(!narrow.contains("NOPASSWD: ALL"));
  }

  #[test]
  fn test_join_or_none() {
    assert_eq!(join_or_none(&[]), "(none)");
    assert_eq!(join_or_none(&["root".to_string(), "toor".to_string()]), "root toor");
  }
}
