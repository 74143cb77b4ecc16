//! sshd_config hardening directives

use std::fs;
use std::io::ErrorKind;

use crate::core::error::AuditResult;
use crate::transcript::CheckContext;

const SSHD_CONFIG: &str = "/etc/ssh/sshd_config";

pub fn run(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.section("SSH configuration")?;

  let content = match fs::read_to_string(SSHD_CONFIG) {
    Ok(content) => content,
    Err(err) if err.kind() == ErrorKind::NotFound => {
      ctx.info("No /etc/ssh/sshd_config found (sshd may not be running on this host).")?;
      return Ok(());
    }
    Err(err) => return Err(err.into()),
  };

  ctx.info(format!("Evaluating {}", SSHD_CONFIG))?;

  let permit_root = config_value(&content, "PermitRootLogin");
  let password_auth = config_value(&content, "PasswordAuthentication");
  let empty_pw = config_value(&content, "PermitEmptyPasswords");
  let protocol = config_value(&content, "Protocol");

  match permit_root.as_deref() {
    Some("yes") => ctx.crit("PermitRootLogin is YES - root over SSH is high risk.")?,
    Some(value) => ctx.info(format!("PermitRootLogin={}", value))?,
    None => ctx.warn("PermitRootLogin not set - verify distribution default (often 'prohibit-password').")?,
  }

  match password_auth.as_deref() {
    Some("yes") => ctx.warn("PasswordAuthentication=YES - consider key-only auth for servers.")?,
    Some("no") => ctx.info("PasswordAuthentication=NO (keys-only auth enforced).")?,
    _ => ctx.warn("PasswordAuthentication not explicitly set - check defaults.")?,
  }

  if empty_pw.as_deref() == Some("yes") {
    ctx.crit("PermitEmptyPasswords=YES - extremely dangerous.")?;
  }

  if let Some(protocol) = protocol
    && protocol != "2"
  {
    ctx.crit("SSH Protocol not restricted to 2.")?;
  }

  Ok(())
}

/// Effective value for a directive: last non-comment occurrence wins, value
/// lowercased, key matched case-insensitively
fn config_value(content: &str, key: &str) -> Option<String> {
  let mut value = None;
  for line in content.lines() {
    let stripped = line.trim();
    if stripped.is_empty() || stripped.starts_with('#') {
      continue;
    }
    let mut parts = stripped.split_whitespace();
    let Some(directive) = parts.next() else {
      continue;
    };
    if directive.eq_ignore_ascii_case(key)
      && let Some(v) = parts.next()
    {
      value = Some(v.to_lowercase());
    }
  }
  value
}
