//! Presence of journald, rsyslog and the audit subsystem

use crate::core::error::AuditResult;
use crate::exec;
use crate::transcript::CheckContext;

pub fn run(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.section("Logging & audit")?;

  if exec::command_exists("systemctl") {
    if systemctl_active("systemd-journald") {
      ctx.info("systemd-journald is active.")?;
    } else {
      ctx.warn("systemd-journald is not reported as active.")?;
    }

    if systemctl_active("rsyslog") {
      ctx.info("rsyslog is active.")?;
    } else {
      ctx.info("rsyslog not active (may be fine if journald is primary).")?;
    }
  } else {
    ctx.warn("systemctl not available; cannot check journald/rsyslog status.")?;
  }

  if exec::command_exists("auditctl") || systemctl_status_ok("auditd") {
    ctx.info("auditd/audit subsystem appears present; review rules with 'auditctl -l'.")?;
  } else {
    ctx.warn("No obvious audit subsystem detected (auditd/auditctl). Host-level auditing may be limited.")?;
  }

  Ok(())
}

fn systemctl_active(service: &str) -> bool {
  exec::run_command("systemctl", &["is-active", "--quiet", service])
    .map(|out| out.success())
    .unwrap_or(false)
}

fn systemctl_status_ok(service: &str) -> bool {
  exec::run_command("systemctl", &["status", service])
    .map(|out| out.success())
    .unwrap_or(false)
}
