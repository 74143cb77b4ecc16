//! Listening sockets and firewall posture

use crate::core::error::AuditResult;
use crate::exec;
use crate::transcript::CheckContext;

const PORT_LINES: usize = 20;
const FIREWALL_LINES: usize = 30;

pub fn run(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.section("Network & firewall")?;
  listening_ports(ctx)?;
  firewall_status(ctx)
}

fn listening_ports(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.info("Listening TCP/UDP ports (top 20 lines):")?;

  let cmd: Option<(&str, &[&str])> = if exec::command_exists("ss") {
    Some(("ss", &["-tulpen"]))
  } else if exec::command_exists("netstat") {
    Some(("netstat", &["-tulpen"]))
  } else {
    None
  };

  let Some((program, args)) = cmd else {
    ctx.warn("Neither ss nor netstat available; cannot list listening ports.")?;
    return Ok(());
  };

  match exec::run_command(program, args) {
    Ok(result) => {
      for line in result.stdout.lines().take(PORT_LINES) {
        ctx.info(line)?;
      }
    }
    Err(err) => {
      ctx.warn(format!(
        "Failed to inspect listening ports ({} {}): {}",
        program,
        args.join(" "),
        err
      ))?;
    }
  }
  Ok(())
}

fn firewall_status(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.info("Evaluating firewall status...")?;

  if exec::command_exists("ufw") {
    ctx.info("ufw detected.")?;
    match exec::run_command("ufw", &["status", "verbose"]) {
      Ok(result) => {
        // ufw reports to stderr when invoked without privileges
        let text = first_nonempty(&result.stdout, &result.stderr);
        for line in text.lines().take(FIREWALL_LINES) {
          ctx.info(line)?;
        }
      }
      Err(err) => {
        ctx.warn(format!("Failed to get ufw status: {}", err))?;
      }
    }
    return Ok(());
  }

  if exec::command_exists("firewall-cmd") {
    ctx.info("firewalld detected.")?;
    match exec::run_command("firewall-cmd", &["--state"]) {
      Ok(state) if state.stdout.contains("running") => {
        ctx.info("firewalld is running.")?;
        match exec::run_command("firewall-cmd", &["--list-all"]) {
          Ok(detail) => {
            for line in detail.stdout.lines().take(FIREWALL_LINES) {
              ctx.info(line)?;
            }
          }
          Err(err) => {
            ctx.warn(format!("Failed to query firewalld: {}", err))?;
          }
        }
      }
      Ok(_) => {
        ctx.warn("firewalld appears installed but not running.")?;
      }
      Err(err) => {
        ctx.warn(format!("Failed to query firewalld: {}", err))?;
      }
    }
    return Ok(());
  }

  if exec::command_exists("iptables") {
    ctx.warn("No ufw/firewalld detected, but iptables exists. Showing top of rules:")?;
    match exec::run_command("iptables", &["-L", "-n"]) {
      Ok(result) => {
        for line in result.stdout.lines().take(FIREWALL_LINES) {
          ctx.info(line)?;
        }
      }
      Err(err) => {
        ctx.warn(format!("Failed to dump iptables rules: {}", err))?;
      }
    }
    return Ok(());
  }

  ctx.warn("No firewall tooling detected (ufw/firewalld/iptables) - host may rely solely on upstream filtering.")?;
  Ok(())
}

fn first_nonempty<'a>(primary: &'a str, fallback: &'a str) -> &'a str {
  if primary.is_empty() { fallback } else { primary }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_first_nonempty_prefers_primary() {
    assert_eq!(first_nonempty("stdout text", "stderr text"), "stdout text");
    assert_eq!(first_nonempty("", "stderr text"), "stderr text");
    assert_eq!(first_nonempty("", ""), "");
  }
}
