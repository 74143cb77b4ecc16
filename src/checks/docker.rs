//! Docker daemon reachability and per-container posture

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::core::error::{AuditError, AuditResult};
use crate::exec;
use crate::transcript::CheckContext;

const DOCKER_SOCK: &str = "/var/run/docker.sock";
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InspectEntry {
  #[serde(rename = "Config")]
  config: Option<ContainerConfig>,
  #[serde(rename = "HostConfig")]
  host_config: Option<HostConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContainerConfig {
  #[serde(rename = "User")]
  user: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HostConfig {
  #[serde(rename = "Privileged")]
  privileged: Option<bool>,
}

impl InspectEntry {
  fn user(&self) -> Option<&str> {
    self.config.as_ref().and_then(|c| c.user.as_deref())
  }

  fn privileged(&self) -> bool {
    self.host_config.as_ref().and_then(|h| h.privileged) == Some(true)
  }
}

pub fn run(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.section("Docker / container runtime")?;

  if !exec::command_exists("docker") {
    ctx.info("Docker CLI not found - skipping Docker checks.")?;
    return Ok(());
  }

  let info = match exec::run_command_with_timeout("docker", &["info"], COMMAND_TIMEOUT) {
    Ok(info) => info,
    Err(err) => {
      ctx.warn(format!("Docker CLI present but 'docker info' failed: {}", err))?;
      return Ok(());
    }
  };
  if !info.success() {
    ctx.warn("Docker CLI present but 'docker info' failed (daemon not running or insufficient permissions).")?;
    return Ok(());
  }

  ctx.info("Docker daemon reachable.")?;
  socket_permissions(ctx)?;

  let running = match exec::run_command_with_timeout(
    "docker",
    &["ps", "--format", "{{.ID}} {{.Image}} {{.Names}}"],
    COMMAND_TIMEOUT,
  ) {
    Ok(running) => running,
    Err(err) => {
      ctx.warn(format!("Failed to list running containers: {}", err))?;
      return Ok(());
    }
  };

  let lines: Vec<&str> = running.stdout.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
  if lines.is_empty() {
    ctx.info("No running containers.")?;
    return Ok(());
  }

  ctx.info("Running containers:")?;
  for line in &lines {
    ctx.info(format!("  {}", line))?;
  }

  for line in &lines {
    let mut parts = line.splitn(3, ' ');
    let (Some(container_id), Some(image), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
      continue;
    };

    let entry = match inspect_container(container_id) {
      Ok(entry) => entry,
      Err(err) => {
        ctx.warn(format!("Failed to inspect container {}: {}", name, err))?;
        continue;
      }
    };

    if runs_as_root(entry.user()) {
      let shown = entry.user().filter(|u| !u.is_empty()).unwrap_or("(default/root)");
      ctx.warn(format!(
        "Container {} ({}) is running as root (User={}). Consider using non-root user.",
        name, image, shown
      ))?;
    }
    if entry.privileged() {
      ctx.crit(format!("Container {} ({}) is running in privileged mode.", name, image))?;
    }
  }

  Ok(())
}

fn inspect_container(container_id: &str) -> AuditResult<InspectEntry> {
  let result = exec::run_command_with_timeout("docker", &["inspect", container_id], COMMAND_TIMEOUT)?;
  parse_inspect(&result.stdout)
}

/// `docker inspect` wraps single results in an array; accept both shapes.
/// An empty array means the container no longer exists.
fn parse_inspect(raw: &str) -> AuditResult<InspectEntry> {
  let value: serde_json::Value = serde_json::from_str(raw)?;
  let entry = match value {
    serde_json::Value::Array(items) => items
      .into_iter()
      .next()
      .ok_or_else(|| AuditError::Json(serde::de::Error::custom("inspect returned no entries")))?,
    other => other,
  };
  Ok(serde_json::from_value(entry)?)
}

/// Docker treats an unset or empty user as uid 0 inside the container
fn runs_as_root(user: Option<&str>) -> bool {
  matches!(user, None | Some("") | Some("0") | Some("root"))
}

fn socket_permissions(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  let sock = Path::new(DOCKER_SOCK);
  if !sock.exists() {
    return Ok(());
  }
  match socket_details(sock) {
    Some(details) => ctx.info(format!("docker.sock perms: {}", details))?,
    None => ctx.warn("Unable to read docker.sock permissions.")?,
  }
  Ok(())
}

#[cfg(unix)]
fn socket_details(path: &Path) -> Option<String> {
  use std::os::unix::fs::MetadataExt;

  let meta = fs::metadata(path).ok()?;
  let mode = meta.mode() & 0o777;
  let owner = resolve_name("/etc/passwd", meta.uid()).unwrap_or_else(|| meta.uid().to_string());
  let group = resolve_name("/etc/group", meta.gid()).unwrap_or_else(|| meta.gid().to_string());
  Some(format!("0o{:o} {}:{}", mode, owner, group))
}

#[cfg(not(unix))]
fn socket_details(path: &Path) -> Option<String> {
  let _ = path;
  None
}

#[cfg(unix)]
fn resolve_name(table: &str, id: u32) -> Option<String> {
  let content = fs::read_to_string(table).ok()?;
  name_for_id(&content, id)
}

/// passwd/group style lookup: `name:x:id:...`
fn name_for_id(content: &str, id: u32) -> Option<String> {
  for line in content.lines() {
    let mut fields = line.split(':');
    let (Some(name), _password, Some(field_id)) = (fields.next(), fields.next(), fields.next()) else {
      continue;
    };
    if field_id.parse::<u32>().ok() == Some(id) {
      return Some(name.to_string());
    }
  }
  None
}
