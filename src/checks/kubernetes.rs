//! Kubernetes cluster reachability and privileged-pod scan

use std::time::Duration;

use serde::Deserialize;

use crate::core::error::AuditResult;
use crate::exec;
use crate::transcript::CheckContext;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PodList {
  items: Vec<Pod>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Pod {
  metadata: PodMetadata,
  spec: PodSpec,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PodMetadata {
  namespace: Option<String>,
  name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PodSpec {
  containers: Vec<PodContainer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PodContainer {
  name: String,
  #[serde(rename = "securityContext")]
  security_context: Option<SecurityContext>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SecurityContext {
  privileged: Option<bool>,
}

pub fn run(ctx: &mut CheckContext<'_>) -> AuditResult<()> {
  ctx.section("Kubernetes checks")?;

  if !exec::command_exists("kubectl") {
    ctx.info("kubectl not found - skipping Kubernetes checks.")?;
    return Ok(());
  }

  let cluster = match exec::run_command_with_timeout("kubectl", &["cluster-info"], COMMAND_TIMEOUT) {
    Ok(cluster) => cluster,
    Err(err) => {
      ctx.warn(format!("kubectl present but 'kubectl cluster-info' failed: {}", err))?;
      return Ok(());
    }
  };
  if !cluster.success() {
    ctx.warn("kubectl present but 'kubectl cluster-info' failed - no cluster context or auth issue.")?;
    return Ok(());
  }

  ctx.info("kubectl can reach a cluster.")?;
  if let Ok(version) = exec::run_command_with_timeout("kubectl", &["version", "--short"], COMMAND_TIMEOUT) {
    for line in version.stdout.lines() {
      ctx.info(line)?;
    }
  }

  let pods = match exec::run_command_with_timeout(
    "kubectl",
    &["get", "pods", "-A", "-o", "json"],
    COMMAND_TIMEOUT,
  ) {
    Ok(pods) => pods,
    Err(err) => {
      ctx.warn(format!("Failed to query pods for privileged containers: {}", err))?;
      return Ok(());
    }
  };
  if !pods.success() {
    ctx.warn("kubectl get pods returned non-zero; unable to assess privileged containers.")?;
    return Ok(());
  }

  let privileged = privileged_containers(&pods.stdout);
  if privileged.is_empty() {
    ctx.info("No privileged containers detected via API scan.")?;
  } else {
    ctx.crit("Privileged containers detected (namespace pod container):")?;
    for entry in &privileged {
      ctx.info(format!("  {}", entry))?;
    }
  }

  Ok(())
}

/// Flattens the pod list to `namespace pod container` rows for containers
/// whose securityContext explicitly sets privileged: true.
fn privileged_containers(raw: &str) -> Vec<String> {
  let Ok(list) = serde_json::from_str::<PodList>(raw) else {
    return Vec::new();
  };

  let mut flagged = Vec::new();
  for pod in &list.items {
    let namespace = pod.metadata.namespace.as_deref().unwrap_or("default");
    for container in &pod.spec.containers {
      let privileged = container
        .security_context
        .as_ref()
        .and_then(|sc| sc.privileged)
        == Some(true);
      if privileged {
        flagged.push(format!("{} {} {}", namespace, pod.metadata.name, container.name));
      }
    }
  }
  flagged
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_privileged_containers_flags_only_privileged() {
    let raw = r#"{
      "items": [
        {
          "metadata": {"namespace": "kube-system", "name": "node-agent-x1"},
          "spec": {
            "containers": [
              {"name": "agent", "securityContext": {"privileged": true}},
              {"name": "sidecar", "securityContext": {"privileged": false}}
            ]
          }
        },
        {
          "metadata": {"namespace": "web", "name": "frontend-7d9"},
          "spec": {
            "containers": [
              {"name": "nginx"}
            ]
          }
        }
      ]
    }"#;
    let flagged = privileged_containers(raw);
    assert_eq!(flagged, vec!["kube-system node-agent-x1 agent".to_string()]);
  }

  #[test]
  fn test_privileged_containers_defaults_namespace() {
    let raw = r#"{
      "items": [
        {
          "metadata": {"name": "standalone"},
          "spec": {
            "containers": [
              {"name": "main", "securityContext": {"privileged": true}}
            ]
          }
        }
      ]
    }"#;
    let flagged = privileged_containers(raw);
    assert_eq!(flagged, vec!["default standalone main".to_string()]);
  }

  #[test]
  fn test_privileged_containers_missing_security_context() {
    let raw = r#"{
      "items": [
        {
          "metadata": {"namespace": "web", "name": "plain"},
          "spec": {"containers": [{"name": "app"}]}
        }
      ]
    }"#;
    assert!(privileged_containers(raw).is_empty());
  }

  #[test]
  fn test_privileged_containers_malformed_json() {
    assert!(privileged_containers("").is_empty());
    assert!(privileged_containers("not json").is_empty());
    assert!(privileged_containers("[1, 2, 3]").is_empty());
  }
}
