//! Host posture checks and their registry
//!
//! Each check is a plain function reporting through the run's `CheckContext`.
//! The registry fixes the execution order; `resolve` maps a descriptor's
//! locator onto the implementation, so a caller-supplied registry slice stays
//! decoupled from the code it references.

pub mod docker;
pub mod filesystem;
pub mod kubernetes;
pub mod logging;
pub mod network;
pub mod os;
pub mod ssh;
pub mod sudo;
pub mod updates;

use crate::core::error::AuditResult;
use crate::transcript::CheckContext;

/// A check implementation: findings go through the context, `Err` means the
/// check itself broke
pub type CheckFn = fn(&mut CheckContext<'_>) -> AuditResult<()>;

/// One registry entry: display label plus implementation locator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckDescriptor {
  pub label: &'static str,
  pub locator: &'static str,
}

/// Built-in checks, in execution order
pub const DEFAULT_CHECKS: &[CheckDescriptor] = &[
  CheckDescriptor {
    label: "OS",
    locator: "checks::os",
  },
  CheckDescriptor {
    label: "updates",
    locator: "checks::updates",
  },
  CheckDescriptor {
    label: "filesystem",
    locator: "checks::filesystem",
  },
  CheckDescriptor {
    label: "network/firewall",
    locator: "checks::network",
  },
  CheckDescriptor {
    label: "logging/audit",
    locator: "checks::logging",
  },
  CheckDescriptor {
    label: "SSH",
    locator: "checks::ssh",
  },
  CheckDescriptor {
    label: "sudo/users",
    locator: "checks::sudo",
  },
  CheckDescriptor {
    label: "Docker",
    locator: "checks::docker",
  },
  CheckDescriptor {
    label: "Kubernetes",
    locator: "checks::kubernetes",
  },
];

/// Map a locator onto its implementation
pub fn resolve(locator: &str) -> Option<CheckFn> {
  match locator {
    "checks::os" => Some(os::run),
    "checks::updates" => Some(updates::run),
    "checks::filesystem" => Some(filesystem::run),
    "checks::network" => Some(network::run),
    "checks::logging" => Some(logging::run),
    "checks::ssh" => Some(ssh::run),
    "checks::sudo" => Some(sudo::run),
    "checks::docker" => Some(docker::run),
    "checks::kubernetes" => Some(kubernetes::run),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_registry_order() {
    let labels: Vec<&str> = DEFAULT_CHECKS.iter().map(|c| c.label).collect();
    assert_eq!(
      labels,
      vec![
        "OS",
        "updates",
        "filesystem",
        "network/firewall",
        "logging/audit",
        "SSH",
        "sudo/users",
        "Docker",
        "Kubernetes",
      ]
    );
  }

  #[test]
  fn test_every_default_locator_resolves() {
    for desc in DEFAULT_CHECKS {
      assert!(resolve(desc.locator).is_some(), "unresolved: {}", desc.locator);
    }
  }

  #[test]
  fn test_unknown_locator_does_not_resolve() {
    assert!(resolve("checks::nonexistent").is_none());
    assert!(resolve("").is_none());
  }
}
