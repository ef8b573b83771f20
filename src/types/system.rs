//! System domain types: instances, scaling configuration, launch options.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Environment variable mapping, ordered for stable merges.
pub type EnvMap = BTreeMap<String, String>;

/// A running container descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Instance {
    /// Container ID
    pub id: String,

    /// Container name
    pub name: String,

    /// Whether the container is currently running
    pub running: bool,
}

impl Instance {
    /// Create a new running instance descriptor.
    pub fn new(id: &str, name: &str) -> Self {
        Self { id: id.to_string(), name: name.to_string(), running: true }
    }
}

/// Container kind filter for instance queries.
///
/// Daemon instances are the long-lived service containers the scaling engine
/// manages; shell instances are one-shot task containers and never count
/// toward a system's scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceKind {
    Daemon,
    Shell,
}

/// Scaling configuration of a system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Scalable {
    /// Number of daemon instances started by default.
    pub default: u32,

    /// Ceiling on concurrent daemon instances; `<= 0` means unlimited.
    pub limit: i64,
}

impl Default for Scalable {
    fn default() -> Self {
        Self { default: 1, limit: 0 }
    }
}

/// Network information harvested from a dependency's first instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetInfo {
    /// Published ports, by declared port name.
    pub port: BTreeMap<String, u16>,
}

/// Input to a system's export-env expansion: the dependency's raw container
/// environment plus its published network surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportContext {
    pub envs: EnvMap,
    pub net: NetInfo,
}

/// Options accepted by scale and launch operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleOptions {
    /// Extra environment passed to launched daemons. Explicit entries win
    /// over env harvested from dependencies.
    pub envs: EnvMap,

    /// Automatically start dependencies that have no running instances.
    pub dependencies: bool,

    /// Pull the system image before launching.
    pub pull: bool,

    /// Force re-provisioning of the first launched instance.
    pub provision_force: bool,

    /// Force a rebuild of the system image.
    pub build_force: bool,

    /// Re-fetch remote mount assets for the first launched instance.
    pub pull_remote: bool,

    /// Force-kill containers instead of a graceful stop.
    pub kill: bool,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            envs: EnvMap::new(),
            dependencies: true,
            pull: false,
            provision_force: false,
            build_force: false,
            pull_remote: false,
            kill: false,
        }
    }
}

impl ScaleOptions {
    /// Reduced option set propagated when auto-scaling a dependency.
    ///
    /// Only `dependencies` and `pull` carry over; one-shot flags like
    /// `provision_force` apply to the requested system alone.
    pub fn dependencies_options(&self) -> Self {
        Self { dependencies: self.dependencies, pull: self.pull, ..Self::default() }
    }
}
