//! System collaborator trait.
//!
//! A `System` is a declared service unit: scaling configuration, ordered
//! dependencies, mounts, and container lifecycle. The aggregate itself is
//! owned by the manifest layer; the engines consume it through this trait so
//! they stay free of manifest parsing and Docker client concerns.

use crate::error::Result;
use crate::types::mount::{MountSpec, ResolvedMount};
use crate::types::system::{EnvMap, ExportContext, Instance, InstanceKind, Scalable, ScaleOptions};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A declared service unit.
#[async_trait]
pub trait System: Send + Sync {
    /// System name, unique within its manifest.
    fn name(&self) -> &str;

    /// Namespace of the owning manifest.
    fn namespace(&self) -> &str;

    /// Directory containing the owning manifest file. Relative mount values
    /// resolve against this.
    fn manifest_dir(&self) -> &Path;

    /// Scaling configuration.
    fn scalable(&self) -> Scalable;

    /// Declared dependencies, in resolution order.
    fn depends_instances(&self) -> Vec<Arc<dyn System>>;

    /// Declared mounts, keyed by container mount point.
    fn mounts(&self) -> BTreeMap<String, MountSpec>;

    /// Resolved remote mounts, keyed by container mount point.
    fn remote_mounts(&self) -> BTreeMap<String, ResolvedMount>;

    /// Whether remote mount assets still need to be fetched.
    fn pull_remote(&self) -> bool;

    /// Update the pending-fetch flag. Cleared by the mount resolver after a
    /// successful fetch batch, never set by it.
    fn set_pull_remote(&self, value: bool);

    /// Expand this system's declared export environment against a
    /// dependency context (raw container env + published ports).
    fn expand_export_envs(&self, context: &ExportContext) -> EnvMap;

    /// List current instances of the given kind. Always a fresh query
    /// against live container state.
    async fn instances(&self, kind: InstanceKind) -> Result<Vec<Instance>>;

    /// Launch one daemon instance.
    async fn run_daemon(&self, options: &ScaleOptions) -> Result<Instance>;

    /// Stop the given instances in one batched call.
    async fn stop(&self, instances: &[Instance], kill: bool) -> Result<()>;

    /// Run a one-shot command in a throwaway container of this system, with
    /// extra host → container bind mounts. Used by remote-asset fetches.
    async fn run_once(
        &self,
        command: &[String],
        extra_mounts: &BTreeMap<PathBuf, PathBuf>,
    ) -> Result<()>;
}
