//! Docker inspection accessor.
//!
//! The engines never talk to the Docker daemon directly; they consume a
//! narrow inspection capability injected at construction time. The concrete
//! client (HTTP API wrapper, CLI shim) lives with the embedding application.

use crate::error::Result;
use crate::types::EnvMap;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A published port of a running container, by declared port name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortAccess {
    /// Declared port name (e.g., "http").
    pub name: String,

    /// Host port the container port is published on.
    pub port: u16,
}

/// The slice of `docker inspect` output the engines consume.
#[derive(Debug, Clone, Default)]
pub struct ContainerDetail {
    /// Published ports.
    pub access: Vec<PortAccess>,

    /// Raw container environment, `"KEY=VALUE"` entries.
    pub env: Vec<String>,
}

impl ContainerDetail {
    /// Published ports as a name → host port mapping.
    pub fn port_map(&self) -> BTreeMap<String, u16> {
        self.access.iter().map(|access| (access.name.clone(), access.port)).collect()
    }

    /// Container environment as a mapping. Entries without `=` are skipped.
    pub fn env_map(&self) -> EnvMap {
        self.env
            .iter()
            .filter_map(|entry| {
                entry.split_once('=').map(|(key, value)| (key.to_string(), value.to_string()))
            })
            .collect()
    }
}

/// Container inspection capability.
#[async_trait]
pub trait DockerInspector: Send + Sync {
    /// Inspect a container by ID.
    async fn inspect(&self, container_id: &str) -> Result<ContainerDetail>;
}

/// Translate a resolved host path into the form the Docker daemon expects
/// for a bind mount.
///
/// On the Unix targets this crate supports the translation is the identity;
/// the indirection keeps every bind-mount path flowing through one place.
pub fn host_path(path: &Path) -> PathBuf {
    path.to_path_buf()
}
