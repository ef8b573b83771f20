//! Mount domain types.
//!
//! Manifest mount declarations can be a bare string (shorthand for a plain
//! path bind) or a tagged object; both deserialize into [`MountSpec`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Entries excluded from every sync mount, on top of caller-declared
/// excludes and nested-mount sub-paths.
pub const SYNC_DEFAULT_EXCLUDES: [&str; 5] =
    [".syncignore", ".gitignore", ".azk/", ".git/", "Azkfile.js"];

/// Mount type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountType {
    /// Direct bind of a host path (relative values resolve against the
    /// manifest directory).
    Path,
    /// Namespace-scoped storage surviving container recreation.
    Persistent,
    /// Host folder synchronized into a cache directory.
    Sync,
}

/// Per-mount options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountOptions {
    /// Sync mounts: use the sync cache in daemon context (default true).
    pub daemon: Option<bool>,

    /// Sync mounts: use the sync cache in shell context (default false).
    pub shell: Option<bool>,

    /// Caller-declared sync exclusion patterns.
    pub except: Vec<String>,

    /// Source URL marking this mount as remote, whatever its type.
    pub from: Option<String>,
}

/// Object form of a mount declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountDecl {
    #[serde(rename = "type")]
    pub mount_type: MountType,

    /// Declared value: a host path (possibly relative) or a persistent
    /// volume name.
    pub value: String,

    #[serde(default)]
    pub options: MountOptions,
}

/// A mount declaration as it appears in a manifest.
///
/// Mounts can be specified as a plain string or a full object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MountSpec {
    /// Shorthand string, implying a `path` mount with default options.
    Shorthand(String),
    /// Full object form.
    Decl(MountDecl),
}

impl MountSpec {
    /// Build a path mount.
    pub fn path(value: &str) -> Self {
        MountSpec::Decl(MountDecl {
            mount_type: MountType::Path,
            value: value.to_string(),
            options: MountOptions::default(),
        })
    }

    /// Build a persistent mount.
    pub fn persistent(value: &str) -> Self {
        MountSpec::Decl(MountDecl {
            mount_type: MountType::Persistent,
            value: value.to_string(),
            options: MountOptions::default(),
        })
    }

    /// Build a sync mount.
    pub fn sync(value: &str) -> Self {
        MountSpec::Decl(MountDecl {
            mount_type: MountType::Sync,
            value: value.to_string(),
            options: MountOptions::default(),
        })
    }

    /// Replace the options of this mount.
    pub fn with_options(self, options: MountOptions) -> Self {
        match self {
            MountSpec::Shorthand(value) => {
                MountSpec::Decl(MountDecl { mount_type: MountType::Path, value, options })
            }
            MountSpec::Decl(decl) => MountSpec::Decl(MountDecl { options, ..decl }),
        }
    }

    /// Effective mount type (shorthand strings are path mounts).
    pub fn mount_type(&self) -> MountType {
        match self {
            MountSpec::Shorthand(_) => MountType::Path,
            MountSpec::Decl(decl) => decl.mount_type,
        }
    }

    /// Declared value.
    pub fn value(&self) -> &str {
        match self {
            MountSpec::Shorthand(value) => value,
            MountSpec::Decl(decl) => &decl.value,
        }
    }

    /// Effective options (shorthand strings carry defaults).
    pub fn options(&self) -> MountOptions {
        match self {
            MountSpec::Shorthand(_) => MountOptions::default(),
            MountSpec::Decl(decl) => decl.options.clone(),
        }
    }

    /// Whether this mount's content is fetched from a URL before first use.
    ///
    /// Only the object form can carry `from`; shorthand strings are never
    /// remote.
    pub fn is_remote(&self) -> bool {
        match self {
            MountSpec::Shorthand(_) => false,
            MountSpec::Decl(decl) => decl.options.from.is_some(),
        }
    }
}

/// A mount after path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMount {
    /// Resolved host path, computed without any existence check. Stable
    /// across repeated resolutions of the same mount key.
    pub base: PathBuf,

    /// Final existence-gated, host-translated path; `None` when the path is
    /// absent and gating is enabled.
    pub target: Option<PathBuf>,

    /// Options carried over from the declaration.
    pub options: MountOptions,
}

/// A sync mount ready for the file synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEntry {
    /// Cache directory the host folder is synchronized into.
    pub guest_folder: PathBuf,

    /// Options with the full exclusion set filled in.
    pub options: MountOptions,
}
