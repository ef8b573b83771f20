//! Mount resolution engine.
//!
//! Translates a system's declarative mount specifications into concrete
//! container bind mounts: path mounts resolve against the manifest directory
//! and are existence-gated, persistent mounts land under the namespaced
//! persistent root, sync mounts land in the sync cache (context permitting),
//! and remote mounts are fetched once before first use.

use crate::config::Config;
use crate::docker;
use crate::error::{DockyardError, Result};
use crate::events::{Event, EventBus, Status};
use crate::manifest::Manifest;
use crate::system::System;
use crate::types::mount::{
    MountOptions, MountSpec, MountType, ResolvedMount, SyncEntry, SYNC_DEFAULT_EXCLUDES,
};
use futures::future;
use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument, warn};

/// Mount resolver for one system.
///
/// Base paths are memoized per mount key in an explicit cache; repeated
/// resolutions of the same key always yield the same base. The cache is only
/// dropped by [`MountResolver::invalidate`].
pub struct MountResolver {
    system: Arc<dyn System>,
    /// Shared manifest, used to build throwaway helper systems for fetches.
    manifest: Arc<dyn Manifest>,
    config: Config,
    events: EventBus,
    base_cache: Mutex<HashMap<String, PathBuf>>,
}

impl MountResolver {
    /// Create a resolver for `system`.
    pub fn new(
        system: Arc<dyn System>,
        manifest: Arc<dyn Manifest>,
        config: Config,
        events: EventBus,
    ) -> Self {
        Self { system, manifest, config, events, base_cache: Mutex::new(HashMap::new()) }
    }

    /// Drop every memoized base path, forcing re-resolution.
    pub fn invalidate(&self) {
        self.base_cache.lock().unwrap().clear();
    }

    /// Resolve one mount declaration.
    ///
    /// `daemon` selects the execution context (daemon vs shell), which only
    /// affects sync mounts. With `valid_mounts` unset the literal resolved
    /// path is returned untranslated and ungated, for diagnostic use.
    pub fn resolve(
        &self,
        key: &str,
        spec: &MountSpec,
        daemon: bool,
        valid_mounts: bool,
    ) -> ResolvedMount {
        let options = spec.options();
        let base = self.base_for(key, spec, daemon);

        let gated = match spec.mount_type() {
            MountType::Path => true,
            // Backing store is created on demand, never gated.
            MountType::Persistent => false,
            // Cache-directory syncs are materialized by the synchronizer;
            // only the plain-path fallback is gated.
            MountType::Sync => !self.use_sync_cache(&options, daemon),
        };

        let target = if !valid_mounts {
            Some(base.clone())
        } else if !gated {
            Some(docker::host_path(&base))
        } else if base.exists() {
            Some(docker::host_path(&base))
        } else {
            warn!(mount = key, path = %base.display(), "Mount path does not exist, dropping");
            None
        };

        ResolvedMount { base, target, options }
    }

    /// Compute container mount point → host path bindings.
    ///
    /// Mounts whose resolved target is absent are omitted; partial mount
    /// availability must not abort a launch.
    pub fn volumes(
        &self,
        mounts: &BTreeMap<String, MountSpec>,
        daemon: bool,
        valid_mounts: bool,
    ) -> BTreeMap<String, PathBuf> {
        let mut volumes = BTreeMap::new();
        for (point, spec) in mounts {
            if let Some(target) = self.resolve(point, spec, daemon, valid_mounts).target {
                volumes.insert(point.clone(), target);
            }
        }
        volumes
    }

    /// Compute host sync source → sync entry mappings for every sync mount.
    ///
    /// Each entry's exclusion set is the caller-declared excludes, plus every
    /// other mount key nested under this one (normalized to a `./…` pattern,
    /// so a directory covered by a nested mount is never synced twice), plus
    /// the fixed default excludes.
    pub fn syncs(&self, mounts: &BTreeMap<String, MountSpec>) -> BTreeMap<PathBuf, SyncEntry> {
        let mut syncs = BTreeMap::new();

        for (key, spec) in mounts {
            if spec.mount_type() != MountType::Sync {
                continue;
            }

            let host_sync_path = self.resolved_path(spec.value());

            let nested = mounts
                .keys()
                .filter(|dir| dir.as_str() != key && dir.starts_with(key.as_str()))
                .map(|dir| relative_pattern(key, dir));

            let mut options = spec.options();
            let mut except: Vec<String> = Vec::new();
            for pattern in options
                .except
                .iter()
                .cloned()
                .chain(nested)
                .chain(SYNC_DEFAULT_EXCLUDES.iter().map(|entry| entry.to_string()))
            {
                if !except.contains(&pattern) {
                    except.push(pattern);
                }
            }
            options.except = except;

            syncs.insert(
                host_sync_path,
                SyncEntry { guest_folder: self.sync_path(spec.value()), options },
            );
        }

        syncs
    }

    /// Resolved mounts whose content is fetched from a URL, keyed by mount
    /// point.
    pub fn remotes(&self, mounts: &BTreeMap<String, MountSpec>) -> BTreeMap<String, ResolvedMount> {
        mounts
            .iter()
            .filter(|(_, spec)| spec.is_remote())
            .map(|(key, spec)| (key.clone(), self.resolve(key, spec, true, true)))
            .collect()
    }

    /// Fetch pending remote mount assets.
    ///
    /// Every remote mount is fetched when the system's `pull_remote` flag is
    /// set, or when its resolved base is missing on the host. Fetches run
    /// concurrently and are all joined; completion order is irrelevant. Once
    /// the whole batch settles, empty batches included, a set `pull_remote`
    /// flag is cleared: a one-shot consumption, never re-armed here.
    #[instrument(skip(self), fields(system = %self.system.name()))]
    pub async fn get_remotes(&self) -> Result<()> {
        let pull = self.system.pull_remote();
        let remote_mounts = self.system.remote_mounts();

        let mut fetches = Vec::new();
        for (key, mount) in &remote_mounts {
            let Some(origin) = mount.options.from.clone() else { continue };

            if pull || !mount.base.exists() {
                let filename = mount
                    .base
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();

                self.events.publish(Event::new(Status::RemoteFetch {
                    system: self.system.name().to_string(),
                    mount: key.clone(),
                    origin: origin.clone(),
                    target: mount.base.clone(),
                    filename,
                }));

                fetches.push(self.fetch_remote(origin, mount.base.clone()));
            }
        }

        if fetches.is_empty() {
            debug!("No remote mounts to fetch");
            if pull {
                self.system.set_pull_remote(false);
            }
            return Ok(());
        }

        future::try_join_all(fetches).await?;

        if pull {
            self.system.set_pull_remote(false);
        }
        Ok(())
    }

    /// Download one remote asset to its host path.
    ///
    /// The retrieval command runs inside a throwaway helper system with the
    /// target's parent directory and the persistent root bind-mounted, so
    /// the artifact lands at the real host path.
    async fn fetch_remote(&self, origin: String, target: PathBuf) -> Result<()> {
        let helper = self.manifest.system(&self.config.shared_system, true)?;

        let mut extra_mounts = BTreeMap::new();
        if let Some(parent) = target.parent() {
            extra_mounts.insert(parent.to_path_buf(), parent.to_path_buf());
        }
        let persistent = self.config.persistent_folders.clone();
        extra_mounts.insert(persistent.clone(), persistent);

        let command = vec![
            "curl".to_string(),
            "-sS".to_string(),
            "-o".to_string(),
            target.to_string_lossy().into_owned(),
            origin.clone(),
        ];

        debug!(origin = %origin, target = %target.display(), "Fetching remote mount asset");
        helper.run_once(&command, &extra_mounts).await.map_err(|err| {
            DockyardError::RemoteFetchFailed { origin, target, reason: err.to_string() }
        })
    }

    /* Path resolvers */

    /// Resolve a declared mount value against the manifest directory. An
    /// empty value resolves to the manifest directory itself.
    fn resolved_path(&self, value: &str) -> PathBuf {
        let manifest_dir = self.system.manifest_dir();
        if value.is_empty() {
            return manifest_dir.to_path_buf();
        }
        let path = Path::new(value);
        if path.is_absolute() {
            clean_path(path)
        } else {
            clean_path(&manifest_dir.join(path))
        }
    }

    /// Sync-cache location for a declared value: the resolved host path,
    /// re-rooted under `sync_root/namespace/system`.
    fn sync_path(&self, value: &str) -> PathBuf {
        let resolved = self.resolved_path(value);
        let mut path = self
            .config
            .sync_folders
            .join(self.system.namespace())
            .join(self.system.name());
        for component in resolved.components() {
            if let Component::Normal(part) = component {
                path.push(part);
            }
        }
        path
    }

    fn use_sync_cache(&self, options: &MountOptions, daemon: bool) -> bool {
        (daemon && options.daemon != Some(false)) || (!daemon && options.shell == Some(true))
    }

    fn base_for(&self, key: &str, spec: &MountSpec, daemon: bool) -> PathBuf {
        // Sync bases differ between daemon and shell context, so the memo
        // key carries the context.
        let cache_key = format!("{}:{}", if daemon { "daemon" } else { "shell" }, key);

        if let Some(base) = self.base_cache.lock().unwrap().get(&cache_key) {
            return base.clone();
        }

        let base = match spec.mount_type() {
            MountType::Path => self.resolved_path(spec.value()),
            MountType::Persistent => self
                .config
                .persistent_folders
                .join(self.system.namespace())
                .join(spec.value()),
            MountType::Sync => {
                if self.use_sync_cache(&spec.options(), daemon) {
                    self.sync_path(spec.value())
                } else {
                    self.resolved_path(spec.value())
                }
            }
        };

        self.base_cache.lock().unwrap().insert(cache_key, base.clone());
        base
    }
}

/// Lexically normalize a path: strips `.` components and folds `..` into
/// their parent where possible. No filesystem access.
fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !cleaned.pop() {
                    cleaned.push(Component::ParentDir);
                }
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}

/// Normalize a mount key nested under `key` into a `./…` exclusion pattern.
fn relative_pattern(key: &str, dir: &str) -> String {
    let rest = dir[key.len()..].trim_start_matches('/');
    let cleaned = clean_path(Path::new(rest));
    format!("./{}", cleaned.display())
}
