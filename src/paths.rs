//! Centralized path configuration for dockyard.
//!
//! All host-side data roots (persistent folders, sync caches, the shared
//! manifest directory) go through this module so the engines and any
//! embedding daemon agree on locations.

use std::path::PathBuf;

/// Get the dockyard data directory.
///
/// Resolution order:
/// 1. `DOCKYARD_DATA_DIR` environment variable
/// 2. `/var/lib/dockyard` if it exists (system install)
/// 3. `~/.dockyard` for user-only installs
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DOCKYARD_DATA_DIR") {
        return PathBuf::from(dir);
    }

    let system_dir = PathBuf::from("/var/lib/dockyard");
    if system_dir.exists() {
        return system_dir;
    }

    dirs::home_dir().map(|h| h.join(".dockyard")).unwrap_or(system_dir)
}

/// Root for persistent mounts, namespaced per manifest.
pub fn persistent_dir() -> PathBuf {
    data_dir().join("persistent_folders")
}

/// Root for host/container sync caches, namespaced per manifest and system.
pub fn sync_dir() -> PathBuf {
    data_dir().join("sync_folders")
}

/// Directory holding the shared manifest used to build helper systems
/// (remote-asset fetches run inside one of these).
pub fn shared_dir() -> PathBuf {
    data_dir().join("shared")
}

/// Get the logs directory.
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}
