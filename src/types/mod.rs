//! Domain types shared by the scaling and mount engines.

pub mod mount;
pub mod system;

pub use mount::{
    MountOptions, MountSpec, MountType, ResolvedMount, SyncEntry, SYNC_DEFAULT_EXCLUDES,
};
pub use system::{EnvMap, ExportContext, Instance, InstanceKind, NetInfo, Scalable, ScaleOptions};
