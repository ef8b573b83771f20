//! dockyard core library
//!
//! Scaling and mount-resolution engines for Docker-based multi-service
//! development environments. The engines consume their collaborators
//! (systems, balancer, Docker inspection, manifests, tracking) through
//! injected traits and stay free of client plumbing.

pub mod balancer;
pub mod config;
pub mod docker;
pub mod error;
pub mod events;
pub mod manifest;
pub mod mounts;
pub mod observability;
pub mod paths;
pub mod scale;
pub mod system;
pub mod tracker;
pub mod types;

// Re-export commonly used items
pub use balancer::Balancer;
pub use config::Config;
pub use docker::{ContainerDetail, DockerInspector, PortAccess};
pub use error::{DockyardError, Result};
pub use events::{Event, EventBus, Status};
pub use manifest::Manifest;
pub use mounts::MountResolver;
pub use scale::ScaleEngine;
pub use system::System;
pub use tracker::{NullTracker, Tracker, TrackerEvent};
pub use types::{
    EnvMap, ExportContext, Instance, InstanceKind, MountOptions, MountSpec, MountType, NetInfo,
    ResolvedMount, Scalable, ScaleOptions, SyncEntry,
};
